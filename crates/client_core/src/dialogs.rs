use unsub_shared::protocol::Scenario;

pub const NEW_SCENARIO_NAME: &str = "Untitled scenario";

/// Flags for the scenario copy/create/rename/delete/open dialogs. Opening
/// one dialog leaves the others as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogState {
    is_copy_dialog_open: bool,
    is_create_dialog_open: bool,
    is_rename_dialog_open: bool,
    is_delete_dialog_open: bool,
    is_open_scenario_dialog_open: bool,
    scenario_to_edit: Option<Scenario>,
    new_name: String,
    is_loading: bool,
}

impl DialogState {
    pub fn set_copy_dialog(&mut self, open: bool) {
        self.is_copy_dialog_open = open;
    }

    pub fn set_create_dialog(&mut self, open: bool) {
        self.is_create_dialog_open = open;
    }

    pub fn set_rename_dialog(&mut self, open: bool) {
        self.is_rename_dialog_open = open;
    }

    pub fn set_delete_dialog(&mut self, open: bool) {
        self.is_delete_dialog_open = open;
    }

    pub fn set_open_scenario_dialog(&mut self, open: bool) {
        self.is_open_scenario_dialog_open = open;
    }

    pub fn loading_start(&mut self) {
        self.is_loading = true;
    }

    pub fn loading_finish(&mut self) {
        self.is_loading = false;
    }

    pub fn open_copy_dialog(&mut self, scenario: &Scenario) {
        self.new_name = format!("Copy of {}", scenario.name());
        self.scenario_to_edit = Some(scenario.clone());
        self.is_copy_dialog_open = true;
    }

    pub fn open_create_dialog(&mut self) {
        self.scenario_to_edit = None;
        self.new_name = NEW_SCENARIO_NAME.to_string();
        self.is_create_dialog_open = true;
    }

    pub fn open_rename_dialog(&mut self, scenario: &Scenario) {
        self.new_name = scenario.name().to_string();
        self.scenario_to_edit = Some(scenario.clone());
        self.is_rename_dialog_open = true;
    }

    pub fn open_delete_dialog(&mut self, scenario: &Scenario) {
        self.scenario_to_edit = Some(scenario.clone());
        self.is_delete_dialog_open = true;
    }

    pub fn open_open_scenario_dialog(&mut self) {
        self.scenario_to_edit = None;
        self.is_open_scenario_dialog_open = true;
    }

    pub fn set_new_name(&mut self, name: impl Into<String>) {
        self.new_name = name.into();
    }

    pub fn close_all(&mut self) {
        self.scenario_to_edit = None;
        self.new_name.clear();
        self.is_delete_dialog_open = false;
        self.is_copy_dialog_open = false;
        self.is_create_dialog_open = false;
        self.is_rename_dialog_open = false;
        self.is_open_scenario_dialog_open = false;
    }

    pub fn scenario_to_edit(&self) -> Option<&Scenario> {
        self.scenario_to_edit.as_ref()
    }

    pub fn is_copy_dialog_open(&self) -> bool {
        self.is_copy_dialog_open
    }

    pub fn is_create_dialog_open(&self) -> bool {
        self.is_create_dialog_open
    }

    pub fn is_rename_dialog_open(&self) -> bool {
        self.is_rename_dialog_open
    }

    pub fn is_delete_dialog_open(&self) -> bool {
        self.is_delete_dialog_open
    }

    pub fn is_open_scenario_dialog_open(&self) -> bool {
        self.is_open_scenario_dialog_open
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn new_name(&self) -> &str {
        &self.new_name
    }

    pub fn any_open(&self) -> bool {
        self.is_copy_dialog_open
            || self.is_create_dialog_open
            || self.is_rename_dialog_open
            || self.is_delete_dialog_open
            || self.is_open_scenario_dialog_open
    }
}

#[cfg(test)]
#[path = "tests/dialogs_tests.rs"]
mod tests;
