//! Static display metadata the backend does not send.

use unsub_shared::domain::CounterVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFileInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub counter_version: Option<CounterVersion>,
    pub server_key: &'static str,
    pub msg: &'static str,
}

pub const DATA_FILES: &[DataFileInfo] = &[
    DataFileInfo {
        id: "counter",
        display_name: "COUNTER JR1 report",
        counter_version: Some(CounterVersion::V4),
        server_key: "counter",
        msg: "COUNTER 4 Journal Report 1: full-text article requests by journal.",
    },
    DataFileInfo {
        id: "counterTrj2",
        display_name: "COUNTER TR_J2 report",
        counter_version: Some(CounterVersion::V5),
        server_key: "counter-trj2",
        msg: "COUNTER 5 TR_J2: access denied by journal and reason.",
    },
    DataFileInfo {
        id: "counterTrj3",
        display_name: "COUNTER TR_J3 report",
        counter_version: Some(CounterVersion::V5),
        server_key: "counter-trj3",
        msg: "COUNTER 5 TR_J3: journal usage by access type.",
    },
    DataFileInfo {
        id: "counterTrj4",
        display_name: "COUNTER TR_J4 report",
        counter_version: Some(CounterVersion::V5),
        server_key: "counter-trj4",
        msg: "COUNTER 5 TR_J4: journal requests by year of publication.",
    },
    DataFileInfo {
        id: "price",
        display_name: "Title-by-title pricelist",
        counter_version: None,
        server_key: "price",
        msg: "Your a-la-carte subscription price for each journal in the package.",
    },
    DataFileInfo {
        id: "perpetualAccess",
        display_name: "Post-Termination Access (PTA)",
        counter_version: None,
        server_key: "perpetual-access",
        msg: "The date ranges of content you keep access to after cancelling.",
    },
    DataFileInfo {
        id: "coreJournals",
        display_name: "Core journals list",
        counter_version: None,
        server_key: "core-journals",
        msg: "Journals that must stay subscribed regardless of cost per use.",
    },
];

pub fn data_file_info(id: &str) -> Option<&'static DataFileInfo> {
    DATA_FILES.iter().find(|info| info.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub link: &'static str,
    pub msg: &'static str,
}

pub const WARNINGS: &[WarningInfo] = &[
    WarningInfo {
        id: "missingPerpetualAccess",
        display_name: "Missing PTA data",
        link: "http://help.unsub.org",
        msg: "You haven't uploaded any information about your PTA (Post-Termination Access) rights, so the forecast is assuming you will lose all access to existing content if you cancel. This is probably not true, and leads to a less accurate and more pessimistic forecast.",
    },
    WarningInfo {
        id: "missingPrices",
        display_name: "Missing price data",
        link: "http://help.unsub.org",
        msg: "Some journals in this package have no a-la-carte price, so they are left out of cost per use rankings until a pricelist covering them is uploaded.",
    },
];

pub fn warning_info(id: &str) -> Option<&'static WarningInfo> {
    WARNINGS.iter().find(|info| info.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Currency,
    Percent,
    Number,
    Bool,
}

/// Editable scenario setting, keyed by its name in `Scenario::configs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioConfigInfo {
    pub name: &'static str,
    pub display: &'static str,
    pub kind: ConfigKind,
    pub descr: &'static str,
}

pub const SCENARIO_CONFIGS: &[ScenarioConfigInfo] = &[
    ScenarioConfigInfo {
        name: "cost_bigdeal",
        display: "Big Deal cost",
        kind: ConfigKind::Currency,
        descr: "Annual cost of the current bundled package.",
    },
    ScenarioConfigInfo {
        name: "cost_bigdeal_increase",
        display: "Big Deal annual increase",
        kind: ConfigKind::Percent,
        descr: "Expected yearly price increase of the bundle.",
    },
    ScenarioConfigInfo {
        name: "cost_alacart_increase",
        display: "A-la-carte annual increase",
        kind: ConfigKind::Percent,
        descr: "Expected yearly price increase of individual titles.",
    },
    ScenarioConfigInfo {
        name: "cost_content_fee_percent",
        display: "Content fee",
        kind: ConfigKind::Percent,
        descr: "Fee charged on top of title prices when leaving the bundle.",
    },
    ScenarioConfigInfo {
        name: "cost_ill",
        display: "ILL transaction cost",
        kind: ConfigKind::Currency,
        descr: "Cost of fulfilling one interlibrary loan request.",
    },
    ScenarioConfigInfo {
        name: "ill_request_percent_of_delayed",
        display: "ILL request rate",
        kind: ConfigKind::Percent,
        descr: "Share of delayed-access usage that turns into ILL requests.",
    },
    ScenarioConfigInfo {
        name: "weight_citation",
        display: "Citation weight",
        kind: ConfigKind::Number,
        descr: "Downloads one citation from your authors is worth.",
    },
    ScenarioConfigInfo {
        name: "weight_authorship",
        display: "Authorship weight",
        kind: ConfigKind::Number,
        descr: "Downloads one authored paper is worth.",
    },
    ScenarioConfigInfo {
        name: "include_bronze",
        display: "Include Bronze OA",
        kind: ConfigKind::Bool,
        descr: "Count free-to-read publisher copies as open access.",
    },
    ScenarioConfigInfo {
        name: "include_submitted_version",
        display: "Include submitted versions",
        kind: ConfigKind::Bool,
        descr: "Count preprints as open access.",
    },
    ScenarioConfigInfo {
        name: "include_backfile",
        display: "Include backfile",
        kind: ConfigKind::Bool,
        descr: "Count usage of content covered by post-termination access.",
    },
    ScenarioConfigInfo {
        name: "backfile_contribution",
        display: "Backfile contribution",
        kind: ConfigKind::Percent,
        descr: "Share of backfile usage still reachable after cancelling.",
    },
    ScenarioConfigInfo {
        name: "include_social_networks",
        display: "Include academic social networks",
        kind: ConfigKind::Bool,
        descr: "Count copies on academic social networks as open access.",
    },
];

pub fn scenario_config_info(name: &str) -> Option<&'static ScenarioConfigInfo> {
    SCENARIO_CONFIGS.iter().find(|info| info.name == name)
}

pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "USD" | "CAD" | "AUS" | "NZD" | "HKD" => Some("$"),
        "GBP" => Some("£"),
        "EUR" => Some("€"),
        _ => None,
    }
}

pub fn publisher_logo(publisher: &str) -> Option<&'static str> {
    let key = publisher
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match key.as_str() {
        "elsevier" => Some("/img/publisher-logos/elsevier.png"),
        "wiley" => Some("/img/publisher-logos/wiley.png"),
        "springernature" | "springer" => Some("/img/publisher-logos/springer-nature.png"),
        "sage" => Some("/img/publisher-logos/sage.png"),
        "taylorfrancis" | "taylorandfrancis" => Some("/img/publisher-logos/taylor-francis.png"),
        _ => None,
    }
}
