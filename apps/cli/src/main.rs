use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use unsub_client::{load_settings, AppStore, PublisherState};
use unsub_shared::{
    domain::{Issnl, PublisherId, ScenarioId},
    protocol::Credentials,
};

const DEFAULT_TOKEN_PATH: &str = "unsub_storage.json";

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the configured API base url.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        password: String,
    },
    Demo {
        email: String,
        password: String,
        name: String,
    },
    Me,
    SetName {
        name: String,
    },
    Logout,
    Publisher {
        publisher_id: String,
    },
    Apc {
        publisher_id: String,
    },
    Scenario {
        scenario_id: String,
    },
    CreateScenario {
        publisher_id: String,
        name: String,
    },
    CopyScenario {
        publisher_id: String,
        scenario_id: String,
        name: String,
    },
    RenameScenario {
        publisher_id: String,
        scenario_id: String,
        name: String,
    },
    DeleteScenario {
        publisher_id: String,
        scenario_id: String,
    },
    /// Sets one scenario config; the value is read as JSON, falling back to a string.
    SetConfig {
        scenario_id: String,
        key: String,
        value: String,
    },
    Subscribe {
        scenario_id: String,
        issnl: String,
    },
    Unsubscribe {
        scenario_id: String,
        issnl: String,
    },
    RefreshFile {
        publisher_id: String,
        file_id: String,
    },
}

fn print_publisher(state: &PublisherState) {
    println!("{} ({})", state.name(), state.publisher());
    println!(
        "journals={} valid={} currency={} big_deal_cost={}{}",
        state.journals().len(),
        state.valid_journals().count(),
        state.currency(),
        state.currency_symbol().unwrap_or(""),
        state.big_deal_cost()
    );
    match state.active_counter_version() {
        Some(version) => println!("counter: {version}"),
        None => println!("counter: not uploaded"),
    }
    for file in state.data_files() {
        println!(
            "  file {:<16} uploaded={} live={}",
            file.id, file.uploaded, file.is_live
        );
    }
    for warning in state.warnings_active() {
        println!("  warning {}", warning.id);
    }
    for scenario in state.scenarios() {
        println!("  scenario {} {}", scenario.id, scenario.name());
    }
}

fn parse_config_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = cli.api_url {
        settings.api_base_url = url;
    }
    if let Some(path) = cli.token_path {
        settings.token_path = Some(path);
    }
    settings
        .token_path
        .get_or_insert_with(|| PathBuf::from(DEFAULT_TOKEN_PATH));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();

    let store = AppStore::from_settings(&settings).context("building api client")?;

    match cli.command {
        Command::Login { username, password } => {
            store
                .user
                .login(&Credentials { username, password })
                .await?;
            println!("logged in as {}", store.user.state().await.name());
        }
        Command::Demo {
            email,
            password,
            name,
        } => {
            store.user.create_demo(&email, &password, &name).await?;
            println!("demo account created for {email}");
        }
        Command::Me => {
            store.user.fetch_user().await?;
            let user = store.user.state().await;
            println!("name={} email={}", user.name(), user.email());
            println!("demo={} password_set={}", user.is_demo(), user.password_is_set());
            for institution in user.institutions() {
                println!("  institution {}", institution.institution_name);
            }
        }
        Command::SetName { name } => {
            store.user.fetch_user().await?;
            store.user.change_name(&name).await?;
            println!("name changed to {name}");
        }
        Command::Logout => {
            store.user.logout().await?;
            println!("logged out");
        }
        Command::Publisher { publisher_id } => {
            store
                .publisher
                .fetch_publisher(&PublisherId::from(publisher_id))
                .await?;
            print_publisher(&store.publisher.state().await);
        }
        Command::Apc { publisher_id } => {
            let Some(apc) = store
                .publisher
                .fetch_publisher_apc_data(&PublisherId::from(publisher_id))
                .await
            else {
                bail!("APC data could not be loaded");
            };
            println!("{}", serde_json::to_string_pretty(&apc)?);
        }
        Command::Scenario { scenario_id } => {
            let scenario = store
                .scenario
                .fetch_scenario(&ScenarioId::from(scenario_id))
                .await?;
            let state = store.scenario.state().await;
            println!("{} {}", scenario.id, scenario.name());
            println!("summary digest: {}", state.digest());
            println!("subscriptions: {}", scenario.subrs.len());
        }
        Command::CreateScenario { publisher_id, name } => {
            store
                .publisher
                .fetch_publisher_lazy(&PublisherId::from(publisher_id))
                .await?;
            let scenario = store.publisher.create_scenario(&name).await?;
            println!("created scenario {}", scenario.id);
        }
        Command::CopyScenario {
            publisher_id,
            scenario_id,
            name,
        } => {
            store
                .publisher
                .fetch_publisher_lazy(&PublisherId::from(publisher_id))
                .await?;
            let scenario = store
                .publisher
                .copy_scenario(&ScenarioId::from(scenario_id), &name)
                .await?;
            println!("copied into scenario {}", scenario.id);
        }
        Command::RenameScenario {
            publisher_id,
            scenario_id,
            name,
        } => {
            store
                .publisher
                .fetch_publisher_lazy(&PublisherId::from(publisher_id))
                .await?;
            let scenario = store
                .publisher
                .rename_scenario(&ScenarioId::from(scenario_id), &name)
                .await?;
            println!("renamed scenario {} to {}", scenario.id, scenario.name());
        }
        Command::DeleteScenario {
            publisher_id,
            scenario_id,
        } => {
            store
                .publisher
                .fetch_publisher_lazy(&PublisherId::from(publisher_id))
                .await?;
            let id = ScenarioId::from(scenario_id);
            store.publisher.delete_scenario(&id).await?;
            println!("deleted scenario {id}");
        }
        Command::SetConfig {
            scenario_id,
            key,
            value,
        } => {
            store
                .scenario
                .fetch_scenario(&ScenarioId::from(scenario_id))
                .await?;
            store
                .scenario
                .set_config(&key, parse_config_value(&value))
                .await?;
            println!("configs: {}", store.scenario.state().await.configs_digest());
        }
        Command::Subscribe { scenario_id, issnl } => {
            store
                .scenario
                .fetch_scenario(&ScenarioId::from(scenario_id))
                .await?;
            store.scenario.add_subr(Issnl::from(issnl)).await?;
            println!("subscribed");
        }
        Command::Unsubscribe { scenario_id, issnl } => {
            store
                .scenario
                .fetch_scenario(&ScenarioId::from(scenario_id))
                .await?;
            store.scenario.remove_subr(&Issnl::from(issnl)).await?;
            println!("unsubscribed");
        }
        Command::RefreshFile {
            publisher_id,
            file_id,
        } => {
            store
                .publisher
                .fetch_publisher(&PublisherId::from(publisher_id))
                .await?;
            let file = store.publisher.refresh_data_file(&file_id).await?;
            println!(
                "{} uploaded={} live={} rows={:?}",
                file.id, file.uploaded, file.is_live, file.rows_count
            );
        }
    }

    Ok(())
}
