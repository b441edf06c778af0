pub mod scenarios;

use {
    anyhow::{bail, Context as _},
    chrono::Utc,
    clap::Parser,
    fs_err::create_dir_all,
    itertools::Itertools,
    serde::{Deserialize, Serialize},
    std::{
        collections::BTreeMap,
        env,
        path::{Path, PathBuf},
        process,
    },
    thiserror::Error,
    tracing::{error, info, warn},
    tracing_subscriber::{filter::LevelFilter, EnvFilter},
    uiauto::Screen,
};

const POPUP_TITLE: &str = "FDC3 smoke test";
const GENERIC_FAILURE: &str = "test failed";

/// Expected scenario failure. The message is shown to the operator verbatim.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Failure(pub String);

pub fn fail(message: impl Into<String>) -> anyhow::Error {
    Failure(message.into()).into()
}

/// Popup text for a failed scenario: the `Failure` message if the scenario
/// reported one, the generic text for everything else.
pub fn failure_message(err: &anyhow::Error) -> &str {
    err.downcast_ref::<Failure>()
        .map(|failure| failure.0.as_str())
        .unwrap_or(GENERIC_FAILURE)
}

pub type Scenario = fn(&Screen) -> anyhow::Result<()>;

#[derive(Default)]
pub struct Registry {
    scenarios: BTreeMap<String, Scenario>,
}

impl Registry {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(|s| s.as_str())
    }

    pub fn add(&mut self, name: &str, scenario: Scenario) {
        let old = self.scenarios.insert(name.into(), scenario);
        assert!(old.is_none(), "duplicate scenario name");
    }

    pub fn get(&self, name: &str) -> Option<Scenario> {
        self.scenarios.get(name).copied()
    }
}

fn default_registry() -> Registry {
    let mut registry = Registry::default();
    scenarios::register(&mut registry);
    registry
}

/// Directory with the reference screenshots for the app under test.
pub fn assets_dir() -> PathBuf {
    if let Ok(var) = env::var("FDC3_SMOKE_ASSETS_DIR") {
        PathBuf::from(var)
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("screenshots")
    }
}

fn save_failure_capture(screen: &Screen) -> anyhow::Result<PathBuf> {
    let dir = assets_dir().join("failures");
    create_dir_all(&dir)?;
    let path = dir.join(format!("failure_{}.png", Utc::now().format("%Y%m%d%H%M%S")));
    info!("saving full screen image to {path:?}");
    screen
        .capture()?
        .save(&path)
        .with_context(|| format!("failed to save image {:?}", &path))?;
    Ok(path)
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
enum Args {
    /// Runs a single scenario against the app currently on screen.
    Run { scenario: String },
    /// Lists the registered scenarios.
    List,
    /// Prints machine-readable information about this runner.
    Query { query: String },
}

pub fn run() -> anyhow::Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env()?,
        )
        .init();

    let args = Args::parse();
    let registry = default_registry();

    match args {
        Args::Run { scenario } => {
            let Some(scenario_fn) = registry.get(&scenario) else {
                println!(
                    "scenario {:?} not found, available: {}",
                    scenario,
                    registry.names().join(", ")
                );
                process::exit(1);
            };
            let screen = Screen::new()?;
            // Park the cursor so it doesn't cover the app under test.
            screen.mouse_move_global(1, 1)?;
            info!("running scenario: {}", scenario);
            match scenario_fn(&screen) {
                Ok(()) => {
                    info!("scenario {} passed", scenario);
                    process::exit(0);
                }
                Err(err) => {
                    error!("scenario {} failed: {:?}", scenario, err);
                    if let Err(capture_err) = save_failure_capture(&screen) {
                        warn!("failed to save failure capture: {:?}", capture_err);
                    }
                    uiauto::popup(POPUP_TITLE, failure_message(&err));
                    process::exit(1);
                }
            }
        }
        Args::List => {
            for name in registry.names() {
                println!("{name}");
            }
        }
        Args::Query { query } => {
            if query != "all" {
                bail!("unknown query");
            }
            let data = QueryAllResponse {
                assets_dir: assets_dir(),
                scenarios: registry.names().map(|s| s.to_owned()).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAllResponse {
    pub assets_dir: PathBuf,
    pub scenarios: Vec<String>,
}
