mod console;
mod menus;

use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console::Console;
use hms_core::clock::{Clock, SystemClock};
use hms_core::constants::{CASE_ID_BASE_ENV, DATA_DIR_ENV};
use hms_core::repositories::CsvRepository;
use hms_core::{CoreConfig, HmsError};
use menus::Session;

/// Interactive hospital management console.
///
/// Presents the role menu on stdin/stdout. Every change is written to the CSV
/// data files as soon as it is made, so leaving the menu (or closing stdin)
/// needs no extra save step.
///
/// # Environment Variables
/// - `HMS_DATA_DIR`: directory holding the CSV files (default: `<project root>/data`)
/// - `HMS_CASE_ID_BASE`: floor for generated case numbers (default: 3350)
/// - `RUST_LOG`: log filter, added to the default `hms=info`
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hms=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cfg = Arc::new(CoreConfig::resolve(
        std::env::var(DATA_DIR_ENV).ok(),
        std::env::var(CASE_ID_BASE_ENV).ok(),
        &std::env::current_dir()?,
    )?);
    tracing::info!("++ Using data directory {}", cfg.data_dir().display());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let session = Session {
        repo: Arc::new(CsvRepository::new(Arc::clone(&cfg))),
        cfg,
        clock,
    };

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    match menus::run(&mut console, &session) {
        Ok(()) => {
            console.say("Goodbye.")?;
            Ok(())
        }
        Err(HmsError::InputClosed) => {
            tracing::info!("input closed, exiting");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
