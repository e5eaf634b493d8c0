use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tuiman_core::core::paths::AppPaths;
use tuiman_core::core::settings::Settings;

/// Keyboard-driven HTTP request manager for the terminal.
#[derive(Parser, Debug)]
#[command(name = "tuiman", version, about)]
struct Cli {
    /// Directory holding settings.json and saved requests.
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Directory holding the run history, session and log file.
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Log level or filter directive; overrides settings.json.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = AppPaths::from_env()?.with_overrides(cli.config_dir, cli.state_dir);
    paths.ensure()?;

    let settings_file = paths.settings_file();
    let level = cli.log_level.unwrap_or_else(|| {
        Settings::load_with_validation(&settings_file)
            .map(|s| s.log_level)
            .unwrap_or_else(|_| Settings::default().log_level)
    });
    init_logging(&paths, &level);

    let settings = Settings::load(&settings_file);
    tracing::info!("starting tuiman {}", env!("CARGO_PKG_VERSION"));
    tuiman_core::tui_main::run(&paths, settings)
}

/// Log to the state directory; the terminal belongs to the UI. Failing to
/// open the log file only disables logging.
fn init_logging(paths: &AppPaths, level: &str) {
    let log_file = paths.log_file();
    let file = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("tuiman: logging disabled ({}: {e})", log_file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_env("TUIMAN_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
