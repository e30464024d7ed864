mod app;
mod config;
mod effects;
mod logging;
mod ui;

use std::path::PathBuf;

use clap::Parser;

pub use app::run_app;

/// Interactive shell for requesting and downloading security reports.
#[derive(Debug, Parser)]
#[command(name = "portal", version, about)]
pub struct Args {
    /// RON configuration file; missing files fall back to defaults.
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Where log lines go.
    #[arg(long, value_enum, default_value_t = logging::LogDestination::File)]
    pub log: logging::LogDestination,
    /// Overrides `log_level` from the config file.
    #[arg(long, env = "PORTAL_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// Directory for downloaded reports and document exports.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
