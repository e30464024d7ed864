mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    // `.env` must be loaded before clap reads `env = ...` defaults.
    let _ = dotenvy::dotenv();
    let args = platform::Args::parse();
    platform::run_app(args)
}
