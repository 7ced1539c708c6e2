use clap::Parser;
use env_logger::Env;
use log::{error, info};

mod app;
mod assets;
mod cli;
mod presets;

use cli::Cli;

fn init_logging() {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match app::run(&cli) {
        Ok(stats) => info!("Done: {} steps, {} resets", stats.steps, stats.resets),
        Err(e) => {
            error!("{e:#}");
            eprintln!("simlab: {e:#}");
            std::process::exit(1);
        }
    }
}
