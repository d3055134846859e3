mod cli;
mod core;
mod engine;
mod sql;
mod storage;

use clap::Parser;
use cli::Cli;
use core::config::ConfigManager;
use logly::prelude::*;

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new();
    let logger_config = LoggerConfig { color: true, ..Default::default() };
    logger.configure(logger_config);

    let mut config_manager = ConfigManager::new()?;
    config_manager.init()?;

    let log_path = config_manager.root_dir.join("log").join("rootdb.log");
    logger.add_sink(SinkConfig {
        path: Some(log_path),
        rotation: Some("daily".to_string()),
        retention: Some(7),
        async_write: true,
        ..Default::default()
    })?;

    cli::run(cli, &logger)
}
