use clap::Parser;
use filament_tracker_lib::config::Config;
use rolling_logger::LoggerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let _log_guard = rolling_logger::init_logger_with(
        &config.log_dir,
        "filament-tracker",
        LoggerConfig {
            level: config.log_level.clone(),
            ..LoggerConfig::default()
        },
    )?;

    if let Some(path) = rolling_logger::current_log_file() {
        rolling_logger::info(&format!("Logging to {}", path.display()))?;
    }

    if let Err(e) = filament_tracker_lib::run(config).await {
        let _ = rolling_logger::error(&format!("Fatal: {:#}", e));
        return Err(e);
    }
    Ok(())
}
