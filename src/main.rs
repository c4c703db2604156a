use hot_water_reset::{AppConfig, HotWaterError, Pipeline, RunSummary};
use log::{error, info};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: hot-water-reset [CONFIG.toml]";

async fn run(config_path: Option<PathBuf>) -> Result<RunSummary, HotWaterError> {
    let config = AppConfig::load(config_path)?;
    info!(
        "Window {} .. {}, output in {}",
        config.window.start,
        config.window.end,
        config.output.dir.display()
    );
    Pipeline::from_config(&config)?.run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = match std::env::args_os().nth(1) {
        Some(arg) if arg == "-h" || arg == "--help" => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        arg => arg.map(PathBuf::from),
    };

    match run(config_path).await {
        Ok(summary) => {
            for report in &summary.reports {
                info!(
                    "{}: {} series, {} unresolved points, {} files",
                    report.name,
                    report.series,
                    report.unresolved,
                    report.files.len()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
