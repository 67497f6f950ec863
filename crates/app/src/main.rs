use std::process::ExitCode;

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use study_planner_smoke::{
    config::{ConfigOverrides, load_config},
    run_with_config,
};
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "study-planner-smoke",
    version,
    about = "End-to-end smoke tests for the study planner API"
)]
struct Cli {
    /// Path to a TOML config file (defaults to config/smoke.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<Utf8PathBuf>,
    /// API base URL, e.g. http://localhost:8001/api
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!(?err, "smoke run could not complete");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let overrides = ConfigOverrides {
        base_url: cli.base_url,
        report_path: cli.report,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;

    let summary = run_with_config(&config);
    println!();
    print!("{summary}");

    if let Some(path) = &config.report_path {
        summary.write_json(path)?;
        println!("Run report written to {path}");
    }
    Ok(summary.exit_code)
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
