use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dimensional_pipeline::logging::init_console_logging;
use dimensional_pipeline::prelude::*;

#[derive(Parser)]
#[command(name = "load-staging")]
#[command(about = "Load workbook sheets into the staging tables", long_about = None)]
#[command(version)]
struct Cli {
    /// Source workbook
    #[arg(long, default_value = DEFAULT_WORKBOOK_PATH)]
    workbook: PathBuf,

    /// Path to the SQL Server config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = init_console_logging(cli.verbose) {
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Staging load failed");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ConnectionConfig::load(&cli.config)?;
    let mut workbook = CalamineWorkbook::open(&cli.workbook)?;
    let connector = TiberiusConnector::new(config);

    let report = StagingLoader::default().load(&mut workbook, &connector).await?;

    println!("\n=== Staging Summary ===\n");
    for (table, count) in &report.summary {
        println!("{}: {} rows", table, count);
    }
    if !report.skipped.is_empty() {
        println!("\nSkipped sheets: {}", report.skipped.join(", "));
    }

    Ok(())
}
