use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dimensional_pipeline::logging::{init_logging, DEFAULT_LOG_FILE};
use dimensional_pipeline::prelude::*;

#[derive(Parser)]
#[command(name = "dimensional-flow")]
#[command(about = "Refresh the dimensional warehouse for a date range", long_about = None)]
#[command(version)]
struct Cli {
    /// First order date to load (YYYY-MM-DD)
    #[arg(long = "start_date", value_name = "DATE")]
    start_date: String,

    /// Last order date to load (YYYY-MM-DD)
    #[arg(long = "end_date", value_name = "DATE")]
    end_date: String,

    /// Path to the SQL Server config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory containing the update scripts
    #[arg(long, default_value = DEFAULT_QUERIES_DIR)]
    queries_dir: PathBuf,

    /// Log file (appended)
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Print the flow result as JSON
    #[arg(long)]
    json: bool,

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

    let _guard = match init_logging(&cli.log_file, cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "Pipeline failed");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    // Reject bad input before touching the database
    let range = DateRange::parse(&cli.start_date, &cli.end_date)?;
    let config = ConnectionConfig::load(&cli.config)?;

    let names = WarehouseNames {
        database: config.database.clone(),
        ..WarehouseNames::default()
    };
    let ctx = TaskContext::new(Arc::new(TiberiusConnector::new(config)), &cli.queries_dir)
        .with_names(names);

    let mut flow = DimensionalDataFlow::new(ctx)?;
    let result = flow.exec(&range).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_flow_result(&result);
    }

    Ok(result.success)
}

fn print_flow_result(result: &FlowResult) {
    println!("\n=== Flow Result ===\n");
    println!("Success: {}", if result.success { "YES" } else { "NO" });
    println!("Execution ID: {}\n", result.execution_id);

    for outcome in &result.results {
        let status = if outcome.result.success { "✓" } else { "✗" };
        println!(
            "{} {} ({} batches, {}ms)",
            status, outcome.step, outcome.result.batches, outcome.result.duration_ms
        );
        if let Some(err) = &outcome.result.error {
            println!("    Error: {}", err);
        }
    }

    if let Some(err) = &result.error {
        println!("\n{}", err);
    }
}
