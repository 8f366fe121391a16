//! Dengue ETL - rebuilds the dengue case table from the public snapshot

use anyhow::Result;
use clap::Parser;
use dengue_common::logging::{init_logging, LogConfig, LogLevel};
use dengue_etl::config::AppConfig;
use dengue_etl::pipeline::DenguePipeline;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dengue-etl")]
#[command(author, version, about = "Dengue case snapshot ETL job")]
struct Cli {
    /// Destination table for cleaned records
    #[arg(long, env = "DENGUE_TABLE")]
    table: Option<String>,

    /// Stop parsing the snapshot after this many rows
    #[arg(long, env = "DENGUE_ROW_LIMIT")]
    limit: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Environment settings first; the verbose flag then bumps the level
    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    init_logging(&log_config)?;

    let mut config = AppConfig::load()?;

    if let Some(table) = cli.table {
        config.table = table;
    }

    if let Some(limit) = cli.limit {
        config.source.row_limit = Some(limit);
    }

    // Command line overrides can invalidate a loaded config
    config.validate()?;

    let report = DenguePipeline::new(config).run().await?;

    info!("{}", report.summary());
    info!("Dengue ETL run finished");

    Ok(())
}
