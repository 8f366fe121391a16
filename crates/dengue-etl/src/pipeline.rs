//! Dengue case ETL pipeline
//!
//! Orchestrates the full run from snapshot download to database load.

use tracing::{error, info};

use crate::config::AppConfig;
use crate::db;
use crate::downloader::CaseDownloader;
use crate::models::CaseRecord;
use crate::storage::CaseStorage;
use crate::transform::{CaseTransformer, TransformStats};
use dengue_common::Result;

/// Dengue case ETL pipeline
pub struct DenguePipeline {
    config: AppConfig,
}

impl DenguePipeline {
    /// Create a new pipeline
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the full ETL job
    ///
    /// Stages:
    /// 1. Fetch the case snapshot over HTTP
    /// 2. Transform it into cleaned records for the target state
    /// 3. Replace the database table with the cleaned records
    ///
    /// A fetch failure or an empty transform ends the run early without
    /// touching the database. A load failure is reported in the result
    /// rather than raised, so the job still exits cleanly; only invalid
    /// configuration and non-coercible values abort the run.
    pub async fn run(&self) -> Result<PipelineReport> {
        info!(
            state = %self.config.source.target_state,
            table = %self.config.table,
            "Starting dengue case ETL run"
        );

        // 1. Fetch
        info!("Stage 1/3: Fetching case snapshot");
        let downloader = CaseDownloader::new(self.config.source.clone())?;
        let raw = downloader.fetch().await;

        // 2. Transform
        info!("Stage 2/3: Transforming rows");
        let transformer = CaseTransformer::new(self.config.source.target_state.clone());

        let transformed = match transformer.transform(raw)? {
            Some(transformed) => transformed,
            None => {
                info!("Nothing to load; run ends without touching the database");
                return Ok(PipelineReport {
                    skipped: true,
                    ..PipelineReport::default()
                });
            },
        };

        let records = transformed.records.len();
        let stats = transformed.stats.clone();

        // 3. Load
        info!("Stage 3/3: Loading records");
        let loaded = match self.load(&transformed.records).await {
            Ok(stored) => Some(stored),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                error!(error = %err, "Load failed; run ends without writing data");
                None
            },
        };

        info!(
            records = records,
            loaded = ?loaded,
            "Dengue case ETL run completed"
        );

        Ok(PipelineReport {
            records,
            stats,
            loaded,
            skipped: false,
        })
    }

    /// Connect, replace the table, and release the connection
    async fn load(&self, records: &[CaseRecord]) -> Result<usize> {
        let pool = db::create_pool(&self.config.database).await?;

        let storage = CaseStorage::new(pool, self.config.table.clone());
        let stored = storage.store_replace(records).await;

        storage.db().close().await;

        stored
    }
}

/// Result of running the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Cleaned records produced by the transform stage
    pub records: usize,
    /// Rows removed during cleaning
    pub stats: TransformStats,
    /// Records written to the database (None if the load failed or was skipped)
    pub loaded: Option<usize>,
    /// Whether the run ended early with nothing to load
    pub skipped: bool,
}

impl PipelineReport {
    /// Check if the run wrote data to the database
    pub fn is_success(&self) -> bool {
        !self.skipped && self.loaded.is_some()
    }

    /// Get a summary message
    pub fn summary(&self) -> String {
        if self.skipped {
            "Run skipped - no data to load".to_string()
        } else if let Some(loaded) = self.loaded {
            format!(
                "Loaded {} records ({} undated, {} negative, {} duplicate rows dropped)",
                loaded,
                self.stats.undated_dropped,
                self.stats.negative_dropped,
                self.stats.duplicates_dropped
            )
        } else {
            format!(
                "Load failed - {} cleaned records were not written",
                self.records
            )
        }
    }
}
