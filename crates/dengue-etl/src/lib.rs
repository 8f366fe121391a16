//! Dengue ETL Library
//!
//! Batch job that rebuilds a per-state dengue case table from the public
//! brasil.io snapshot.
//!
//! # Stages
//!
//! - **Fetch**: download and gunzip the case CSV over HTTP
//! - **Transform**: filter to one state, clean, and derive calendar columns
//! - **Load**: replace the target table inside a single transaction
//!
//! # Example
//!
//! ```no_run
//! use dengue_etl::config::AppConfig;
//! use dengue_etl::pipeline::DenguePipeline;
//! use tracing::info;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let report = DenguePipeline::new(config).run().await?;
//!     info!("{}", report.summary());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod downloader;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod storage;
pub mod transform;

pub use dengue_common::{EtlError, Result};
