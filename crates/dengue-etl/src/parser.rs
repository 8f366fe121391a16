//! Snapshot CSV parser
//!
//! Decodes the decompressed snapshot body into raw case rows. The snapshot
//! is header-addressed: columns are matched by name, extra columns are
//! ignored, and the five columns the pipeline uses must all be present.
//!
//! Parsing is all-or-nothing. A record that cannot be decoded (ragged row,
//! invalid UTF-8, missing column) fails the whole parse; the fetch stage
//! turns that into the absent dataset.

use csv::ReaderBuilder;
use dengue_common::{EtlError, Result};
use tracing::debug;

use crate::models::RawCaseRow;

/// Parser for the dengue case snapshot CSV
pub struct CaseCsvParser {
    /// Maximum number of rows to parse (None for unlimited)
    row_limit: Option<usize>,
}

impl CaseCsvParser {
    /// Create a new parser with no limit
    pub fn new() -> Self {
        Self { row_limit: None }
    }

    /// Create a parser with a row limit
    pub fn with_limit(limit: usize) -> Self {
        Self {
            row_limit: Some(limit),
        }
    }

    /// Parse CSV content into raw case rows
    ///
    /// The first record is the header. An empty body or a headers-only body
    /// parses to an empty vector.
    pub fn parse(&self, content: &[u8]) -> Result<Vec<RawCaseRow>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(content);

        let mut rows = Vec::new();

        for (idx, result) in reader.deserialize::<RawCaseRow>().enumerate() {
            let row = result
                .map_err(|e| EtlError::Parse(format!("CSV record {}: {}", idx + 1, e)))?;
            rows.push(row);

            if let Some(limit) = self.row_limit {
                if rows.len() >= limit {
                    debug!("Reached row limit of {} rows", limit);
                    break;
                }
            }
        }

        Ok(rows)
    }
}

impl Default for CaseCsvParser {
    fn default() -> Self {
        Self::new()
    }
}
