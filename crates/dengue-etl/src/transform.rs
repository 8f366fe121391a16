//! Case transformation
//!
//! The core of the pipeline: reduces the raw snapshot to one state's rows,
//! coerces the reporting columns, derives the calendar columns, and removes
//! exact duplicates.
//!
//! Cleaning is tiered by failure class. An unparseable notification date or
//! a negative case count drops the row and counts it; a value in a numeric
//! column that is not an integer aborts the whole run, because it means the
//! upstream schema drifted rather than a row went bad.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::models::{CaseRecord, RawCaseRow};
use dengue_common::{EtlError, Result};

/// Source date format ("2023-01-02")
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Counters for rows removed during transformation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Rows matching the target state before cleaning
    pub region_rows: usize,

    /// Rows dropped because the notification date failed to parse
    pub undated_dropped: usize,

    /// Rows dropped because the case count was negative
    pub negative_dropped: usize,

    /// Exact duplicate rows removed
    pub duplicates_dropped: usize,
}

/// Cleaned records plus the counters describing how they were produced
#[derive(Debug, Clone)]
pub struct TransformedCases {
    pub records: Vec<CaseRecord>,
    pub stats: TransformStats,
}

/// Transformer for raw case rows
pub struct CaseTransformer {
    target_state: String,
}

impl CaseTransformer {
    /// Create a transformer for one target state
    pub fn new(target_state: impl Into<String>) -> Self {
        Self {
            target_state: target_state.into(),
        }
    }

    /// Transform the raw snapshot into cleaned records
    ///
    /// `None` in means the fetch produced nothing. `None` out means there is
    /// nothing to load: absent input, no rows for the target state, or every
    /// row cleaned away. The only error a transform can raise is a
    /// non-coercible numeric value.
    pub fn transform(&self, raw: Option<Vec<RawCaseRow>>) -> Result<Option<TransformedCases>> {
        let rows = match raw {
            Some(rows) => rows,
            None => {
                warn!("No snapshot data to transform; skipping");
                return Ok(None);
            },
        };

        let total = rows.len();

        // 1. Keep only the target state, remembering each row's position in
        //    the snapshot for error reporting
        let region_rows: Vec<(usize, RawCaseRow)> = rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.state == self.target_state)
            .collect();

        if region_rows.is_empty() {
            warn!(
                state = %self.target_state,
                total_rows = total,
                "No rows for target state; nothing to transform"
            );
            return Ok(None);
        }

        info!(
            state = %self.target_state,
            region_rows = region_rows.len(),
            total_rows = total,
            "Filtered snapshot to target state"
        );

        let mut stats = TransformStats {
            region_rows: region_rows.len(),
            ..TransformStats::default()
        };

        // 2. Parse dates, coerce integers, drop unusable rows
        let mut records = Vec::with_capacity(region_rows.len());

        for (idx, row) in &region_rows {
            let line = idx + 1;

            let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).ok();

            // Coercion runs for every region row, dated or not; a broken
            // numeric value must abort the run, not vanish with a row that
            // was going to be dropped anyway.
            let ibge_code = coerce_int("city_ibge_code", &row.city_ibge_code, line)?;
            let cases = coerce_int("cases", &row.cases, line)?;

            let date = match date {
                Some(date) => date,
                None => {
                    stats.undated_dropped += 1;
                    continue;
                },
            };

            if cases < 0 {
                stats.negative_dropped += 1;
                continue;
            }

            records.push(CaseRecord::from_parts(date, row.city.clone(), ibge_code, cases));
        }

        if stats.undated_dropped > 0 {
            warn!(
                dropped = stats.undated_dropped,
                "Dropped rows with unparseable notification dates"
            );
        }

        if stats.negative_dropped > 0 {
            warn!(
                dropped = stats.negative_dropped,
                "Dropped rows with negative case counts"
            );
        }

        // 3. Remove exact duplicates, keeping first occurrences in order
        let before = records.len();
        let mut seen = HashSet::with_capacity(records.len());
        records.retain(|record| seen.insert(record.clone()));
        stats.duplicates_dropped = before - records.len();

        info!(
            duplicates = stats.duplicates_dropped,
            "Removed exact duplicate records"
        );

        if records.is_empty() {
            warn!("All rows were dropped during cleaning; nothing to load");
            return Ok(None);
        }

        info!(records = records.len(), "Transformation complete");

        Ok(Some(TransformedCases { records, stats }))
    }
}

/// Coerce a source value to an integer
///
/// Accepts an integer literal, or a float literal with zero fractional part
/// (the source renders integer columns as floats whenever the column carries
/// nulls). Anything else is a coercion error naming the field, the raw
/// value, and the row.
fn coerce_int(field: &str, value: &str, row: usize) -> Result<i64> {
    let trimmed = value.trim();

    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(parsed);
    }

    if let Ok(parsed) = trimmed.parse::<f64>() {
        if parsed.fract() == 0.0 && parsed >= i64::MIN as f64 && parsed <= i64::MAX as f64 {
            return Ok(parsed as i64);
        }
    }

    Err(EtlError::Coercion {
        field: field.to_string(),
        value: value.to_string(),
        row,
    })
}

// ============================================================================
// Tests
// ============================================================================
