// Dengue Case Data Models

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw CSV Row
// ============================================================================

/// One record of the source CSV, projected onto the columns the pipeline
/// uses and kept as raw strings
///
/// The snapshot carries more columns than these five; they are ignored at
/// deserialization. Type coercion is the transformer's job, so nothing is
/// parsed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCaseRow {
    /// Notification date as written in the file (expected "YYYY-MM-DD")
    pub date: String,

    /// Two-letter state code (e.g., "RJ")
    pub state: String,

    /// City name
    pub city: String,

    /// IBGE municipality code; the source renders it as a float when the
    /// column carries nulls (e.g., "3304557.0")
    pub city_ibge_code: String,

    /// Confirmed case count, same float caveat as the IBGE code
    pub cases: String,
}

// ============================================================================
// Case Record
// ============================================================================

/// One cleaned reporting row, as persisted to the reporting table
///
/// Derives `Eq` and `Hash` over all fields so the transformer can drop
/// exact duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Notification date (renamed from `date`)
    pub notification_date: NaiveDate,

    /// City name
    pub city: String,

    /// IBGE municipality code (renamed from `city_ibge_code`)
    pub ibge_code: i64,

    /// Confirmed case count (renamed from `cases`), never negative
    pub confirmed_cases: i64,

    /// Calendar year of the notification date
    pub year: i32,

    /// Calendar month of the notification date (1-12)
    pub month: i32,

    /// ISO-8601 week number of the notification date (1-53)
    ///
    /// Near year boundaries the ISO week may belong to a different ISO year
    /// than the calendar `year` column; the week number is stored as-is.
    pub epidemiological_week: i32,
}

impl CaseRecord {
    /// Build a record, deriving the calendar columns from the date
    pub fn from_parts(
        notification_date: NaiveDate,
        city: String,
        ibge_code: i64,
        confirmed_cases: i64,
    ) -> Self {
        CaseRecord {
            notification_date,
            city,
            ibge_code,
            confirmed_cases,
            year: notification_date.year(),
            month: notification_date.month() as i32,
            epidemiological_week: notification_date.iso_week().week() as i32,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
