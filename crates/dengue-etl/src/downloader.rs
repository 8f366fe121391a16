// Dengue Snapshot Downloader

use crate::config::SourceConfig;
use crate::models::RawCaseRow;
use crate::parser::CaseCsvParser;
use dengue_common::checksum::sha256_hex;
use dengue_common::{EtlError, Result};
use flate2::read::GzDecoder;
use reqwest::Client;
use std::io::Read;
use std::time::Duration;
use tracing::{error, info};

/// Magic bytes opening every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// HTTP client for the dengue case snapshot
pub struct CaseDownloader {
    client: Client,
    config: SourceConfig,
}

impl CaseDownloader {
    /// Create new downloader with configuration
    pub fn new(config: SourceConfig) -> Result<Self> {
        config.validate().map_err(EtlError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| EtlError::Network(e.to_string()))?;

        Ok(CaseDownloader { client, config })
    }

    /// Fetch and parse the snapshot, absorbing failures
    ///
    /// This is the stage boundary: a network or parse failure is logged at
    /// error level and surfaces as `None`, the absent dataset, so the run
    /// degrades to a no-op instead of crashing.
    pub async fn fetch(&self) -> Option<Vec<RawCaseRow>> {
        match self.try_fetch().await {
            Ok(rows) => Some(rows),
            Err(e) => {
                error!(
                    error = %e,
                    url = %self.config.url,
                    "Snapshot fetch failed; continuing with no data"
                );
                None
            },
        }
    }

    /// Fetch and parse the snapshot, reporting typed errors
    pub async fn try_fetch(&self) -> Result<Vec<RawCaseRow>> {
        let payload = self.download().await?;

        info!(
            bytes = payload.len(),
            sha256 = %sha256_hex(&payload),
            "Downloaded snapshot"
        );

        let body = self.decode(&payload)?;

        let parser = match self.config.row_limit {
            Some(limit) => CaseCsvParser::with_limit(limit),
            None => CaseCsvParser::new(),
        };
        let rows = parser.parse(&body)?;

        info!(rows = rows.len(), "Parsed snapshot CSV");

        Ok(rows)
    }

    /// Download the snapshot body
    async fn download(&self) -> Result<Vec<u8>> {
        info!("Downloading dengue snapshot from: {}", self.config.url);

        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| EtlError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EtlError::Network(format!(
                "HTTP error: {} from {}",
                response.status(),
                self.config.url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EtlError::Network(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    /// Gunzip the payload if it carries the gzip magic, pass it through otherwise
    ///
    /// The snapshot is served as a .gz file, but mirrors sometimes serve the
    /// plain CSV; sniffing the magic handles both.
    fn decode(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if !payload.starts_with(&GZIP_MAGIC) {
            return Ok(payload.to_vec());
        }

        let mut decoder = GzDecoder::new(payload);
        let mut decompressed = Vec::new();

        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| EtlError::Parse(format!("Invalid gzip stream: {}", e)))?;

        Ok(decompressed)
    }

    /// Get configuration
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloader_creation() {
        let config = SourceConfig::default();
        let downloader = CaseDownloader::new(config);
        assert!(downloader.is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = SourceConfig::default();
        config.url = "".to_string();

        let downloader = CaseDownloader::new(config);
        assert!(matches!(downloader, Err(EtlError::Config(_))));
    }

    #[test]
    fn test_decode_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let downloader = CaseDownloader::new(SourceConfig::default()).unwrap();

        let test_data = "date,state,city,city_ibge_code,cases\n";
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(test_data.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = downloader.decode(&compressed).unwrap();
        assert_eq!(decoded, test_data.as_bytes());
    }

    #[test]
    fn test_decode_plain_passthrough() {
        let downloader = CaseDownloader::new(SourceConfig::default()).unwrap();

        let plain = b"date,state,city,city_ibge_code,cases\n";
        let decoded = downloader.decode(plain).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn test_decode_corrupt_gzip() {
        let downloader = CaseDownloader::new(SourceConfig::default()).unwrap();

        // Gzip magic followed by garbage
        let corrupt = [0x1f, 0x8b, 0xff, 0x00, 0x12, 0x34];
        let result = downloader.decode(&corrupt);
        assert!(matches!(result, Err(EtlError::Parse(_))));
    }
}
