//! End-to-end tests for the full ETL pipeline
//!
//! These tests run the pipeline against a mock snapshot server and validate:
//! - Skip behavior when the fetch fails or produces nothing to load
//! - Cleaning counters across a realistic snapshot
//! - Run outcome when the database is unreachable
//! - Hard failure on non-coercible numeric values
//!
//! The database config points at a closed port, so any test that reaches
//! the load stage observes a load failure instead of writing anywhere.

use dengue_etl::config::{AppConfig, DatabaseConfig, SourceConfig};
use dengue_etl::pipeline::DenguePipeline;
use dengue_etl::EtlError;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Snapshot with duplicates, a bad date, a negative count, and an SP row
fn snapshot_csv() -> String {
    [
        "date,state,city,city_ibge_code,cases",
        "2023-01-02,RJ,Rio de Janeiro,3304557.0,10",
        "2023-01-02,SP,São Paulo,3550308.0,5",
        "2023-01-03,RJ,Niterói,3303302.0,4",
        "not-a-date,RJ,Maricá,3302700.0,2",
        "2023-01-04,RJ,Campos,3301009.0,-1",
        "2023-01-02,RJ,Rio de Janeiro,3304557.0,10",
    ]
    .join("\n")
}

fn gzip(data: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Database config pointing at a closed port
fn unreachable_database() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1:1".to_string(),
        database: "dengue".to_string(),
        user: "etl".to_string(),
        password: "etl".to_string(),
        connect_timeout_secs: 1,
    }
}

fn app_config(mock_server: &MockServer) -> AppConfig {
    AppConfig {
        source: SourceConfig::builder()
            .url(format!("{}/caso.csv.gz", mock_server.uri()))
            .timeout_secs(5)
            .build(),
        database: unreachable_database(),
        table: "dengue_cases_test".to_string(),
    }
}

async fn mount_snapshot(mock_server: &MockServer, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path("/caso.csv.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(mock_server)
        .await;
}

// ============================================================================
// Skip Path Tests
// ============================================================================

#[tokio::test]
async fn test_pipeline_skips_when_fetch_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/caso.csv.gz"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let pipeline = DenguePipeline::new(app_config(&mock_server));
    let report = pipeline.run().await.unwrap();

    // The skip path returns before the load stage; with the database
    // pointing at a closed port, reaching it would surface as a failed
    // load, not a skip.
    assert!(report.skipped);
    assert!(!report.is_success());
    assert_eq!(report.records, 0);
}

#[tokio::test]
async fn test_pipeline_skips_empty_snapshot() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, gzip(b"date,state,city,city_ibge_code,cases")).await;

    let pipeline = DenguePipeline::new(app_config(&mock_server));
    let report = pipeline.run().await.unwrap();

    assert!(report.skipped);
}

#[tokio::test]
async fn test_pipeline_skips_when_no_rows_for_state() {
    let mock_server = MockServer::start().await;

    let body = gzip(
        [
            "date,state,city,city_ibge_code,cases",
            "2023-01-02,SP,São Paulo,3550308.0,5",
        ]
        .join("\n")
        .as_bytes(),
    );
    mount_snapshot(&mock_server, body).await;

    let pipeline = DenguePipeline::new(app_config(&mock_server));
    let report = pipeline.run().await.unwrap();

    assert!(report.skipped);
    assert_eq!(report.summary(), "Run skipped - no data to load");
}

// ============================================================================
// Transform and Load Outcome Tests
// ============================================================================

#[tokio::test]
async fn test_pipeline_cleans_snapshot_and_reports_counts() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, gzip(snapshot_csv().as_bytes())).await;

    let pipeline = DenguePipeline::new(app_config(&mock_server));
    let report = pipeline.run().await.unwrap();

    assert!(!report.skipped);
    assert_eq!(report.stats.region_rows, 5);
    assert_eq!(report.stats.undated_dropped, 1);
    assert_eq!(report.stats.negative_dropped, 1);
    assert_eq!(report.stats.duplicates_dropped, 1);
    assert_eq!(report.records, 2);
}

#[tokio::test]
async fn test_pipeline_load_failure_is_not_a_run_failure() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, gzip(snapshot_csv().as_bytes())).await;

    let pipeline = DenguePipeline::new(app_config(&mock_server));
    let report = pipeline.run().await.unwrap();

    assert!(!report.skipped);
    assert!(report.loaded.is_none());
    assert!(!report.is_success());
    assert!(report.summary().contains("Load failed"));
}

// ============================================================================
// Hard Failure Tests
// ============================================================================

#[tokio::test]
async fn test_pipeline_fails_on_non_coercible_value() {
    let mock_server = MockServer::start().await;

    let body = gzip(
        [
            "date,state,city,city_ibge_code,cases",
            "2023-01-02,RJ,Rio de Janeiro,3304557.0,10",
            "2023-01-03,RJ,Niterói,3303302.0,abc",
        ]
        .join("\n")
        .as_bytes(),
    );
    mount_snapshot(&mock_server, body).await;

    let pipeline = DenguePipeline::new(app_config(&mock_server));
    let err = pipeline.run().await.unwrap_err();

    match err {
        EtlError::Coercion { field, value, row } => {
            assert_eq!(field, "cases");
            assert_eq!(value, "abc");
            assert_eq!(row, 2);
        },
        other => panic!("expected coercion error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pipeline_rejects_invalid_source_config() {
    let mock_server = MockServer::start().await;

    let mut config = app_config(&mock_server);
    config.source.target_state = "Rio".to_string();

    let pipeline = DenguePipeline::new(config);
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, EtlError::Config(_)));
}
