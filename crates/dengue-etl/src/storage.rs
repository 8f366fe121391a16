// Dengue Case Storage Layer

use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::info;

use crate::config::validate_table_name;
use crate::models::CaseRecord;
use dengue_common::{EtlError, Result};

/// Default number of records per INSERT statement
pub const DEFAULT_INSERT_CHUNK_SIZE: usize = 1000;

/// Storage handler for cleaned dengue case records
pub struct CaseStorage {
    db: PgPool,
    table: String,
    chunk_size: usize,
}

impl CaseStorage {
    /// Create new storage handler with the default chunk size
    pub fn new(db: PgPool, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
            chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }

    /// Create storage handler with a custom chunk size
    pub fn with_chunk_size(db: PgPool, table: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            db,
            table: table.into(),
            chunk_size,
        }
    }

    /// Replace the target table with the given records
    ///
    /// Drops and recreates the table, inserts every record in chunks, and
    /// adds the composite primary key, all inside a single transaction. A
    /// failure at any point rolls the whole replacement back, leaving the
    /// previous table contents intact.
    pub async fn store_replace(&self, records: &[CaseRecord]) -> Result<usize> {
        validate_table_name(&self.table)?;

        info!(
            "Replacing table {} with {} records",
            self.table,
            records.len()
        );

        let mut tx = self.db.begin().await.map_err(load_err)?;

        // 1. Drop and recreate the target table
        self.recreate_table(&mut tx).await?;

        // 2. Insert records in batches
        let total_chunks = (records.len() + self.chunk_size - 1) / self.chunk_size;
        let mut stored = 0;

        for (chunk_idx, chunk) in records.chunks(self.chunk_size).enumerate() {
            info!(
                "Storing chunk {} / {} ({} records)",
                chunk_idx + 1,
                total_chunks,
                chunk.len()
            );

            self.batch_insert(&mut tx, chunk).await?;
            stored += chunk.len();
        }

        // 3. Constrain after the bulk load so the index is built once
        self.add_primary_key(&mut tx).await?;

        tx.commit().await.map_err(load_err)?;

        info!("Successfully stored {} records into {}", stored, self.table);

        Ok(stored)
    }

    /// Drop and recreate the target table
    async fn recreate_table(&self, tx: &mut Transaction<'_, Postgres>) -> Result<()> {
        sqlx::query(&format!(r#"DROP TABLE IF EXISTS "{}""#, self.table))
            .execute(&mut **tx)
            .await
            .map_err(load_err)?;

        sqlx::query(&format!(
            r#"
            CREATE TABLE "{}" (
                notification_date DATE NOT NULL,
                city TEXT NOT NULL,
                ibge_code BIGINT NOT NULL,
                confirmed_cases BIGINT NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                epidemiological_week INTEGER NOT NULL
            )
            "#,
            self.table
        ))
        .execute(&mut **tx)
        .await
        .map_err(load_err)?;

        Ok(())
    }

    /// Batch insert case records
    async fn batch_insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        records: &[CaseRecord],
    ) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            INSERT INTO "{}" (
                notification_date,
                city,
                ibge_code,
                confirmed_cases,
                year,
                month,
                epidemiological_week
            )
            "#,
            self.table
        ));

        query_builder.push_values(records, |mut b, record| {
            b.push_bind(record.notification_date)
                .push_bind(&record.city)
                .push_bind(record.ibge_code)
                .push_bind(record.confirmed_cases)
                .push_bind(record.year)
                .push_bind(record.month)
                .push_bind(record.epidemiological_week);
        });

        query_builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(load_err)?;

        Ok(())
    }

    /// Add the composite primary key
    async fn add_primary_key(&self, tx: &mut Transaction<'_, Postgres>) -> Result<()> {
        sqlx::query(&format!(
            r#"ALTER TABLE "{}" ADD PRIMARY KEY (ibge_code, notification_date)"#,
            self.table
        ))
        .execute(&mut **tx)
        .await
        .map_err(load_err)?;

        Ok(())
    }

    /// Get database connection pool
    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

fn load_err(e: sqlx::Error) -> EtlError {
    EtlError::Load(e.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // Note: store_replace against a live database is covered by the
    // integration tests; these only exercise construction and validation.

    #[tokio::test]
    async fn test_storage_creation() {
        let db = PgPool::connect_lazy("postgresql://localhost/test").unwrap();
        let storage = CaseStorage::new(db, "dengue_cases_rj");

        assert_eq!(storage.table, "dengue_cases_rj");
        assert_eq!(storage.chunk_size, DEFAULT_INSERT_CHUNK_SIZE);
    }

    #[tokio::test]
    async fn test_storage_with_custom_chunk_size() {
        let db = PgPool::connect_lazy("postgresql://localhost/test").unwrap();
        let storage = CaseStorage::with_chunk_size(db, "staging", 100);

        assert_eq!(storage.chunk_size, 100);
    }

    #[tokio::test]
    async fn test_store_replace_rejects_bad_table_name() {
        // Validation runs before any database work, so a lazy pool that
        // never connects is enough.
        let db = PgPool::connect_lazy("postgresql://localhost/test").unwrap();
        let storage = CaseStorage::new(db, "drop table; --");

        let err = storage.store_replace(&[]).await.unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }
}
