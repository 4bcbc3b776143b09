use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::repo_types::PantryRecord;
use crate::{error::AppError, storage::PantryStore};

/// Direct Postgres backend for the pantry table, used when `DATABASE_URL`
/// is configured. The connection string carries the elevated role.
#[derive(Clone)]
pub struct PgPantryStore {
    db: PgPool,
}

impl PgPantryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Insert one pantry row within a transaction.
pub async fn insert_record_tx(
    tx: &mut Transaction<'_, Postgres>,
    record: &PantryRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ingredients (user_id, name, expiry_date)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(record.user_id)
    .bind(&record.name)
    .bind(record.expiry_date)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl PantryStore for PgPantryStore {
    async fn insert_items(&self, records: &[PantryRecord]) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        // All rows of one scan land together or not at all.
        let mut tx = self.db.begin().await?;
        for record in records {
            insert_record_tx(&mut tx, record).await?;
        }
        tx.commit().await?;

        debug!(rows = records.len(), "pantry rows inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    /// Connects and migrates when `DATABASE_URL` points at a scratch database.
    async fn test_pool() -> Option<PgPool> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("Skipping test: DATABASE_URL is not set");
            return None;
        };
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        Some(pool)
    }

    async fn rows_for(pool: &PgPool, user_id: Uuid) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingredients WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn record(user_id: Uuid, name: &str) -> PantryRecord {
        PantryRecord {
            user_id,
            name: name.into(),
            expiry_date: datetime!(2026-10-26 14:05:00 UTC),
        }
    }

    #[tokio::test]
    async fn scan_rows_are_inserted_together() {
        let Some(pool) = test_pool().await else { return };
        let user_id = Uuid::new_v4();

        PgPantryStore::new(pool.clone())
            .insert_items(&[record(user_id, "Milk"), record(user_id, "Apples")])
            .await
            .unwrap();

        assert_eq!(rows_for(&pool, user_id).await, 2);
        let expiry =
            sqlx::query_scalar::<_, time::OffsetDateTime>("SELECT expiry_date FROM ingredients WHERE user_id = $1 AND name = 'Milk'")
                .bind(user_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(expiry, datetime!(2026-10-26 14:05:00 UTC));
    }

    #[tokio::test]
    async fn failed_row_rolls_back_the_scan() {
        let Some(pool) = test_pool().await else { return };
        let user_id = Uuid::new_v4();

        // Postgres text cannot hold NUL.
        let err = PgPantryStore::new(pool.clone())
            .insert_items(&[record(user_id, "Milk"), record(user_id, "Bad\0name")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(rows_for(&pool, user_id).await, 0);
    }

    #[tokio::test]
    async fn uncommitted_transaction_leaves_no_rows() {
        let Some(pool) = test_pool().await else { return };
        let user_id = Uuid::new_v4();

        let mut tx = pool.begin().await.unwrap();
        insert_record_tx(&mut tx, &record(user_id, "Eggs")).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(rows_for(&pool, user_id).await, 0);
    }
}
