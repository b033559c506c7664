use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{StoreError, Visit, VisitStore};

/// 基于 Postgres 的访问计数存储
#[derive(Clone)]
pub struct PgVisitRepository {
    pool: PgPool,
}

impl PgVisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitStore for PgVisitRepository {
    async fn increment_visit(&self, ip: &str) -> Result<(), StoreError> {
        // 单条 upsert 语句，并发加一不会丢失
        sqlx::query(
            r#"
            INSERT INTO visits (ip, count, created_at, updated_at)
            VALUES ($1, 1, NOW(), NOW())
            ON CONFLICT (ip)
            DO UPDATE SET
                count = visits.count + 1,
                updated_at = NOW()
            "#,
        )
        .bind(ip)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to increment visit for {}: {:?}", ip, e);
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn get_visit_count(&self, ip: &str) -> Result<i64, StoreError> {
        let count: Option<i64> = sqlx::query_scalar("SELECT count FROM visits WHERE ip = $1")
            .bind(ip)
            .fetch_optional(&self.pool)
            .await?;

        count.ok_or(StoreError::NotFound)
    }

    async fn get_all_visits(&self) -> Result<Vec<Visit>, StoreError> {
        let visits = sqlx::query_as::<_, Visit>(
            r#"
            SELECT id, ip, count, created_at, updated_at
            FROM visits
            ORDER BY count DESC, updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(visits)
    }
}
