use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::{SqliteRepositoryBase, SqliteTransactionContext};
use eventrec_domain::shared::{DomainError, UserId};
use eventrec_domain::streak::{codec, StreakAggregate, StreakAggregateRepository};

#[derive(FromRow)]
struct StreakAggregateRow {
    user_id: String,
    total_event_count: i64,
    segments: String,
}

impl StreakAggregateRow {
    /// Decoding a corrupted segments column fails loudly; falling back to an
    /// empty list would silently erase the user's streak history.
    fn try_into_aggregate(self) -> Result<StreakAggregate, DomainError> {
        let segments = codec::decode(&self.segments)?;
        Ok(StreakAggregate::restore(
            UserId::from_string(&self.user_id),
            self.total_event_count,
            segments,
        ))
    }
}

pub struct SqliteStreakAggregateRepository {
    base: SqliteRepositoryBase,
}

impl SqliteStreakAggregateRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }

    /// Read the aggregate inside the mutation transaction so the
    /// read-modify-write cycle observes its own snapshot.
    pub async fn find_by_user_id_in_tx(
        &self,
        tx: &mut SqliteTransactionContext<'static>,
        user_id: &UserId,
    ) -> Result<Option<StreakAggregate>, DomainError> {
        let query = r#"
            SELECT user_id, total_event_count, segments
            FROM streak_aggregates
            WHERE user_id = ?1
        "#;

        let row: Option<StreakAggregateRow> = sqlx::query_as(query)
            .bind(user_id.as_str())
            .fetch_optional(&mut **tx.inner_mut())
            .await
            .map_err(|e| DomainError::Repository(format!("Find streak aggregate: {}", e)))?;

        row.map(|r| r.try_into_aggregate()).transpose()
    }

    /// Write back the whole aggregate row, inserting it on first use.
    pub async fn upsert_in_tx(
        &self,
        tx: &mut SqliteTransactionContext<'static>,
        aggregate: &StreakAggregate,
    ) -> Result<(), DomainError> {
        let segments = codec::encode(aggregate.segments())?;

        let query = r#"
            INSERT INTO streak_aggregates (user_id, total_event_count, segments)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                total_event_count = ?2,
                segments = ?3
        "#;

        sqlx::query(query)
            .bind(aggregate.user_id().as_str())
            .bind(aggregate.total_events())
            .bind(&segments)
            .execute(&mut **tx.inner_mut())
            .await
            .map_err(|e| DomainError::Repository(format!("Upsert streak aggregate: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl StreakAggregateRepository for SqliteStreakAggregateRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<StreakAggregate>, DomainError> {
        let query = r#"
            SELECT user_id, total_event_count, segments
            FROM streak_aggregates
            WHERE user_id = ?1
        "#;

        let row: Option<StreakAggregateRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(query).bind(user_id.as_str()),
                "Find streak aggregate by user ID",
            )
            .await?;

        row.map(|r| r.try_into_aggregate()).transpose()
    }
}
