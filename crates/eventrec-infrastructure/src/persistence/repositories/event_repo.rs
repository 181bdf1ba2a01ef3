use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

use crate::persistence::{SqliteRepositoryBase, SqliteTransactionContext};
use eventrec_domain::event::{EventRecord, EventRepository};
use eventrec_domain::shared::{DomainError, UserId};

#[derive(FromRow)]
struct EventRow {
    id: i64,
    user_id: String,
    name: Option<String>,
    timestamp: DateTime<Utc>,
    day: NaiveDate,
    deleted: bool,
}

impl EventRow {
    fn into_record(self) -> EventRecord {
        EventRecord::restore(
            self.id,
            UserId::from_string(&self.user_id),
            self.name,
            self.timestamp,
            self.day,
            self.deleted,
        )
    }
}

const EVENT_COLUMNS: &str = "id, user_id, name, timestamp, day, deleted";

pub struct SqliteEventRepository {
    base: SqliteRepositoryBase,
}

impl SqliteEventRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            base: SqliteRepositoryBase::new(pool),
        }
    }

    /// Append an event row inside the given transaction and return the
    /// persisted record with its assigned row id.
    pub async fn insert_in_tx(
        &self,
        tx: &mut SqliteTransactionContext<'static>,
        user_id: &UserId,
        name: Option<&str>,
        timestamp: DateTime<Utc>,
        day: NaiveDate,
    ) -> Result<EventRecord, DomainError> {
        let query = r#"
            INSERT INTO events (user_id, name, timestamp, day, deleted)
            VALUES (?1, ?2, ?3, ?4, 0)
            RETURNING id
        "#;

        let id: i64 = sqlx::query_scalar(query)
            .bind(user_id.as_str())
            .bind(name)
            .bind(timestamp)
            .bind(day)
            .fetch_one(&mut **tx.inner_mut())
            .await
            .map_err(|e| DomainError::Repository(format!("Insert event: {}", e)))?;

        EventRecord::new(
            id,
            user_id.clone(),
            name.map(|n| n.to_string()),
            timestamp,
            day,
        )
    }

    pub async fn find_by_id_in_tx(
        &self,
        tx: &mut SqliteTransactionContext<'static>,
        user_id: &UserId,
        event_id: i64,
    ) -> Result<Option<EventRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM events WHERE user_id = ?1 AND id = ?2",
            EVENT_COLUMNS
        );

        let row: Option<EventRow> = sqlx::query_as(&query)
            .bind(user_id.as_str())
            .bind(event_id)
            .fetch_optional(&mut **tx.inner_mut())
            .await
            .map_err(|e| DomainError::Repository(format!("Find event by ID: {}", e)))?;

        Ok(row.map(|r| r.into_record()))
    }

    /// Soft-delete: the row stays, only the flag flips.
    pub async fn mark_deleted_in_tx(
        &self,
        tx: &mut SqliteTransactionContext<'static>,
        user_id: &UserId,
        event_id: i64,
    ) -> Result<(), DomainError> {
        let query = "UPDATE events SET deleted = 1 WHERE user_id = ?1 AND id = ?2";

        sqlx::query(query)
            .bind(user_id.as_str())
            .bind(event_id)
            .execute(&mut **tx.inner_mut())
            .await
            .map_err(|e| DomainError::Repository(format!("Mark event deleted: {}", e)))?;

        Ok(())
    }

    pub async fn count_other_active_on_day_in_tx(
        &self,
        tx: &mut SqliteTransactionContext<'static>,
        user_id: &UserId,
        day: NaiveDate,
        excluding_event_id: i64,
    ) -> Result<i64, DomainError> {
        let query = r#"
            SELECT COUNT(*) FROM events
            WHERE user_id = ?1 AND day = ?2 AND deleted = 0 AND id != ?3
        "#;

        sqlx::query_scalar(query)
            .bind(user_id.as_str())
            .bind(day)
            .bind(excluding_event_id)
            .fetch_one(&mut **tx.inner_mut())
            .await
            .map_err(|e| DomainError::Repository(format!("Count other events on day: {}", e)))
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn find_by_id(
        &self,
        user_id: &UserId,
        event_id: i64,
    ) -> Result<Option<EventRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM events WHERE user_id = ?1 AND id = ?2",
            EVENT_COLUMNS
        );

        let row: Option<EventRow> = self
            .base
            .fetch_optional(
                sqlx::query_as(&query).bind(user_id.as_str()).bind(event_id),
                "Find event by ID",
            )
            .await?;

        Ok(row.map(|r| r.into_record()))
    }

    async fn list_in_range(
        &self,
        user_id: &UserId,
        from_day: NaiveDate,
        to_day: NaiveDate,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM events
             WHERE user_id = ?1 AND deleted = 0 AND day >= ?2 AND day <= ?3
             ORDER BY timestamp DESC, id DESC",
            EVENT_COLUMNS
        );

        let rows: Vec<EventRow> = self
            .base
            .fetch_all(
                sqlx::query_as(&query)
                    .bind(user_id.as_str())
                    .bind(from_day)
                    .bind(to_day),
                "List events in range",
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }

    async fn list_all(&self, user_id: &UserId) -> Result<Vec<EventRecord>, DomainError> {
        let query = format!(
            "SELECT {} FROM events
             WHERE user_id = ?1 AND deleted = 0
             ORDER BY timestamp DESC, id DESC",
            EVENT_COLUMNS
        );

        let rows: Vec<EventRow> = self
            .base
            .fetch_all(sqlx::query_as(&query).bind(user_id.as_str()), "List events")
            .await?;

        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }

    async fn count_active(&self, user_id: &UserId) -> Result<i64, DomainError> {
        let query = "SELECT COUNT(*) FROM events WHERE user_id = ?1 AND deleted = 0";

        self.base
            .fetch_scalar_i64(
                sqlx::query_scalar(query).bind(user_id.as_str()),
                "Count active events",
            )
            .await
    }

    async fn count_other_active_on_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        excluding_event_id: i64,
    ) -> Result<i64, DomainError> {
        let query = r#"
            SELECT COUNT(*) FROM events
            WHERE user_id = ?1 AND day = ?2 AND deleted = 0 AND id != ?3
        "#;

        self.base
            .fetch_scalar_i64(
                sqlx::query_scalar(query)
                    .bind(user_id.as_str())
                    .bind(day)
                    .bind(excluding_event_id),
                "Count other events on day",
            )
            .await
    }
}
