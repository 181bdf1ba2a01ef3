use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::{DomainError, UserId};

/// One recorded event. `day` is the event's calendar day with the
/// time-of-day stripped; `timestamp` keeps the exact creation instant.
/// Deletion is a soft flag, rows are never physically erased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    id: i64,
    user_id: UserId,
    name: Option<String>,
    timestamp: DateTime<Utc>,
    day: NaiveDate,
    deleted: bool,
}

impl EventRecord {
    pub fn new(
        id: i64,
        user_id: UserId,
        name: Option<String>,
        timestamp: DateTime<Utc>,
        day: NaiveDate,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::Validation(format!(
                "Event id must be a positive row id, got {}",
                id
            )));
        }
        if let Some(name) = &name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation(
                    "Event name cannot be blank; omit it instead".to_string(),
                ));
            }
        }

        Ok(Self {
            id,
            user_id,
            name,
            timestamp,
            day,
            deleted: false,
        })
    }

    pub fn restore(
        id: i64,
        user_id: UserId,
        name: Option<String>,
        timestamp: DateTime<Utc>,
        day: NaiveDate,
        deleted: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            timestamp,
            day,
            deleted,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}
