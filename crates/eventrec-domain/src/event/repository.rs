use async_trait::async_trait;
use chrono::NaiveDate;

use super::EventRecord;
use crate::shared::{DomainError, UserId};

/// Read surface of the event store. Mutations (insert, soft-delete) go
/// through the transactional methods of the concrete repository so that an
/// event write and the matching aggregate write land in one transaction.
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(
        &self,
        user_id: &UserId,
        event_id: i64,
    ) -> Result<Option<EventRecord>, DomainError>;

    /// Surviving events with `from_day <= day <= to_day`, most recent first.
    async fn list_in_range(
        &self,
        user_id: &UserId,
        from_day: NaiveDate,
        to_day: NaiveDate,
    ) -> Result<Vec<EventRecord>, DomainError>;

    /// All surviving events for a user, most recent first.
    async fn list_all(&self, user_id: &UserId) -> Result<Vec<EventRecord>, DomainError>;

    /// Number of surviving events for a user.
    async fn count_active(&self, user_id: &UserId) -> Result<i64, DomainError>;

    /// Number of surviving events on `day` other than `excluding_event_id`.
    /// Zero means deleting that event deactivates the day.
    async fn count_other_active_on_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        excluding_event_id: i64,
    ) -> Result<i64, DomainError>;
}
