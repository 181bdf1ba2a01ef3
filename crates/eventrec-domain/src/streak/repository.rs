use async_trait::async_trait;

use super::StreakAggregate;
use crate::shared::{DomainError, UserId};

#[async_trait]
pub trait StreakAggregateRepository: Send + Sync {
    /// Load the aggregate row for a user. `None` means the user has never
    /// recorded an event; a corrupted segments column surfaces as
    /// `DomainError::Decode`.
    async fn find_by_user_id(&self, user_id: &UserId)
        -> Result<Option<StreakAggregate>, DomainError>;
}
