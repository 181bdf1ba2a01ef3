use async_trait::async_trait;

use super::DomainError;

/// One open database transaction. Repositories run their statements inside
/// it through the concrete context; the owner either commits or rolls back,
/// and dropping an unfinished context rolls back.
#[async_trait]
pub trait TransactionContext: Send + Sync {
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Hands out transactions so the recorder can land an event write and the
/// matching aggregate write together.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Transaction: TransactionContext;

    async fn begin(&self) -> Result<Box<Self::Transaction>, DomainError>;
}
