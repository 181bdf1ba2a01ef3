use async_trait::async_trait;
use sqlx::{Pool, Sqlite, Transaction as SqlxTransaction};
use std::sync::Arc;

use eventrec_domain::shared::transaction::{TransactionContext, UnitOfWork};
use eventrec_domain::shared::DomainError;

/// Transaction context over a sqlx SQLite transaction. Handed out with a
/// `'static` lifetime by `SqliteUnitOfWork::begin` so repositories can hold
/// it across awaits.
pub struct SqliteTransactionContext<'a> {
    tx: Option<SqlxTransaction<'a, Sqlite>>,
}

impl<'a> SqliteTransactionContext<'a> {
    fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Mutable access to the underlying transaction, for repositories that
    /// run their queries inside it.
    pub fn inner_mut(&mut self) -> &mut SqlxTransaction<'a, Sqlite> {
        self.tx.as_mut().expect("Transaction already consumed")
    }
}

#[async_trait]
impl<'a> TransactionContext for SqliteTransactionContext<'a> {
    async fn commit(mut self: Box<Self>) -> Result<(), DomainError> {
        match self.tx.take() {
            Some(tx) => tx
                .commit()
                .await
                .map_err(|e| DomainError::Transaction(format!("Commit failed: {}", e))),
            None => Err(DomainError::Transaction(
                "Transaction already consumed".to_string(),
            )),
        }
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), DomainError> {
        match self.tx.take() {
            Some(tx) => tx
                .rollback()
                .await
                .map_err(|e| DomainError::Transaction(format!("Rollback failed: {}", e))),
            None => Err(DomainError::Transaction(
                "Transaction already consumed".to_string(),
            )),
        }
    }
}

pub struct SqliteUnitOfWork {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteUnitOfWork {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    type Transaction = SqliteTransactionContext<'static>;

    async fn begin(&self) -> Result<Box<Self::Transaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::Transaction(format!("Begin failed: {}", e)))?;

        // SAFETY: the transaction borrows the pool, but every context is
        // committed or rolled back (or dropped, which rolls back) before the
        // pool goes away, so widening to 'static cannot outlive it.
        let static_tx: SqlxTransaction<'static, Sqlite> = unsafe { std::mem::transmute(tx) };

        Ok(Box::new(SqliteTransactionContext::new(static_tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Database;

    async fn setup_pool() -> Arc<Pool<Sqlite>> {
        let db = Database::in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        Arc::new(db.pool().clone())
    }

    async fn insert_event(tx: &mut SqliteTransactionContext<'static>) {
        sqlx::query(
            "INSERT INTO events (user_id, name, timestamp, day, deleted)
             VALUES ('user-1', NULL, '2023-07-01T09:00:00Z', '2023-07-01', 0)",
        )
        .execute(&mut **tx.inner_mut())
        .await
        .unwrap();
    }

    async fn count_events(pool: &Pool<Sqlite>) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_commit_persists_event_rows() {
        let pool = setup_pool().await;
        let uow = SqliteUnitOfWork::new(pool.clone());

        let mut tx = uow.begin().await.unwrap();
        insert_event(&mut tx).await;
        tx.commit().await.unwrap();

        assert_eq!(count_events(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_discards_event_rows() {
        let pool = setup_pool().await;
        let uow = SqliteUnitOfWork::new(pool.clone());

        let mut tx = uow.begin().await.unwrap();
        insert_event(&mut tx).await;
        tx.rollback().await.unwrap();

        assert_eq!(count_events(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_dropping_the_context_rolls_back() {
        let pool = setup_pool().await;
        let uow = SqliteUnitOfWork::new(pool.clone());

        let mut tx = uow.begin().await.unwrap();
        insert_event(&mut tx).await;
        drop(tx);

        assert_eq!(count_events(&pool).await, 0);
    }
}
