use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{query::QueryAs, FromRow, Sqlite, SqlitePool};
use std::sync::Arc;

use eventrec_domain::shared::DomainError;

/// Shared read plumbing for sqlx repositories: runs a query against the pool
/// and maps failures to `DomainError::Repository` tagged with a short
/// operation label for the logs. Mutations do not come through here, they
/// run on a transaction context instead.
pub struct SqliteRepositoryBase {
    pool: Arc<SqlitePool>,
}

impl SqliteRepositoryBase {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn fetch_optional<'a, T>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
        label: &str,
    ) -> Result<Option<T>, DomainError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(format!("{}: {}", label, e)))
    }

    pub async fn fetch_all<'a, T>(
        &self,
        query: QueryAs<'a, Sqlite, T, SqliteArguments<'a>>,
        label: &str,
    ) -> Result<Vec<T>, DomainError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(format!("{}: {}", label, e)))
    }

    pub async fn fetch_scalar_i64<'a>(
        &self,
        query: sqlx::query::QueryScalar<'a, Sqlite, i64, SqliteArguments<'a>>,
        label: &str,
    ) -> Result<i64, DomainError> {
        query
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| DomainError::Repository(format!("{}: {}", label, e)))
    }
}
