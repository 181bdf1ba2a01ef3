use eventrec_domain::shared::DomainError;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::fs::OpenOptions;
use std::path::Path;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file at `db_path`. Connection
    /// failures surface as `StorageUnavailable`; retrying is the caller's
    /// call.
    pub async fn new(db_path: &str) -> Result<Self, DomainError> {
        let path = Path::new(db_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::StorageUnavailable(format!("Failed to create DB directory: {}", e))
            })?;
        }

        if !path.exists() {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(path)
                .map_err(|e| {
                    DomainError::StorageUnavailable(format!("Failed to create DB file: {}", e))
                })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&format!("sqlite:{}", db_path))
            .await
            .map_err(|e| DomainError::StorageUnavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Open the database at the platform default location.
    pub async fn open_default() -> Result<Self, DomainError> {
        let path = crate::config::default_database_path()?;
        let path = path.to_str().ok_or_else(|| {
            DomainError::StorageUnavailable(format!("Non-UTF8 database path: {:?}", path))
        })?;
        Self::new(path).await
    }

    /// In-memory database, used by tests. Capped at one connection: every
    /// pooled handle to `:memory:` would otherwise open its own empty
    /// database.
    pub async fn in_memory() -> Result<Self, DomainError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .map_err(|e| DomainError::StorageUnavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
