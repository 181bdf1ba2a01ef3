use sqlx::SqlitePool;

use eventrec_infrastructure::persistence::Database;

/// Fresh in-memory database with all migrations applied.
#[allow(dead_code)]
pub async fn setup_in_memory_db() -> SqlitePool {
    let db = Database::in_memory().await.expect("open in-memory db");
    db.run_migrations().await.expect("run migrations");
    db.pool().clone()
}
