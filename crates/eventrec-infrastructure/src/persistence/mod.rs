pub mod repositories;
pub mod transaction;

mod database;
mod repository_base;

pub use database::Database;
pub use repository_base::SqliteRepositoryBase;
pub use transaction::{SqliteTransactionContext, SqliteUnitOfWork};
