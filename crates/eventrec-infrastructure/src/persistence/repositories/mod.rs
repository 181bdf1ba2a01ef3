pub mod event_repo;
pub mod streak_repo;

pub use event_repo::SqliteEventRepository;
pub use streak_repo::SqliteStreakAggregateRepository;
