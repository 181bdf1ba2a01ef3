mod aggregate;
pub mod codec;
mod repository;
mod segment;


pub use aggregate::{StreakAggregate, StreakStatistics};
pub use repository::StreakAggregateRepository;
pub use segment::{
    insert_day, max_consecutive_days, remove_day, total_distinct_days, ActiveDaySegment,
};
