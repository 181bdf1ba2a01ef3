// Domain layer - Pure business logic
// No dependencies on infrastructure or presentation layers

pub mod event;
pub mod shared;
pub mod streak;

// Re-exports for convenience
pub use shared::{DomainError, UserId};
