use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::segment::{
    insert_day, max_consecutive_days, remove_day, total_distinct_days, ActiveDaySegment,
};
use crate::shared::{DomainError, UserId};

/// Per-user streak aggregate: the canonical segment list plus a lifetime
/// event counter. One row per user, rewritten on every event mutation so that
/// statistics reads never scan the event table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakAggregate {
    user_id: UserId,
    total_event_count: i64,
    segments: Vec<ActiveDaySegment>,
}

impl StreakAggregate {
    /// Empty aggregate for a user with no recorded events yet.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            total_event_count: 0,
            segments: Vec::new(),
        }
    }

    pub fn restore(
        user_id: UserId,
        total_event_count: i64,
        segments: Vec<ActiveDaySegment>,
    ) -> Self {
        Self {
            user_id,
            total_event_count,
            segments,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn segments(&self) -> &[ActiveDaySegment] {
        &self.segments
    }

    /// Lifetime number of event creations. Deliberately never decremented on
    /// delete; see `remove_day`.
    pub fn total_events(&self) -> i64 {
        self.total_event_count
    }

    /// Record one event on the given calendar day. Extends the active-day set
    /// and bumps the lifetime counter; recording a second event on an already
    /// active day only bumps the counter.
    pub fn record_event_on(&mut self, day: NaiveDate) {
        self.segments = insert_day(&self.segments, day);
        self.total_event_count += 1;
    }

    /// Drop a day whose last surviving event was deleted. The lifetime event
    /// counter stays as-is: `total_events` tracks creations, not the live row
    /// count.
    pub fn remove_day(&mut self, day: NaiveDate) -> Result<(), DomainError> {
        self.segments = remove_day(&self.segments, day)?;
        Ok(())
    }

    pub fn total_distinct_days(&self) -> i64 {
        total_distinct_days(&self.segments)
    }

    pub fn max_consecutive_days(&self) -> i64 {
        max_consecutive_days(&self.segments)
    }

    /// Length of the most recent run. This is only "current" in the live
    /// sense when `last_active_date` is today; the aggregate does not expire
    /// stale runs, callers decide liveness.
    pub fn current_consecutive_days(&self) -> i64 {
        self.segments
            .last()
            .map(|segment| segment.count())
            .unwrap_or(0)
    }

    pub fn last_active_date(&self) -> Option<NaiveDate> {
        self.segments.last().map(|segment| segment.end_date())
    }

    pub fn statistics(&self) -> StreakStatistics {
        StreakStatistics {
            total_events: self.total_events(),
            total_distinct_days: self.total_distinct_days(),
            max_consecutive_days: self.max_consecutive_days(),
            current_consecutive_days: self.current_consecutive_days(),
        }
    }
}

/// Read model returned by the statistics query surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakStatistics {
    pub total_events: i64,
    pub total_distinct_days: i64,
    pub max_consecutive_days: i64,
    pub current_consecutive_days: i64,
}

impl StreakStatistics {
    /// All-zero statistics for a user without an aggregate row.
    pub fn empty() -> Self {
        Self {
            total_events: 0,
            total_distinct_days: 0,
            max_consecutive_days: 0,
            current_consecutive_days: 0,
        }
    }
}
