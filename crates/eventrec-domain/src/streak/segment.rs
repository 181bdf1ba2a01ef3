use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// A closed interval of consecutive calendar days that all have at least one
/// surviving event. `count` is redundant with the dates but persisted so that
/// statistics queries never touch date arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActiveDaySegment {
    start_date: NaiveDate,
    end_date: NaiveDate,
    count: i64,
}

impl ActiveDaySegment {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, DomainError> {
        if start_date > end_date {
            return Err(DomainError::Validation(format!(
                "Segment start {} is after end {}",
                start_date, end_date
            )));
        }
        Ok(Self {
            start_date,
            end_date,
            count: (end_date - start_date).num_days() + 1,
        })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start_date: day,
            end_date: day,
            count: 1,
        }
    }

    pub fn restore(start_date: NaiveDate, end_date: NaiveDate, count: i64) -> Self {
        Self {
            start_date,
            end_date,
            count,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date
    }

    /// `count` must equal the number of days spanned by the interval.
    pub fn is_well_formed(&self) -> bool {
        self.start_date <= self.end_date
            && self.count == (self.end_date - self.start_date).num_days() + 1
    }

    fn extend_end_to(&mut self, day: NaiveDate) {
        self.end_date = day;
        self.count += 1;
    }

    fn extend_start_to(&mut self, day: NaiveDate) {
        self.start_date = day;
        self.count += 1;
    }

    /// Merge a directly following segment into this one.
    fn absorb_following(&mut self, other: &ActiveDaySegment) {
        self.end_date = other.end_date;
        self.count += other.count;
    }
}

fn day_after(day: NaiveDate) -> NaiveDate {
    day + Duration::days(1)
}

/// Insert a calendar day into the segment list.
///
/// Idempotent: a day already covered by a segment leaves the list unchanged.
/// A day adjacent to a segment extends it, then merges with the neighbour on
/// the other side when the extension closed a one-day gap. At most one merge
/// per side can happen in a single call since the input list is canonical
/// (sorted, disjoint, non-adjacent).
pub fn insert_day(segments: &[ActiveDaySegment], day: NaiveDate) -> Vec<ActiveDaySegment> {
    let mut out = segments.to_vec();

    for index in 0..out.len() {
        if out[index].contains(day) {
            return out;
        }

        if day == day_after(out[index].end_date()) {
            out[index].extend_end_to(day);
            if index + 1 < out.len()
                && day_after(out[index].end_date()) == out[index + 1].start_date()
            {
                let next = out.remove(index + 1);
                out[index].absorb_following(&next);
            }
            return out;
        }

        if day_after(day) == out[index].start_date() {
            out[index].extend_start_to(day);
            if index > 0 && day_after(out[index - 1].end_date()) == out[index].start_date() {
                let current = out.remove(index);
                out[index - 1].absorb_following(&current);
            }
            return out;
        }
    }

    out.push(ActiveDaySegment::single(day));
    out.sort_by_key(|segment| segment.start_date());
    out
}

/// Remove a calendar day from the segment list.
///
/// The day is expected to be covered by exactly one segment; asking to remove
/// a day that is not active anywhere is a caller bug and reported as
/// `InvariantViolation` rather than ignored.
pub fn remove_day(
    segments: &[ActiveDaySegment],
    day: NaiveDate,
) -> Result<Vec<ActiveDaySegment>, DomainError> {
    let mut out = segments.to_vec();

    for index in 0..out.len() {
        let segment = out[index].clone();
        if !segment.contains(day) {
            continue;
        }

        if segment.count() == 1 {
            out.remove(index);
        } else if day == segment.start_date() {
            out[index] = ActiveDaySegment::new(day_after(day), segment.end_date())?;
        } else if day == segment.end_date() {
            out[index] = ActiveDaySegment::new(segment.start_date(), day - Duration::days(1))?;
        } else {
            let left = ActiveDaySegment::new(segment.start_date(), day - Duration::days(1))?;
            let right = ActiveDaySegment::new(day_after(day), segment.end_date())?;
            out[index] = left;
            out.insert(index + 1, right);
        }
        return Ok(out);
    }

    Err(DomainError::InvariantViolation(format!(
        "Day {} is not covered by any active segment",
        day
    )))
}

/// Total number of distinct active days.
pub fn total_distinct_days(segments: &[ActiveDaySegment]) -> i64 {
    segments.iter().map(|segment| segment.count()).sum()
}

/// Length of the longest run of consecutive active days, 0 when empty.
pub fn max_consecutive_days(segments: &[ActiveDaySegment]) -> i64 {
    segments
        .iter()
        .map(|segment| segment.count())
        .max()
        .unwrap_or(0)
}
