//! Serialized form of the segment list.
//!
//! The aggregate row stores its segments as a JSON array of
//! `{"startDate","endDate","count"}` records with day-granularity dates
//! (`YYYY-MM-DD`). Decode is strict: malformed text, unknown fields, and
//! well-formed JSON that breaks the segment invariants are all rejected with
//! `DomainError::Decode`. A corrupted column must abort the enclosing
//! transaction instead of being read back as an empty history.

use chrono::Duration;

use super::segment::ActiveDaySegment;
use crate::shared::DomainError;

pub fn encode(segments: &[ActiveDaySegment]) -> Result<String, DomainError> {
    serde_json::to_string(segments).map_err(|e| DomainError::Serialization(e.to_string()))
}

pub fn decode(raw: &str) -> Result<Vec<ActiveDaySegment>, DomainError> {
    let segments: Vec<ActiveDaySegment> =
        serde_json::from_str(raw).map_err(|e| DomainError::Decode(e.to_string()))?;

    // Canonical lists are sorted with at least one inactive day between
    // segments; adjacent segments would under-report consecutive runs.
    for pair in segments.windows(2) {
        if pair[1].start_date() <= pair[0].end_date() + Duration::days(1) {
            return Err(DomainError::Decode(format!(
                "Segments touch, overlap, or are out of order: {} follows {}",
                pair[1].start_date(),
                pair[0].end_date()
            )));
        }
    }
    if let Some(segment) = segments.iter().find(|segment| !segment.is_well_formed()) {
        return Err(DomainError::Decode(format!(
            "Segment {}..{} carries count {}",
            segment.start_date(),
            segment.end_date(),
            segment.count()
        )));
    }

    Ok(segments)
}
