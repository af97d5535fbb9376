//! Next-target computation
//!
//! Scans the seven day-offsets starting at today's weekday and returns the
//! first preferred instant strictly in the future. The scan is bounded:
//! either some offset yields a future candidate within one week, or every
//! entry is empty and the search fails.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};

use crate::error::PlanningError;
use crate::models::PreferenceVector;

/// Compute the next booking instant after `now`
///
/// # Errors
///
/// Returns `PlanningError::NoPreferencesFound` when no weekday carries a
/// desired hour.
pub fn next_target(
    now: NaiveDateTime,
    preferences: &PreferenceVector,
) -> Result<NaiveDateTime, PlanningError> {
    let midnight = now.date().and_time(NaiveTime::MIN);
    let weekday = now.date().weekday().num_days_from_monday() as usize;

    for offset in 0..7 {
        let Some(hour) = preferences.hour_for(weekday + offset) else {
            continue;
        };
        let candidate = midnight + Duration::days(offset as i64) + Duration::hours(hour as i64);
        if candidate > now {
            return Ok(candidate);
        }
    }

    Err(PlanningError::NoPreferencesFound)
}
