//! Weekly preference sheet
//!
//! Desired booking times come from a CSV sheet with one column per weekday
//! and one row per bookable hour:
//!
//! ```text
//! Time,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday
//! 800,,x,,x,,x,
//! 900,,,,,,,
//! ...
//! 1900,,,,,,,
//! ```
//!
//! Exactly 8 columns and 13 rows (header plus hours 8 through 19). Any
//! non-blank cell marks a desired hour for that weekday; when several rows
//! mark the same day, the later row wins. Shape violations fail with
//! `PreferenceFileInvalid` instead of silently truncating.

use std::path::Path;

use crate::error::PlanningError;
use crate::models::PreferenceVector;

/// Expected column count: hour label plus seven weekdays
const COLUMNS: usize = 8;

/// Read the preference sheet into a weekly preference vector
///
/// # Errors
///
/// Returns `PlanningError::PreferenceFileInvalid` when the file is missing,
/// unreadable, or not exactly the 8-column by 13-row shape.
pub fn read_preferences(path: &Path) -> Result<PreferenceVector, PlanningError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let header_len = reader.headers()?.len();
    if header_len != COLUMNS {
        return Err(PlanningError::invalid_file(format!(
            "expected {COLUMNS} columns in the header, found {header_len}"
        )));
    }

    let mut hours = [0u8; 7];
    let mut hour = PreferenceVector::FIRST_HOUR;

    for record in reader.records() {
        let record = record?;
        if hour > PreferenceVector::LAST_HOUR {
            return Err(PlanningError::invalid_file(format!(
                "more than {} hour rows; bookings run {}00 through {}00 only",
                PreferenceVector::LAST_HOUR - PreferenceVector::FIRST_HOUR + 1,
                PreferenceVector::FIRST_HOUR,
                PreferenceVector::LAST_HOUR
            )));
        }
        if record.len() != COLUMNS {
            return Err(PlanningError::invalid_file(format!(
                "expected {COLUMNS} columns, found {} in the row for hour {hour}",
                record.len()
            )));
        }
        for (day, field) in record.iter().skip(1).enumerate() {
            if !field.trim().is_empty() {
                hours[day] = hour;
            }
        }
        hour += 1;
    }

    if hour != PreferenceVector::LAST_HOUR + 1 {
        return Err(PlanningError::invalid_file(format!(
            "expected {} hour rows, found {}",
            PreferenceVector::LAST_HOUR - PreferenceVector::FIRST_HOUR + 1,
            hour - PreferenceVector::FIRST_HOUR
        )));
    }

    PreferenceVector::new(hours)
}
