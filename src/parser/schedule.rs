//! Schedule-table parser
//!
//! Expected page shape, maintained by a third party and liable to change
//! without notice:
//!
//! - one `<table style="border-collapse:collapse;">` holding the schedule;
//! - a header row whose cells (after two leading label cells) carry one
//!   date each, formatted like `06Aug 2026`;
//! - body rows grouped into hour blocks: a row whose first cell matches an
//!   hour label like `0800 - 0900` starts a block (and carries one extra
//!   leading metadata cell), rows without a label continue the previous
//!   hour;
//! - each data cell belongs to (column date, block hour); a cell with an
//!   `<input value="...">` control holds the reservable-lane token.
//!
//! Any deviation surfaces as `ScheduleParseFailure` naming the violated
//! expectation, never as a panic or index error.

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::BookingError;
use crate::models::ScheduleSnapshot;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Header date cells, e.g. `06Aug 2026`
    static ref DATE_LABEL: Regex =
        Regex::new(r"(?P<day>\d{2})(?P<month>[A-Za-z]{3})\s+(?P<year>\d{4})")
            .expect("invalid date-label pattern");

    /// Hour-block labels, e.g. `0800 - 0900`
    static ref HOUR_LABEL: Regex =
        Regex::new(r"(?P<hour>\d{2})\d{2}\s+-\s+\d{4}").expect("invalid hour-label pattern");
}

/// Parser for the weekly availability table
pub struct ScheduleParser {
    table: Selector,
    row: Selector,
    cell: Selector,
    control: Selector,
}

impl Default for ScheduleParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: parse_selector!(r#"table[style="border-collapse:collapse;"]"#),
            row: parse_selector!("tr"),
            cell: parse_selector!("td"),
            control: parse_selector!("input"),
        }
    }

    /// Parse the schedule page into an availability snapshot
    ///
    /// # Errors
    ///
    /// Returns `BookingError::ScheduleParseFailure` on any structural
    /// mismatch: missing table, unparseable header date, slot rows before
    /// the first hour label, or a cell count that disagrees with the
    /// header.
    pub fn parse(&self, html: &str) -> Result<ScheduleSnapshot, BookingError> {
        let document = Html::parse_document(html);

        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| BookingError::parse_failure("schedule table not found"))?;

        let mut rows = table.select(&self.row);
        let header = rows
            .next()
            .ok_or_else(|| BookingError::parse_failure("schedule table has no rows"))?;
        let dates = self.parse_header_dates(header)?;

        let mut snapshot = ScheduleSnapshot::new();
        let mut block_hour: Option<u32> = None;

        for row in rows {
            let cells: Vec<ElementRef> = row.select(&self.cell).collect();
            if cells.is_empty() {
                continue;
            }

            let first = cell_text(&cells[0]);
            let data = if let Some(caps) = HOUR_LABEL.captures(first.trim()) {
                let hour: u32 = caps["hour"].parse().map_err(|_| {
                    BookingError::parse_failure(format!("unreadable hour label '{}'", first.trim()))
                })?;
                block_hour = Some(hour);
                // Hour rows carry the hour label plus one metadata cell.
                cells.get(2..).ok_or_else(|| {
                    BookingError::parse_failure("hour row is missing its metadata cell")
                })?
            } else {
                &cells[1..]
            };

            let hour = block_hour.ok_or_else(|| {
                BookingError::parse_failure("slot row appears before any hour label")
            })?;

            if data.len() != dates.len() {
                return Err(BookingError::parse_failure(format!(
                    "expected {} slot cells per row, found {}",
                    dates.len(),
                    data.len()
                )));
            }

            for (date, cell) in dates.iter().zip(data) {
                let instant = slot_instant(*date, hour)?;
                let token = cell
                    .select(&self.control)
                    .next()
                    .and_then(|input| input.value().attr("value"))
                    .map(str::to_string);
                snapshot.record(instant, token);
            }
        }

        if snapshot.is_empty() {
            return Err(BookingError::parse_failure(
                "no slot rows below the header",
            ));
        }

        Ok(snapshot)
    }

    /// Extract one date per day column from the header row
    fn parse_header_dates(&self, header: ElementRef) -> Result<Vec<NaiveDate>, BookingError> {
        let cells: Vec<ElementRef> = header.select(&self.cell).collect();
        let date_cells = cells.get(2..).ok_or_else(|| {
            BookingError::parse_failure("header row is missing its leading label cells")
        })?;
        if date_cells.is_empty() {
            return Err(BookingError::parse_failure("header row has no date columns"));
        }

        let mut dates = Vec::with_capacity(date_cells.len());
        for cell in date_cells {
            let text = cell_text(cell);
            let caps = DATE_LABEL.captures(text.trim()).ok_or_else(|| {
                BookingError::parse_failure(format!(
                    "unrecognized header date '{}'",
                    text.trim()
                ))
            })?;
            let rendered = format!("{} {} {}", &caps["day"], &caps["month"], &caps["year"]);
            let date = NaiveDate::parse_from_str(&rendered, "%d %b %Y").map_err(|_| {
                BookingError::parse_failure(format!("unparseable header date '{rendered}'"))
            })?;
            dates.push(date);
        }
        Ok(dates)
    }
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>()
}

fn slot_instant(date: NaiveDate, hour: u32) -> Result<NaiveDateTime, BookingError> {
    date.and_hms_opt(hour, 0, 0).ok_or_else(|| {
        BookingError::parse_failure(format!("hour label {hour} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(table_body: &str) -> String {
        format!(
            r#"<html><body><table style="border-collapse:collapse;">{table_body}</table></body></html>"#
        )
    }

    fn instant(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_cell_with_control_yields_token() {
        let html = page(
            r#"<tr><td>Venue</td><td>Type</td><td>06Aug 2026</td><td>07Aug 2026</td></tr>
               <tr><td>0800 - 0900</td><td>Lap</td>
                   <td><input type="radio" name="p_rec" value="060810042026"></td>
                   <td>Full</td></tr>"#,
        );
        let snapshot = ScheduleParser::new().parse(&html).unwrap();
        assert_eq!(snapshot.token_for(instant(6, 8)), Some("060810042026"));
        assert_eq!(snapshot.token_for(instant(7, 8)), None);
        assert!(snapshot.contains(instant(7, 8)));
    }

    #[test]
    fn test_continuation_row_carries_hour_forward() {
        let html = page(
            r#"<tr><td>Venue</td><td>Type</td><td>06Aug 2026</td></tr>
               <tr><td>0900 - 1000</td><td>Lane 1</td><td>Full</td></tr>
               <tr><td>Lane 2</td><td><input value="090810022026"></td></tr>"#,
        );
        let snapshot = ScheduleParser::new().parse(&html).unwrap();
        assert_eq!(snapshot.token_for(instant(6, 9)), Some("090810022026"));
    }

    #[test]
    fn test_missing_table_is_parse_failure() {
        let err = ScheduleParser::new()
            .parse("<html><body><p>maintenance</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, BookingError::ScheduleParseFailure { .. }));
    }

    #[test]
    fn test_bad_header_date_is_parse_failure() {
        let html = page(
            r#"<tr><td>Venue</td><td>Type</td><td>Thursday</td></tr>
               <tr><td>0800 - 0900</td><td>Lap</td><td>Full</td></tr>"#,
        );
        let err = ScheduleParser::new().parse(&html).unwrap_err();
        assert!(matches!(err, BookingError::ScheduleParseFailure { .. }));
        assert!(err.to_string().contains("Thursday"));
    }

    #[test]
    fn test_cell_count_mismatch_is_parse_failure() {
        let html = page(
            r#"<tr><td>Venue</td><td>Type</td><td>06Aug 2026</td><td>07Aug 2026</td></tr>
               <tr><td>0800 - 0900</td><td>Lap</td><td>Full</td></tr>"#,
        );
        let err = ScheduleParser::new().parse(&html).unwrap_err();
        assert!(matches!(err, BookingError::ScheduleParseFailure { .. }));
    }

    #[test]
    fn test_slot_row_before_hour_label_is_parse_failure() {
        let html = page(
            r#"<tr><td>Venue</td><td>Type</td><td>06Aug 2026</td></tr>
               <tr><td>Lane 1</td><td>Full</td></tr>"#,
        );
        let err = ScheduleParser::new().parse(&html).unwrap_err();
        assert!(matches!(err, BookingError::ScheduleParseFailure { .. }));
    }

    #[test]
    fn test_first_lane_in_cell_order_wins() {
        let html = page(
            r#"<tr><td>Venue</td><td>Type</td><td>06Aug 2026</td></tr>
               <tr><td>0800 - 0900</td><td>Lane 1</td><td><input value="060810012026"></td></tr>
               <tr><td>Lane 2</td><td><input value="060810022026"></td></tr>"#,
        );
        let snapshot = ScheduleParser::new().parse(&html).unwrap();
        assert_eq!(snapshot.token_for(instant(6, 8)), Some("060810012026"));
    }
}
