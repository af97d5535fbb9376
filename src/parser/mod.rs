//! HTML parsing of the portal's schedule page
//!
//! The portal publishes availability as one merged-cell HTML table with no
//! schema. The parser states its structural expectations explicitly and
//! turns every violation into a `ScheduleParseFailure` so "the site
//! changed" is always distinguishable from "the slot is gone".

pub mod schedule;

pub use schedule::ScheduleParser;
