//! ICS document generation and writing.
//!
//! Output follows RFC 5545: one VCALENDAR holding one VEVENT per release.

mod generate;
mod write;

pub use generate::generate_ics;
pub use write::{
    DEFAULT_CALENDAR_NAME, ReleaseCalendar, SkippedRow, WriteOptions, WriteReport,
    build_calendar, convert, write_ical,
};
