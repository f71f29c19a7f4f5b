//! Calendar writer: rows in, one .ics file out.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::dataset::ValidationOptions;
use crate::error::{FieldError, ReleaseResult};
use crate::event::ReleaseEvent;
use crate::ics::generate_ics;
use crate::row::{RawRow, read_release_rows};

pub const DEFAULT_CALENDAR_NAME: &str = "Federal Data Releases";

/// The calendar being assembled.
///
/// Created empty, filled with events in row order, then consumed by
/// [`ReleaseCalendar::write`].
#[derive(Debug, Clone)]
pub struct ReleaseCalendar {
    name: String,
    events: Vec<ReleaseEvent>,
}

impl ReleaseCalendar {
    pub fn new(name: impl Into<String>) -> Self {
        ReleaseCalendar {
            name: name.into(),
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: ReleaseEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ReleaseEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn to_ics(&self, dtstamp: DateTime<Utc>) -> String {
        generate_ics(&self.name, &self.events, dtstamp)
    }

    /// Serialize to `path`, replacing any existing file.
    pub fn write(self, path: &Path, dtstamp: DateTime<Utc>) -> ReleaseResult<()> {
        std::fs::write(path, self.to_ics(dtstamp))?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub calendar_name: String,
    pub validation: ValidationOptions,
    /// DTSTAMP for every event, normally the time of the run
    pub dtstamp: DateTime<Utc>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            validation: ValidationOptions::default(),
            dtstamp: Utc::now(),
        }
    }
}

/// A row left out of the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub title: String,
    pub error: FieldError,
}

#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub written: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Validate and project each row, keeping the ones that pass.
///
/// A failing row is logged and skipped; it never stops the rows after it.
pub fn build_calendar<'a>(
    rows: impl IntoIterator<Item = &'a RawRow>,
    options: &WriteOptions,
) -> (ReleaseCalendar, Vec<SkippedRow>) {
    let mut calendar = ReleaseCalendar::new(&options.calendar_name);
    let mut skipped = Vec::new();

    for row in rows {
        match ReleaseEvent::from_row(row, &options.validation) {
            Ok(event) => {
                tracing::debug!(line = row.line(), event = %event, "Built release event");
                calendar.push(event);
            }
            Err(error) => {
                tracing::debug!(line = row.line(), ?error, "Invalid fields present");
                tracing::warn!(
                    line = row.line(),
                    %error,
                    "Release event {:?} could not be added to the calendar",
                    row.title()
                );
                skipped.push(SkippedRow {
                    line: row.line(),
                    title: row.title().to_string(),
                    error,
                });
            }
        }
    }

    (calendar, skipped)
}

/// Build a calendar from `rows` and write it to `ical_path`.
pub fn write_ical(
    rows: &[RawRow],
    ical_path: &Path,
    options: &WriteOptions,
) -> ReleaseResult<WriteReport> {
    let (calendar, skipped) = build_calendar(rows, options);
    let written = calendar.len();

    if calendar.is_empty() && !rows.is_empty() {
        tracing::warn!(rows = rows.len(), "No valid release events, writing an empty calendar");
    }

    calendar.write(ical_path, options.dtstamp)?;

    tracing::info!(
        written,
        skipped = skipped.len(),
        path = %ical_path.display(),
        "Wrote release calendar"
    );

    Ok(WriteReport { written, skipped })
}

/// Read a release listing (header + data rows) and write its calendar.
pub fn convert(
    list_path: &Path,
    ical_path: &Path,
    options: &WriteOptions,
) -> ReleaseResult<WriteReport> {
    let rows = read_release_rows(list_path)?;
    tracing::info!(rows = rows.len(), path = %list_path.display(), "Loaded release listing");

    write_ical(&rows, ical_path, options)
}
