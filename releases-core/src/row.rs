//! Raw CSV rows and the fixed release column layout.

use std::fmt;
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::error::{FieldError, ReleaseError, ReleaseResult};

/// Columns of a release listing, in file order.
///
/// Position is fixed: header names are never used to remap columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Date,
    Description,
    AgencyName,
    Url,
    ContactName,
    ContactEmail,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Name,
        Column::Date,
        Column::Description,
        Column::AgencyName,
        Column::Url,
        Column::ContactName,
        Column::ContactEmail,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical header name for this column.
    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Date => "date",
            Column::Description => "description",
            Column::AgencyName => "agency_name",
            Column::Url => "url",
            Column::ContactName => "contact_name",
            Column::ContactEmail => "contact_email",
        }
    }

    /// The canonical header row for a release listing.
    pub fn header_row() -> RawRow {
        RawRow::from(Column::ALL.map(Column::header))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One unvalidated CSV row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source file, 0 when built in memory
    line: u64,
    fields: Vec<String>,
}

impl RawRow {
    pub fn new(fields: Vec<String>) -> Self {
        RawRow { line: 0, fields }
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields.get(column.index()).map(String::as_str)
    }

    /// Field value, or a `Missing` error when the row is too short.
    pub fn field(&self, column: Column) -> Result<&str, FieldError> {
        self.get(column).ok_or(FieldError::Missing(column))
    }

    /// Name of the release, used to identify the row in diagnostics.
    pub fn title(&self) -> &str {
        self.get(Column::Name).unwrap_or_default()
    }
}

impl From<Vec<String>> for RawRow {
    fn from(fields: Vec<String>) -> Self {
        RawRow::new(fields)
    }
}

impl<const N: usize> From<[&str; N]> for RawRow {
    fn from(fields: [&str; N]) -> Self {
        RawRow::new(fields.iter().map(|f| f.to_string()).collect())
    }
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ReleaseError + '_ {
    move |source| ReleaseError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Read every row of a comma-delimited, double-quoted file, header included.
///
/// Rows keep their field count as found in the file; short or long rows are
/// left for validation to judge.
pub fn read_rows(path: &Path) -> ReleaseResult<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_path(path)
        .map_err(csv_error(path))?;

    reader
        .records()
        .map(|record| -> ReleaseResult<RawRow> {
            let record = record.map_err(csv_error(path))?;
            let line = record.position().map_or(0, |pos| pos.line());
            let fields = record.iter().map(str::to_string).collect();
            Ok(RawRow::new(fields).with_line(line))
        })
        .collect()
}

/// Read the data rows of a release listing, skipping the header row.
pub fn read_release_rows(path: &Path) -> ReleaseResult<Vec<RawRow>> {
    let mut rows = read_rows(path)?;
    if !rows.is_empty() {
        rows.remove(0);
    }
    Ok(rows)
}

/// Write a header followed by `rows`, quoting fields only where needed.
/// Creates or truncates `path`.
pub fn write_rows<'a>(
    path: &Path,
    header: &RawRow,
    rows: impl IntoIterator<Item = &'a RawRow>,
) -> ReleaseResult<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .quote_style(QuoteStyle::Necessary)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error(path))?;

    writer.write_record(header.fields()).map_err(csv_error(path))?;
    for row in rows {
        writer.write_record(row.fields()).map_err(csv_error(path))?;
    }
    writer.flush()?;

    Ok(())
}
