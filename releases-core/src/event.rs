//! Calendar events projected from validated releases.

use std::fmt;

use uuid::Uuid;

use crate::dataset::{Dataset, ValidationOptions};
use crate::error::FieldError;
use crate::row::RawRow;
use crate::time::ReleaseTime;

const UID_DOMAIN: &str = "releases-ical";

/// One release as a calendar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEvent {
    /// Stable across runs for the same title, date and URL
    pub uid: String,
    pub summary: String,
    pub start: ReleaseTime,
    pub url: String,
    /// Publisher name
    pub organizer: String,
    pub contact: Contact,
    pub description: String,
}

/// Who to ask about a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

impl Contact {
    pub fn mailto(&self) -> String {
        format!("mailto:{}", self.email)
    }
}

/// The contact line, e.g. `CN=Jane Doe:mailto:jane@example.gov`
impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CN={}:{}", self.name, self.mailto())
    }
}

impl ReleaseEvent {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let start = dataset.temporal().start;
        let url = dataset.distribution().download_url.clone();

        ReleaseEvent {
            uid: release_uid(dataset.title(), &start, &url),
            summary: dataset.title().to_string(),
            start,
            url,
            organizer: dataset.publisher().name.clone(),
            contact: Contact {
                name: dataset.contact_point().name.clone(),
                email: dataset.contact_point().email.clone(),
            },
            description: dataset.description().to_string(),
        }
    }

    /// Validate a row and project it in one step. Fails with the row's
    /// validation error; projection itself cannot fail.
    pub fn from_row(row: &RawRow, options: &ValidationOptions) -> Result<Self, FieldError> {
        let dataset = Dataset::from_row(row, options)?;
        Ok(Self::from(&dataset))
    }
}

impl From<&Dataset> for ReleaseEvent {
    fn from(dataset: &Dataset) -> Self {
        ReleaseEvent::from_dataset(dataset)
    }
}

impl fmt::Display for ReleaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.summary, self.start)
    }
}

fn release_uid(title: &str, start: &ReleaseTime, url: &str) -> String {
    let key = format!("{title}|{start}|{url}");
    let uuid = Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes());
    format!("{uuid}@{UID_DOMAIN}")
}
