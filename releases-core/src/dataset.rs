//! Validated release records.
//!
//! A [`Dataset`] is the checked form of a release row, loosely following the
//! Project Open Data metadata schema (title, temporal, publisher,
//! distribution, contactPoint). It can only be obtained through
//! [`Dataset::from_row`], which validates every field or fails as a whole.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FieldError;
use crate::row::{Column, RawRow};
use crate::time::ReleaseTime;

/// How strictly download URLs are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlPolicy {
    /// Reject rows whose URL is not an absolute URL with a host and path.
    #[default]
    Enforce,
    /// Log malformed URLs and keep them as-is.
    Advisory,
}

/// Options applied while validating rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    pub url_policy: UrlPolicy,
}

/// Start and end of a release. Rows carry a single date, so both ends are
/// the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temporal {
    pub start: ReleaseTime,
    pub end: ReleaseTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPoint {
    /// Display name (vCard `fn`)
    pub name: String,
    pub email: String,
}

/// A fully validated release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    title: String,
    temporal: Temporal,
    description: String,
    publisher: Publisher,
    distribution: Distribution,
    contact_point: ContactPoint,
}

impl Dataset {
    /// Validate a raw row and build a dataset from it.
    ///
    /// Columns are read by position. The first failing field is reported;
    /// nothing is built unless every field passes.
    pub fn from_row(row: &RawRow, options: &ValidationOptions) -> Result<Self, FieldError> {
        let title = row.field(Column::Name)?;
        if title.trim().is_empty() {
            return Err(FieldError::Empty(Column::Name));
        }

        let date = row.field(Column::Date)?;
        let temporal = parse_temporal(date, date)?;
        let description = row.field(Column::Description)?;
        let publisher = Publisher {
            name: row.field(Column::AgencyName)?.to_string(),
        };

        let distribution = Distribution {
            download_url: check_download_url(row.field(Column::Url)?, options.url_policy)?,
        };

        let contact_point = ContactPoint {
            name: row.field(Column::ContactName)?.to_string(),
            email: row.field(Column::ContactEmail)?.to_string(),
        };

        Ok(Dataset {
            title: title.to_string(),
            temporal,
            description: description.to_string(),
            publisher,
            distribution,
            contact_point,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn temporal(&self) -> &Temporal {
        &self.temporal
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn contact_point(&self) -> &ContactPoint {
        &self.contact_point
    }
}

fn parse_temporal(start: &str, end: &str) -> Result<Temporal, FieldError> {
    match (ReleaseTime::parse(start), ReleaseTime::parse(end)) {
        (Some(start), Some(end)) => Ok(Temporal { start, end }),
        _ => Err(FieldError::UnparsableDate {
            start: start.to_string(),
            end: end.to_string(),
        }),
    }
}

/// Returns the URL to store: the parsed form under `Enforce`, the raw value
/// under `Advisory`.
fn check_download_url(value: &str, policy: UrlPolicy) -> Result<String, FieldError> {
    let reason = match url_shape(value) {
        Ok(url) if policy == UrlPolicy::Enforce => return Ok(url.into()),
        Ok(_) => return Ok(value.to_string()),
        Err(reason) => reason,
    };

    match policy {
        UrlPolicy::Enforce => Err(FieldError::InvalidUrl {
            value: value.to_string(),
            reason,
        }),
        UrlPolicy::Advisory => {
            tracing::warn!(url = %value, %reason, "Keeping malformed download URL");
            Ok(value.to_string())
        }
    }
}

/// An absolute URL with a host and a non-empty path.
fn url_shape(value: &str) -> Result<Url, String> {
    let url = Url::parse(value.trim()).map_err(|e| e.to_string())?;

    if !url.has_host() {
        return Err("URL has no host".to_string());
    }

    // The url crate normalizes an empty path on http(s) URLs to "/"
    if url.path().is_empty() {
        return Err("URL has no path".to_string());
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn census_row() -> RawRow {
        RawRow::from([
            "Census Release",
            "2016-01-01",
            "Annual survey",
            "Census Bureau",
            "http://example.gov/data.csv",
            "Jane Doe",
            "jane@example.gov",
        ])
    }

    fn with_field(column: Column, value: &str) -> RawRow {
        let mut fields = census_row().fields().to_vec();
        fields[column.index()] = value.to_string();
        RawRow::new(fields)
    }

    fn enforce() -> ValidationOptions {
        ValidationOptions::default()
    }

    fn advisory() -> ValidationOptions {
        ValidationOptions {
            url_policy: UrlPolicy::Advisory,
        }
    }

    #[test]
    fn test_from_row_copies_fields_verbatim() {
        let dataset = Dataset::from_row(&census_row(), &enforce()).unwrap();

        let day = ReleaseTime::Date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(dataset.title(), "Census Release");
        assert_eq!(dataset.temporal(), &Temporal { start: day, end: day });
        assert_eq!(dataset.description(), "Annual survey");
        assert_eq!(dataset.publisher().name, "Census Bureau");
        assert_eq!(dataset.distribution().download_url, "http://example.gov/data.csv");
        assert_eq!(dataset.contact_point().name, "Jane Doe");
        assert_eq!(dataset.contact_point().email, "jane@example.gov");
    }

    #[test]
    fn test_from_row_unparsable_date_names_both_values() {
        let err = Dataset::from_row(&with_field(Column::Date, "not-a-date"), &enforce()).unwrap_err();

        assert_eq!(
            err,
            FieldError::UnparsableDate {
                start: "not-a-date".to_string(),
                end: "not-a-date".to_string(),
            }
        );
        assert_eq!(err.column(), Column::Date);
        let message = err.to_string();
        assert_eq!(message.matches("not-a-date").count(), 2, "{message}");
    }

    #[test]
    fn test_from_row_accepts_reduced_precision_dates() {
        let dataset = Dataset::from_row(&with_field(Column::Date, "2016-01"), &enforce()).unwrap();

        let day = ReleaseTime::Date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(dataset.temporal().start, day);
        assert!(Dataset::from_row(&with_field(Column::Date, "2016"), &enforce()).is_ok());
        assert!(Dataset::from_row(&with_field(Column::Date, "2016-01-01T10"), &enforce()).is_ok());
    }

    #[test]
    fn test_from_row_empty_date_is_unparsable() {
        let err = Dataset::from_row(&with_field(Column::Date, ""), &enforce()).unwrap_err();
        assert!(matches!(err, FieldError::UnparsableDate { .. }), "got {err:?}");
    }

    #[test]
    fn test_from_row_short_row_reports_first_missing_column() {
        let row = RawRow::from(["Census Release", "2016-01-01", "Annual survey"]);

        let err = Dataset::from_row(&row, &enforce()).unwrap_err();

        assert_eq!(err, FieldError::Missing(Column::AgencyName));
    }

    #[test]
    fn test_from_row_rejects_blank_title() {
        let err = Dataset::from_row(&with_field(Column::Name, "  "), &enforce()).unwrap_err();
        assert_eq!(err, FieldError::Empty(Column::Name));
    }

    #[test]
    fn test_from_row_allows_empty_description_and_contact() {
        let mut fields = census_row().fields().to_vec();
        fields[Column::Description.index()] = String::new();
        fields[Column::ContactEmail.index()] = String::new();
        let row = RawRow::new(fields);

        let dataset = Dataset::from_row(&row, &enforce()).unwrap();

        assert_eq!(dataset.description(), "");
        assert_eq!(dataset.contact_point().email, "");
    }

    #[test]
    fn test_from_row_ignores_extra_trailing_fields() {
        let mut fields = census_row().fields().to_vec();
        fields.push("extra".to_string());

        assert!(Dataset::from_row(&RawRow::new(fields), &enforce()).is_ok());
    }

    // Malformed URLs are rejected by default. The advisory policy keeps the
    // older pass-through behaviour and is pinned here so a change is visible.
    #[test]
    fn test_enforced_url_policy_rejects_malformed_urls() {
        for value in ["example.gov/data.csv", "", "not a url", "mailto:someone@example.gov"] {
            let err = Dataset::from_row(&with_field(Column::Url, value), &enforce()).unwrap_err();
            assert!(
                matches!(err, FieldError::InvalidUrl { .. }),
                "{value:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_enforced_url_policy_accepts_host_only_http_url() {
        let dataset = Dataset::from_row(&with_field(Column::Url, "https://data.gov"), &enforce()).unwrap();
        assert_eq!(dataset.distribution().download_url, "https://data.gov/");
    }

    #[test]
    fn test_enforced_url_policy_stores_the_checked_url() {
        for (value, stored) in [
            (" http://example.gov/a.csv ", "http://example.gov/a.csv"),
            ("http:example.gov/x", "http://example.gov/x"),
            ("HTTP://Example.GOV/data.csv", "http://example.gov/data.csv"),
        ] {
            let dataset = Dataset::from_row(&with_field(Column::Url, value), &enforce()).unwrap();
            assert_eq!(dataset.distribution().download_url, stored, "for {value:?}");
        }
    }

    #[test]
    fn test_advisory_url_policy_passes_malformed_urls_through() {
        let dataset =
            Dataset::from_row(&with_field(Column::Url, "not a url"), &advisory()).unwrap();
        assert_eq!(dataset.distribution().download_url, "not a url");
    }
}
