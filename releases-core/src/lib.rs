//! Core types for turning data-release listings into calendars.
//!
//! The pipeline runs in one pass:
//! - `merge` concatenates a folder of same-header CSV listings (optional)
//! - `row` loads a listing into raw rows
//! - `dataset` validates a row into a [`Dataset`]
//! - `event` projects a dataset into a [`ReleaseEvent`]
//! - `ics` collects events and writes the .ics file

pub mod dataset;
pub mod error;
pub mod event;
pub mod ics;
pub mod merge;
pub mod row;
pub mod time;

pub use dataset::{Dataset, UrlPolicy, ValidationOptions};
pub use error::{FieldError, ReleaseError, ReleaseResult};
pub use event::ReleaseEvent;
