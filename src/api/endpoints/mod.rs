//! API endpoint handlers, one module per resource.

pub mod activity;
pub mod dashboard;
pub mod doctors;
pub mod health;
pub mod orders;
pub mod patients;
pub mod reports;
pub mod settings;
pub mod sql;
pub mod tests;

use serde::{Deserialize, Serialize};

/// Acknowledgement body for mutations that return no row.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

/// Date that "today" statistics and patient ages are computed against.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
