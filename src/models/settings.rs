use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const LAB_NAME: &str = "lab_name";
pub const LAB_ADDRESS: &str = "lab_address";
pub const LAB_PHONE: &str = "lab_phone";
pub const LAB_EMAIL: &str = "lab_email";
pub const LAB_LICENSE: &str = "lab_license";
pub const REPORT_HEADER: &str = "report_header";
pub const REPORT_FOOTER: &str = "report_footer";

/// Body of both `GET` and `PUT /api/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabSettings {
    pub settings: BTreeMap<String, String>,
}

impl LabSettings {
    /// Value for `key`, `None` when missing or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}
