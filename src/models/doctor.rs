use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::patient::non_empty;
use crate::db::DatabaseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: i64,
    pub full_name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorInput {
    pub full_name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl DoctorInput {
    /// Trim fields and drop empty optionals.
    pub fn validate(&self) -> Result<DoctorInput, DatabaseError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(DatabaseError::invalid("Full name is required"));
        }
        Ok(DoctorInput {
            full_name: full_name.to_string(),
            specialization: non_empty(self.specialization.as_deref()),
            phone: non_empty(self.phone.as_deref()),
            email: non_empty(self.email.as_deref()),
        })
    }
}
