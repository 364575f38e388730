use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use crate::db::DatabaseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: i64,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
}

/// `POST /api/patients` body. Gender accepts free text (`male`, `F`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// `PUT /api/patients/:id` body. Absent fields keep their value,
/// empty strings clear optional fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Validated patient fields ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl PatientInput {
    pub fn validate(&self) -> Result<PatientRecord, DatabaseError> {
        Ok(PatientRecord {
            full_name: required_name(&self.full_name)?,
            date_of_birth: parse_date_of_birth(self.date_of_birth.as_deref())?,
            gender: Gender::from_input(self.gender.as_deref()),
            phone: non_empty(self.phone.as_deref()),
            email: non_empty(self.email.as_deref()),
            address: non_empty(self.address.as_deref()),
        })
    }
}

impl PatientUpdate {
    /// Merge the update over the stored patient.
    pub fn apply(&self, current: &Patient) -> Result<PatientRecord, DatabaseError> {
        let full_name = match &self.full_name {
            Some(name) => required_name(name)?,
            None => current.full_name.clone(),
        };
        let date_of_birth = match &self.date_of_birth {
            Some(dob) => parse_date_of_birth(Some(dob))?,
            None => current.date_of_birth,
        };
        let gender = match &self.gender {
            Some(g) => Gender::from_input(Some(g)),
            None => current.gender,
        };
        Ok(PatientRecord {
            full_name,
            date_of_birth,
            gender,
            phone: merge(&self.phone, &current.phone),
            email: merge(&self.email, &current.email),
            address: merge(&self.address, &current.address),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
    }
}

fn required_name(name: &str) -> Result<String, DatabaseError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DatabaseError::invalid("Full name is required"));
    }
    Ok(trimmed.to_string())
}

fn parse_date_of_birth(input: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match non_empty(input) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DatabaseError::invalid(format!("Invalid date of birth: {s}"))),
    }
}

pub(crate) fn non_empty(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn merge(update: &Option<String>, current: &Option<String>) -> Option<String> {
    match update {
        Some(value) => non_empty(Some(value)),
        None => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Patient {
        Patient {
            patient_id: 7,
            full_name: "Priya Rao".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 2),
            gender: Some(Gender::Female),
            phone: Some("+91-9845000000".into()),
            email: None,
            address: Some("Jayanagar".into()),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn input_normalizes_fields() {
        let input = PatientInput {
            full_name: "  Amit Kumar ".into(),
            date_of_birth: Some("1985-12-31".into()),
            gender: Some("male".into()),
            phone: Some("".into()),
            email: Some("amit@example.com".into()),
            address: None,
        };
        let record = input.validate().unwrap();
        assert_eq!(record.full_name, "Amit Kumar");
        assert_eq!(record.date_of_birth, NaiveDate::from_ymd_opt(1985, 12, 31));
        assert_eq!(record.gender, Some(Gender::Male));
        assert_eq!(record.phone, None);
        assert_eq!(record.email.as_deref(), Some("amit@example.com"));
    }

    #[test]
    fn blank_name_rejected() {
        let input = PatientInput {
            full_name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            input.validate(),
            Err(DatabaseError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn malformed_date_rejected() {
        let input = PatientInput {
            full_name: "A".into(),
            date_of_birth: Some("31/12/1985".into()),
            ..Default::default()
        };
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid date of birth"));
    }

    #[test]
    fn update_keeps_absent_and_clears_empty() {
        let update = PatientUpdate {
            phone: Some(String::new()),
            email: Some("priya@example.com".into()),
            ..Default::default()
        };
        let record = update.apply(&stored()).unwrap();
        assert_eq!(record.full_name, "Priya Rao");
        assert_eq!(record.gender, Some(Gender::Female));
        assert_eq!(record.phone, None);
        assert_eq!(record.email.as_deref(), Some("priya@example.com"));
        assert_eq!(record.address.as_deref(), Some("Jayanagar"));
    }

    #[test]
    fn update_with_empty_gender_clears_it() {
        let update = PatientUpdate {
            gender: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(update.apply(&stored()).unwrap().gender, None);
    }
}
