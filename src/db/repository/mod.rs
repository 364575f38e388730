//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection`. Mutations run inside a
//! transaction together with their activity-log entry.

mod activity;
mod catalog;
mod dashboard;
mod doctor;
mod order;
mod patient;
mod settings;
mod sql_console;

pub use activity::*;
pub use catalog::*;
pub use dashboard::*;
pub use doctor::*;
pub use order::*;
pub use patient::*;
pub use settings::*;
pub use sql_console::*;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use rusqlite::Connection;

    use super::*;
    use crate::models::*;

    pub fn patient(conn: &Connection, name: &str, gender: &str, dob: Option<&str>) -> Patient {
        insert_patient(
            conn,
            &PatientInput {
                full_name: name.into(),
                date_of_birth: dob.map(str::to_string),
                gender: Some(gender.into()),
                phone: Some("+91-9845012345".into()),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        )
        .unwrap()
    }

    pub fn doctor(conn: &Connection, name: &str) -> Doctor {
        insert_doctor(
            conn,
            &DoctorInput {
                full_name: name.into(),
                specialization: Some("Pathologist".into()),
                ..Default::default()
            },
        )
        .unwrap()
    }

    pub fn test(conn: &Connection, name: &str, unit: &str, min: f64, max: f64, price: f64) -> TestItem {
        insert_test(
            conn,
            &TestInput {
                test_name: name.into(),
                sample_type: Some("Blood".into()),
                unit: Some(unit.into()),
                normal_min: Some(min),
                normal_max: Some(max),
                price,
                ..Default::default()
            },
        )
        .unwrap()
    }

    /// Hemoglobin with male/female ranges only.
    pub fn hemoglobin(conn: &Connection) -> i64 {
        let item = insert_test(
            conn,
            &TestInput {
                test_name: "Hemoglobin (Hb)".into(),
                sample_type: Some("Blood".into()),
                unit: Some("g/dL".into()),
                price: 250.0,
                ..Default::default()
            },
        )
        .unwrap();
        for (gender, min, max) in [(RangeGender::Male, 13.0, 17.0), (RangeGender::Female, 12.0, 15.0)] {
            insert_reference_range(
                conn,
                item.test_id,
                &ReferenceRange {
                    gender,
                    age_min: None,
                    age_max: None,
                    normal_min: Some(min),
                    normal_max: Some(max),
                    unit: Some("g/dL".into()),
                },
            )
            .unwrap();
        }
        item.test_id
    }

    pub fn today() -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}
