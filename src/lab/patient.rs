//! Patient-facing derived values: age, gender label and registry search.

use chrono::{Datelike, NaiveDate};

use crate::models::enums::Gender;
use crate::models::patient::Patient;

/// Whole years between `dob` and `today`, one less when this year's
/// birthday is still ahead. `None` for an unknown or future date of birth.
pub fn age_on(dob: Option<NaiveDate>, today: NaiveDate) -> Option<i32> {
    let dob = dob?;
    if dob > today {
        return None;
    }
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    Some(age)
}

/// `Male` / `Female` / `Other`, or `-` when unknown.
pub fn gender_label(gender: Option<Gender>) -> &'static str {
    gender.map_or("-", |g| g.label())
}

/// Registry search: blank term matches everyone; otherwise the name matches
/// case-insensitively or the phone contains the raw term.
pub fn matches_search(patient: &Patient, term: &str) -> bool {
    if term.trim().is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    patient.full_name.to_lowercase().contains(&needle)
        || patient.phone.as_deref().is_some_and(|p| p.contains(term))
}

pub fn filter_patients<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    patients.iter().filter(|p| matches_search(p, term)).collect()
}
