//! List filters for the catalog, doctor directory and order queue.

use std::str::FromStr;

use serde::Serialize;

use super::reference::RangeTexts;
use crate::models::catalog::TestItem;
use crate::models::doctor::Doctor;
use crate::models::enums::{DisplayPriority, DisplayStatus, Gender};
use crate::models::order::OrderListItem;

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Match on test name, sample type or category, case-insensitively.
pub fn filter_tests<'a>(tests: &'a [TestItem], term: &str) -> Vec<&'a TestItem> {
    if term.trim().is_empty() {
        return tests.iter().collect();
    }
    let needle = term.to_lowercase();
    tests
        .iter()
        .filter(|t| {
            contains_ci(Some(&t.test_name), &needle)
                || contains_ci(t.sample_type.as_deref(), &needle)
                || contains_ci(t.category_name.as_deref(), &needle)
        })
        .collect()
}

/// Match on name or specialization, case-insensitively.
pub fn filter_doctors<'a>(doctors: &'a [Doctor], term: &str) -> Vec<&'a Doctor> {
    if term.trim().is_empty() {
        return doctors.iter().collect();
    }
    let needle = term.to_lowercase();
    doctors
        .iter()
        .filter(|d| {
            contains_ci(Some(&d.full_name), &needle)
                || contains_ci(d.specialization.as_deref(), &needle)
        })
        .collect()
}

/// Order queue filter; `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<DisplayStatus>,
    pub priority: Option<DisplayPriority>,
}

impl OrderFilter {
    /// Build from select-box values, where `all` (or anything unknown)
    /// disables that filter.
    pub fn from_selection(status: &str, priority: &str) -> Self {
        Self {
            status: DisplayStatus::from_str(status).ok(),
            priority: DisplayPriority::from_str(priority).ok(),
        }
    }

    pub fn matches(&self, order: &OrderListItem) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.priority.map_or(true, |p| order.priority == p)
    }

    pub fn apply<'a>(&self, orders: &'a [OrderListItem]) -> Vec<&'a OrderListItem> {
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}

/// Price of the selected tests, as shown while building an order.
pub fn order_total(tests: &[TestItem], selected: &[i64]) -> f64 {
    tests
        .iter()
        .filter(|t| selected.contains(&t.test_id))
        .map(|t| t.price)
        .sum()
}

/// A catalog test as offered while building an order for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestChoice {
    pub test_id: i64,
    pub test_name: String,
    pub price: f64,
    /// Range for the patient's gender, `-` when none applies.
    pub range_text: String,
}

/// Filter the catalog by `term` and attach the range that applies to a
/// patient of `gender`.
pub fn test_choices(tests: &[TestItem], term: &str, gender: Option<Gender>) -> Vec<TestChoice> {
    filter_tests(tests, term)
        .into_iter()
        .map(|t| TestChoice {
            test_id: t.test_id,
            test_name: t.test_name.clone(),
            price: t.price,
            range_text: RangeTexts::from(t).display_for(gender).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_item(id: i64, name: &str, sample: &str, category: &str, price: f64) -> TestItem {
        TestItem {
            test_id: id,
            test_name: name.into(),
            sample_type: Some(sample.into()),
            unit: None,
            price,
            category_name: Some(category.into()),
            any_range_text: None,
            male_range_text: None,
            female_range_text: None,
        }
    }

    fn order(id: i64, status: DisplayStatus, priority: DisplayPriority) -> OrderListItem {
        OrderListItem {
            order_id: id,
            patient_name: "P".into(),
            order_date: None,
            tests_count: 1,
            priority,
            status,
        }
    }

    #[test]
    fn tests_match_any_field() {
        let tests = vec![
            test_item(1, "HbA1c", "Blood", "Diabetes Panel", 400.0),
            test_item(2, "Urine Culture", "Urine", "Urine Analysis", 600.0),
        ];
        assert_eq!(filter_tests(&tests, "diabetes")[0].test_id, 1);
        assert_eq!(filter_tests(&tests, "URINE").len(), 1);
        assert_eq!(filter_tests(&tests, " ").len(), 2);
    }

    #[test]
    fn doctors_match_specialization() {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let doctors = vec![Doctor {
            doctor_id: 1,
            full_name: "Dr. Sunita Sharma".into(),
            specialization: Some("Cardiologist".into()),
            phone: None,
            email: None,
            created_at,
        }];
        assert_eq!(filter_doctors(&doctors, "cardio").len(), 1);
        assert!(filter_doctors(&doctors, "surgeon").is_empty());
    }

    #[test]
    fn order_filter_all_passes_everything() {
        let orders = vec![
            order(1, DisplayStatus::Pending, DisplayPriority::Urgent),
            order(2, DisplayStatus::Completed, DisplayPriority::Normal),
        ];
        assert_eq!(OrderFilter::from_selection("all", "all").apply(&orders).len(), 2);

        let urgent = OrderFilter::from_selection("all", "urgent").apply(&orders);
        assert_eq!(urgent.len(), 1);
        assert_eq!(urgent[0].order_id, 1);

        let done = OrderFilter::from_selection("completed", "urgent").apply(&orders);
        assert!(done.is_empty());
    }

    #[test]
    fn choices_carry_patient_range() {
        let mut hb = test_item(1, "Hemoglobin", "Blood", "Hematology", 250.0);
        hb.male_range_text = Some("13 - 17 g/dL".into());
        hb.female_range_text = Some("12 - 15 g/dL".into());
        let tests = vec![hb, test_item(2, "Urine Culture", "Urine", "Urine Analysis", 600.0)];

        let choices = test_choices(&tests, "", Some(Gender::Female));
        assert_eq!(choices[0].range_text, "12 - 15 g/dL");
        assert_eq!(choices[1].range_text, "-");

        let blood = test_choices(&tests, "blood", Some(Gender::Male));
        assert_eq!(blood.len(), 1);
        assert_eq!(blood[0].range_text, "13 - 17 g/dL");
    }

    #[test]
    fn total_sums_selected_prices() {
        let tests = vec![
            test_item(1, "A", "Blood", "X", 250.0),
            test_item(2, "B", "Blood", "X", 180.5),
            test_item(3, "C", "Blood", "X", 99.0),
        ];
        assert_eq!(order_total(&tests, &[1, 2]), 430.5);
        assert_eq!(order_total(&tests, &[]), 0.0);
    }
}
