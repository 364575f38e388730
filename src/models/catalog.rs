use serde::{Deserialize, Serialize};

use super::enums::RangeGender;
use super::patient::non_empty;
use crate::db::DatabaseError;

/// Catalog row as listed by `GET /api/tests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestItem {
    pub test_id: i64,
    pub test_name: String,
    pub sample_type: Option<String>,
    pub unit: Option<String>,
    pub price: f64,
    pub category_name: Option<String>,
    pub any_range_text: Option<String>,
    pub male_range_text: Option<String>,
    pub female_range_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCategory {
    pub category_id: i64,
    pub category_name: String,
    pub description: Option<String>,
}

/// One row of `test_reference_ranges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub gender: RangeGender,
    pub age_min: Option<i64>,
    pub age_max: Option<i64>,
    pub normal_min: Option<f64>,
    pub normal_max: Option<f64>,
    pub unit: Option<String>,
}

impl ReferenceRange {
    pub fn any(normal_min: Option<f64>, normal_max: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            gender: RangeGender::Any,
            age_min: None,
            age_max: None,
            normal_min,
            normal_max,
            unit: unit.map(str::to_string),
        }
    }

    pub fn has_bounds(&self) -> bool {
        self.normal_min.is_some() && self.normal_max.is_some()
    }

    /// Whether the range applies to a patient of the given age. Ranges
    /// without age limits apply to everyone, as do patients of unknown age.
    pub fn covers_age(&self, age: Option<i32>) -> bool {
        let Some(age) = age.map(i64::from) else {
            return true;
        };
        self.age_min.map_or(true, |min| age >= min) && self.age_max.map_or(true, |max| age <= max)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInput {
    pub test_name: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub sample_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub normal_min: Option<f64>,
    #[serde(default)]
    pub normal_max: Option<f64>,
    pub price: f64,
}

impl TestInput {
    pub fn validate(&self) -> Result<TestInput, DatabaseError> {
        let test_name = self.test_name.trim();
        if test_name.is_empty() {
            return Err(DatabaseError::invalid("Test name is required"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DatabaseError::invalid("Price must be a non-negative number"));
        }
        if let (Some(min), Some(max)) = (self.normal_min, self.normal_max) {
            if min > max {
                return Err(DatabaseError::invalid(
                    "Normal minimum cannot exceed normal maximum",
                ));
            }
        }
        Ok(TestInput {
            test_name: test_name.to_string(),
            category_id: self.category_id,
            sample_type: non_empty(self.sample_type.as_deref()),
            unit: non_empty(self.unit.as_deref()),
            normal_min: self.normal_min,
            normal_max: self.normal_max,
            price: self.price,
        })
    }
}
