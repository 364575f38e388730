use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{DisplayPriority, DisplayStatus, Gender, ResultFlag};

/// Row of `GET /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderListItem {
    pub order_id: i64,
    pub patient_name: String,
    pub order_date: Option<NaiveDateTime>,
    pub tests_count: i64,
    pub priority: DisplayPriority,
    pub status: DisplayStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub patient_id: i64,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub test_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub order_id: i64,
}

/// One ordered test with its result snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTestItem {
    pub test_id: i64,
    pub test_name: String,
    pub unit: Option<String>,
    pub normal_range_text: Option<String>,
    pub result_value: Option<f64>,
    pub result_flag: Option<ResultFlag>,
    pub result_entered_at: Option<NaiveDateTime>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_id: i64,
    pub order_date: Option<NaiveDateTime>,
    pub priority: DisplayPriority,
    pub status: DisplayStatus,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_dob: Option<NaiveDate>,
    pub patient_gender: Option<Gender>,
    pub doctor_id: Option<i64>,
    pub doctor_name: Option<String>,
    pub doctor_specialization: Option<String>,
    pub sample_collected_at: Option<NaiveDateTime>,
    pub results_entered_at: Option<NaiveDateTime>,
    pub report_ready_at: Option<NaiveDateTime>,
    pub tests: Vec<OrderTestItem>,
}

/// `PUT /api/orders/:id` body. Status uses the client-facing codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrderPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultItem {
    pub test_id: i64,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResultsPayload {
    pub results: Vec<TestResultItem>,
    #[serde(default = "default_mark_completed")]
    pub mark_completed: bool,
}

fn default_mark_completed() -> bool {
    true
}

/// Outcome of a results update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsUpdate {
    pub updated: usize,
    pub skipped: Vec<i64>,
    pub status: DisplayStatus,
}

/// Row of `GET /api/reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportListItem {
    pub order_id: i64,
    pub patient_name: String,
    pub order_date: Option<NaiveDateTime>,
    pub priority: DisplayPriority,
    pub status: DisplayStatus,
    pub total_amount: f64,
}
