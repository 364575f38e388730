use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub orders_today: i64,
    pub orders_yesterday: i64,
    pub pending_reports: i64,
    pub urgent_pending_reports: i64,
    pub completed_reports: i64,
    pub completed_yesterday: i64,
    pub total_patients: i64,
    pub new_patients_this_week: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOrderCount {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    #[serde(rename = "ordersLast7Days")]
    pub orders_last_7_days: Vec<DailyOrderCount>,
}
