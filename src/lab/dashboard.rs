//! Dashboard stat cards and the seven-day order chart.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::dashboard::{DailyOrderCount, DashboardResponse, DashboardStats};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: i64,
    pub trend: Option<String>,
    /// `Some(true)` renders as good news, `Some(false)` as bad.
    pub trend_up: Option<bool>,
}

/// Day-over-day trend. `first_label` is used when yesterday had nothing.
fn day_trend(today: i64, yesterday: i64, first_label: &str) -> (Option<String>, Option<bool>) {
    let diff = today - yesterday;
    if yesterday == 0 && today > 0 {
        (Some(first_label.to_string()), Some(true))
    } else if diff > 0 {
        (Some(format!("+{diff} vs yesterday")), Some(true))
    } else if diff < 0 {
        (Some(format!("{diff} vs yesterday")), Some(false))
    } else {
        (None, None)
    }
}

pub fn stat_cards(stats: &DashboardStats) -> Vec<StatCard> {
    let (orders_trend, orders_up) =
        day_trend(stats.orders_today, stats.orders_yesterday, "First orders today");
    let (completed_trend, completed_up) = day_trend(
        stats.completed_reports,
        stats.completed_yesterday,
        "First completed today",
    );

    let (pending_trend, pending_up) = if stats.urgent_pending_reports > 0 {
        (Some(format!("{} urgent", stats.urgent_pending_reports)), Some(false))
    } else {
        (None, None)
    };

    let (patients_trend, patients_up) = if stats.new_patients_this_week > 0 {
        (Some(format!("+{} this week", stats.new_patients_this_week)), Some(true))
    } else {
        (None, None)
    };

    vec![
        StatCard {
            title: "Orders Today",
            value: stats.orders_today,
            trend: orders_trend,
            trend_up: orders_up,
        },
        StatCard {
            title: "Pending Reports",
            value: stats.pending_reports,
            trend: pending_trend,
            trend_up: pending_up,
        },
        StatCard {
            title: "Completed Reports",
            value: stats.completed_reports,
            trend: completed_trend,
            trend_up: completed_up,
        },
        StatCard {
            title: "Total Patients",
            value: stats.total_patients,
            trend: patients_trend,
            trend_up: patients_up,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    /// Short weekday name (`Mon`), or the raw date when it does not parse.
    pub label: String,
    pub count: i64,
}

pub fn chart_bars(days: &[DailyOrderCount]) -> Vec<ChartBar> {
    days.iter()
        .map(|day| ChartBar {
            label: NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
                .map(|d| d.format("%a").to_string())
                .unwrap_or_else(|_| day.date.clone()),
            count: day.count,
        })
        .collect()
}

/// Bar scale maximum; never below 1.
pub fn chart_scale(bars: &[ChartBar]) -> i64 {
    bars.iter().map(|b| b.count).max().unwrap_or(1).max(1)
}

/// Everything the dashboard page draws from one `GET /api/dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub cards: Vec<StatCard>,
    pub bars: Vec<ChartBar>,
    pub scale: i64,
}

impl DashboardView {
    pub fn from_response(response: &DashboardResponse) -> Self {
        let bars = chart_bars(&response.orders_last_7_days);
        Self {
            cards: stat_cards(&response.stats),
            scale: chart_scale(&bars),
            bars,
        }
    }
}
