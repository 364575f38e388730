//! Order lifecycle and the mapping between stored and client-facing codes.
//!
//! Storage keeps four stages; clients see three:
//! `PENDING` → pending, `SAMPLE_COLLECTED`/`RESULTS_ENTERED` → in-progress,
//! `REPORT_READY` → completed.

use std::str::FromStr;

use crate::db::DatabaseError;
use crate::models::enums::{DisplayPriority, DisplayStatus, Gender, OrderStatus, Priority};

impl Gender {
    /// Lenient parse of form input: `male`, `M`, `f`, `Other`...
    /// Empty or unrecognised input yields `None`.
    pub fn from_input(input: Option<&str>) -> Option<Gender> {
        let first = input?.trim().chars().next()?.to_ascii_lowercase();
        match first {
            'm' => Some(Gender::Male),
            'f' => Some(Gender::Female),
            'o' => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl Priority {
    /// `urgent` in any case is urgent, anything else is normal.
    pub fn from_input(input: &str) -> Priority {
        if input.trim().eq_ignore_ascii_case("urgent") {
            Priority::Urgent
        } else {
            Priority::Normal
        }
    }

    pub fn display(&self) -> DisplayPriority {
        match self {
            Priority::Normal => DisplayPriority::Normal,
            Priority::Urgent => DisplayPriority::Urgent,
        }
    }
}

impl OrderStatus {
    pub fn display(&self) -> DisplayStatus {
        match self {
            OrderStatus::Pending => DisplayStatus::Pending,
            OrderStatus::SampleCollected | OrderStatus::ResultsEntered => {
                DisplayStatus::InProgress
            }
            OrderStatus::ReportReady => DisplayStatus::Completed,
        }
    }

    /// Column stamped when an order enters this stage.
    pub fn timestamp_column(&self) -> Option<&'static str> {
        match self {
            OrderStatus::Pending => None,
            OrderStatus::SampleCollected => Some("sample_collected_at"),
            OrderStatus::ResultsEntered => Some("results_entered_at"),
            OrderStatus::ReportReady => Some("report_ready_at"),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::SampleCollected => 1,
            OrderStatus::ResultsEntered => 2,
            OrderStatus::ReportReady => 3,
        }
    }
}

impl DisplayStatus {
    pub fn to_stored(&self) -> OrderStatus {
        match self {
            DisplayStatus::Pending => OrderStatus::Pending,
            DisplayStatus::InProgress => OrderStatus::ResultsEntered,
            DisplayStatus::Completed => OrderStatus::ReportReady,
        }
    }
}

/// Parse a client status code (`pending`, `in-progress`, `completed`),
/// case-insensitively. Unknown codes are rejected.
pub fn parse_display_status(input: &str) -> Result<OrderStatus, DatabaseError> {
    let normalized = input.trim().to_ascii_lowercase();
    DisplayStatus::from_str(&normalized)
        .map(|s| s.to_stored())
        .map_err(|_| DatabaseError::invalid(format!("Unknown order status: {input}")))
}

/// Stage an order moves to after results are recorded.
///
/// Completion is explicit; otherwise recording results only ever moves
/// an order forward to `RESULTS_ENTERED`.
pub fn status_after_results(current: OrderStatus, mark_completed: bool) -> OrderStatus {
    if mark_completed {
        return OrderStatus::ReportReady;
    }
    if current.rank() < OrderStatus::ResultsEntered.rank() {
        OrderStatus::ResultsEntered
    } else {
        current
    }
}
