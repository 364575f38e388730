use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Row of the activity feed. `action` and `entity_type` stay as text so
/// rows written by older versions still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogItem {
    pub log_id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}
