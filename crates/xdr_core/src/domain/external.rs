//! Record kinds the store exposes but the dashboard never reads or writes.

use serde::{Deserialize, Serialize};

use super::JsonMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub timestamp: String,
    pub host_id: Option<String>,
    pub user_id_event: Option<String>,
    pub process_name: Option<String>,
    pub event_category: Option<String>,
    #[serde(default)]
    pub raw_data: JsonMap,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Playbook {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub trigger: JsonMap,
    #[serde(default)]
    pub steps: Vec<JsonMap>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Failed,
    RolledBack,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybookExecution {
    pub id: String,
    pub playbook_id: String,
    pub incident_id: String,
    pub user_id: String,
    pub status: ExecutionStatus,
    pub steps_completed: u32,
    pub steps_total: Option<u32>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub execution_log: JsonMap,
    pub started_at: String,
    pub completed_at: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Executing,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseAction {
    pub id: String,
    pub user_id: String,
    pub execution_id: Option<String>,
    pub action_type: String,
    pub target_entity: Option<String>,
    pub status: ActionStatus,
    pub parameters: Option<JsonMap>,
    pub result: Option<JsonMap>,
    pub error_message: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityDistribution {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyticsSummary {
    pub total_alerts: u64,
    pub total_incidents: u64,
    pub active_rules: u64,
    pub alerts_last_24h: u64,
    pub severity_distribution: SeverityDistribution,
}
