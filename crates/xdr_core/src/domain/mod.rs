//! Persisted entity kinds and their closed value sets.
//!
//! Records are owned by a user account (`user_id`). Timestamps are RFC3339 UTC strings as
//! written by the store. Opaque payloads the dashboard never interprets stay as [`JsonMap`].

pub mod external;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Open, schema-less key/value payload.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

fn unknown_value(kind: &str, value: &str) -> AppError {
    AppError::new("DOMAIN_UNKNOWN_VALUE", format!("Unknown {kind} value"))
        .with_details(format!("value={value}"))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl FromStr for Severity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| unknown_value("severity", s))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    New,
    Investigating,
    Confirmed,
    FalsePositive,
    Resolved,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 5] = [
        AlertStatus::New,
        AlertStatus::Investigating,
        AlertStatus::Confirmed,
        AlertStatus::FalsePositive,
        AlertStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::New => "new",
            AlertStatus::Investigating => "investigating",
            AlertStatus::Confirmed => "confirmed",
            AlertStatus::FalsePositive => "false_positive",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| unknown_value("alert status", s))
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Open,
    Investigating,
    Contained,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 5] = [
        IncidentStatus::Open,
        IncidentStatus::Investigating,
        IncidentStatus::Contained,
        IncidentStatus::Resolved,
        IncidentStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Open => "open",
            IncidentStatus::Investigating => "investigating",
            IncidentStatus::Contained => "contained",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }
}

impl FromStr for IncidentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| unknown_value("incident status", s))
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Active,
    Disabled,
    /// Present in stored data; the dashboard never sets it.
    Testing,
}

impl RuleStatus {
    pub const ALL: [RuleStatus; 3] = [
        RuleStatus::Active,
        RuleStatus::Disabled,
        RuleStatus::Testing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Active => "active",
            RuleStatus::Disabled => "disabled",
            RuleStatus::Testing => "testing",
        }
    }
}

impl FromStr for RuleStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| unknown_value("rule status", s))
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detection match awaiting triage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub rule_id: Option<String>,
    /// Snapshot of the rule title at match time.
    pub rule_name: String,
    pub severity: Severity,
    pub status: AlertStatus,
    pub event_id: Option<String>,
    pub incident_id: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub matched_fields: JsonMap,
    pub host_id: Option<String>,
    pub user_id_alert: Option<String>,
    #[serde(default)]
    pub false_positive: bool,
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A group of related alerts under one investigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incident {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    #[serde(default)]
    pub alert_ids: Vec<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    #[serde(default)]
    pub attack_chain: Vec<String>,
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionRule {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub status: RuleStatus,
    /// Detection logic consumed by the external engine; not interpreted here.
    #[serde(default)]
    pub detection: JsonMap,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub false_positives: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rule_references: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}
