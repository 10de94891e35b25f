//! Creation forms and the records they submit.
//!
//! A form with an empty title produces no record; callers treat that as a silent no-op.
//! Status, timestamps and empty collections not set here are filled in by the store.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{IncidentStatus, RuleStatus, Severity};
use crate::store::Record;

/// Severities offered by the creation forms. `info` is not offered.
pub const FORM_SEVERITIES: [Severity; 4] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentForm {
    pub title: String,
    pub severity: Severity,
}

impl Default for IncidentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            severity: Severity::High,
        }
    }
}

impl IncidentForm {
    pub fn to_record(&self) -> Option<Record> {
        if self.title.is_empty() {
            return None;
        }
        let mut record = Record::new();
        record.insert("title".to_string(), Value::String(self.title.clone()));
        record.insert("severity".to_string(), json!(self.severity));
        record.insert("status".to_string(), json!(IncidentStatus::Open));
        Some(record)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleForm {
    pub title: String,
    pub severity: Severity,
    pub description: String,
}

impl Default for RuleForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            severity: Severity::High,
            description: String::new(),
        }
    }
}

impl RuleForm {
    pub fn to_record(&self) -> Option<Record> {
        if self.title.is_empty() {
            return None;
        }
        let mut record = Record::new();
        record.insert("title".to_string(), Value::String(self.title.clone()));
        record.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        record.insert("severity".to_string(), json!(self.severity));
        record.insert("status".to_string(), json!(RuleStatus::Active));
        record.insert("detection".to_string(), json!({}));
        for list in ["fields", "false_positives", "tags"] {
            record.insert(list.to_string(), json!([]));
        }
        Some(record)
    }
}
