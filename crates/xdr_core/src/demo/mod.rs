use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::store::{Collection, EntityStore, Record};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoSeedSummary {
    pub rules: usize,
    pub alerts: usize,
    pub incidents: usize,
}

fn as_record(value: Value) -> Result<Record, AppError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::new("DEMO_SEED_FAILED", "Demo record is not an object")
            .with_details(other.to_string())),
    }
}

fn record_id(record: &Record) -> Result<String, AppError> {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::new("DEMO_SEED_FAILED", "Stored record has no id"))
}

/// Seeds a deterministic demo dataset so the dashboard has something to triage.
///
/// Alerts normally arrive from the external detection engine; here they are written directly,
/// linked to the demo rules by id and spread one hour apart starting 2026-01-01T00:00:00Z.
pub fn seed_demo_dataset(store: &impl EntityStore) -> Result<DemoSeedSummary, AppError> {
    let rules = [
        (
            "Credential dumping via LSASS access",
            "critical",
            "active",
            vec!["attack.t1003", "windows"],
        ),
        (
            "Encoded PowerShell command line",
            "high",
            "active",
            vec!["attack.t1059.001"],
        ),
        (
            "Outbound beaconing to rare domain",
            "medium",
            "active",
            vec!["network"],
        ),
        (
            "Office spawning script interpreter",
            "high",
            "disabled",
            vec!["attack.t1204"],
        ),
    ];

    let mut rule_ids = Vec::new();
    for (title, severity, status, tags) in &rules {
        let stored = store.insert(
            Collection::DetectionRules,
            as_record(json!({
                "title": title,
                "description": format!("Demo rule: {title}"),
                "severity": severity,
                "status": status,
                "detection": {"condition": "selection"},
                "fields": ["host.name", "process.command_line"],
                "tags": tags,
                "created_at": "2025-12-31T00:00:00Z"
            }))?,
        )?;
        rule_ids.push((record_id(&stored)?, *title, *severity));
    }

    let hosts = ["ws-0142", "ws-0077", "db-01", "dc-02", "web-03"];
    let statuses = ["new", "new", "investigating", "confirmed", "false_positive", "resolved"];
    let mut alert_ids = Vec::new();
    for i in 0..16usize {
        let (rule_id, rule_name, severity) = &rule_ids[i % rule_ids.len()];
        let status = statuses[i % statuses.len()];
        let host = hosts[i % hosts.len()];
        let flagged = status == "false_positive";
        let stored = store.insert(
            Collection::Alerts,
            as_record(json!({
                "rule_id": rule_id,
                "rule_name": rule_name,
                "severity": severity,
                "status": status,
                "description": format!("{rule_name} matched on {host}"),
                "matched_fields": {"host.name": host, "sequence": i},
                "host_id": host,
                "false_positive": flagged,
                "created_at": format!("2026-01-01T{:02}:00:00Z", i)
            }))?,
        )?;
        alert_ids.push(record_id(&stored)?);
    }

    let (dc_alerts, ws_alerts) = (
        vec![alert_ids[0].clone(), alert_ids[4].clone()],
        vec![alert_ids[3].clone()],
    );
    let incidents = [
        json!({
            "title": "Credential theft on domain controller",
            "severity": "critical",
            "status": "investigating",
            "alert_ids": dc_alerts,
            "entity_type": "host",
            "entity_id": "dc-02",
            "attack_chain": ["initial access", "execution", "credential access"],
            "created_at": "2026-01-01T05:30:00Z"
        }),
        json!({
            "title": "Phishing payload on workstation",
            "severity": "high",
            "status": "open",
            "alert_ids": ws_alerts,
            "entity_type": "host",
            "entity_id": "ws-0142",
            "attack_chain": ["initial access", "execution"],
            "created_at": "2026-01-01T06:30:00Z"
        }),
    ];
    let incident_count = incidents.len();
    for incident in incidents {
        store.insert(Collection::Incidents, as_record(incident)?)?;
    }

    let summary = DemoSeedSummary {
        rules: rule_ids.len(),
        alerts: alert_ids.len(),
        incidents: incident_count,
    };
    info!(
        rules = summary.rules,
        alerts = summary.alerts,
        incidents = summary.incidents,
        "seeded demo dataset"
    );
    Ok(summary)
}
