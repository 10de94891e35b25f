//! Status changes the dashboard exposes as user actions.
//!
//! Nothing here rejects a transition: alerts and incidents move any-to-any, and rules flip
//! between `active` and `disabled`. Validation, if any, belongs to the store.

use serde_json::Value;
use time::OffsetDateTime;

use crate::clock::format_rfc3339_utc;
use crate::domain::{AlertStatus, IncidentStatus, RuleStatus};
use crate::error::AppError;
use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Investigate,
    Confirm,
    MarkFalsePositive,
}

impl AlertAction {
    pub const ALL: [AlertAction; 3] = [
        AlertAction::Investigate,
        AlertAction::Confirm,
        AlertAction::MarkFalsePositive,
    ];

    pub fn target_status(&self) -> AlertStatus {
        match self {
            AlertAction::Investigate => AlertStatus::Investigating,
            AlertAction::Confirm => AlertStatus::Confirmed,
            AlertAction::MarkFalsePositive => AlertStatus::FalsePositive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertAction::Investigate => "Mark as Investigating",
            AlertAction::Confirm => "Confirm Alert",
            AlertAction::MarkFalsePositive => "Mark as False Positive",
        }
    }
}

/// Statuses offered by the incident status selector, in display order.
pub fn incident_status_choices() -> &'static [IncidentStatus] {
    &IncidentStatus::ALL
}

/// `active` becomes `disabled`; anything else becomes `active`.
pub fn toggled_rule_status(current: RuleStatus) -> RuleStatus {
    match current {
        RuleStatus::Active => RuleStatus::Disabled,
        RuleStatus::Disabled | RuleStatus::Testing => RuleStatus::Active,
    }
}

/// Update payload for a status change stamped at `at`.
pub fn status_change(status: &str, at: OffsetDateTime) -> Result<Record, AppError> {
    let mut fields = Record::new();
    fields.insert("status".to_string(), Value::String(status.to_string()));
    fields.insert(
        "updated_at".to_string(),
        Value::String(format_rfc3339_utc(at)?),
    );
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn alert_actions_never_target_new_or_resolved() {
        for action in AlertAction::ALL {
            let s = action.target_status();
            assert!(s != AlertStatus::New && s != AlertStatus::Resolved);
        }
    }

    #[test]
    fn rule_toggle_is_binary() {
        assert_eq!(toggled_rule_status(RuleStatus::Active), RuleStatus::Disabled);
        assert_eq!(toggled_rule_status(RuleStatus::Disabled), RuleStatus::Active);
        assert_eq!(toggled_rule_status(RuleStatus::Testing), RuleStatus::Active);
    }

    #[test]
    fn status_change_stamps_updated_at() {
        let fields = status_change("contained", datetime!(2026-02-03 04:05:06 UTC)).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["status"], "contained");
        assert_eq!(fields["updated_at"], "2026-02-03T04:05:06.000000Z");
    }

    #[test]
    fn incident_selector_offers_every_status() {
        assert_eq!(incident_status_choices().len(), 5);
    }
}
