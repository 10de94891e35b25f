use serde::{Deserialize, Serialize};

use crate::domain::{Alert, AlertStatus, Severity};
use crate::store::{Collection, ListQuery};

/// Number of most recent alerts the overview summarizes.
pub const DEFAULT_OVERVIEW_WINDOW: u32 = 10;

/// Summary counts over a window of recent alerts.
///
/// These are counts over the fetched window only, not totals for the whole collection: with
/// the default window, `total` never exceeds 10.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertStats {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub new: usize,
}

/// Newest-first alerts capped at `window`.
pub fn recent_alerts_query(window: u32) -> ListQuery {
    ListQuery::new(Collection::Alerts).limit(window)
}

pub fn compute_alert_stats(window: &[Alert]) -> AlertStats {
    window.iter().fold(
        AlertStats {
            total: window.len(),
            ..AlertStats::default()
        },
        |mut acc, alert| {
            match alert.severity {
                Severity::Critical => acc.critical += 1,
                Severity::High => acc.high += 1,
                _ => {}
            }
            if alert.status == AlertStatus::New {
                acc.new += 1;
            }
            acc
        },
    )
}
