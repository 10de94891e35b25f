use super::ListState;
use crate::domain::Alert;
use crate::error::AppError;
use crate::stats::{compute_alert_stats, recent_alerts_query, AlertStats};
use crate::store::{list_as, EntityStore};

/// Recent alerts plus summary counts over that same window.
pub struct OverviewView<S> {
    store: S,
    window: u32,
    state: ListState<Alert>,
    stats: AlertStats,
}

impl<S: EntityStore> OverviewView<S> {
    pub fn new(store: S, window: u32) -> Self {
        Self {
            store,
            window,
            state: ListState::new(),
            stats: AlertStats::default(),
        }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn recent_alerts(&self) -> &[Alert] {
        self.state.items()
    }

    pub fn stats(&self) -> AlertStats {
        self.stats
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.state.last_error()
    }

    pub fn reload(&mut self) {
        let query = recent_alerts_query(self.window);
        let store = &self.store;
        self.state.load("list recent alerts", || list_as(store, &query));
        self.stats = compute_alert_stats(self.state.items());
    }
}
