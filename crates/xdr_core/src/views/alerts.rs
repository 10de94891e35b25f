use std::rc::Rc;

use tracing::debug;

use super::ListState;
use crate::clock::Clock;
use crate::domain::Alert;
use crate::error::AppError;
use crate::filter::{AlertFilter, ViewFilter};
use crate::store::{list_as, Collection, EntityStore};
use crate::transitions::{status_change, AlertAction};

pub struct AlertsView<S> {
    store: S,
    clock: Rc<dyn Clock>,
    filter: AlertFilter,
    state: ListState<Alert>,
}

impl<S: EntityStore> AlertsView<S> {
    pub fn new(store: S, clock: Rc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            filter: AlertFilter::default(),
            state: ListState::new(),
        }
    }

    pub fn filter(&self) -> AlertFilter {
        self.filter
    }

    pub fn alerts(&self) -> &[Alert] {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.state.last_error()
    }

    /// Every selection change is a fresh round trip, even when re-selecting the same filter.
    pub fn set_filter(&mut self, filter: AlertFilter) {
        debug!(filter = filter.label(), "alerts filter changed");
        self.filter = filter;
        self.reload();
    }

    pub fn reload(&mut self) {
        let query = self.filter.query();
        let store = &self.store;
        self.state.load("list alerts", || list_as(store, &query));
    }

    /// Moves the alert to the action's target status regardless of its current status.
    pub fn apply_action(&mut self, alert_id: &str, action: AlertAction) {
        let status = action.target_status();
        let (store, clock) = (&self.store, &self.clock);
        let written = self.state.write("update alert status", || {
            let fields = status_change(status.as_str(), clock.now_utc())?;
            store.update(Collection::Alerts, alert_id, fields)
        });
        if written {
            debug!(alert_id, status = status.as_str(), "alert status updated");
            self.reload();
        }
    }
}
