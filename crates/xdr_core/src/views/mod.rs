//! View controllers for the four dashboard screens.
//!
//! Each controller owns its filter, its current result list and a loading flag, and nothing
//! else: there is no cache shared between views. Writes are followed by a full reload of the
//! same collection, never by patching the local list. Store failures are logged and
//! otherwise swallowed; the previous list stays on screen.

pub mod alerts;
pub mod incidents;
pub mod overview;
pub mod rules;

use tracing::error;

use crate::error::AppError;

pub use alerts::AlertsView;
pub use incidents::IncidentsView;
pub use overview::OverviewView;
pub use rules::RulesView;

#[derive(Debug)]
pub(crate) struct ListState<T> {
    items: Vec<T>,
    loading: bool,
    last_error: Option<AppError>,
}

impl<T> ListState<T> {
    /// Views start out loading until their first list completes.
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            last_error: None,
        }
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    pub(crate) fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub(crate) fn load(
        &mut self,
        op: &'static str,
        fetch: impl FnOnce() -> Result<Vec<T>, AppError>,
    ) {
        self.loading = true;
        match fetch() {
            Ok(items) => {
                self.items = items;
                self.last_error = None;
            }
            Err(err) => self.fail(op, err),
        }
        self.loading = false;
    }

    /// Runs a write; returns whether it succeeded.
    pub(crate) fn write(
        &mut self,
        op: &'static str,
        apply: impl FnOnce() -> Result<(), AppError>,
    ) -> bool {
        match apply() {
            Ok(()) => true,
            Err(err) => {
                self.fail(op, err);
                false
            }
        }
    }

    fn fail(&mut self, op: &'static str, err: AppError) {
        error!(
            op,
            code = %err.code,
            details = err.details.as_deref().unwrap_or(""),
            "{}",
            err.message
        );
        self.last_error = Some(err);
    }
}
