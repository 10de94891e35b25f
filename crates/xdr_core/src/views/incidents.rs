use std::rc::Rc;

use tracing::debug;

use super::ListState;
use crate::clock::Clock;
use crate::domain::{Incident, IncidentStatus};
use crate::error::AppError;
use crate::filter::{IncidentFilter, ViewFilter};
use crate::forms::IncidentForm;
use crate::store::{list_as, Collection, EntityStore};
use crate::transitions::status_change;

pub struct IncidentsView<S> {
    store: S,
    clock: Rc<dyn Clock>,
    filter: IncidentFilter,
    state: ListState<Incident>,
    form: IncidentForm,
    form_open: bool,
}

impl<S: EntityStore> IncidentsView<S> {
    pub fn new(store: S, clock: Rc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            filter: IncidentFilter::default(),
            state: ListState::new(),
            form: IncidentForm::default(),
            form_open: false,
        }
    }

    pub fn filter(&self) -> IncidentFilter {
        self.filter
    }

    pub fn incidents(&self) -> &[Incident] {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.state.last_error()
    }

    pub fn set_filter(&mut self, filter: IncidentFilter) {
        debug!(filter = filter.label(), "incidents filter changed");
        self.filter = filter;
        self.reload();
    }

    pub fn reload(&mut self) {
        let query = self.filter.query();
        let store = &self.store;
        self.state.load("list incidents", || list_as(store, &query));
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn toggle_form(&mut self) {
        self.form_open = !self.form_open;
    }

    /// Hides the form; typed values are kept for the next time it opens.
    pub fn cancel_form(&mut self) {
        self.form_open = false;
    }

    pub fn form(&self) -> &IncidentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut IncidentForm {
        &mut self.form
    }

    /// Submits the form. An empty title does nothing; a failed insert keeps the form as is.
    pub fn create(&mut self) {
        let Some(record) = self.form.to_record() else {
            debug!("incident form has no title; nothing submitted");
            return;
        };
        let store = &self.store;
        let created = self.state.write("create incident", || {
            store.insert(Collection::Incidents, record).map(|_| ())
        });
        if created {
            self.form = IncidentForm::default();
            self.form_open = false;
            self.reload();
        }
    }

    /// Any status may be selected from any other.
    pub fn set_status(&mut self, incident_id: &str, status: IncidentStatus) {
        let (store, clock) = (&self.store, &self.clock);
        let written = self.state.write("update incident status", || {
            let fields = status_change(status.as_str(), clock.now_utc())?;
            store.update(Collection::Incidents, incident_id, fields)
        });
        if written {
            debug!(incident_id, status = status.as_str(), "incident status updated");
            self.reload();
        }
    }
}
