use std::rc::Rc;

use tracing::{debug, warn};

use super::ListState;
use crate::clock::Clock;
use crate::domain::DetectionRule;
use crate::error::AppError;
use crate::filter::{RuleFilter, ViewFilter};
use crate::forms::RuleForm;
use crate::store::{list_as, Collection, EntityStore};
use crate::transitions::{status_change, toggled_rule_status};

pub struct RulesView<S> {
    store: S,
    clock: Rc<dyn Clock>,
    filter: RuleFilter,
    state: ListState<DetectionRule>,
    form: RuleForm,
    form_open: bool,
}

impl<S: EntityStore> RulesView<S> {
    pub fn new(store: S, clock: Rc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            filter: RuleFilter::default(),
            state: ListState::new(),
            form: RuleForm::default(),
            form_open: false,
        }
    }

    pub fn filter(&self) -> RuleFilter {
        self.filter
    }

    pub fn rules(&self) -> &[DetectionRule] {
        self.state.items()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.state.last_error()
    }

    pub fn set_filter(&mut self, filter: RuleFilter) {
        debug!(filter = filter.label(), "rules filter changed");
        self.filter = filter;
        self.reload();
    }

    pub fn reload(&mut self) {
        let query = self.filter.query();
        let store = &self.store;
        self.state.load("list rules", || list_as(store, &query));
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn toggle_form(&mut self) {
        self.form_open = !self.form_open;
    }

    pub fn cancel_form(&mut self) {
        self.form_open = false;
    }

    pub fn form(&self) -> &RuleForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RuleForm {
        &mut self.form
    }

    pub fn create(&mut self) {
        let Some(record) = self.form.to_record() else {
            debug!("rule form has no title; nothing submitted");
            return;
        };
        let store = &self.store;
        let created = self.state.write("create rule", || {
            store
                .insert(Collection::DetectionRules, record)
                .map(|_| ())
        });
        if created {
            self.form = RuleForm::default();
            self.form_open = false;
            self.reload();
        }
    }

    /// Flips the listed rule between `active` and `disabled`, based on the status shown in
    /// the current list.
    pub fn toggle_status(&mut self, rule_id: &str) {
        let Some(current) = self
            .state
            .items()
            .iter()
            .find(|r| r.id == rule_id)
            .map(|r| r.status)
        else {
            warn!(rule_id, "toggle requested for a rule that is not listed");
            return;
        };

        let next = toggled_rule_status(current);
        let (store, clock) = (&self.store, &self.clock);
        let written = self.state.write("toggle rule status", || {
            let fields = status_change(next.as_str(), clock.now_utc())?;
            store.update(Collection::DetectionRules, rule_id, fields)
        });
        if written {
            debug!(rule_id, from = current.as_str(), to = next.as_str(), "rule toggled");
            self.reload();
        }
    }

    /// Hard-deletes the rule once `confirm` agrees. Declining leaves everything untouched.
    pub fn delete(&mut self, rule_id: &str, confirm: impl FnOnce() -> bool) {
        if !confirm() {
            debug!(rule_id, "rule deletion declined");
            return;
        }
        let store = &self.store;
        let deleted = self.state.write("delete rule", || {
            store.delete(Collection::DetectionRules, rule_id)
        });
        if deleted {
            debug!(rule_id, "rule deleted");
            self.reload();
        }
    }
}
