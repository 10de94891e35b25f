mod common;

use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;
use time::macros::datetime;
use time::Duration;

use xdr_core::clock::FixedClock;
use xdr_core::domain::{AlertStatus, Severity};
use xdr_core::filter::AlertFilter;
use xdr_core::store::{Collection, EqFilter};
use xdr_core::transitions::AlertAction;
use xdr_core::views::AlertsView;

use common::{insert_alert, recording_store};

fn clock() -> Rc<FixedClock> {
    Rc::new(FixedClock::new(datetime!(2026-02-01 09:00:00 UTC)))
}

#[test]
fn view_starts_loading_until_first_list() {
    let store = recording_store("analyst");
    let mut view = AlertsView::new(store.clone(), clock());
    assert!(view.is_loading());
    assert_eq!(store.list_count(), 0);

    view.reload();
    assert!(!view.is_loading());
    assert!(view.alerts().is_empty());
    assert_eq!(store.list_count(), 1);
}

#[test]
fn filters_map_to_single_field_predicates() {
    let store = recording_store("analyst");
    insert_alert(&store, "critical", "new", 1);
    insert_alert(&store, "critical", "confirmed", 2);
    insert_alert(&store, "high", "new", 3);
    insert_alert(&store, "low", "resolved", 4);

    let mut view = AlertsView::new(store.clone(), clock());
    view.reload();
    let hours: Vec<&str> = view.alerts().iter().map(|a| a.rule_name.as_str()).collect();
    assert_eq!(hours, vec!["rule-4", "rule-3", "rule-2", "rule-1"]);
    assert_eq!(store.last_list().unwrap().filter, None);

    view.set_filter(AlertFilter::New);
    assert_eq!(
        store.last_list().unwrap().filter,
        Some(EqFilter::new("status", "new"))
    );
    assert_eq!(view.alerts().len(), 2);
    assert!(view.alerts().iter().all(|a| a.status == AlertStatus::New));

    view.set_filter(AlertFilter::Critical);
    assert_eq!(
        store.last_list().unwrap().filter,
        Some(EqFilter::new("severity", "critical"))
    );
    // Critical includes alerts of any status.
    assert_eq!(view.alerts().len(), 2);
    assert!(view.alerts().iter().all(|a| a.severity == Severity::Critical));

    view.set_filter(AlertFilter::All);
    assert_eq!(view.alerts().len(), 4);
}

#[test]
fn every_filter_change_is_a_round_trip() {
    let store = recording_store("analyst");
    let mut view = AlertsView::new(store.clone(), clock());
    view.set_filter(AlertFilter::New);
    view.set_filter(AlertFilter::New);
    view.set_filter(AlertFilter::All);
    assert_eq!(store.list_count(), 3);
}

#[test]
fn status_action_stamps_update_time_and_relists_once() {
    let store = recording_store("analyst");
    let id = insert_alert(&store, "high", "new", 1);
    let clock = clock();
    let mut view = AlertsView::new(store.clone(), clock.clone());
    view.set_filter(AlertFilter::New);

    clock.advance(Duration::minutes(30));
    store.reset();
    view.apply_action(&id, AlertAction::Investigate);

    assert_eq!(store.writes.get(), 1);
    assert_eq!(store.list_count(), 1);
    let relist = store.last_list().unwrap();
    assert_eq!(relist.collection, Collection::Alerts);
    assert_eq!(relist.filter, Some(EqFilter::new("status", "new")));

    // The alert left the `new` filter after the reload.
    assert!(view.alerts().is_empty());
    view.set_filter(AlertFilter::All);
    let alert = &view.alerts()[0];
    assert_eq!(alert.status, AlertStatus::Investigating);
    assert_eq!(alert.updated_at, "2026-02-01T09:30:00.000000Z");
}

#[test]
fn any_action_applies_from_any_status() {
    let store = recording_store("analyst");
    let id = insert_alert(&store, "medium", "resolved", 1);
    let mut view = AlertsView::new(store.clone(), clock());
    view.reload();

    for action in [
        AlertAction::MarkFalsePositive,
        AlertAction::Confirm,
        AlertAction::Investigate,
        AlertAction::Confirm,
    ] {
        view.apply_action(&id, action);
        assert_eq!(view.alerts()[0].status, action.target_status());
    }
}

#[test]
fn failed_list_keeps_previous_alerts_and_clears_loading() {
    let store = recording_store("analyst");
    insert_alert(&store, "critical", "new", 1);
    let mut view = AlertsView::new(store.clone(), clock());
    view.reload();
    assert_eq!(view.alerts().len(), 1);

    store.fail_lists.set(true);
    view.set_filter(AlertFilter::Critical);
    assert!(!view.is_loading());
    assert_eq!(view.alerts().len(), 1);
    assert_eq!(view.filter(), AlertFilter::Critical);
    assert_eq!(view.last_error().unwrap().code, "STORE_UNAVAILABLE");

    store.fail_lists.set(false);
    view.reload();
    assert!(view.last_error().is_none());
}

#[test]
fn failed_update_skips_the_reload() {
    let store = recording_store("analyst");
    let id = insert_alert(&store, "critical", "new", 1);
    let mut view = AlertsView::new(store.clone(), clock());
    view.reload();

    store.reset();
    store.fail_writes.set(true);
    view.apply_action(&id, AlertAction::Confirm);
    assert_eq!(store.list_count(), 0);
    assert_eq!(view.alerts()[0].status, AlertStatus::New);
    assert_eq!(view.last_error().unwrap().code, "STORE_UNAVAILABLE");
}

#[test]
fn unknown_alert_id_is_logged_not_raised() {
    let store = recording_store("analyst");
    insert_alert(&store, "low", "new", 1);
    let mut view = AlertsView::new(store.clone(), clock());
    view.reload();

    view.apply_action("does-not-exist", AlertAction::Confirm);
    assert_eq!(view.last_error().unwrap().code, "STORE_NOT_FOUND");
    assert_eq!(view.alerts().len(), 1);
    assert_eq!(
        serde_json::to_value(view.alerts()[0].status).unwrap(),
        json!("new")
    );
}
