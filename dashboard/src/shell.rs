use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use xdr_core::clock::Clock;
use xdr_core::error::AppError;
use xdr_core::store::{EntityStore, SqliteStore};
use xdr_core::views::{AlertsView, IncidentsView, OverviewView, RulesView};
use xdr_core::workspace::open_workspace_store;

use crate::auth::Session;
use crate::config::DashboardConfig;

/// In-memory view selector. There is no URL routing and nothing persists across restarts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    Overview,
    Alerts,
    Incidents,
    Rules,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Overview,
        ViewKind::Alerts,
        ViewKind::Incidents,
        ViewKind::Rules,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Overview => "Overview",
            ViewKind::Alerts => "Alerts",
            ViewKind::Incidents => "Incidents",
            ViewKind::Rules => "Detection Rules",
        }
    }
}

/// Signed-in dashboard: the session plus one controller per view.
///
/// The overview is fetched once, when the dashboard is built. Alerts, incidents and rules are
/// rebuilt each time they are selected, so they come back with the `all` filter, an empty
/// closed form and a fresh list. Views never share results and can briefly disagree.
pub struct Dashboard<S> {
    session: Session,
    store: S,
    clock: Rc<dyn Clock>,
    active: ViewKind,
    overview: OverviewView<S>,
    alerts: AlertsView<S>,
    incidents: IncidentsView<S>,
    rules: RulesView<S>,
}

impl<S: EntityStore + Clone> Dashboard<S> {
    /// Builds the views, loads the overview and then `config.default_view`.
    pub fn new(
        session: Session,
        store: S,
        clock: Rc<dyn Clock>,
        config: &DashboardConfig,
    ) -> Self {
        let mut dashboard = Self {
            session,
            active: config.default_view,
            overview: OverviewView::new(store.clone(), config.overview_window),
            alerts: AlertsView::new(store.clone(), Rc::clone(&clock)),
            incidents: IncidentsView::new(store.clone(), Rc::clone(&clock)),
            rules: RulesView::new(store.clone(), Rc::clone(&clock)),
            store,
            clock,
        };
        dashboard.overview.reload();
        dashboard.enter(config.default_view);
        dashboard
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn active_view(&self) -> ViewKind {
        self.active
    }

    pub fn select(&mut self, view: ViewKind) {
        info!(view = view.title(), "switching view");
        self.active = view;
        self.enter(view);
    }

    fn enter(&mut self, view: ViewKind) {
        let (store, clock) = (self.store.clone(), Rc::clone(&self.clock));
        match view {
            ViewKind::Overview => {}
            ViewKind::Alerts => {
                self.alerts = AlertsView::new(store, clock);
                self.alerts.reload();
            }
            ViewKind::Incidents => {
                self.incidents = IncidentsView::new(store, clock);
                self.incidents.reload();
            }
            ViewKind::Rules => {
                self.rules = RulesView::new(store, clock);
                self.rules.reload();
            }
        }
    }

    pub fn overview(&self) -> &OverviewView<S> {
        &self.overview
    }

    pub fn alerts(&self) -> &AlertsView<S> {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut AlertsView<S> {
        &mut self.alerts
    }

    pub fn incidents(&self) -> &IncidentsView<S> {
        &self.incidents
    }

    pub fn incidents_mut(&mut self) -> &mut IncidentsView<S> {
        &mut self.incidents
    }

    pub fn rules(&self) -> &RulesView<S> {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RulesView<S> {
        &mut self.rules
    }

    /// Ends the session. Failures are logged; the dashboard stays as it was.
    pub fn sign_out(&self) {
        if let Err(err) = self.session.sign_out() {
            error!(
                code = %err.code,
                details = err.details.as_deref().unwrap_or(""),
                "sign out failed: {}",
                err.message
            );
        }
    }
}

/// Opens the configured workspace scoped to the session's user and builds the dashboard.
pub fn open_dashboard(
    session: Session,
    config: &DashboardConfig,
    clock: Rc<dyn Clock>,
) -> Result<Dashboard<Rc<SqliteStore>>, AppError> {
    let store = open_workspace_store(&config.db_path, &session.user().id)?;
    info!(
        path = %config.db_path.display(),
        user_id = %session.user().id,
        "dashboard opened"
    );
    Ok(Dashboard::new(session, Rc::new(store), clock, config))
}
