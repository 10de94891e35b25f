//! Application shell for the XDR triage dashboard: auth gating, the session context, the
//! view selector, configuration and logging. Triage logic lives in `xdr_core`.

pub mod auth;
pub mod config;
pub mod logging;
pub mod shell;

use std::path::Path;
use std::rc::Rc;

use tracing::info;
use xdr_core::clock::Clock;
use xdr_core::error::AppError;
use xdr_core::store::SqliteStore;

pub use auth::{AuthProvider, AuthState, Gate, LocalAuthProvider, Session, User};
pub use config::{DashboardConfig, LoggingConfig};
pub use logging::init_logging;
pub use shell::{open_dashboard, Dashboard, ViewKind};

/// What the shell shows once startup has finished.
pub enum Screen {
    Loading,
    SignIn,
    Dashboard(Dashboard<Rc<SqliteStore>>),
}

/// Startup: config file (or defaults) with environment overrides, logging, the auth gate and,
/// for a signed-in user, the dashboard over the configured workspace.
pub fn run(
    config_path: Option<&Path>,
    auth: Rc<dyn AuthProvider>,
    clock: Rc<dyn Clock>,
) -> Result<Screen, AppError> {
    let config = match config_path {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    }
    .with_env_overrides()?;
    init_logging(&config.logging)?;
    info!(db_path = %config.db_path.display(), "starting dashboard");

    match Gate::evaluate(&auth) {
        Gate::Loading => Ok(Screen::Loading),
        Gate::SignIn => Ok(Screen::SignIn),
        Gate::Dashboard(session) => open_dashboard(session, &config, clock).map(Screen::Dashboard),
    }
}
