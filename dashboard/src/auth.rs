//! Authentication collaborator and the session handed to the dashboard.
//!
//! The protocol itself lives in the external auth service. The shell only needs to know
//! whether a user is signed in, who it is, and how to sign out.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::info;
use xdr_core::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The auth service has not answered yet.
    Loading,
    SignedOut,
    SignedIn(User),
}

pub trait AuthProvider {
    fn state(&self) -> AuthState;

    fn sign_out(&self) -> Result<(), AppError>;
}

/// Current user plus the capability to end the session.
#[derive(Clone)]
pub struct Session {
    user: User,
    auth: Rc<dyn AuthProvider>,
}

impl Session {
    pub fn new(user: User, auth: Rc<dyn AuthProvider>) -> Self {
        Self { user, auth }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn sign_out(&self) -> Result<(), AppError> {
        self.auth.sign_out()?;
        info!(user_id = %self.user.id, "signed out");
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("user", &self.user).finish()
    }
}

/// What the shell shows for the current auth state.
#[derive(Debug, Clone)]
pub enum Gate {
    Loading,
    SignIn,
    Dashboard(Session),
}

impl Gate {
    pub fn evaluate(auth: &Rc<dyn AuthProvider>) -> Gate {
        match auth.state() {
            AuthState::Loading => Gate::Loading,
            AuthState::SignedOut => Gate::SignIn,
            AuthState::SignedIn(user) => Gate::Dashboard(Session::new(user, Rc::clone(auth))),
        }
    }
}

/// In-process auth state for local workspaces and tests.
#[derive(Debug)]
pub struct LocalAuthProvider {
    state: RefCell<AuthState>,
}

impl LocalAuthProvider {
    pub fn new(state: AuthState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn signed_in(user: User) -> Self {
        Self::new(AuthState::SignedIn(user))
    }

    pub fn set_state(&self, state: AuthState) {
        *self.state.borrow_mut() = state;
    }
}

impl AuthProvider for LocalAuthProvider {
    fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    fn sign_out(&self) -> Result<(), AppError> {
        let mut state = self.state.borrow_mut();
        if !matches!(*state, AuthState::SignedIn(_)) {
            return Err(AppError::new("AUTH_NOT_SIGNED_IN", "No active session to sign out"));
        }
        *state = AuthState::SignedOut;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyst() -> User {
        User {
            id: "u-1".to_string(),
            email: Some("analyst@example.com".to_string()),
        }
    }

    #[test]
    fn gate_follows_auth_state() {
        let local = Rc::new(LocalAuthProvider::new(AuthState::Loading));
        let auth: Rc<dyn AuthProvider> = local.clone();
        assert!(matches!(Gate::evaluate(&auth), Gate::Loading));

        local.set_state(AuthState::SignedOut);
        assert!(matches!(Gate::evaluate(&auth), Gate::SignIn));

        local.set_state(AuthState::SignedIn(analyst()));
        match Gate::evaluate(&auth) {
            Gate::Dashboard(session) => assert_eq!(session.user(), &analyst()),
            other => panic!("expected dashboard, got {other:?}"),
        }
    }

    #[test]
    fn session_sign_out_ends_the_session_once() {
        let auth: Rc<dyn AuthProvider> = Rc::new(LocalAuthProvider::signed_in(analyst()));
        let session = Session::new(analyst(), auth.clone());

        session.sign_out().expect("sign out");
        assert_eq!(auth.state(), AuthState::SignedOut);
        assert_eq!(session.sign_out().unwrap_err().code, "AUTH_NOT_SIGNED_IN");
    }
}
