//! Credential boundary.
//!
//! Token acquisition and refresh belong to the sign-in flow, not to playback.
//! The resolver only needs to know whether a usable token exists, and to
//! report rejected calls so the gateway can refresh.

use std::sync::Mutex;

pub trait AuthGateway: Send + Sync {
    /// Current bearer token, if signed in.
    fn access_token(&self) -> Option<String>;

    /// Called after a collaborator rejected our credentials.
    ///
    /// Returns a fresh token, or `None` when the session is over.
    fn on_unauthorized(&self) -> Option<String>;
}

/// A token supplied up front (config or environment). It cannot refresh, so a
/// rejection clears it and later resolutions fail fast as unauthenticated.
pub struct StaticToken {
    token: Mutex<Option<String>>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self {
            token: Mutex::new(token),
        }
    }
}

impl AuthGateway for StaticToken {
    fn access_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn on_unauthorized(&self) -> Option<String> {
        tracing::warn!("access token rejected; signing out");
        if let Ok(mut t) = self.token.lock() {
            *t = None;
        }
        None
    }
}
