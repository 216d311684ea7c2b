use async_trait::async_trait;
use parking_lot::RwLock;
use railo_shared::Masked;
use std::future::Future;

use crate::CoreError;

/// Login state as the rest of the app sees it. Token storage and refresh
/// live behind this trait.
#[async_trait]
pub trait AuthSession: Send + Sync {
    /// Fast local check, no network
    fn is_authenticated(&self) -> bool;

    /// Full check, may refresh the token. Resolves to the settled login state.
    async fn initialize_auth(&self) -> Result<bool, CoreError>;

    fn remove_token(&self);

    /// Bearer token for outgoing calls, if logged in
    fn access_token(&self) -> Option<Masked<String>>;
}

/// Holds a fixed access token, e.g. one handed over through configuration.
#[derive(Debug, Default)]
pub struct StaticTokenAuth {
    token: RwLock<Option<Masked<String>>>,
}

impl StaticTokenAuth {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty()).map(Masked)),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn set_token(&self, token: String) {
        *self.token.write() = Some(Masked(token));
    }
}

#[async_trait]
impl AuthSession for StaticTokenAuth {
    fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    async fn initialize_auth(&self) -> Result<bool, CoreError> {
        Ok(self.is_authenticated())
    }

    fn remove_token(&self) {
        *self.token.write() = None;
    }

    fn access_token(&self) -> Option<Masked<String>> {
        self.token.read().clone()
    }
}

/// What a page requiring login should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// Not logged in on a page that requires it
    RedirectToLogin,
    /// Not logged in, page is public
    Anonymous,
}

pub fn check_access(auth: &dyn AuthSession, require_auth: bool) -> AccessDecision {
    match (auth.is_authenticated(), require_auth) {
        (true, _) => AccessDecision::Granted,
        (false, true) => AccessDecision::RedirectToLogin,
        (false, false) => AccessDecision::Anonymous,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    /// Whether the server acknowledged the logout
    pub remote_confirmed: bool,
}

/// Sign out remotely, then drop the local token whatever the server said.
pub async fn sign_out<F>(auth: &dyn AuthSession, remote_logout: F) -> LogoutOutcome
where
    F: Future<Output = Result<(), CoreError>>,
{
    let remote_confirmed = match remote_logout.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Remote logout failed, clearing local token anyway: {}", e);
            false
        }
    };

    auth.remove_token();
    tracing::info!(remote_confirmed, "Signed out");
    LogoutOutcome { remote_confirmed }
}
