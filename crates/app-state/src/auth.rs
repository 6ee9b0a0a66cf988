//! Admin auth session state
//!
//! Session-scoped flag gating the admin console (products, promotions,
//! themes). Credential checking is delegated to the configured admin
//! credentials; there is no token handling here.

use parking_lot::RwLock;

use store_client::Credentials;

/// Session-scoped authentication state
pub struct AuthState {
    credentials: Credentials,
    authenticated: RwLock<bool>,
}

impl AuthState {
    /// Create an unauthenticated session over the configured credentials
    pub fn new(credentials: Credentials) -> Self {
        AuthState {
            credentials,
            authenticated: RwLock::new(false),
        }
    }

    /// Attempt a login; returns whether the session is now authenticated
    pub fn login(&self, email: &str, password: &str) -> bool {
        let ok = self.credentials.verify(email, password);
        *self.authenticated.write() = ok;

        if ok {
            tracing::info!(email, "Admin session authenticated");
        } else {
            tracing::warn!(email, "Failed admin login attempt");
        }
        ok
    }

    /// End the session
    pub fn logout(&self) {
        *self.authenticated.write() = false;
        tracing::info!("Admin session ended");
    }

    /// Whether the session is authenticated
    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AuthState {
        AuthState::new(Credentials::new("admin@example.com", "hunter2"))
    }

    #[test]
    fn test_login_success() {
        let auth = state();
        assert!(!auth.is_authenticated());

        assert!(auth.login("admin@example.com", "hunter2"));
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_login_failure_clears_session() {
        let auth = state();

        auth.login("admin@example.com", "hunter2");
        assert!(auth.is_authenticated());

        // A failed re-login drops the session rather than keeping it
        assert!(!auth.login("admin@example.com", "wrong"));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_logout() {
        let auth = state();
        auth.login("admin@example.com", "hunter2");
        auth.logout();
        assert!(!auth.is_authenticated());
    }
}
