//! Admin credential checking
//!
//! Authentication proper is delegated to the hosted backend; the admin
//! console only needs a local check of the configured administrator
//! credentials before exposing admin-only surfaces.

use crate::ConfigError;

/// Configured administrator credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create credentials directly (tests, embedded config)
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Load credentials from `ADMIN_EMAIL` and `ADMIN_PASSWORD`
    pub fn from_env() -> Result<Self, ConfigError> {
        let email =
            std::env::var("ADMIN_EMAIL").map_err(|_| ConfigError::MissingVar("ADMIN_EMAIL"))?;
        let password = std::env::var("ADMIN_PASSWORD")
            .map_err(|_| ConfigError::MissingVar("ADMIN_PASSWORD"))?;

        if email.trim().is_empty() {
            return Err(ConfigError::MissingVar("ADMIN_EMAIL"));
        }
        if password.is_empty() {
            return Err(ConfigError::MissingVar("ADMIN_PASSWORD"));
        }

        Ok(Self { email, password })
    }

    /// Check a login attempt against the configured credentials
    pub fn verify(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    /// The configured admin email
    pub fn email(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_exact_match() {
        let creds = Credentials::new("admin@example.com", "hunter2");
        assert!(creds.verify("admin@example.com", "hunter2"));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let creds = Credentials::new("admin@example.com", "hunter2");
        assert!(!creds.verify("admin@example.com", "wrong"));
        assert!(!creds.verify("other@example.com", "hunter2"));
        assert!(!creds.verify("", ""));
    }
}
