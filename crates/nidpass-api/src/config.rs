//! Environment-driven configuration.

/// Runtime configuration, collected from the environment once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind: String,
    /// Salt mixed into national-ID hashes. Must be stable for the lifetime
    /// of a deployment — changing it orphans every enrolled citizen.
    pub nid_salt: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            nid_salt: "nidpass-dev-salt".to_string(),
        }
    }
}

impl ApiConfig {
    /// Read configuration from the environment.
    ///
    /// - `NIDPASS_BIND` — bind address (default `0.0.0.0:8080`)
    /// - `NIDPASS_NID_SALT` — NID hash salt; a default is used when unset,
    ///   with a warning, because the default is only fit for development.
    ///
    /// `DATABASE_URL` is read separately by [`crate::db::init_pool`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bind = std::env::var("NIDPASS_BIND").unwrap_or(defaults.bind);
        let nid_salt = match std::env::var("NIDPASS_NID_SALT") {
            Ok(salt) if !salt.is_empty() => salt,
            _ => {
                tracing::warn!(
                    "NIDPASS_NID_SALT not set — using the development salt. \
                     Do not run a real enrollment boundary this way."
                );
                defaults.nid_salt
            }
        };
        Self { bind, nid_salt }
    }
}
