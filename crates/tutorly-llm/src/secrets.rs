//! Safebox - API keys from `SECRET_*` environment variables
//!
//! Every variable named `SECRET_<NAME>` becomes an entry `<name>` (lower
//! case). Values are held as [`SecretString`] and never logged.

use crate::error::{Error, Result};
use crate::provider::Provider;
use secrecy::SecretString;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use tracing::{debug, info};

/// Prefix marking an environment variable as a secret
pub const SECRET_PREFIX: &str = "SECRET_";

/// Named secrets collected from the environment
#[derive(Default)]
pub struct Safebox {
    secrets: BTreeMap<String, SecretString>,
}

impl fmt::Debug for Safebox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Safebox")
            .field("names", &self.names())
            .finish()
    }
}

impl Safebox {
    /// Load `.env` (current directory or a parent), then collect secrets
    /// from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) => debug!(error = %e, "No .env loaded"),
        }
        Self::from_process_env()
    }

    /// Collect secrets from the process environment as it is
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        Self::from_vars(vars.into_iter().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Collect secrets from explicit `(key, value)` pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut secrets = BTreeMap::new();
        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(SECRET_PREFIX) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            info!("Using {} from safebox...", name);
            secrets.insert(name.to_lowercase(), SecretString::from(value.into()));
        }
        Self { secrets }
    }

    /// Secret by lower-case name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SecretString> {
        self.secrets.get(&name.to_lowercase())
    }

    /// Secret by name, or `MissingSecret`
    ///
    /// # Errors
    /// Returns `MissingSecret` naming the expected environment variable
    pub fn require(&self, name: &str) -> Result<SecretString> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::MissingSecret(format!("{SECRET_PREFIX}{}", name.to_uppercase())))
    }

    /// API key for a provider
    ///
    /// # Errors
    /// Returns `MissingSecret` if the provider's key is absent
    pub fn api_key(&self, provider: Provider) -> Result<SecretString> {
        self.require(provider.secret_name())
    }

    /// Names of the stored secrets
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.secrets.keys().map(String::as_str).collect()
    }
}
