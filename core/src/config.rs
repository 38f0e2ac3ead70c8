//! Client configuration loaded from a TOML file and the environment.
//!
//! Environment variables use the `MITE_` prefix and win over the file:
//!
//! ```toml
//! realm = "acme"          # MITE_REALM
//! apikey = "0123abcd"     # MITE_APIKEY
//! timeout_secs = 30       # MITE_TIMEOUT_SECS, optional
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::MiteError;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub realm: String,
    pub apikey: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("realm", &self.realm)
            .field("apikey", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// The provider chain: the optional TOML file, then `MITE_*` variables.
    ///
    /// `MITE_REALM` and `MITE_APIKEY` are taken verbatim. `Env` would parse
    /// `0123` as an integer and drop the leading zero.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("MITE_").only(&["timeout_secs"]));
        for (key, var) in [("realm", "MITE_REALM"), ("apikey", "MITE_APIKEY")] {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        figment
    }

    pub fn load(path: Option<&Path>) -> Result<Self, MiteError> {
        let config: Config = Self::figment(path)
            .extract()
            .map_err(|e| MiteError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MiteError> {
        if self.realm.trim().is_empty() {
            return Err(MiteError::Config("realm cannot be empty".to_string()));
        }
        if self.apikey.trim().is_empty() {
            return Err(MiteError::Config("apikey cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
