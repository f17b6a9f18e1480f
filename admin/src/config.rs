//! Runtime configuration.
//!
//! Values come from `TRASHCLEAN_*` environment variables layered over
//! built-in defaults. CLI flags override both (see `main.rs`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://planet-protector-dba76d4b6b9b.herokuapp.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "abdi123";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ENV_PREFIX: &str = "TRASHCLEAN";

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub api_base: String,
    pub admin_password: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub session_dir: PathBuf,
}

impl AdminConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(None)
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_env(Some(vars))
    }

    fn from_env(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let session_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trashclean");

        Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("admin_password", DEFAULT_ADMIN_PASSWORD)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("page_size", u64::from(trashclean_core::types::DEFAULT_PAGE_SIZE))?
            .set_default("session_dir", session_dir.to_string_lossy().into_owned())?
            .add_source(Environment::with_prefix(ENV_PREFIX).source(vars))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
