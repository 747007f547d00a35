use std::env;

/// Configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Path to the SQLite results database
    pub db_path: String,

    /// Location used when a request names none
    pub default_location: String,

    pub rust_log: Option<String>,
}

impl AppConfig {
    pub const DEFAULT_DB_PATH: &'static str = "data/verst.db";
    pub const DEFAULT_LOCATION: &'static str = "korolev";

    /// Load configuration from environment variables (after `.env`)
    ///
    /// Environment variables:
    /// - `VERST_DB_PATH` (default: data/verst.db)
    /// - `VERST_DEFAULT_LOCATION` (default: korolev)
    /// - `RUST_LOG` (optional)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values fall back to defaults
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            db_path: non_empty("VERST_DB_PATH")
                .unwrap_or_else(|| Self::DEFAULT_DB_PATH.to_string()),
            default_location: non_empty("VERST_DEFAULT_LOCATION")
                .unwrap_or_else(|| Self::DEFAULT_LOCATION.to_string()),
            rust_log: non_empty("RUST_LOG"),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}
