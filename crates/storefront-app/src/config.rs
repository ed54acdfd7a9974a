//! Process configuration read from the environment.

use storefront_event_store::EventLogSettings;

use crate::error::AppError;

/// Connection string of the event log.
pub const EVENT_LOG_URL: &str = "EVENT_LOG_URL";
/// Optional pool size override.
pub const EVENT_LOG_MAX_CONNECTIONS: &str = "EVENT_LOG_MAX_CONNECTIONS";

/// Settings the process needs before it can touch the event log.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Where the event log lives.
    pub event_log: EventLogSettings,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let url = lookup(EVENT_LOG_URL)
            .ok_or_else(|| AppError::Config(format!("{EVENT_LOG_URL} must be set")))?;
        let mut event_log = EventLogSettings::parse(&url)
            .map_err(|e| AppError::Config(format!("{EVENT_LOG_URL}: {e}")))?;

        if let Some(raw) = lookup(EVENT_LOG_MAX_CONNECTIONS) {
            let max_connections: u32 = raw.trim().parse().map_err(|e| {
                AppError::Config(format!("{EVENT_LOG_MAX_CONNECTIONS} must be a valid u32: {e}"))
            })?;
            if max_connections == 0 {
                return Err(AppError::Config(format!(
                    "{EVENT_LOG_MAX_CONNECTIONS} must be at least 1"
                )));
            }
            event_log = event_log.with_max_connections(max_connections);
        }

        Ok(Self { event_log })
    }
}
