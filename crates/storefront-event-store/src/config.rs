//! Event log connection settings.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use storefront_core::error::DomainError;
use storefront_core::event_log::EventLog;

use crate::memory::InMemoryEventLog;
use crate::pg_event_log::PgEventLog;

/// Default size of the `PostgreSQL` connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const MEMORY_SCHEME: &str = "memory://";

/// Where the event log lives, parsed from a single connection string.
#[derive(Debug, Clone)]
pub enum EventLogSettings {
    /// A `PostgreSQL` database (`postgres://` or `postgresql://`).
    Postgres {
        /// Parsed connection options.
        options: PgConnectOptions,
        /// Pool size.
        max_connections: u32,
    },
    /// A process-local log (`memory://`). Nothing survives a restart.
    InMemory,
}

impl EventLogSettings {
    /// Parses a connection string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` for an empty, malformed, or
    /// unsupported connection string.
    pub fn parse(connection_string: &str) -> Result<Self, DomainError> {
        let connection_string = connection_string.trim();
        if connection_string.is_empty() {
            return Err(DomainError::Configuration(
                "event log connection string must not be empty".into(),
            ));
        }

        if connection_string == MEMORY_SCHEME {
            return Ok(Self::InMemory);
        }

        if connection_string.starts_with("postgres://")
            || connection_string.starts_with("postgresql://")
        {
            let options = PgConnectOptions::from_str(connection_string).map_err(|e| {
                DomainError::Configuration(format!("malformed event log connection string: {e}"))
            })?;
            return Ok(Self::Postgres {
                options,
                max_connections: DEFAULT_MAX_CONNECTIONS,
            });
        }

        Err(DomainError::Configuration(format!(
            "unsupported event log connection string scheme: {}",
            connection_string
                .split_once("://")
                .map_or(connection_string, |(scheme, _)| scheme)
        )))
    }

    /// Overrides the pool size. Has no effect on an in-memory log.
    #[must_use]
    pub fn with_max_connections(self, max_connections: u32) -> Self {
        match self {
            Self::Postgres { options, .. } => Self::Postgres {
                options,
                max_connections,
            },
            Self::InMemory => Self::InMemory,
        }
    }

    /// Connects to the configured log, creating the schema when needed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the database cannot be reached
    /// or the schema cannot be created.
    pub async fn connect(&self) -> Result<Arc<dyn EventLog>, DomainError> {
        match self {
            Self::Postgres {
                options,
                max_connections,
            } => {
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect_with(options.clone())
                    .await
                    .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
                let log = PgEventLog::new(pool);
                log.ensure_schema().await?;
                tracing::info!(
                    host = options.get_host(),
                    database = options.get_database(),
                    max_connections,
                    "connected to PostgreSQL event log"
                );
                Ok(Arc::new(log))
            }
            Self::InMemory => {
                tracing::warn!("using in-memory event log; events are lost on restart");
                Ok(Arc::new(InMemoryEventLog::new()))
            }
        }
    }
}
