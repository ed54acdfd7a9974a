//! Storefront event store: `EventLog` adapters.
//!
//! `PgEventLog` persists to `PostgreSQL`; `InMemoryEventLog` keeps records in
//! process memory. `EventLogSettings` picks one from a connection string.

pub mod config;
pub mod memory;
pub mod pg_event_log;
pub mod schema;

pub use config::EventLogSettings;
pub use memory::InMemoryEventLog;
pub use pg_event_log::PgEventLog;
