//! `PostgreSQL` implementation of the `EventLog` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use storefront_core::codec::{self, RecordedEvent};
use storefront_core::error::DomainError;
use storefront_core::event::DomainEvent;
use storefront_core::event_log::EventLog;

use crate::schema::CREATE_EVENT_LOG_TABLE;

/// PostgreSQL-backed event log.
///
/// Records live in one `event_log` table. `global_position` orders the global
/// feed and `(stream_id, revision)` is unique, so two writers racing for the
/// same revision cannot both succeed.
#[derive(Debug, Clone)]
pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    /// Creates a new `PgEventLog`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the event log table and indexes if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(CREATE_EVENT_LOG_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }

    async fn read(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        what: &str,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::warn!(read = what, error = %e, "event log read failed");
            infrastructure(e)
        })?;

        let records = rows
            .iter()
            .map(to_recorded_event)
            .collect::<Result<Vec<_>, _>>()?;
        codec::decode_feed(&records)
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn to_recorded_event(row: &PgRow) -> Result<RecordedEvent, DomainError> {
    Ok(RecordedEvent {
        stream_id: row.try_get("stream_id").map_err(infrastructure)?,
        revision: row.try_get("revision").map_err(infrastructure)?,
        event_type: row.try_get("event_type").map_err(infrastructure)?,
        body: row.try_get("body").map_err(infrastructure)?,
    })
}

#[async_trait]
impl EventLog for PgEventLog {
    async fn append_to_stream(
        &self,
        stream_id: &str,
        event: &DomainEvent,
    ) -> Result<String, DomainError> {
        let encoded = codec::encode(event)?;

        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        let revision: i64 = sqlx::query_scalar(
            r"
            SELECT COALESCE(MAX(revision) + 1, 0)
            FROM event_log
            WHERE stream_id = $1
            ",
        )
        .bind(stream_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(infrastructure)?;

        let inserted = sqlx::query(
            r"
            INSERT INTO event_log (stream_id, revision, event_type, body)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(stream_id)
        .bind(revision)
        .bind(&encoded.event_type)
        .bind(&encoded.body)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(DomainError::ConcurrencyConflict {
                    stream_id: stream_id.to_owned(),
                    revision,
                });
            }
            Err(e) => return Err(infrastructure(e)),
        }

        tx.commit().await.map_err(infrastructure)?;

        tracing::debug!(
            stream_id,
            revision,
            event_type = %encoded.event_type,
            "appended event"
        );
        Ok(stream_id.to_owned())
    }

    async fn get_stream(&self, stream_id: &str) -> Result<Vec<DomainEvent>, DomainError> {
        let query = sqlx::query(
            r"
            SELECT stream_id, revision, event_type, body
            FROM event_log
            WHERE stream_id = $1
            ORDER BY revision ASC
            ",
        )
        .bind(stream_id);
        self.read(query, "stream").await
    }

    async fn get_stream_at(
        &self,
        stream_id: &str,
        revision: i64,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let query = sqlx::query(
            r"
            SELECT stream_id, revision, event_type, body
            FROM event_log
            WHERE stream_id = $1 AND revision <= $2
            ORDER BY revision ASC
            ",
        )
        .bind(stream_id)
        .bind(revision);
        self.read(query, "bounded stream").await
    }

    async fn get_all_stream(&self) -> Result<Vec<DomainEvent>, DomainError> {
        let query = sqlx::query(
            r"
            SELECT stream_id, revision, event_type, body
            FROM event_log
            WHERE event_type NOT LIKE '$%'
            ORDER BY global_position ASC
            ",
        );
        self.read(query, "global feed").await
    }
}
