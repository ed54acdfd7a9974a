//! Event log database schema.

/// SQL to create the event log table. Idempotent.
pub const CREATE_EVENT_LOG_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS event_log (
    global_position BIGSERIAL PRIMARY KEY,
    stream_id       TEXT NOT NULL,
    revision        BIGINT NOT NULL,
    event_type      VARCHAR(255) NOT NULL,
    body            JSONB NOT NULL,
    recorded_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (stream_id, revision)
);

CREATE INDEX IF NOT EXISTS idx_event_log_stream_id
    ON event_log (stream_id, revision);
";
