//! SQL schema for the chat DB. Applied on open.

/// Chat turns: one row per message, ordered by (ts_micros, id) within a session.
pub const CHAT_TURNS: &str = "
CREATE TABLE IF NOT EXISTS chat_turns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id TEXT NOT NULL,
    session_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    ts_micros INTEGER NOT NULL,
    report_context_id TEXT,
    latency_ms INTEGER
);
CREATE INDEX IF NOT EXISTS idx_chat_turns_session ON chat_turns(owner_id, session_id, ts_micros);
";

/// Run all migrations on an open connection.
pub fn run_all(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CHAT_TURNS)?;
    Ok(())
}
