use rusqlite::Connection;

use crate::error::Result;

/// Initialise the chime schema in `conn`.
///
/// Creates the `reminders` and `users` tables (idempotent) and an index on
/// `status` so the per-cycle load stays cheap as completed one-time
/// reminders accumulate.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reminders (
            id               TEXT NOT NULL PRIMARY KEY,
            user_name        TEXT NOT NULL,
            date             TEXT NOT NULL,   -- YYYY-MM-DD, reference zone
            time             TEXT NOT NULL,   -- HH:MM, reference zone
            content          TEXT NOT NULL,
            repeat_frequency TEXT NOT NULL DEFAULT 'none',
            notify_kind      TEXT NOT NULL DEFAULT 'call',
            status           TEXT NOT NULL DEFAULT 'pending',
            last_fired_at    TEXT,            -- timestamp of last dispatch attempt, or NULL
            created_at       TEXT NOT NULL
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_reminders_status ON reminders (status);

        CREATE TABLE IF NOT EXISTS users (
            name         TEXT NOT NULL PRIMARY KEY COLLATE NOCASE,
            phone_number TEXT NOT NULL,
            created_at   TEXT NOT NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
