use std::sync::{Arc, Mutex};

use chime_core::types::{NotifyKind, Reminder, ReminderStatus, RepeatFrequency};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::init_db;
use crate::error::Result;

const SELECT_COLUMNS: &str = "id, user_name, date, time, content, repeat_frequency, \
                              notify_kind, status, last_fired_at, created_at";

/// Reminder persistence handle. Cheap to clone; all clones share one
/// connection behind a mutex, matching the strictly sequential driver loop.
#[derive(Clone)]
pub struct ReminderStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReminderStore {
    /// Wrap a connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a new reminder with `status = pending` and no fire history.
    pub fn add(
        &self,
        user_name: &str,
        date: &str,
        time: &str,
        content: &str,
        repeat: RepeatFrequency,
        kind: NotifyKind,
    ) -> Result<Reminder> {
        let conn = self.conn.lock().unwrap();
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO reminders
             (id, user_name, date, time, content, repeat_frequency,
              notify_kind, status, last_fired_at, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,'pending',NULL,?8)",
            rusqlite::params![
                id,
                user_name,
                date,
                time,
                content,
                repeat.to_string(),
                kind.to_string(),
                created_at
            ],
        )?;
        info!(reminder_id = %id, %user_name, %repeat, "reminder added");

        Ok(Reminder {
            id,
            user_name: user_name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            content: content.to_string(),
            repeat,
            kind,
            status: ReminderStatus::Pending,
            last_fired_at: None,
            created_at,
        })
    }

    /// Return all reminders ordered by creation time.
    ///
    /// Rows whose enum columns no longer parse are skipped with a warning —
    /// a corrupt record must never halt a polling cycle.
    pub fn load_all(&self) -> Result<Vec<Reminder>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM reminders ORDER BY created_at"
        ))?;

        let reminders = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,         // id
                    row.get::<_, String>(1)?,         // user_name
                    row.get::<_, String>(2)?,         // date
                    row.get::<_, String>(3)?,         // time
                    row.get::<_, String>(4)?,         // content
                    row.get::<_, String>(5)?,         // repeat_frequency
                    row.get::<_, String>(6)?,         // notify_kind
                    row.get::<_, String>(7)?,         // status
                    row.get::<_, Option<String>>(8)?, // last_fired_at
                    row.get::<_, String>(9)?,         // created_at
                ))
            })?
            .filter_map(|r| r.ok())
            .filter_map(row_to_reminder)
            .collect();

        Ok(reminders)
    }

    /// Record the outcome of a dispatch attempt. `last_fired_at` is left
    /// untouched when `None`. Returns `false` when the id is unknown.
    pub fn update_status(
        &self,
        id: &str,
        status: ReminderStatus,
        last_fired_at: Option<&str>,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE reminders
             SET status = ?1, last_fired_at = COALESCE(?2, last_fired_at)
             WHERE id = ?3",
            rusqlite::params![status.to_string(), last_fired_at, id],
        )?;
        Ok(n > 0)
    }
}

type ReminderRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
);

fn row_to_reminder(row: ReminderRow) -> Option<Reminder> {
    let (id, user_name, date, time, content, repeat_str, kind_str, status_str, last_fired_at, created_at) =
        row;
    let repeat: RepeatFrequency = match repeat_str.parse() {
        Ok(r) => r,
        Err(e) => {
            warn!(reminder_id = %id, "skipping reminder row: {e}");
            return None;
        }
    };
    let kind: NotifyKind = match kind_str.parse() {
        Ok(k) => k,
        Err(e) => {
            warn!(reminder_id = %id, "skipping reminder row: {e}");
            return None;
        }
    };
    let status: ReminderStatus = match status_str.parse() {
        Ok(s) => s,
        Err(e) => {
            warn!(reminder_id = %id, "skipping reminder row: {e}");
            return None;
        }
    };
    Some(Reminder {
        id,
        user_name,
        date,
        time,
        content,
        repeat,
        kind,
        status,
        last_fired_at,
        created_at,
    })
}
