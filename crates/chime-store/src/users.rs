use std::sync::{Arc, Mutex};

use chime_core::types::User;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::db::init_db;
use crate::error::Result;

/// User (recipient) persistence handle. Cheap to clone; the notifier keeps
/// one for dispatch-time phone-number lookups.
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Add a user. Returns `false` when the name is already taken
    /// (case-insensitively).
    pub fn add(&self, name: &str, phone_number: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "INSERT OR IGNORE INTO users (name, phone_number, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![name, phone_number, Utc::now().to_rfc3339()],
        )?;
        if n > 0 {
            info!(%name, "user added");
        }
        Ok(n > 0)
    }

    pub fn load_all(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare_cached("SELECT name, phone_number, created_at FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    name: row.get(0)?,
                    phone_number: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(users)
    }

    /// Case-insensitive lookup (the `name` column is COLLATE NOCASE).
    pub fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                "SELECT name, phone_number, created_at FROM users WHERE name = ?1",
                [name],
                |row| {
                    Ok(User {
                        name: row.get(0)?,
                        phone_number: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn add_and_lookup() {
        let store = store();
        assert!(store.add("Alice", "+14155550123").unwrap());
        let user = store.get_by_name("Alice").unwrap().unwrap();
        assert_eq!(user.phone_number, "+14155550123");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let store = store();
        store.add("Alice", "+14155550123").unwrap();
        assert!(store.get_by_name("alice").unwrap().is_some());
        assert!(store.get_by_name("ALICE").unwrap().is_some());
        assert!(store.get_by_name("bob").unwrap().is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let store = store();
        assert!(store.add("Alice", "+14155550123").unwrap());
        assert!(!store.add("alice", "+14155559999").unwrap());
        assert_eq!(store.load_all().unwrap().len(), 1);
    }
}
