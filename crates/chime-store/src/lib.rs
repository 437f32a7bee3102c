//! `chime-store` — SQLite persistence for reminders and users.
//!
//! The driver reloads the full reminder set every polling cycle; external
//! writers (the `chimectl` CLI) may mutate the store between polls, so no
//! cross-cycle caching happens here. SQLite itself provides the atomicity of
//! individual read-all/update operations.

pub mod db;
pub mod error;
pub mod reminders;
pub mod users;

pub use error::{Result, StoreError};
pub use reminders::ReminderStore;
pub use users::UserStore;
