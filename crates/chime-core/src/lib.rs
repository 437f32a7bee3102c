//! `chime-core` — shared types, clock, config, and errors for the Chime
//! reminder service.
//!
//! Everything that more than one crate needs lives here: the [`types::Reminder`]
//! record, the reference-zone [`clock`] (all scheduling arithmetic happens in a
//! single fixed UTC offset), the figment-based [`config`] loader, and the
//! [`error::ChimeError`] taxonomy.

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use error::{ChimeError, Result};
