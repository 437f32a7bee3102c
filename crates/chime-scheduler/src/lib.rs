//! `chime-scheduler` — the due-reminder scheduling core.
//!
//! # Overview
//!
//! Given a set of [`Reminder`](chime_core::types::Reminder) records and the
//! current instant in the reference zone, this crate decides which reminders
//! are due for dispatch right now ([`is_due`] / [`due_set`]) and which ones
//! fall within a forward-looking horizon ([`upcoming`]).
//!
//! All functions are pure: no I/O, no clocks, no side effects. The driver
//! supplies `now`; tests supply whatever instant they like.
//!
//! # Frequency classes
//!
//! | Frequency | Behaviour                                                        |
//! |-----------|------------------------------------------------------------------|
//! | `none`    | Fire once when the scheduled instant passes, while still pending  |
//! | `daily`   | Re-fire at the scheduled time-of-day once 1 day has elapsed       |
//! | `weekly`  | Re-fire at the scheduled time-of-day once 7 days have elapsed     |
//! | `monthly` | Re-fire at the scheduled time-of-day once 30 days have elapsed    |
//!
//! Recurrence is elapsed-time based, not calendar based: "monthly" means a
//! fixed 30 days. A reminder that missed several periods while the service
//! was down fires once on resumption, not once per missed period.

pub mod due;
pub mod schedule;
pub mod upcoming;

pub use due::{due_set, is_due};
pub use schedule::{next_occurrence, period, scheduled_instant};
pub use upcoming::{upcoming, Upcoming};
