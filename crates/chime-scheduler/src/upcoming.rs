//! Forward-looking projection of next occurrences, for observability only.

use chime_core::clock::normalize_timestamp;
use chime_core::types::Reminder;
use chrono::{DateTime, Duration, FixedOffset};

use crate::schedule::next_occurrence;

/// A reminder's next occurrence within the report horizon.
#[derive(Debug, Clone)]
pub struct Upcoming {
    pub reminder: Reminder,
    pub next_occurrence: DateTime<FixedOffset>,
    /// Whole hours until the occurrence.
    pub hours_remaining: i64,
    /// Residual whole minutes after `hours_remaining` (seconds discarded).
    pub minutes_remaining: i64,
}

/// Project every reminder's next occurrence and keep those that fall within
/// `(now, now + horizon_hours]`, sorted chronologically.
///
/// A due reminder is never also upcoming: inclusion requires the occurrence
/// to lie strictly after `now`. Records with malformed schedules are
/// skipped, never fatal to the scan.
pub fn upcoming(
    reminders: &[Reminder],
    now: DateTime<FixedOffset>,
    horizon_hours: i64,
) -> Vec<Upcoming> {
    let zone = now.timezone();
    let end = now + Duration::hours(horizon_hours);

    let mut entries: Vec<Upcoming> = reminders
        .iter()
        .filter_map(|reminder| {
            let last_fired = reminder
                .last_fired_at
                .as_deref()
                .and_then(|raw| normalize_timestamp(raw, zone));
            let next = next_occurrence(reminder, now, last_fired)?;
            if next <= now || next > end {
                return None;
            }
            let gap_secs = (next - now).num_seconds();
            Some(Upcoming {
                reminder: reminder.clone(),
                next_occurrence: next,
                hours_remaining: gap_secs / 3600,
                minutes_remaining: (gap_secs % 3600) / 60,
            })
        })
        .collect();

    entries.sort_by_key(|e| e.next_occurrence);
    entries
}
