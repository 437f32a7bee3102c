//! The due evaluator and the filter over it.

use chime_core::clock::normalize_timestamp;
use chime_core::types::{Reminder, ReminderStatus, RepeatFrequency};
use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::schedule::{occurrence_on, period, scheduled_instant};

/// Decide whether `reminder` should be dispatched at `now`.
///
/// One-time reminders are due once their scheduled instant passes, while the
/// record is still pending. Recurring reminders are due when (a) at least one
/// full period has elapsed since the last fire (absent or unparsable fire
/// history counts as never fired) and (b) today's occurrence of the scheduled
/// time-of-day has been reached. The two-part test prevents a second fire on
/// the same day while still holding the trigger until the right time-of-day
/// at a period boundary.
///
/// Malformed date/time strings evaluate to not-due; this function never
/// panics and never returns an error.
pub fn is_due(reminder: &Reminder, now: DateTime<FixedOffset>) -> bool {
    let zone = now.timezone();
    let Some(instant) = scheduled_instant(reminder, zone) else {
        debug!(reminder_id = %reminder.id, "malformed schedule, treating as not due");
        return false;
    };

    if reminder.repeat == RepeatFrequency::None {
        return instant <= now && reminder.status == ReminderStatus::Pending;
    }

    // Once recurrence begins the original date is irrelevant; only the
    // time-of-day is reused against the current date.
    let Some(today) = occurrence_on(now.date_naive(), instant.time(), zone) else {
        return false;
    };

    let last_fired = reminder
        .last_fired_at
        .as_deref()
        .and_then(|raw| normalize_timestamp(raw, zone));

    match last_fired {
        None => today <= now,
        Some(fired) => {
            let Some(threshold) = period(reminder.repeat) else {
                return false;
            };
            now - fired >= threshold && today <= now
        }
    }
}

/// The due subset of `reminders` at `now`. Pure, order-preserving, no side
/// effects.
pub fn due_set<'a>(reminders: &'a [Reminder], now: DateTime<FixedOffset>) -> Vec<&'a Reminder> {
    reminders.iter().filter(|r| is_due(r, now)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::types::NotifyKind;
    use chrono::Duration;

    fn zone() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        chime_core::clock::normalize_timestamp(s, zone()).unwrap()
    }

    fn reminder(date: &str, time: &str, repeat: RepeatFrequency) -> Reminder {
        Reminder {
            id: "r1".into(),
            user_name: "alice".into(),
            date: date.into(),
            time: time.into(),
            content: "x".into(),
            repeat,
            kind: NotifyKind::Call,
            status: ReminderStatus::Pending,
            last_fired_at: None,
            created_at: "2024-01-01T00:00:00+05:30".into(),
        }
    }

    // Spec'd scenario: pending one-time reminder fires once its instant passes.
    #[test]
    fn one_time_due_after_scheduled_instant() {
        let r = reminder("2024-01-01", "09:00", RepeatFrequency::None);
        assert!(!is_due(&r, at("2024-01-01T08:59:00")));
        assert!(is_due(&r, at("2024-01-01T09:00:00")));
        assert!(is_due(&r, at("2024-01-01T09:01:00")));
    }

    #[test]
    fn one_time_never_due_again_once_status_leaves_pending() {
        let mut r = reminder("2024-01-01", "09:00", RepeatFrequency::None);
        r.status = ReminderStatus::Completed;
        assert!(!is_due(&r, at("2024-01-01T09:01:00")));
        assert!(!is_due(&r, at("2030-06-15T12:00:00")));

        r.status = ReminderStatus::Failed;
        assert!(!is_due(&r, at("2024-01-01T09:01:00")));
    }

    #[test]
    fn one_time_evaluation_is_idempotent() {
        let r = reminder("2024-01-01", "09:00", RepeatFrequency::None);
        let now = at("2024-01-01T09:01:00");
        for _ in 0..5 {
            assert!(is_due(&r, now));
        }
    }

    #[test]
    fn recurring_never_fired_uses_todays_time_of_day() {
        // Original date is long past; only the time-of-day matters now.
        let r = reminder("2023-06-01", "21:00", RepeatFrequency::Daily);
        assert!(!is_due(&r, at("2024-01-05T20:59:00")));
        assert!(is_due(&r, at("2024-01-05T21:00:00")));
    }

    #[test]
    fn recurring_ignores_non_pending_status() {
        // Status records the last attempt's outcome; it never retires a
        // recurring reminder.
        let mut r = reminder("2023-06-01", "09:00", RepeatFrequency::Daily);
        r.status = ReminderStatus::Failed;
        assert!(is_due(&r, at("2024-01-05T09:30:00")));
    }

    // Spec'd scenario C: daily at 21:00, fired yesterday 21:00.
    #[test]
    fn daily_waits_for_time_of_day_even_after_period_elapsed() {
        let mut r = reminder("2024-01-01", "21:00", RepeatFrequency::Daily);
        r.last_fired_at = Some("2024-01-01T21:00:00".into());
        assert!(!is_due(&r, at("2024-01-02T20:59:00")));
        assert!(is_due(&r, at("2024-01-02T21:00:00")));
    }

    #[test]
    fn daily_not_due_within_one_period_of_last_fire() {
        let mut r = reminder("2024-01-01", "09:00", RepeatFrequency::Daily);
        r.last_fired_at = Some("2024-01-02T09:05:00".into());
        // Later the same day: time-of-day has passed but the period has not.
        assert!(!is_due(&r, at("2024-01-02T18:00:00")));
    }

    // Spec'd scenario E: weekly threshold boundary.
    #[test]
    fn weekly_due_only_at_full_seven_days() {
        let mut r = reminder("2024-01-01", "10:00", RepeatFrequency::Weekly);
        r.last_fired_at = Some("2024-01-01T10:00:00".into());
        // 6 days later, time already passed: threshold not met.
        assert!(!is_due(&r, at("2024-01-07T11:00:00")));
        // Exactly 7 days, time passed: due.
        assert!(is_due(&r, at("2024-01-08T10:00:00")));
    }

    #[test]
    fn monthly_uses_fixed_thirty_days() {
        let mut r = reminder("2024-01-01", "10:00", RepeatFrequency::Monthly);
        r.last_fired_at = Some("2024-01-01T10:00:00".into());
        assert!(!is_due(&r, at("2024-01-30T10:00:00"))); // 29 days
        assert!(is_due(&r, at("2024-01-31T10:00:00"))); // 30 days
    }

    #[test]
    fn unparsable_fire_history_counts_as_never_fired() {
        let mut r = reminder("2023-06-01", "09:00", RepeatFrequency::Daily);
        r.last_fired_at = Some("not-a-timestamp".into());
        assert!(is_due(&r, at("2024-01-05T09:30:00")));
    }

    #[test]
    fn aware_fire_history_is_converted_into_reference_zone() {
        let mut r = reminder("2024-01-01", "21:00", RepeatFrequency::Daily);
        // 15:30 UTC == 21:00 IST on Jan 1.
        r.last_fired_at = Some("2024-01-01T15:30:00+00:00".into());
        assert!(!is_due(&r, at("2024-01-02T20:59:00")));
        assert!(is_due(&r, at("2024-01-02T21:00:00")));
    }

    // Spec'd scenario D: malformed date fails closed.
    #[test]
    fn malformed_date_is_never_due() {
        let r = reminder("not-a-date", "09:00", RepeatFrequency::None);
        assert!(!is_due(&r, at("2024-01-01T09:01:00")));
        let r = reminder("2024-01-01", "nine", RepeatFrequency::Daily);
        assert!(!is_due(&r, at("2024-01-01T09:01:00")));
    }

    #[test]
    fn downtime_across_multiple_periods_yields_a_single_fire() {
        // Fired 25 days ago; one evaluation is due, not 25.
        let mut r = reminder("2024-01-01", "09:00", RepeatFrequency::Daily);
        r.last_fired_at = Some("2024-01-01T09:00:00".into());
        let now = at("2024-01-26T09:30:00");
        assert!(is_due(&r, now));
        // After the driver writes back the fire time, the next period gates again.
        r.last_fired_at = Some("2024-01-26T09:30:00".into());
        assert!(!is_due(&r, at("2024-01-26T10:00:00")));
    }

    #[test]
    fn due_set_preserves_input_order_and_is_pure() {
        let due_a = reminder("2024-01-01", "08:00", RepeatFrequency::None);
        let not_due = reminder("2024-06-01", "08:00", RepeatFrequency::None);
        let mut due_b = reminder("2024-01-01", "07:00", RepeatFrequency::None);
        due_b.id = "r2".into();

        let all = vec![due_a, not_due, due_b];
        let now = at("2024-01-02T12:00:00");
        let due = due_set(&all, now);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].id, "r1");
        assert_eq!(due[1].id, "r2");

        assert!(due_set(&[], now).is_empty());
    }

    #[test]
    fn elapsed_threshold_is_strict_at_the_boundary() {
        let mut r = reminder("2024-01-01", "09:00", RepeatFrequency::Daily);
        r.last_fired_at = Some("2024-01-01T09:30:00".into());
        let threshold = Duration::days(1);
        let exactly = at("2024-01-01T09:30:00") + threshold;
        assert!(is_due(&r, exactly));
        assert!(!is_due(&r, exactly - Duration::minutes(1)));
    }
}
