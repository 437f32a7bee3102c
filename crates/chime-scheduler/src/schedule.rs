//! Occurrence arithmetic shared by the due evaluator and the upcoming
//! projector.

use chime_core::types::{Reminder, RepeatFrequency};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};

/// Parse a reminder's `date` + `time` into a single instant in the reference
/// zone. `None` on malformed input — callers fail closed.
pub fn scheduled_instant(
    reminder: &Reminder,
    zone: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    let date = NaiveDate::parse_from_str(&reminder.date, "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(&reminder.time, "%H:%M").ok()?;
    date.and_time(time).and_local_timezone(zone).single()
}

/// The scheduled time-of-day projected onto an arbitrary calendar date.
pub fn occurrence_on(
    day: NaiveDate,
    time_of_day: NaiveTime,
    zone: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    day.and_time(time_of_day).and_local_timezone(zone).single()
}

/// Minimum elapsed time since the last fire before a recurring reminder may
/// fire again. Fixed-length periods: "monthly" is 30 days, never
/// calendar-month arithmetic. `None` for one-time reminders.
pub fn period(repeat: RepeatFrequency) -> Option<Duration> {
    match repeat {
        RepeatFrequency::None => None,
        RepeatFrequency::Daily => Some(Duration::days(1)),
        RepeatFrequency::Weekly => Some(Duration::days(7)),
        RepeatFrequency::Monthly => Some(Duration::days(30)),
    }
}

/// Compute the next occurrence of `reminder` strictly after `now`.
///
/// `last_fired` must already be normalised into the reference zone. Returns
/// `None` when the schedule is malformed, when a one-time reminder's instant
/// has passed, or when no candidate within one period satisfies the
/// elapsed-time threshold.
pub fn next_occurrence(
    reminder: &Reminder,
    now: DateTime<FixedOffset>,
    last_fired: Option<DateTime<FixedOffset>>,
) -> Option<DateTime<FixedOffset>> {
    let zone = now.timezone();
    let instant = scheduled_instant(reminder, zone)?;
    let today = occurrence_on(now.date_naive(), instant.time(), zone)?;

    match reminder.repeat {
        RepeatFrequency::None => (instant > now).then_some(instant),

        RepeatFrequency::Daily => {
            // Already fired today: next slot is always tomorrow's.
            if last_fired.is_some_and(|lf| lf.date_naive() == now.date_naive()) {
                Some(today + Duration::days(1))
            } else if today > now {
                Some(today)
            } else {
                Some(today + Duration::days(1))
            }
        }

        RepeatFrequency::Weekly | RepeatFrequency::Monthly => {
            let threshold = period(reminder.repeat)?;
            let found = (0..threshold.num_days()).find_map(|offset| {
                let candidate = today + Duration::days(offset);
                let eligible = candidate > now
                    && last_fired.is_none_or(|lf| candidate - lf >= threshold);
                eligible.then_some(candidate)
            });
            // Never fired and the scan produced nothing: today's slot, if
            // still ahead of us.
            found.or_else(|| (last_fired.is_none() && today > now).then_some(today))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::types::{NotifyKind, ReminderStatus};

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

    #[test]
    fn scheduled_instant_combines_date_and_time_in_zone() {
        let r = reminder("2024-01-01", "09:00", RepeatFrequency::None);
        let instant = scheduled_instant(&r, zone()).unwrap();
        assert_eq!(instant, at("2024-01-01T09:00:00"));
    }

    #[test]
    fn scheduled_instant_fails_closed_on_garbage() {
        assert!(scheduled_instant(&reminder("not-a-date", "09:00", RepeatFrequency::None), zone()).is_none());
        assert!(scheduled_instant(&reminder("2024-01-01", "9am", RepeatFrequency::None), zone()).is_none());
        assert!(scheduled_instant(&reminder("2024-02-31", "09:00", RepeatFrequency::None), zone()).is_none());
    }

    #[test]
    fn period_thresholds() {
        assert_eq!(period(RepeatFrequency::None), None);
        assert_eq!(period(RepeatFrequency::Daily), Some(Duration::days(1)));
        assert_eq!(period(RepeatFrequency::Weekly), Some(Duration::days(7)));
        assert_eq!(period(RepeatFrequency::Monthly), Some(Duration::days(30)));
    }

    #[test]
    fn one_time_next_is_the_instant_when_future() {
        let r = reminder("2024-01-02", "09:00", RepeatFrequency::None);
        let next = next_occurrence(&r, at("2024-01-01T12:00:00"), None);
        assert_eq!(next, Some(at("2024-01-02T09:00:00")));
    }

    #[test]
    fn one_time_next_is_none_once_passed() {
        let r = reminder("2024-01-01", "09:00", RepeatFrequency::None);
        assert_eq!(next_occurrence(&r, at("2024-01-01T09:00:00"), None), None);
    }

    #[test]
    fn daily_next_is_today_when_time_ahead() {
        let r = reminder("2023-06-01", "21:00", RepeatFrequency::Daily);
        let next = next_occurrence(&r, at("2024-01-05T08:00:00"), None);
        assert_eq!(next, Some(at("2024-01-05T21:00:00")));
    }

    #[test]
    fn daily_next_is_tomorrow_when_time_passed() {
        let r = reminder("2023-06-01", "08:00", RepeatFrequency::Daily);
        let next = next_occurrence(&r, at("2024-01-05T09:00:00"), None);
        assert_eq!(next, Some(at("2024-01-06T08:00:00")));
    }

    #[test]
    fn daily_next_is_tomorrow_when_already_fired_today() {
        let r = reminder("2023-06-01", "21:00", RepeatFrequency::Daily);
        let next = next_occurrence(
            &r,
            at("2024-01-05T08:00:00"),
            Some(at("2024-01-05T07:00:00")),
        );
        // 21:00 today is still ahead, but today's slot was already consumed.
        assert_eq!(next, Some(at("2024-01-06T21:00:00")));
    }

    #[test]
    fn weekly_next_skips_until_threshold_met() {
        let r = reminder("2023-06-01", "10:00", RepeatFrequency::Weekly);
        // Fired 5 days ago; first candidate satisfying the 7-day gap is 2 days out.
        let next = next_occurrence(
            &r,
            at("2024-01-10T12:00:00"),
            Some(at("2024-01-05T10:00:00")),
        );
        assert_eq!(next, Some(at("2024-01-12T10:00:00")));
    }

    #[test]
    fn weekly_never_fired_takes_first_future_slot() {
        let r = reminder("2023-06-01", "10:00", RepeatFrequency::Weekly);
        let next = next_occurrence(&r, at("2024-01-10T12:00:00"), None);
        assert_eq!(next, Some(at("2024-01-11T10:00:00")));
    }

    #[test]
    fn monthly_next_waits_thirty_days_from_last_fire() {
        let r = reminder("2023-06-01", "10:00", RepeatFrequency::Monthly);
        let next = next_occurrence(
            &r,
            at("2024-01-10T12:00:00"),
            Some(at("2024-01-01T10:00:00")),
        );
        assert_eq!(next, Some(at("2024-01-31T10:00:00")));
    }
}
