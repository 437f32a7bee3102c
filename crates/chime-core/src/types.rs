use serde::{Deserialize, Serialize};

/// How often a reminder repeats after its first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatFrequency {
    /// Fire once at the scheduled date + time, then never again.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for RepeatFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RepeatFrequency::None => "none",
            RepeatFrequency::Daily => "daily",
            RepeatFrequency::Weekly => "weekly",
            RepeatFrequency::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RepeatFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(RepeatFrequency::None),
            "daily" => Ok(RepeatFrequency::Daily),
            "weekly" => Ok(RepeatFrequency::Weekly),
            "monthly" => Ok(RepeatFrequency::Monthly),
            other => Err(format!("unknown repeat frequency: {other}")),
        }
    }
}

/// Outcome of the most recent dispatch attempt.
///
/// For one-time reminders this doubles as the lifecycle gate: once a record
/// leaves `Pending` it is never evaluated as due again. Recurring reminders
/// keep firing regardless of status; only `last_fired_at` gates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Completed => "completed",
            ReminderStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReminderStatus::Pending),
            "completed" => Ok(ReminderStatus::Completed),
            "failed" => Ok(ReminderStatus::Failed),
            other => Err(format!("unknown reminder status: {other}")),
        }
    }
}

/// Delivery channel for a reminder: a voice call that speaks the content,
/// or a plain SMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    #[default]
    Call,
    Sms,
}

impl std::fmt::Display for NotifyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotifyKind::Call => "call",
            NotifyKind::Sms => "sms",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for NotifyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" => Ok(NotifyKind::Call),
            "sms" => Ok(NotifyKind::Sms),
            other => Err(format!("unknown notification type: {other}")),
        }
    }
}

/// A persisted reminder record.
///
/// `date` and `time` are kept as raw text on purpose: a malformed schedule
/// must evaluate as not-due (fail closed), never abort a whole polling cycle.
/// Parsing happens inside the scheduler, per evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// UUID v4 string — primary key, immutable after creation.
    pub id: String,
    /// Recipient reference; resolved to a phone number at dispatch time.
    pub user_name: String,
    /// Original wall-clock date (`YYYY-MM-DD`) in the reference zone.
    /// For recurring reminders only the time-of-day matters once recurrence
    /// begins; the date never advances in the store.
    pub date: String,
    /// Wall-clock time of day (`HH:MM`) in the reference zone.
    pub time: String,
    /// Text to speak (call) or send (SMS).
    pub content: String,
    pub repeat: RepeatFrequency,
    pub kind: NotifyKind,
    /// Mutated only by the driver's write-back after a dispatch attempt.
    pub status: ReminderStatus,
    /// Timestamp of the most recent dispatch attempt, successful or not.
    /// Normalised into the reference zone on read (naive values are assumed
    /// to already be in it).
    pub last_fired_at: Option<String>,
    /// RFC 3339, set at creation.
    pub created_at: String,
}

/// A reminder recipient. `name` is unique case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    /// E.164 format, e.g. `+14155550123`.
    pub phone_number: String,
    pub created_at: String,
}

/// `YYYY-MM-DD` with real calendar validation (rejects 2024-02-31).
pub fn validate_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// `HH:MM`, 24-hour.
pub fn validate_time(time: &str) -> bool {
    chrono::NaiveTime::parse_from_str(time, "%H:%M").is_ok()
}

/// Loose E.164 check: leading `+`, digits only, at least 10 characters total.
pub fn validate_phone_number(phone: &str) -> bool {
    phone.len() >= 10
        && phone.starts_with('+')
        && phone[1..].bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn repeat_frequency_round_trips() {
        for s in ["none", "daily", "weekly", "monthly"] {
            let freq = RepeatFrequency::from_str(s).unwrap();
            assert_eq!(freq.to_string(), s);
        }
    }

    #[test]
    fn repeat_frequency_is_case_insensitive() {
        assert_eq!(
            RepeatFrequency::from_str("Daily").unwrap(),
            RepeatFrequency::Daily
        );
    }

    #[test]
    fn unknown_repeat_frequency_is_rejected() {
        assert!(RepeatFrequency::from_str("fortnightly").is_err());
    }

    #[test]
    fn status_round_trips() {
        for s in ["pending", "completed", "failed"] {
            assert_eq!(ReminderStatus::from_str(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn date_validation() {
        assert!(validate_date("2024-01-31"));
        assert!(!validate_date("2024-02-31"));
        assert!(!validate_date("not-a-date"));
        assert!(!validate_date("31-01-2024"));
    }

    #[test]
    fn time_validation() {
        assert!(validate_time("09:00"));
        assert!(validate_time("23:59"));
        assert!(!validate_time("24:00"));
        assert!(!validate_time("9am"));
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone_number("+14155550123"));
        assert!(!validate_phone_number("14155550123"));
        assert!(!validate_phone_number("+1415555x123"));
        assert!(!validate_phone_number("+1415"));
    }
}
