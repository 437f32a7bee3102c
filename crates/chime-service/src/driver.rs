//! The polling driver: load → evaluate → dispatch → write back, forever.

use std::sync::Arc;
use std::time::Duration;

use chime_core::clock::Clock;
use chime_core::config::ServiceConfig;
use chime_core::types::{Reminder, ReminderStatus};
use chime_notify::Notifier;
use chime_scheduler::{due_set, upcoming};
use chime_store::ReminderStore;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Owns the poll loop. Lifecycle is `new → run(shutdown)`; all state lives on
/// the instance, no process-wide globals.
pub struct Driver {
    reminders: ReminderStore,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    report_interval: Duration,
    horizon_hours: i64,
    sender_number: String,
}

impl Driver {
    pub fn new(
        reminders: ReminderStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            reminders,
            notifier,
            clock,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            report_interval: Duration::from_secs(config.report_interval_secs),
            horizon_hours: config.horizon_hours,
            sender_number: config.sender_number.clone(),
        }
    }

    /// Main loop. The shutdown flag is observed only between iterations; an
    /// in-flight cycle always runs to completion before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_secs = self.poll_interval.as_secs(),
            report_secs = self.report_interval.as_secs(),
            notifier = self.notifier.name(),
            sender = %self.sender_number,
            "reminder driver started"
        );
        self.report_upcoming();

        let mut poll = tokio::time::interval(self.poll_interval);
        // Offset the report ticker so it does not duplicate the startup report.
        let mut report = tokio::time::interval_at(
            tokio::time::Instant::now() + self.report_interval,
            self.report_interval,
        );

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    if let Err(e) = self.cycle().await {
                        error!("reminder cycle aborted: {e}");
                    }
                }
                _ = report.tick() => self.report_upcoming(),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("reminder driver shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One polling cycle: full reload, filter, sequential dispatch.
    ///
    /// Returns `Err` only when the store load fails — that aborts the cycle
    /// (the loop sleeps and retries next interval). Individual dispatch and
    /// write-back problems are logged and never stop the remaining reminders.
    async fn cycle(&self) -> chime_store::Result<()> {
        let now = self.clock.now();
        let reminders = self.reminders.load_all()?;
        if reminders.is_empty() {
            debug!("no reminders found");
            return Ok(());
        }

        let due: Vec<Reminder> = due_set(&reminders, now).into_iter().cloned().collect();
        if due.is_empty() {
            debug!(checked = reminders.len(), "no reminders due");
            return Ok(());
        }
        info!(count = due.len(), "due reminders found");

        for reminder in due {
            let (success, detail) = self
                .notifier
                .dispatch(&reminder, &self.sender_number)
                .await;
            let status = if success {
                ReminderStatus::Completed
            } else {
                ReminderStatus::Failed
            };
            // last_fired_at advances even on failure: the period gate is what
            // stops a persistently failing downstream from being hammered
            // every poll.
            let fired_at = self.clock.now().to_rfc3339();
            match self
                .reminders
                .update_status(&reminder.id, status, Some(&fired_at))
            {
                Ok(true) => {
                    info!(reminder_id = %reminder.id, %status, %detail, "reminder dispatched")
                }
                Ok(false) => {
                    warn!(reminder_id = %reminder.id, "write-back skipped: reminder no longer in store")
                }
                Err(e) => warn!(reminder_id = %reminder.id, "status write-back failed: {e}"),
            }
        }
        Ok(())
    }

    /// Log the upcoming set. Observability only — no state changes.
    fn report_upcoming(&self) {
        let now = self.clock.now();
        let reminders = match self.reminders.load_all() {
            Ok(reminders) => reminders,
            Err(e) => {
                error!("upcoming report skipped: {e}");
                return;
            }
        };
        let entries = upcoming(&reminders, now, self.horizon_hours);
        if entries.is_empty() {
            info!(horizon_hours = self.horizon_hours, "no upcoming reminders");
            return;
        }
        info!(
            count = entries.len(),
            horizon_hours = self.horizon_hours,
            "upcoming reminders"
        );
        for entry in &entries {
            info!(
                reminder_id = %entry.reminder.id,
                user = %entry.reminder.user_name,
                at = %entry.next_occurrence.to_rfc3339(),
                "due in {}h {}m",
                entry.hours_remaining,
                entry.minutes_remaining
            );
        }
    }
}
