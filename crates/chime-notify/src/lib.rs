//! `chime-notify` — outbound reminder delivery.
//!
//! The driver talks to a [`Notifier`]; the only production implementation is
//! [`TwilioNotifier`], which places a voice call or sends an SMS depending on
//! the reminder's [`NotifyKind`](chime_core::types::NotifyKind).

use async_trait::async_trait;
use chime_core::types::Reminder;

pub mod twilio;

pub use twilio::TwilioNotifier;

/// Dispatches one reminder to its recipient.
///
/// Failures are reported, never raised: the returned pair is
/// `(success, detail)` where `detail` carries a human-readable outcome for
/// logging. The driver records the outcome either way and moves on.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Implementation name for logging.
    fn name(&self) -> &str;

    /// Deliver `reminder` from the given sender identity (E.164 number).
    async fn dispatch(&self, reminder: &Reminder, from: &str) -> (bool, String);
}
