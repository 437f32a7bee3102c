//! Twilio REST dispatch: voice calls (TwiML `<Say>`) and SMS.

use async_trait::async_trait;
use chime_core::config::TwilioConfig;
use chime_core::types::{NotifyKind, Reminder, User};
use chime_core::{ChimeError, Result};
use chime_store::UserStore;
use serde::Deserialize;
use tracing::{info, warn};

use crate::Notifier;

const API_VERSION: &str = "2010-04-01";

/// Delivers reminders through the Twilio REST API.
///
/// The recipient's phone number is resolved from the user store at dispatch
/// time, so edits to a user's number take effect on the next fire without
/// touching their reminders.
pub struct TwilioNotifier {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
    simulate: bool,
    users: UserStore,
}

/// Subset of Twilio's response we care about.
#[derive(Deserialize)]
struct CreatedResource {
    sid: String,
}

impl TwilioNotifier {
    /// Fails when credentials are missing and simulation is off — a
    /// startup-time configuration error, not something to discover on the
    /// first dispatch.
    pub fn new(config: &TwilioConfig, users: UserStore) -> Result<Self> {
        if !config.simulate && (config.account_sid.is_empty() || config.auth_token.is_empty()) {
            return Err(ChimeError::Config(
                "twilio.account_sid and twilio.auth_token must be set (or enable twilio.simulate)"
                    .to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            base_url: config.base_url.clone(),
            simulate: config.simulate,
            users,
        })
    }

    fn resolve_user(&self, reminder: &Reminder) -> std::result::Result<User, String> {
        match self.users.get_by_name(&reminder.user_name) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(format!("user '{}' not found", reminder.user_name)),
            Err(e) => Err(format!("user lookup failed: {e}")),
        }
    }

    async fn create_resource(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> (bool, String) {
        let url = format!(
            "{}/{}/Accounts/{}/{}.json",
            self.base_url, API_VERSION, self.account_sid, endpoint
        );
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .send()
            .await;

        match resp {
            Ok(resp) if resp.status().is_success() => match resp.json::<CreatedResource>().await {
                Ok(created) => (true, format!("dispatched, sid {}", created.sid)),
                // Twilio accepted the request; a response we can't parse is
                // still a successful dispatch.
                Err(e) => (true, format!("dispatched, response parse failed: {e}")),
            },
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.text().await.unwrap_or_default();
                warn!(status, body = %body, "Twilio API error");
                (false, format!("twilio api error ({status}): {body}"))
            }
            Err(e) => (false, format!("twilio request failed: {e}")),
        }
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn dispatch(&self, reminder: &Reminder, from: &str) -> (bool, String) {
        let user = match self.resolve_user(reminder) {
            Ok(user) => user,
            Err(detail) => {
                warn!(reminder_id = %reminder.id, "{detail}");
                return (false, detail);
            }
        };
        let to = user.phone_number.as_str();
        // Stored content may carry literal \n sequences from CSV-ish inputs.
        let content = reminder.content.replace("\\n", "\n");

        if self.simulate {
            info!(
                reminder_id = %reminder.id,
                kind = %reminder.kind,
                %to,
                %from,
                "simulated dispatch: {content}"
            );
            return (true, "simulation - nothing sent".to_string());
        }

        info!(reminder_id = %reminder.id, kind = %reminder.kind, %to, "dispatching reminder");
        match reminder.kind {
            NotifyKind::Sms => {
                self.create_resource("Messages", &[("To", to), ("From", from), ("Body", &content)])
                    .await
            }
            NotifyKind::Call => {
                let twiml = format!("<Response><Say>{}</Say></Response>", xml_escape(&content));
                self.create_resource("Calls", &[("To", to), ("From", from), ("Twiml", &twiml)])
                    .await
            }
        }
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
