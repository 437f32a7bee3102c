//! `chimectl` — manage reminders and users in the chime database.
//!
//! This writes to the same SQLite file the service polls, so additions show
//! up on the service's next cycle without a restart.

use anyhow::{bail, Context};
use chime_core::config::ChimeConfig;
use chime_core::types::{validate_date, validate_phone_number, validate_time, NotifyKind, RepeatFrequency};
use chime_store::{ReminderStore, UserStore};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chimectl", about = "Manage chime reminders and users")]
struct Cli {
    /// Path to chime.toml (defaults to ~/.chime/chime.toml).
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a reminder recipient.
    AddUser {
        name: String,
        /// E.164 format, e.g. +14155550123.
        phone_number: String,
    },
    /// Create a reminder for an existing user.
    AddReminder {
        user: String,
        /// YYYY-MM-DD, reference zone.
        date: String,
        /// HH:MM, 24-hour, reference zone.
        time: String,
        content: String,
        /// none | daily | weekly | monthly
        #[arg(long, default_value = "none")]
        repeat: String,
        /// call | sms
        #[arg(long, default_value = "call")]
        kind: String,
    },
    /// List all users.
    ListUsers,
    /// List all reminders with a status summary.
    ListReminders,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ChimeConfig::load(cli.config.as_deref())?;

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let conn = rusqlite::Connection::open(&config.database.path)
        .with_context(|| format!("opening {}", config.database.path))?;

    match cli.command {
        Command::AddUser { name, phone_number } => {
            if !validate_phone_number(&phone_number) {
                bail!("invalid phone number (expected E.164, e.g. +14155550123)");
            }
            let users = UserStore::new(conn)?;
            if users.add(&name, &phone_number)? {
                println!("Added user {name} ({phone_number})");
            } else {
                println!("User {name} already exists");
            }
        }

        Command::AddReminder {
            user,
            date,
            time,
            content,
            repeat,
            kind,
        } => {
            if !validate_date(&date) {
                bail!("invalid date, expected YYYY-MM-DD");
            }
            if !validate_time(&time) {
                bail!("invalid time, expected HH:MM (24-hour)");
            }
            if content.trim().is_empty() {
                bail!("content cannot be empty");
            }
            let repeat: RepeatFrequency = repeat.parse().map_err(anyhow::Error::msg)?;
            let kind: NotifyKind = kind.parse().map_err(anyhow::Error::msg)?;

            let users = UserStore::new(rusqlite::Connection::open(&config.database.path)?)?;
            if users.get_by_name(&user)?.is_none() {
                bail!("user '{user}' not found — add them with `chimectl add-user` first");
            }

            let reminders = ReminderStore::new(conn)?;
            let reminder = reminders.add(&user, &date, &time, &content, repeat, kind)?;
            println!("Added reminder {}", reminder.id);
            println!("  User:    {user}");
            println!("  When:    {date} {time}");
            println!("  Repeat:  {repeat}");
            println!("  Kind:    {kind}");
        }

        Command::ListUsers => {
            let users = UserStore::new(conn)?.load_all()?;
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            println!("Found {} user(s):", users.len());
            for user in users {
                println!("  {} ({})", user.name, user.phone_number);
            }
        }

        Command::ListReminders => {
            let reminders = ReminderStore::new(conn)?.load_all()?;
            if reminders.is_empty() {
                println!("No reminders found.");
                return Ok(());
            }
            println!("Found {} reminder(s):", reminders.len());
            let mut pending = 0usize;
            let mut completed = 0usize;
            let mut failed = 0usize;
            for r in &reminders {
                println!();
                println!("ID: {}", r.id);
                println!("  User:       {}", r.user_name);
                println!("  When:       {} {}", r.date, r.time);
                println!("  Content:    {}", r.content);
                println!("  Repeat:     {}", r.repeat);
                println!("  Kind:       {}", r.kind);
                println!("  Status:     {}", r.status);
                println!(
                    "  Last fired: {}",
                    r.last_fired_at.as_deref().unwrap_or("never")
                );
                match r.status {
                    chime_core::types::ReminderStatus::Pending => pending += 1,
                    chime_core::types::ReminderStatus::Completed => completed += 1,
                    chime_core::types::ReminderStatus::Failed => failed += 1,
                }
            }
            println!();
            println!("Summary: {pending} pending, {completed} completed, {failed} failed");
        }
    }

    Ok(())
}
