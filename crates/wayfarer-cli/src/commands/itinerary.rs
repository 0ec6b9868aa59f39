use clap::Subcommand;
use std::sync::Arc;
use wayfarer_core::{
    ActivityDraft, AlertSeverity, Config, ItineraryService, MemoryAlarms, MemoryAlerts,
    ReminderScheduler,
};

use super::common::{format_datetime, open_db, parse_datetime, CliResult};

#[derive(Subcommand)]
pub enum ItineraryAction {
    /// Add an activity to a trip
    Add {
        trip_id: i64,
        /// Activity time, YYYY-MM-DD HH:MM local time
        time: String,
        description: String,
        /// Switch the reminder on
        #[arg(long)]
        reminder: bool,
        /// Lead-time label, e.g. "1 hora antes" (defaults from config)
        #[arg(long)]
        offset: Option<String>,
        /// "normal" or "important"
        #[arg(long, default_value = "normal")]
        severity: String,
    },
    /// Edit an activity
    Edit {
        id: i64,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// true switches the reminder on, false cancels it
        #[arg(long)]
        reminder: Option<bool>,
        #[arg(long)]
        offset: Option<String>,
        #[arg(long)]
        severity: Option<String>,
    },
    /// Delete an activity
    Rm { id: i64 },
    /// List a trip's itinerary in time order
    List { trip_id: i64 },
}

fn parse_severity(s: &str) -> Result<AlertSeverity, Box<dyn std::error::Error>> {
    match s {
        "normal" => Ok(AlertSeverity::Normal),
        "important" => Ok(AlertSeverity::Important),
        other => {
            Err(format!("unknown severity '{other}'; expected normal or important").into())
        }
    }
}

pub fn run(action: ItineraryAction) -> CliResult {
    let db = open_db()?;
    let scheduler =
        ReminderScheduler::new(Arc::new(MemoryAlarms::new()), Arc::new(MemoryAlerts::new()));
    let service = ItineraryService::new(&db, &scheduler);
    match action {
        ItineraryAction::Add {
            trip_id,
            time,
            description,
            reminder,
            offset,
            severity,
        } => {
            let config = Config::load()?;
            let saved = service.save(ActivityDraft {
                id: None,
                trip_id,
                activity_time: parse_datetime(&time)?,
                description,
                has_reminder: reminder,
                reminder_offset: offset.unwrap_or(config.reminders.default_offset),
                alert_severity: parse_severity(&severity)?,
            })?;
            println!("activity {} created", saved.id);
            Ok(())
        }
        ItineraryAction::Edit {
            id,
            time,
            description,
            reminder,
            offset,
            severity,
        } => {
            let current = service.get(id)?;
            let saved = service.save(ActivityDraft {
                id: Some(id),
                trip_id: current.trip_id,
                activity_time: match time {
                    Some(t) => parse_datetime(&t)?,
                    None => current.activity_time,
                },
                description: description.unwrap_or(current.description),
                has_reminder: reminder.unwrap_or(current.has_reminder),
                reminder_offset: offset.unwrap_or(current.reminder_offset),
                alert_severity: match severity {
                    Some(s) => parse_severity(&s)?,
                    None => current.alert_severity,
                },
            })?;
            println!("activity {} updated", saved.id);
            Ok(())
        }
        ItineraryAction::Rm { id } => {
            service.delete(id)?;
            println!("activity {id} deleted");
            Ok(())
        }
        ItineraryAction::List { trip_id } => {
            for item in service.list(trip_id)? {
                let reminder = if item.has_reminder {
                    format!("  ({})", item.reminder_offset)
                } else {
                    String::new()
                };
                println!(
                    "{:>4}  {}  {}{}  [{}]",
                    item.id,
                    format_datetime(item.activity_time),
                    item.description,
                    reminder,
                    item.alert_severity.as_str(),
                );
            }
            Ok(())
        }
    }
}
