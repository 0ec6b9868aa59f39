//! Reminder host loop for the CLI.
//!
//! A CLI process has no resident alarm service, so delivery is poll-driven:
//! `remind check` advances a cursor over fire times and pushes anything
//! that came due through the dispatcher onto a console alert sink. A GUI
//! host would instead keep a `ReminderScheduler` over a real platform
//! backend resident.

use clap::Subcommand;
use std::sync::Arc;

use wayfarer_core::reminder::fire_at;
use wayfarer_core::{
    AlarmBackend, Alert, AlertSink, Config, Dispatcher, ItineraryService, MemoryAlarms,
    MemoryAlerts, PlatformError, ReminderScheduler, TriggerPayload,
};

use super::common::{format_datetime, open_db, CliResult};

/// kv cursor: fire times at or before this instant have been delivered.
const CURSOR_KEY: &str = "remind.last_check";

#[derive(Subcommand)]
pub enum RemindAction {
    /// List upcoming reminders in fire order
    List,
    /// Deliver every reminder that came due since the last check
    Check,
}

/// Renders alerts on stdout, one line per notification.
struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn show(&self, alert: Alert) -> Result<(), PlatformError> {
        println!(
            "[{}] {}: {} (activity {}, trip {}, at {})",
            alert.channel.id(),
            alert.title,
            alert.body,
            alert.activity_id,
            alert.trip_id,
            format_datetime(alert.activity_time),
        );
        Ok(())
    }

    fn dismiss(&self, _activity_id: i64) {}
}

pub fn run(action: RemindAction) -> CliResult {
    let db = open_db()?;
    match action {
        RemindAction::List => {
            let now = chrono::Utc::now().timestamp_millis();
            let mut upcoming: Vec<(i64, wayfarer_core::ItineraryActivity)> = db
                .activities_with_reminders()?
                .into_iter()
                .map(|a| (fire_at(a.activity_time, &a.reminder_offset), a))
                .filter(|(at, _)| *at > now)
                .collect();
            upcoming.sort_by_key(|(at, _)| *at);
            for (at, activity) in upcoming {
                println!(
                    "{}  {} (activity {}, trip {})",
                    format_datetime(at),
                    activity.description,
                    activity.id,
                    activity.trip_id,
                );
            }
            Ok(())
        }
        RemindAction::Check => {
            let config = Config::load()?;
            if !config.notifications.enabled {
                tracing::info!("notifications disabled in config; skipping delivery");
                return Ok(());
            }

            let now = chrono::Utc::now().timestamp_millis();
            let since: i64 = db
                .kv_get(CURSOR_KEY)?
                .and_then(|v| v.parse().ok())
                .unwrap_or(now);

            let dispatcher = Dispatcher::new(Arc::new(ConsoleAlerts));
            let mut delivered = 0usize;
            for activity in db.activities_with_reminders()? {
                let at = fire_at(activity.activity_time, &activity.reminder_offset);
                if at > since && at <= now {
                    dispatcher.fire(&TriggerPayload {
                        activity_id: activity.id,
                        trip_id: activity.trip_id,
                        description: activity.description.clone(),
                        alert_severity: activity.alert_severity,
                        activity_time: activity.activity_time,
                    });
                    delivered += 1;
                }
            }

            db.kv_set(CURSOR_KEY, &now.to_string())?;
            println!("{delivered} reminder(s) delivered");
            Ok(())
        }
    }
}

/// `wayfarer-cli boot`: regenerate pending triggers from stored activities,
/// the restart-recovery path.
pub fn boot() -> CliResult {
    let db = open_db()?;
    let alarms = Arc::new(MemoryAlarms::new());
    let scheduler = ReminderScheduler::new(alarms.clone(), Arc::new(MemoryAlerts::new()));
    let service = ItineraryService::new(&db, &scheduler);
    let registered = service.restore_reminders()?;
    println!("{registered} pending trigger(s) restored");
    for trigger in alarms.pending() {
        println!(
            "  {}  activity {} (trip {})",
            format_datetime(trigger.fire_at),
            trigger.activity_id,
            trigger.payload.trip_id,
        );
    }
    Ok(())
}
