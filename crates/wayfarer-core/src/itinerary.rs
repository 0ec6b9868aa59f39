//! Itinerary editing service.
//!
//! Owns the save/delete orchestration: validate, persist, then hand the
//! old/new pair to the reminder scheduler. Persistence and trigger
//! registration are independent resources -- a platform refusal on the
//! scheduling side never rolls back the save.

use chrono::Utc;
use tokio::sync::broadcast;

use crate::error::{CoreError, Result, ValidationError};
use crate::events::ChangeEvent;
use crate::model::{
    AlertSeverity, ItineraryActivity, Trip, MAX_DESCRIPTION_LEN, TRIP_WINDOW_SLACK_MS,
};
use crate::reminder::ReminderScheduler;
use crate::storage::Database;

/// Editable fields of an activity; `id` is None on create.
#[derive(Debug, Clone)]
pub struct ActivityDraft {
    pub id: Option<i64>,
    pub trip_id: i64,
    pub activity_time: i64,
    pub description: String,
    pub has_reminder: bool,
    pub reminder_offset: String,
    pub alert_severity: AlertSeverity,
}

pub struct ItineraryService<'a> {
    db: &'a Database,
    scheduler: &'a ReminderScheduler,
    events: broadcast::Sender<ChangeEvent>,
}

impl<'a> ItineraryService<'a> {
    pub fn new(db: &'a Database, scheduler: &'a ReminderScheduler) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            db,
            scheduler,
            events,
        }
    }

    /// Subscribe to the change stream backing live list views.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    pub fn list(&self, trip_id: i64) -> Result<Vec<ItineraryActivity>> {
        Ok(self.db.activities_by_trip(trip_id)?)
    }

    pub fn get(&self, activity_id: i64) -> Result<ItineraryActivity> {
        self.db
            .activity_by_id(activity_id)?
            .ok_or(CoreError::NotFound {
                what: "activity",
                id: activity_id,
            })
    }

    /// Validate and persist a draft, then recompute its reminder trigger.
    ///
    /// Validation failures abort before anything is written. The reminder
    /// offset is blanked when the reminder is off, so a stale label never
    /// outlives the checkbox.
    pub fn save(&self, draft: ActivityDraft) -> Result<ItineraryActivity> {
        let trip = self
            .db
            .trip_by_id(draft.trip_id)?
            .ok_or(CoreError::NotFound {
                what: "trip",
                id: draft.trip_id,
            })?;

        let description = draft.description.trim().to_string();
        validate(&description, draft.activity_time, &trip)?;

        let old = match draft.id {
            Some(id) => Some(self.get(id)?),
            None => None,
        };

        let mut activity = ItineraryActivity {
            id: draft.id.unwrap_or(0),
            trip_id: draft.trip_id,
            activity_time: draft.activity_time,
            description,
            has_reminder: draft.has_reminder,
            reminder_offset: if draft.has_reminder {
                draft.reminder_offset
            } else {
                String::new()
            },
            alert_severity: draft.alert_severity,
        };

        match draft.id {
            None => activity.id = self.db.insert_activity(&activity)?,
            Some(_) => {
                self.db.update_activity(&activity)?;
            }
        }

        self.scheduler.on_activity_saved(old.as_ref(), &activity);
        let _ = self.events.send(ChangeEvent::ActivitySaved {
            activity: activity.clone(),
            created: old.is_none(),
            at: Utc::now(),
        });
        Ok(activity)
    }

    /// Delete an activity and cancel its trigger, whatever its reminder
    /// state was.
    pub fn delete(&self, activity_id: i64) -> Result<()> {
        let activity = self.get(activity_id)?;
        self.db.delete_activity(activity_id)?;
        self.scheduler.on_activity_deleted(activity_id);
        let _ = self.events.send(ChangeEvent::ActivityDeleted {
            activity_id,
            trip_id: activity.trip_id,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Remove a trip's whole itinerary, cancelling each trigger first.
    pub fn delete_by_trip(&self, trip_id: i64) -> Result<usize> {
        let items = self.db.activities_by_trip(trip_id)?;
        for item in &items {
            self.scheduler.on_activity_deleted(item.id);
        }
        let n = self.db.delete_activities_by_trip(trip_id)?;
        for item in &items {
            let _ = self.events.send(ChangeEvent::ActivityDeleted {
                activity_id: item.id,
                trip_id,
                at: Utc::now(),
            });
        }
        Ok(n)
    }

    /// Boot-time recovery: regenerate every pending trigger from the
    /// persisted activities. Returns how many were registered.
    pub fn restore_reminders(&self) -> Result<usize> {
        let activities = self.db.activities_with_reminders()?;
        Ok(self.scheduler.restore_all(&activities))
    }
}

fn validate(description: &str, activity_time: i64, trip: &Trip) -> Result<()> {
    if description.is_empty() {
        return Err(ValidationError::DescriptionEmpty.into());
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            len,
            max: MAX_DESCRIPTION_LEN,
        }
        .into());
    }

    let window_start = trip.start_date - TRIP_WINDOW_SLACK_MS;
    let window_end = trip.end_date + TRIP_WINDOW_SLACK_MS;
    if activity_time < window_start || activity_time > window_end {
        return Err(ValidationError::OutsideTripWindow {
            activity_time,
            window_start,
            window_end,
        }
        .into());
    }
    Ok(())
}
