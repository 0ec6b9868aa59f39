//! Reminder scheduling.
//!
//! Translates itinerary-activity state into zero-or-one deferred triggers
//! per activity id. The registry key is the activity id; registration
//! replaces, cancellation is unconditional, and a reschedule is a strict
//! cancel-then-schedule sequence so a stale trigger can never survive an
//! edit.
//!
//! Every platform failure here is logged and swallowed. The data save an
//! operation accompanies must commit or fail on its own; reminder delivery
//! is best-effort.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::model::{AlertSeverity, ItineraryActivity};

use super::offset::fire_at;
use super::platform::{AlarmBackend, AlertSink};

/// Immutable payload carried by a registered trigger and delivered to the
/// dispatcher verbatim when it fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerPayload {
    pub activity_id: i64,
    pub trip_id: i64,
    pub description: String,
    pub alert_severity: AlertSeverity,
    /// Epoch milliseconds.
    pub activity_time: i64,
}

impl TriggerPayload {
    fn snapshot(activity: &ItineraryActivity) -> Self {
        Self {
            activity_id: activity.id,
            trip_id: activity.trip_id,
            description: activity.description.clone(),
            alert_severity: activity.alert_severity,
            activity_time: activity.activity_time,
        }
    }
}

/// A deferred trigger held by the platform registry. Derived state: never
/// persisted, always recomputable from its activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTrigger {
    pub activity_id: i64,
    /// Absolute fire instant, epoch milliseconds.
    pub fire_at: i64,
    pub payload: TriggerPayload,
}

/// Schedules, cancels and regenerates reminder triggers.
pub struct ReminderScheduler {
    alarms: Arc<dyn AlarmBackend>,
    alerts: Arc<dyn AlertSink>,
}

impl ReminderScheduler {
    pub fn new(alarms: Arc<dyn AlarmBackend>, alerts: Arc<dyn AlertSink>) -> Self {
        Self { alarms, alerts }
    }

    /// Register the trigger for an activity with an active reminder.
    ///
    /// A fire time already in the past is a silent no-op: a trigger must
    /// never fire for a moment that has passed. Registration under an
    /// already-used id replaces the previous trigger.
    pub fn schedule(&self, activity: &ItineraryActivity) {
        if !activity.has_reminder {
            tracing::debug!(activity_id = activity.id, "no reminder set; nothing to schedule");
            return;
        }

        let fire_at = fire_at(activity.activity_time, &activity.reminder_offset);
        if fire_at <= now_ms() {
            tracing::debug!(
                activity_id = activity.id,
                fire_at,
                "fire time already passed; skipping"
            );
            return;
        }

        let trigger = ScheduledTrigger {
            activity_id: activity.id,
            fire_at,
            payload: TriggerPayload::snapshot(activity),
        };
        match self.alarms.register(trigger) {
            Ok(()) => {
                tracing::debug!(activity_id = activity.id, fire_at, "trigger registered");
            }
            Err(e) => {
                tracing::warn!(
                    activity_id = activity.id,
                    error = %e,
                    "trigger registration refused by platform; reminder dropped"
                );
            }
        }
    }

    /// Remove any trigger under this id and dismiss a still-visible alert
    /// for it. Absence of either is not an error.
    pub fn cancel(&self, activity_id: i64) {
        if let Err(e) = self.alarms.cancel(activity_id) {
            tracing::warn!(activity_id, error = %e, "trigger cancellation refused by platform");
        }
        self.alerts.dismiss(activity_id);
        tracing::debug!(activity_id, "trigger cancelled");
    }

    /// Strict cancel-then-schedule. Not a diff: even when the new state
    /// carries no reminder, the cancel half has already run.
    pub fn reschedule(&self, activity: &ItineraryActivity) {
        self.cancel(activity.id);
        self.schedule(activity);
    }

    /// Orchestration hook for the itinerary save path.
    ///
    /// Create (`old` is None): schedule iff the new state has a reminder.
    /// Update: reschedule iff the new state has a reminder, else cancel.
    pub fn on_activity_saved(&self, old: Option<&ItineraryActivity>, new: &ItineraryActivity) {
        match old {
            None => {
                if new.has_reminder {
                    self.schedule(new);
                }
            }
            Some(_) => {
                if new.has_reminder {
                    self.reschedule(new);
                } else {
                    self.cancel(new.id);
                }
            }
        }
    }

    /// Orchestration hook for the itinerary delete path: always cancel,
    /// regardless of the prior reminder state.
    pub fn on_activity_deleted(&self, activity_id: i64) {
        self.cancel(activity_id);
    }

    /// Recompute every pending trigger from persisted activities -- the
    /// recovery path after a device restart, where the registry is empty
    /// but the activities survived. Returns how many triggers were
    /// registered.
    pub fn restore_all(&self, activities: &[ItineraryActivity]) -> usize {
        let before = self.alarms.pending().len();
        for activity in activities {
            self.schedule(activity);
        }
        let registered = self.alarms.pending().len().saturating_sub(before);
        tracing::info!(registered, "pending triggers restored");
        registered
    }

    /// Snapshot of still-pending triggers, soonest first.
    pub fn pending(&self) -> Vec<ScheduledTrigger> {
        self.alarms.pending()
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::reminder::platform::{MemoryAlarms, MemoryAlerts};

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn activity(id: i64, activity_time: i64, offset: &str) -> ItineraryActivity {
        ItineraryActivity {
            id,
            trip_id: 1,
            activity_time,
            description: "Museo de Bellas Artes".into(),
            has_reminder: true,
            reminder_offset: offset.into(),
            alert_severity: AlertSeverity::Normal,
        }
    }

    fn scheduler() -> (ReminderScheduler, Arc<MemoryAlarms>, Arc<MemoryAlerts>) {
        let alarms = Arc::new(MemoryAlarms::new());
        let alerts = Arc::new(MemoryAlerts::new());
        let scheduler = ReminderScheduler::new(alarms.clone(), alerts.clone());
        (scheduler, alarms, alerts)
    }

    #[test]
    fn schedules_one_hour_before_activity() {
        let (scheduler, _, _) = scheduler();
        // Saved two hours ahead of the activity; fire time lands one hour out.
        let t = now_ms() + 2 * HOUR_MS;
        scheduler.schedule(&activity(1, t, "1 hora antes"));

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, t - HOUR_MS);
        assert_eq!(pending[0].payload.trip_id, 1);
    }

    #[test]
    fn reminderless_activity_registers_nothing() {
        let (scheduler, _, _) = scheduler();
        let mut a = activity(1, now_ms() + 2 * HOUR_MS, "1 hora antes");
        a.has_reminder = false;
        scheduler.schedule(&a);
        scheduler.on_activity_saved(None, &a);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn past_fire_time_is_a_silent_noop() {
        let (scheduler, _, _) = scheduler();
        // Activity is 30 minutes out but the offset reaches back an hour.
        scheduler.schedule(&activity(1, now_ms() + HOUR_MS / 2, "1 hora antes"));
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn registration_is_idempotent_per_key() {
        let (scheduler, _, _) = scheduler();
        let t = now_ms() + 4 * HOUR_MS;
        scheduler.schedule(&activity(1, t, "1 hora antes"));
        scheduler.schedule(&activity(1, t, "2 horas antes"));

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, t - 2 * HOUR_MS);
    }

    #[test]
    fn cancel_is_unconditional_and_idempotent() {
        let (scheduler, _, _) = scheduler();
        scheduler.cancel(99); // nothing registered: still fine
        let t = now_ms() + 2 * HOUR_MS;
        scheduler.schedule(&activity(1, t, "1 hora antes"));
        scheduler.reschedule(&activity(1, t, "30 minutos antes"));
        scheduler.cancel(1);
        scheduler.cancel(1);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn cancel_dismisses_visible_alert() {
        let (scheduler, alarms, alerts) = scheduler();
        let t = now_ms() + 2 * HOUR_MS;
        scheduler.schedule(&activity(1, t, "1 hora antes"));

        // Simulate the trigger firing and the alert being shown.
        let trigger = alarms.pending().remove(0);
        crate::reminder::Dispatcher::new(alerts.clone()).fire(&trigger.payload);
        assert_eq!(alerts.visible().len(), 1);

        scheduler.cancel(1);
        assert!(alerts.visible().is_empty());
    }

    #[test]
    fn update_without_reminder_cancels() {
        let (scheduler, _, _) = scheduler();
        let t = now_ms() + 2 * HOUR_MS;
        let old = activity(1, t, "1 hora antes");
        scheduler.on_activity_saved(None, &old);
        assert_eq!(scheduler.pending().len(), 1);

        let mut edited = old.clone();
        edited.has_reminder = false;
        scheduler.on_activity_saved(Some(&old), &edited);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn delete_always_cancels() {
        let (scheduler, _, _) = scheduler();
        let t = now_ms() + 2 * HOUR_MS;
        scheduler.on_activity_saved(None, &activity(1, t, "1 hora antes"));
        scheduler.on_activity_deleted(1);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn restore_all_skips_past_and_reminderless() {
        let (scheduler, _, _) = scheduler();
        let future = activity(1, now_ms() + 3 * HOUR_MS, "1 hora antes");
        let stale = activity(2, now_ms() - HOUR_MS, "15 minutos antes");
        let mut silent = activity(3, now_ms() + 3 * HOUR_MS, "1 hora antes");
        silent.has_reminder = false;

        let registered = scheduler.restore_all(&[future, stale, silent]);
        assert_eq!(registered, 1);
        assert_eq!(scheduler.pending()[0].activity_id, 1);
    }

    /// An alarm backend that refuses everything, standing in for a revoked
    /// exact-alarm capability.
    struct DeniedAlarms;

    impl AlarmBackend for DeniedAlarms {
        fn register(&self, _trigger: ScheduledTrigger) -> Result<(), PlatformError> {
            Err(PlatformError::PermissionDenied("exact alarms".into()))
        }
        fn cancel(&self, _activity_id: i64) -> Result<(), PlatformError> {
            Err(PlatformError::PermissionDenied("exact alarms".into()))
        }
        fn pending(&self) -> Vec<ScheduledTrigger> {
            Vec::new()
        }
    }

    #[test]
    fn permission_denial_never_reaches_the_caller() {
        let scheduler =
            ReminderScheduler::new(Arc::new(DeniedAlarms), Arc::new(MemoryAlerts::new()));
        // Both paths log-and-swallow; neither panics nor errors.
        scheduler.schedule(&activity(1, now_ms() + 2 * HOUR_MS, "1 hora antes"));
        scheduler.cancel(1);
        assert!(scheduler.pending().is_empty());
    }
}
