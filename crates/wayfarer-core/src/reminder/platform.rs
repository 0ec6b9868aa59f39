//! Platform seams for deferred triggers and visible alerts.
//!
//! The scheduler talks to the host platform through two traits: an alarm
//! registry that holds deferred triggers, and an alert sink that renders
//! fired alerts. Both have in-memory implementations used by the tests and
//! the CLI host. Registry state is shared mutable and keyed by activity id;
//! the scheduler is its sole writer.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::PlatformError;

use super::dispatch::Alert;
use super::scheduler::ScheduledTrigger;

/// Deferred-trigger registry. At most one trigger per activity id;
/// registration under an existing key replaces the previous trigger.
pub trait AlarmBackend: Send + Sync {
    /// Register (or replace) the trigger under its activity id.
    fn register(&self, trigger: ScheduledTrigger) -> Result<(), PlatformError>;

    /// Remove the trigger for this id. Absence is not an error.
    fn cancel(&self, activity_id: i64) -> Result<(), PlatformError>;

    /// Snapshot of still-pending triggers, soonest first.
    fn pending(&self) -> Vec<ScheduledTrigger>;
}

/// Presentation surface for fired alerts. Alerts are deduplicated by
/// activity id: showing the same id again replaces, never stacks.
pub trait AlertSink: Send + Sync {
    fn show(&self, alert: Alert) -> Result<(), PlatformError>;

    /// Remove a still-visible alert. Absence is not an error.
    fn dismiss(&self, activity_id: i64);
}

/// In-memory alarm registry.
#[derive(Debug, Default)]
pub struct MemoryAlarms {
    inner: Mutex<HashMap<i64, ScheduledTrigger>>,
}

impl MemoryAlarms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every trigger whose fire time has passed,
    /// soonest first. This is the host's poll step: the caller hands the
    /// results to the dispatcher.
    pub fn take_due(&self, now: i64) -> Vec<ScheduledTrigger> {
        let mut map = self.inner.lock().expect("alarm registry poisoned");
        let due_ids: Vec<i64> = map
            .values()
            .filter(|t| t.fire_at <= now)
            .map(|t| t.activity_id)
            .collect();
        let mut due: Vec<ScheduledTrigger> =
            due_ids.iter().filter_map(|id| map.remove(id)).collect();
        due.sort_by_key(|t| t.fire_at);
        due
    }
}

impl AlarmBackend for MemoryAlarms {
    fn register(&self, trigger: ScheduledTrigger) -> Result<(), PlatformError> {
        let mut map = self.inner.lock().expect("alarm registry poisoned");
        map.insert(trigger.activity_id, trigger);
        Ok(())
    }

    fn cancel(&self, activity_id: i64) -> Result<(), PlatformError> {
        let mut map = self.inner.lock().expect("alarm registry poisoned");
        map.remove(&activity_id);
        Ok(())
    }

    fn pending(&self) -> Vec<ScheduledTrigger> {
        let map = self.inner.lock().expect("alarm registry poisoned");
        let mut pending: Vec<ScheduledTrigger> = map.values().cloned().collect();
        pending.sort_by_key(|t| t.fire_at);
        pending
    }
}

/// In-memory alert surface. Keeps the currently-visible alerts keyed by
/// activity id so tests can observe dedup and dismissal.
#[derive(Debug, Default)]
pub struct MemoryAlerts {
    inner: Mutex<HashMap<i64, Alert>>,
}

impl MemoryAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> Vec<Alert> {
        let map = self.inner.lock().expect("alert surface poisoned");
        let mut alerts: Vec<Alert> = map.values().cloned().collect();
        alerts.sort_by_key(|a| a.activity_id);
        alerts
    }
}

impl AlertSink for MemoryAlerts {
    fn show(&self, alert: Alert) -> Result<(), PlatformError> {
        let mut map = self.inner.lock().expect("alert surface poisoned");
        map.insert(alert.activity_id, alert);
        Ok(())
    }

    fn dismiss(&self, activity_id: i64) {
        let mut map = self.inner.lock().expect("alert surface poisoned");
        map.remove(&activity_id);
    }
}
