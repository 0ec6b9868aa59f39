//! Reminder scheduling subsystem.
//!
//! A trigger's life: `scheduled -> fired -> dismissed`, with
//! `scheduled -> cancelled` as the alternate terminal reached through
//! [`ReminderScheduler::cancel`]. The scheduler owns registration and
//! cancellation; the [`Dispatcher`] owns the fire step; the host (tests,
//! the CLI poll loop, or a real platform alarm service) connects the two.

pub mod dispatch;
pub mod offset;
pub mod platform;
pub mod scheduler;

pub use dispatch::{Alert, Channel, Dispatcher};
pub use offset::{fire_at, ReminderOffset};
pub use platform::{AlarmBackend, AlertSink, MemoryAlarms, MemoryAlerts};
pub use scheduler::{ReminderScheduler, ScheduledTrigger, TriggerPayload};
