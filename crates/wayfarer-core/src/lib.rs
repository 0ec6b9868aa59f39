//! # Wayfarer Core Library
//!
//! Core business logic for Wayfarer, a personal trip organizer: accounts,
//! trips, timed itinerary activities with reminder notifications, and a
//! PIN-gated document vault. The CLI binary is a thin layer over this
//! library; a GUI host would sit on the same surface.
//!
//! ## Architecture
//!
//! - **ReminderScheduler**: turns itinerary state into zero-or-one deferred
//!   triggers per activity, with replace-on-register and
//!   cancel-then-schedule semantics; the platform is reached only through
//!   the `AlarmBackend`/`AlertSink` seams
//! - **PinGate**: bounded-retry PIN state machine guarding the document
//!   vault, with a credential-validated reset side channel
//! - **Storage**: SQLite persistence plus TOML configuration
//! - **ItineraryService**: validation and the save/delete orchestration
//!   that keeps triggers in lockstep with the store
//!
//! ## Key Components
//!
//! - [`ReminderScheduler`]: trigger registration and regeneration
//! - [`Dispatcher`]: fired-trigger presentation
//! - [`PinGate`]: vault access state machine
//! - [`Database`]: account/trip/itinerary/document persistence
//! - [`Config`]: application configuration

pub mod auth;
pub mod error;
pub mod events;
pub mod itinerary;
pub mod model;
pub mod pin;
pub mod reminder;
pub mod session;
pub mod storage;
pub mod trips;

pub use auth::Authenticator;
pub use error::{CoreError, DatabaseError, PinError, PlatformError, ValidationError};
pub use events::ChangeEvent;
pub use itinerary::{ActivityDraft, ItineraryService};
pub use model::{Account, AlertSeverity, Document, ItineraryActivity, Trip, TripKind};
pub use pin::{KeyringPinStore, MemoryPinStore, PinEvent, PinGate, PinPhase, PinScope};
pub use reminder::{
    Alert, AlarmBackend, AlertSink, Channel, Dispatcher, MemoryAlarms, MemoryAlerts,
    ReminderOffset, ReminderScheduler, ScheduledTrigger, TriggerPayload,
};
pub use session::Session;
pub use storage::{Config, Database};
pub use trips::TripDraft;
