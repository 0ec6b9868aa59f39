//! Fired-trigger dispatch.
//!
//! When a deferred trigger fires, the dispatcher reads the immutable payload
//! it was registered with, resolves a presentation channel from the alert
//! severity and hands a fully-built alert to the sink. A denied display
//! permission is logged and swallowed; delivery is best-effort.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::model::AlertSeverity;

use super::platform::AlertSink;
use super::scheduler::TriggerPayload;

/// The two fixed presentation channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Normal,
    Important,
}

impl Channel {
    /// The one severity-to-channel mapping. Severity affects presentation
    /// only; scheduling never looks at it.
    pub fn for_severity(severity: AlertSeverity) -> Self {
        match severity {
            AlertSeverity::Normal => Channel::Normal,
            AlertSeverity::Important => Channel::Important,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Channel::Normal => "itinerary_reminders_normal",
            Channel::Important => "itinerary_reminders_important",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Channel::Normal => "Recordatorios de Itinerario",
            Channel::Important => "Recordatorios Importantes",
        }
    }

    /// Vibration pattern in milliseconds (delay, on, off, on).
    pub fn vibration_pattern(self) -> &'static [u64] {
        match self {
            Channel::Normal => &[0, 250, 250, 250],
            Channel::Important => &[0, 500, 250, 500],
        }
    }

    fn title(self) -> &'static str {
        match self {
            Channel::Normal => "Recordatorio de Actividad",
            Channel::Important => "Recordatorio Importante",
        }
    }
}

/// A user-visible alert. `activity_id` doubles as the dedup key; tapping
/// the alert hands `activity_id` and `trip_id` back to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub activity_id: i64,
    pub trip_id: i64,
    pub title: String,
    pub body: String,
    pub channel: Channel,
    /// When the underlying activity occurs, epoch milliseconds.
    pub activity_time: i64,
}

/// Turns fired triggers into alerts.
pub struct Dispatcher {
    sink: Arc<dyn AlertSink>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Render the alert for a fired trigger payload.
    ///
    /// Display failures never propagate: the platform refusing to show a
    /// notification must not disturb the caller.
    pub fn fire(&self, payload: &TriggerPayload) {
        let channel = Channel::for_severity(payload.alert_severity);
        let alert = Alert {
            activity_id: payload.activity_id,
            trip_id: payload.trip_id,
            title: channel.title().to_string(),
            body: payload.description.clone(),
            channel,
            activity_time: payload.activity_time,
        };
        if let Err(e) = self.sink.show(alert) {
            tracing::warn!(
                activity_id = payload.activity_id,
                error = %e,
                "alert display refused by platform; dropping"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::platform::MemoryAlerts;

    fn payload(id: i64, severity: AlertSeverity) -> TriggerPayload {
        TriggerPayload {
            activity_id: id,
            trip_id: 7,
            description: "Check in at hotel".into(),
            alert_severity: severity,
            activity_time: 1_700_000_000_000,
        }
    }

    #[test]
    fn severity_picks_channel_and_pattern() {
        let normal = Channel::for_severity(AlertSeverity::Normal);
        let important = Channel::for_severity(AlertSeverity::Important);
        assert_eq!(normal.id(), "itinerary_reminders_normal");
        assert_eq!(important.id(), "itinerary_reminders_important");
        assert_eq!(normal.vibration_pattern(), &[0, 250, 250, 250]);
        assert_eq!(important.vibration_pattern(), &[0, 500, 250, 500]);
    }

    #[test]
    fn fire_renders_alert_with_payload_fields() {
        let sink = Arc::new(MemoryAlerts::new());
        let dispatcher = Dispatcher::new(sink.clone());
        dispatcher.fire(&payload(3, AlertSeverity::Important));

        let visible = sink.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].activity_id, 3);
        assert_eq!(visible[0].trip_id, 7);
        assert_eq!(visible[0].channel, Channel::Important);
        assert_eq!(visible[0].body, "Check in at hotel");
    }

    #[test]
    fn refiring_same_id_replaces_instead_of_stacking() {
        let sink = Arc::new(MemoryAlerts::new());
        let dispatcher = Dispatcher::new(sink.clone());
        dispatcher.fire(&payload(3, AlertSeverity::Normal));
        dispatcher.fire(&payload(3, AlertSeverity::Important));

        let visible = sink.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].channel, Channel::Important);
    }
}
