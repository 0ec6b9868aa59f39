//! Domain records shared across the crate.
//!
//! Timestamps are epoch milliseconds (`i64`) throughout -- the same unit the
//! platform alarm registry speaks -- with `chrono` used at the edges for
//! parsing and display.

use serde::{Deserialize, Serialize};

/// Maximum length of an itinerary activity description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Slack around a trip's date range inside which activities may fall.
pub const TRIP_WINDOW_SLACK_MS: i64 = 3 * 24 * 60 * 60 * 1000;

/// A registered account. Credentials are stored and compared verbatim;
/// the [`crate::auth::Authenticator`] trait is the seam where a hashed
/// backend would plug in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TripKind {
    Vacation,
    Work,
}

impl TripKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TripKind::Vacation => "VACATION",
            TripKind::Work => "WORK",
        }
    }

    /// Parse the stored column value. Unknown values fall back to Vacation.
    pub fn from_db(s: &str) -> Self {
        match s {
            "WORK" => TripKind::Work,
            _ => TripKind::Vacation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub destination: String,
    /// Epoch milliseconds.
    pub start_date: i64,
    /// Epoch milliseconds.
    pub end_date: i64,
    pub kind: TripKind,
    /// Owning account.
    pub username: String,
}

/// Presentation priority of a reminder alert. Affects which notification
/// channel the alert is rendered on, never the scheduling arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Normal,
    Important,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Normal => "NORMAL",
            AlertSeverity::Important => "IMPORTANT",
        }
    }

    /// Parse the stored column value. Unknown values fall back to Normal.
    pub fn from_db(s: &str) -> Self {
        match s {
            "IMPORTANT" => AlertSeverity::Important,
            _ => AlertSeverity::Normal,
        }
    }
}

/// A timed entry in a trip's itinerary.
///
/// `reminder_offset` is only meaningful while `has_reminder` is set; the
/// save path blanks it otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryActivity {
    pub id: i64,
    pub trip_id: i64,
    /// When the activity occurs, epoch milliseconds.
    pub activity_time: i64,
    pub description: String,
    pub has_reminder: bool,
    /// Human-readable lead-time label, e.g. "1 hora antes".
    pub reminder_offset: String,
    pub alert_severity: AlertSeverity,
}

/// A file attached to a trip, held behind the PIN-gated vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub trip_id: i64,
    pub title: String,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_round_trips_and_defaults() {
        assert_eq!(AlertSeverity::from_db("IMPORTANT"), AlertSeverity::Important);
        assert_eq!(AlertSeverity::from_db("NORMAL"), AlertSeverity::Normal);
        assert_eq!(AlertSeverity::from_db("bogus"), AlertSeverity::Normal);
        assert_eq!(AlertSeverity::Important.as_str(), "IMPORTANT");
    }

    #[test]
    fn trip_kind_from_db() {
        assert_eq!(TripKind::from_db("WORK"), TripKind::Work);
        assert_eq!(TripKind::from_db("anything"), TripKind::Vacation);
    }
}
