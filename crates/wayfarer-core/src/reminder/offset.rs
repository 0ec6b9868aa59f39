//! Reminder lead-time vocabulary.
//!
//! The user-facing labels are fixed and matched exactly, case-sensitively.
//! Anything unrecognized resolves to one hour, so a reminder is always
//! schedulable no matter what the stored label says.

use serde::{Deserialize, Serialize};

const MINUTE_MS: i64 = 60 * 1000;

/// Fixed set of reminder lead times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderOffset {
    Minutes15,
    Minutes30,
    Hour1,
    Hours2,
    Day1,
    Days2,
}

impl ReminderOffset {
    /// The fallback used for unrecognized labels.
    pub const DEFAULT: ReminderOffset = ReminderOffset::Hour1;

    /// Every variant, in menu order.
    pub const ALL: [ReminderOffset; 6] = [
        ReminderOffset::Minutes15,
        ReminderOffset::Minutes30,
        ReminderOffset::Hour1,
        ReminderOffset::Hours2,
        ReminderOffset::Day1,
        ReminderOffset::Days2,
    ];

    /// Exact, case-sensitive label match.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "15 minutos antes" => Some(ReminderOffset::Minutes15),
            "30 minutos antes" => Some(ReminderOffset::Minutes30),
            "1 hora antes" => Some(ReminderOffset::Hour1),
            "2 horas antes" => Some(ReminderOffset::Hours2),
            "1 día antes" => Some(ReminderOffset::Day1),
            "2 días antes" => Some(ReminderOffset::Days2),
            _ => None,
        }
    }

    /// Parse with the one-hour fallback for unknown labels.
    pub fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or(Self::DEFAULT)
    }

    pub fn label(self) -> &'static str {
        match self {
            ReminderOffset::Minutes15 => "15 minutos antes",
            ReminderOffset::Minutes30 => "30 minutos antes",
            ReminderOffset::Hour1 => "1 hora antes",
            ReminderOffset::Hours2 => "2 horas antes",
            ReminderOffset::Day1 => "1 día antes",
            ReminderOffset::Days2 => "2 días antes",
        }
    }

    pub fn minutes(self) -> i64 {
        match self {
            ReminderOffset::Minutes15 => 15,
            ReminderOffset::Minutes30 => 30,
            ReminderOffset::Hour1 => 60,
            ReminderOffset::Hours2 => 120,
            ReminderOffset::Day1 => 1440,
            ReminderOffset::Days2 => 2880,
        }
    }

    pub fn as_millis(self) -> i64 {
        self.minutes() * MINUTE_MS
    }
}

/// Absolute fire instant for an activity at `activity_time` (epoch millis)
/// with the given offset label.
pub fn fire_at(activity_time: i64, offset_label: &str) -> i64 {
    activity_time - ReminderOffset::from_label(offset_label).as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_maps_to_exact_minutes() {
        let expected = [
            ("15 minutos antes", 15),
            ("30 minutos antes", 30),
            ("1 hora antes", 60),
            ("2 horas antes", 120),
            ("1 día antes", 1440),
            ("2 días antes", 2880),
        ];
        for (label, minutes) in expected {
            assert_eq!(ReminderOffset::from_label(label).minutes(), minutes);
        }
    }

    #[test]
    fn unknown_labels_fall_back_to_one_hour() {
        for label in ["", "3 horas antes", "1 HORA ANTES", "1 hour before"] {
            assert_eq!(ReminderOffset::from_label(label), ReminderOffset::Hour1);
            assert!(ReminderOffset::parse(label).is_none());
        }
    }

    #[test]
    fn labels_round_trip() {
        for offset in ReminderOffset::ALL {
            assert_eq!(ReminderOffset::parse(offset.label()), Some(offset));
        }
    }

    #[test]
    fn fire_at_subtracts_offset_exactly() {
        let t = 1_700_000_000_000;
        assert_eq!(fire_at(t, "1 hora antes"), t - 60 * 60 * 1000);
        assert_eq!(fire_at(t, "2 días antes"), t - 2880 * 60 * 1000);
        // Unknown label behaves as one hour.
        assert_eq!(fire_at(t, "whenever"), t - 60 * 60 * 1000);
    }
}
