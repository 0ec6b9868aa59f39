//! Itinerary change stream.
//!
//! Every itinerary mutation produces a [`ChangeEvent`] on a broadcast
//! channel, so list views can stay live against the store instead of
//! re-querying on a timer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ItineraryActivity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChangeEvent {
    ActivitySaved {
        activity: ItineraryActivity,
        created: bool,
        at: DateTime<Utc>,
    },
    ActivityDeleted {
        activity_id: i64,
        trip_id: i64,
        at: DateTime<Utc>,
    },
}
