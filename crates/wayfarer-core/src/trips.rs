//! Trip editing and cascade deletion.

use crate::error::{CoreError, Result, ValidationError};
use crate::itinerary::ItineraryService;
use crate::model::{Trip, TripKind};
use crate::session::Session;
use crate::storage::Database;

/// Editable fields of a trip; `id` is None on create.
#[derive(Debug, Clone)]
pub struct TripDraft {
    pub id: Option<i64>,
    pub destination: String,
    pub start_date: i64,
    pub end_date: i64,
    pub kind: TripKind,
}

/// Validate and persist a trip for the session owner.
pub fn save(db: &Database, session: &Session, draft: TripDraft) -> Result<Trip> {
    if draft.end_date < draft.start_date {
        return Err(ValidationError::InvalidTripDates {
            start: draft.start_date,
            end: draft.end_date,
        }
        .into());
    }

    let mut trip = Trip {
        id: draft.id.unwrap_or(0),
        destination: draft.destination.trim().to_string(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        kind: draft.kind,
        username: session.username.clone(),
    };

    match draft.id {
        None => trip.id = db.insert_trip(&trip)?,
        Some(id) => {
            if !db.update_trip(&trip)? {
                return Err(CoreError::NotFound { what: "trip", id });
            }
        }
    }
    Ok(trip)
}

pub fn get(db: &Database, trip_id: i64) -> Result<Trip> {
    db.trip_by_id(trip_id)?.ok_or(CoreError::NotFound {
        what: "trip",
        id: trip_id,
    })
}

pub fn list(db: &Database, session: &Session) -> Result<Vec<Trip>> {
    Ok(db.trips_by_user(&session.username)?)
}

/// Delete a trip together with its itinerary (cancelling every reminder
/// trigger) and its vault documents.
pub fn delete(db: &Database, itinerary: &ItineraryService<'_>, trip_id: i64) -> Result<()> {
    if db.trip_by_id(trip_id)?.is_none() {
        return Err(CoreError::NotFound {
            what: "trip",
            id: trip_id,
        });
    }
    itinerary.delete_by_trip(trip_id)?;
    db.delete_documents_by_trip(trip_id)?;
    db.delete_trip(trip_id)?;
    Ok(())
}
