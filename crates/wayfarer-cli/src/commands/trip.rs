use clap::Subcommand;
use std::sync::Arc;
use wayfarer_core::{
    ItineraryService, MemoryAlarms, MemoryAlerts, ReminderScheduler, TripDraft, TripKind,
};

use super::common::{current_session, format_datetime, open_db, parse_datetime, CliResult};

#[derive(Subcommand)]
pub enum TripAction {
    /// Create a trip
    Add {
        destination: String,
        /// Start, YYYY-MM-DD HH:MM local time
        start: String,
        /// End, YYYY-MM-DD HH:MM local time
        end: String,
        /// "vacation" or "work"
        #[arg(long, default_value = "vacation")]
        kind: String,
    },
    /// List the logged-in account's trips
    List,
    /// Print one trip as JSON
    Show { id: i64 },
    /// Edit trip fields
    Edit {
        id: i64,
        #[arg(long)]
        destination: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        kind: Option<String>,
    },
    /// Delete a trip with its itinerary and documents
    Rm { id: i64 },
}

fn parse_kind(s: &str) -> Result<TripKind, Box<dyn std::error::Error>> {
    match s {
        "vacation" => Ok(TripKind::Vacation),
        "work" => Ok(TripKind::Work),
        other => Err(format!("unknown trip kind '{other}'; expected vacation or work").into()),
    }
}

pub fn run(action: TripAction) -> CliResult {
    let db = open_db()?;
    let session = current_session(&db)?;
    match action {
        TripAction::Add {
            destination,
            start,
            end,
            kind,
        } => {
            let trip = wayfarer_core::trips::save(
                &db,
                &session,
                TripDraft {
                    id: None,
                    destination,
                    start_date: parse_datetime(&start)?,
                    end_date: parse_datetime(&end)?,
                    kind: parse_kind(&kind)?,
                },
            )?;
            println!("trip {} created", trip.id);
            Ok(())
        }
        TripAction::List => {
            for trip in wayfarer_core::trips::list(&db, &session)? {
                println!(
                    "{:>4}  {}  {} .. {}  [{}]",
                    trip.id,
                    trip.destination,
                    format_datetime(trip.start_date),
                    format_datetime(trip.end_date),
                    trip.kind.as_str(),
                );
            }
            Ok(())
        }
        TripAction::Show { id } => {
            let trip = wayfarer_core::trips::get(&db, id)?;
            println!("{}", serde_json::to_string_pretty(&trip)?);
            Ok(())
        }
        TripAction::Edit {
            id,
            destination,
            start,
            end,
            kind,
        } => {
            let trip = wayfarer_core::trips::get(&db, id)?;
            let draft = TripDraft {
                id: Some(id),
                destination: destination.unwrap_or(trip.destination),
                start_date: match start {
                    Some(s) => parse_datetime(&s)?,
                    None => trip.start_date,
                },
                end_date: match end {
                    Some(s) => parse_datetime(&s)?,
                    None => trip.end_date,
                },
                kind: match kind {
                    Some(k) => parse_kind(&k)?,
                    None => trip.kind,
                },
            };
            wayfarer_core::trips::save(&db, &session, draft)?;
            println!("trip {id} updated");
            Ok(())
        }
        TripAction::Rm { id } => {
            let scheduler =
                ReminderScheduler::new(Arc::new(MemoryAlarms::new()), Arc::new(MemoryAlerts::new()));
            let itinerary = ItineraryService::new(&db, &scheduler);
            wayfarer_core::trips::delete(&db, &itinerary, id)?;
            println!("trip {id} deleted");
            Ok(())
        }
    }
}
