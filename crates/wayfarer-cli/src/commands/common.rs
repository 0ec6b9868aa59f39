//! Shared plumbing for the command handlers.

use chrono::{Local, NaiveDateTime, TimeZone};
use wayfarer_core::{Database, Session};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// kv key remembering who is logged in between invocations.
pub const SESSION_KEY: &str = "session.username";

pub fn open_db() -> Result<Database, Box<dyn std::error::Error>> {
    Ok(Database::open()?)
}

/// The session persisted by `auth login`.
pub fn current_session(db: &Database) -> Result<Session, Box<dyn std::error::Error>> {
    match db.kv_get(SESSION_KEY)? {
        Some(username) => Ok(Session::new(username)),
        None => Err("not logged in; run `wayfarer-cli auth login` first".into()),
    }
}

/// Parse "YYYY-MM-DD HH:MM" in local time into epoch milliseconds.
pub fn parse_datetime(s: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .map_err(|_| format!("invalid date-time '{s}'; expected YYYY-MM-DD HH:MM"))?;
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("ambiguous local time '{s}'"))?;
    Ok(local.timestamp_millis())
}

/// Epoch milliseconds rendered as local "YYYY-MM-DD HH:MM".
pub fn format_datetime(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => format!("@{ms}"),
    }
}
