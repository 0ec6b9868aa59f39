//! SQLite-backed persistence.
//!
//! One connection, one file (`~/.config/wayfarer/wayfarer.db`), five tables:
//! accounts, trips, itinerary items, documents and a key-value store for
//! small bits of application state (CLI session, poll cursors, PIN attempt
//! counters).

use rusqlite::{params, Connection, Row};

use crate::error::DatabaseError;
use crate::model::{Account, AlertSeverity, Document, ItineraryActivity, Trip, TripKind};

use super::data_dir;

/// SQLite database for accounts, trips, itineraries and documents.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/wayfarer/wayfarer.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, crate::error::CoreError> {
        let path = data_dir()?.join("wayfarer.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (creating if needed) a database at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (tests and throwaway sessions).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                username TEXT PRIMARY KEY,
                password TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS trips (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                destination TEXT NOT NULL,
                start_date  INTEGER NOT NULL,
                end_date    INTEGER NOT NULL,
                kind        TEXT NOT NULL,
                username    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS itinerary_items (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                trip_id         INTEGER NOT NULL,
                activity_time   INTEGER NOT NULL,
                description     TEXT NOT NULL,
                has_reminder    INTEGER NOT NULL DEFAULT 0,
                reminder_offset TEXT NOT NULL DEFAULT '',
                alert_severity  TEXT NOT NULL DEFAULT 'NORMAL'
            );

            CREATE TABLE IF NOT EXISTS documents (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                trip_id    INTEGER NOT NULL,
                title      TEXT NOT NULL,
                file_name  TEXT NOT NULL,
                file_path  TEXT NOT NULL,
                file_type  TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Indexes for the list-by-X query patterns
            CREATE INDEX IF NOT EXISTS idx_trips_username ON trips(username, start_date);
            CREATE INDEX IF NOT EXISTS idx_itinerary_trip ON itinerary_items(trip_id, activity_time);
            CREATE INDEX IF NOT EXISTS idx_itinerary_reminder ON itinerary_items(has_reminder);
            CREATE INDEX IF NOT EXISTS idx_documents_trip ON documents(trip_id);",
        )?;
        Ok(())
    }

    // ── Accounts ─────────────────────────────────────────────────────

    /// Register a new account. Returns false if the username is taken.
    pub fn insert_account(&self, account: &Account) -> Result<bool, DatabaseError> {
        let n = self.conn.execute(
            "INSERT OR IGNORE INTO accounts (username, password) VALUES (?1, ?2)",
            params![account.username, account.password],
        )?;
        Ok(n > 0)
    }

    /// Credential check: returns the account only when both username and
    /// password match. Comparison is verbatim, as stored.
    pub fn login(&self, username: &str, password: &str) -> Result<Option<Account>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT username, password FROM accounts WHERE username = ?1 AND password = ?2",
        )?;
        let result = stmt.query_row(params![username, password], |row| {
            Ok(Account {
                username: row.get(0)?,
                password: row.get(1)?,
            })
        });
        match result {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn account_exists(&self, username: &str) -> Result<bool, DatabaseError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ── Trips ────────────────────────────────────────────────────────

    pub fn insert_trip(&self, trip: &Trip) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO trips (destination, start_date, end_date, kind, username)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.kind.as_str(),
                trip.username,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_trip(&self, trip: &Trip) -> Result<bool, DatabaseError> {
        let n = self.conn.execute(
            "UPDATE trips SET destination = ?1, start_date = ?2, end_date = ?3, kind = ?4
             WHERE id = ?5",
            params![
                trip.destination,
                trip.start_date,
                trip.end_date,
                trip.kind.as_str(),
                trip.id,
            ],
        )?;
        Ok(n > 0)
    }

    pub fn delete_trip(&self, trip_id: i64) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM trips WHERE id = ?1", params![trip_id])?;
        Ok(n > 0)
    }

    pub fn trip_by_id(&self, trip_id: i64) -> Result<Option<Trip>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, destination, start_date, end_date, kind, username
             FROM trips WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![trip_id], row_to_trip);
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn trips_by_user(&self, username: &str) -> Result<Vec<Trip>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, destination, start_date, end_date, kind, username
             FROM trips WHERE username = ?1 ORDER BY start_date ASC",
        )?;
        let rows = stmt.query_map(params![username], row_to_trip)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ── Itinerary items ──────────────────────────────────────────────

    pub fn insert_activity(&self, item: &ItineraryActivity) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO itinerary_items
               (trip_id, activity_time, description, has_reminder, reminder_offset, alert_severity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.trip_id,
                item.activity_time,
                item.description,
                item.has_reminder,
                item.reminder_offset,
                item.alert_severity.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_activity(&self, item: &ItineraryActivity) -> Result<bool, DatabaseError> {
        let n = self.conn.execute(
            "UPDATE itinerary_items
             SET activity_time = ?1, description = ?2, has_reminder = ?3,
                 reminder_offset = ?4, alert_severity = ?5
             WHERE id = ?6",
            params![
                item.activity_time,
                item.description,
                item.has_reminder,
                item.reminder_offset,
                item.alert_severity.as_str(),
                item.id,
            ],
        )?;
        Ok(n > 0)
    }

    pub fn delete_activity(&self, activity_id: i64) -> Result<bool, DatabaseError> {
        let n = self.conn.execute(
            "DELETE FROM itinerary_items WHERE id = ?1",
            params![activity_id],
        )?;
        Ok(n > 0)
    }

    pub fn activity_by_id(
        &self,
        activity_id: i64,
    ) -> Result<Option<ItineraryActivity>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, activity_time, description, has_reminder,
                    reminder_offset, alert_severity
             FROM itinerary_items WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![activity_id], row_to_activity);
        match result {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn activities_by_trip(
        &self,
        trip_id: i64,
    ) -> Result<Vec<ItineraryActivity>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, activity_time, description, has_reminder,
                    reminder_offset, alert_severity
             FROM itinerary_items WHERE trip_id = ?1 ORDER BY activity_time ASC",
        )?;
        let rows = stmt.query_map(params![trip_id], row_to_activity)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every activity with an active reminder, across all trips. Feeds the
    /// boot-time trigger regeneration: durable trigger state is never
    /// persisted, only the activities are.
    pub fn activities_with_reminders(&self) -> Result<Vec<ItineraryActivity>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, activity_time, description, has_reminder,
                    reminder_offset, alert_severity
             FROM itinerary_items WHERE has_reminder = 1 ORDER BY activity_time ASC",
        )?;
        let rows = stmt.query_map([], row_to_activity)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_activities_by_trip(&self, trip_id: i64) -> Result<usize, DatabaseError> {
        let n = self.conn.execute(
            "DELETE FROM itinerary_items WHERE trip_id = ?1",
            params![trip_id],
        )?;
        Ok(n)
    }

    // ── Documents ────────────────────────────────────────────────────

    pub fn insert_document(&self, doc: &Document) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO documents (trip_id, title, file_name, file_path, file_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                doc.trip_id,
                doc.title,
                doc.file_name,
                doc.file_path,
                doc.file_type,
                doc.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_document(&self, doc: &Document) -> Result<bool, DatabaseError> {
        let n = self.conn.execute(
            "UPDATE documents SET title = ?1, file_name = ?2, file_path = ?3, file_type = ?4
             WHERE id = ?5",
            params![doc.title, doc.file_name, doc.file_path, doc.file_type, doc.id],
        )?;
        Ok(n > 0)
    }

    pub fn delete_document(&self, document_id: i64) -> Result<bool, DatabaseError> {
        let n = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1", params![document_id])?;
        Ok(n > 0)
    }

    pub fn document_by_id(&self, document_id: i64) -> Result<Option<Document>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, title, file_name, file_path, file_type, created_at
             FROM documents WHERE id = ?1",
        )?;
        let result = stmt.query_row(params![document_id], row_to_document);
        match result {
            Ok(d) => Ok(Some(d)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn documents_by_trip(&self, trip_id: i64) -> Result<Vec<Document>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, trip_id, title, file_name, file_path, file_type, created_at
             FROM documents WHERE trip_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![trip_id], row_to_document)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_documents_by_trip(&self, trip_id: i64) -> Result<usize, DatabaseError> {
        let n = self.conn.execute(
            "DELETE FROM documents WHERE trip_id = ?1",
            params![trip_id],
        )?;
        Ok(n)
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn row_to_trip(row: &Row<'_>) -> Result<Trip, rusqlite::Error> {
    Ok(Trip {
        id: row.get(0)?,
        destination: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        kind: TripKind::from_db(&row.get::<_, String>(4)?),
        username: row.get(5)?,
    })
}

fn row_to_activity(row: &Row<'_>) -> Result<ItineraryActivity, rusqlite::Error> {
    Ok(ItineraryActivity {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        activity_time: row.get(2)?,
        description: row.get(3)?,
        has_reminder: row.get(4)?,
        reminder_offset: row.get(5)?,
        alert_severity: AlertSeverity::from_db(&row.get::<_, String>(6)?),
    })
}

fn row_to_document(row: &Row<'_>) -> Result<Document, rusqlite::Error> {
    Ok(Document {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        title: row.get(2)?,
        file_name: row.get(3)?,
        file_path: row.get(4)?,
        file_type: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trip() -> Trip {
        Trip {
            id: 0,
            destination: "Valparaíso".into(),
            start_date: 1_700_000_000_000,
            end_date: 1_700_600_000_000,
            kind: TripKind::Vacation,
            username: "ana".into(),
        }
    }

    #[test]
    fn account_register_and_login() {
        let db = Database::open_memory().unwrap();
        let account = Account {
            username: "ana".into(),
            password: "secret".into(),
        };
        assert!(db.insert_account(&account).unwrap());
        // Duplicate username is refused.
        assert!(!db.insert_account(&account).unwrap());

        assert!(db.login("ana", "secret").unwrap().is_some());
        assert!(db.login("ana", "wrong").unwrap().is_none());
        assert!(db.account_exists("ana").unwrap());
        assert!(!db.account_exists("bob").unwrap());
    }

    #[test]
    fn trip_crud() {
        let db = Database::open_memory().unwrap();
        let id = db.insert_trip(&sample_trip()).unwrap();
        let mut trip = db.trip_by_id(id).unwrap().unwrap();
        assert_eq!(trip.destination, "Valparaíso");

        trip.destination = "Santiago".into();
        assert!(db.update_trip(&trip).unwrap());
        assert_eq!(db.trip_by_id(id).unwrap().unwrap().destination, "Santiago");

        assert_eq!(db.trips_by_user("ana").unwrap().len(), 1);
        assert!(db.delete_trip(id).unwrap());
        assert!(db.trip_by_id(id).unwrap().is_none());
    }

    #[test]
    fn itinerary_listing_is_time_ordered() {
        let db = Database::open_memory().unwrap();
        let trip_id = db.insert_trip(&sample_trip()).unwrap();
        for (t, desc) in [(300, "later"), (100, "first"), (200, "middle")] {
            db.insert_activity(&ItineraryActivity {
                id: 0,
                trip_id,
                activity_time: 1_700_000_000_000 + t,
                description: desc.into(),
                has_reminder: false,
                reminder_offset: String::new(),
                alert_severity: AlertSeverity::Normal,
            })
            .unwrap();
        }
        let items = db.activities_by_trip(trip_id).unwrap();
        let descs: Vec<_> = items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descs, ["first", "middle", "later"]);
    }

    #[test]
    fn reminder_scan_only_returns_flagged_items() {
        let db = Database::open_memory().unwrap();
        let trip_id = db.insert_trip(&sample_trip()).unwrap();
        for has_reminder in [true, false, true] {
            db.insert_activity(&ItineraryActivity {
                id: 0,
                trip_id,
                activity_time: 1_700_000_100_000,
                description: "x".into(),
                has_reminder,
                reminder_offset: "1 hora antes".into(),
                alert_severity: AlertSeverity::Normal,
            })
            .unwrap();
        }
        assert_eq!(db.activities_with_reminders().unwrap().len(), 2);
    }

    #[test]
    fn document_crud_and_trip_scoped_delete() {
        let db = Database::open_memory().unwrap();
        let trip_id = db.insert_trip(&sample_trip()).unwrap();
        let doc = Document {
            id: 0,
            trip_id,
            title: "Pasaporte".into(),
            file_name: "passport.pdf".into(),
            file_path: "/docs/passport.pdf".into(),
            file_type: "pdf".into(),
            created_at: 1_700_000_000_000,
        };
        let id = db.insert_document(&doc).unwrap();
        assert_eq!(db.documents_by_trip(trip_id).unwrap().len(), 1);
        assert_eq!(db.document_by_id(id).unwrap().unwrap().title, "Pasaporte");
        assert_eq!(db.delete_documents_by_trip(trip_id).unwrap(), 1);
        assert!(db.document_by_id(id).unwrap().is_none());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }
}
