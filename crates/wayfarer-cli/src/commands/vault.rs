use clap::Subcommand;
use wayfarer_core::pin::PinStore;
use wayfarer_core::{
    Config, Database, Document, KeyringPinStore, PinEvent, PinGate, PinPhase, Session,
    ValidationError,
};

use super::common::{current_session, format_datetime, open_db, CliResult};

#[derive(Subcommand)]
pub enum VaultAction {
    /// Report the gate state
    Status,
    /// Create the vault PIN (first time only)
    SetPin { pin: String },
    /// Verify a PIN entry
    Enter { pin: String },
    /// Reset a forgotten or locked PIN with account credentials
    Reset {
        username: String,
        password: String,
        new_pin: String,
    },
    /// List a trip's documents (requires the PIN)
    List {
        trip_id: i64,
        #[arg(long)]
        pin: String,
    },
    /// Attach a document to a trip (requires the PIN)
    AddDoc {
        trip_id: i64,
        title: String,
        /// Path to the file
        file: String,
        #[arg(long)]
        pin: String,
    },
    /// Remove a document (requires the PIN)
    RmDoc {
        id: i64,
        #[arg(long)]
        pin: String,
    },
}

fn gate<'a>(db: &'a Database, session: &Session) -> CliResult2<PinGate<KeyringPinStore<'a>>> {
    let config = Config::load()?;
    let scope = config.vault.scope_for(&session.username)?;
    Ok(PinGate::new(KeyringPinStore::new(db, scope))?)
}

type CliResult2<T> = Result<T, Box<dyn std::error::Error>>;

fn check_pin_shape(pin: &str) -> CliResult {
    if pin.len() != wayfarer_core::pin::PIN_LEN || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(Box::new(ValidationError::InvalidPin));
    }
    Ok(())
}

/// Feed a complete PIN into the gate digit by digit.
fn feed<S: PinStore>(gate: &mut PinGate<S>, pin: &str) -> CliResult2<PinEvent> {
    check_pin_shape(pin)?;
    let mut last = PinEvent::Pending { entered: 0 };
    for d in pin.chars() {
        last = gate.submit_digit(d)?;
    }
    Ok(last)
}

/// Drive the gate to Verified or explain why it refused.
fn unlock<S: PinStore>(gate: &mut PinGate<S>, pin: &str) -> CliResult {
    match gate.phase() {
        PinPhase::Creating => {
            return Err("no PIN set yet; run `wayfarer-cli vault set-pin` first".into())
        }
        PinPhase::Locked => {
            return Err("PIN entry is locked; run `wayfarer-cli vault reset`".into())
        }
        _ => {}
    }
    match feed(gate, pin)? {
        PinEvent::Verified => Ok(()),
        event => Err(event
            .message()
            .unwrap_or_else(|| "PIN rejected".to_string())
            .into()),
    }
}

/// Create a new PIN through the create-confirm flow.
fn create_pin<S: PinStore>(gate: &mut PinGate<S>, pin: &str) -> CliResult {
    match feed(gate, pin)? {
        PinEvent::AwaitingConfirmation => {}
        event => {
            return Err(event
                .message()
                .unwrap_or_else(|| "unexpected gate state".to_string())
                .into())
        }
    }
    // Non-interactive confirmation: repeat the same entry.
    match feed(gate, pin)? {
        PinEvent::Created => Ok(()),
        event => Err(event
            .message()
            .unwrap_or_else(|| "PIN confirmation failed".to_string())
            .into()),
    }
}

pub fn run(action: VaultAction) -> CliResult {
    let db = open_db()?;
    let session = current_session(&db)?;
    match action {
        VaultAction::Status => {
            let gate = gate(&db, &session)?;
            let phase = match gate.phase() {
                PinPhase::Creating => "no PIN set",
                PinPhase::Confirming => "awaiting confirmation",
                PinPhase::Entering => "PIN set",
                PinPhase::Verified => "verified",
                PinPhase::Locked => "locked",
            };
            println!("{phase}; attempts remaining: {}", gate.attempts_remaining()?);
            Ok(())
        }
        VaultAction::SetPin { pin } => {
            let mut gate = gate(&db, &session)?;
            if gate.phase() != PinPhase::Creating {
                return Err("a PIN already exists; use `vault reset` to replace it".into());
            }
            create_pin(&mut gate, &pin)?;
            println!("vault PIN set");
            Ok(())
        }
        VaultAction::Enter { pin } => {
            let mut gate = gate(&db, &session)?;
            unlock(&mut gate, &pin)?;
            println!("vault unlocked");
            Ok(())
        }
        VaultAction::Reset {
            username,
            password,
            new_pin,
        } => {
            let mut gate = gate(&db, &session)?;
            gate.reset_via_credentials(&db, &session, &username, &password)?;
            create_pin(&mut gate, &new_pin)?;
            println!("vault PIN reset");
            Ok(())
        }
        VaultAction::List { trip_id, pin } => {
            let mut gate = gate(&db, &session)?;
            unlock(&mut gate, &pin)?;
            for doc in db.documents_by_trip(trip_id)? {
                println!(
                    "{:>4}  {}  {} ({}, {})",
                    doc.id,
                    format_datetime(doc.created_at),
                    doc.title,
                    doc.file_name,
                    doc.file_type,
                );
            }
            Ok(())
        }
        VaultAction::AddDoc {
            trip_id,
            title,
            file,
            pin,
        } => {
            let mut gate = gate(&db, &session)?;
            unlock(&mut gate, &pin)?;
            let path = std::path::Path::new(&file);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            let file_type = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = db.insert_document(&Document {
                id: 0,
                trip_id,
                title,
                file_name,
                file_path: file,
                file_type,
                created_at: chrono::Utc::now().timestamp_millis(),
            })?;
            println!("document {id} added");
            Ok(())
        }
        VaultAction::RmDoc { id, pin } => {
            let mut gate = gate(&db, &session)?;
            unlock(&mut gate, &pin)?;
            if db.delete_document(id)? {
                println!("document {id} removed");
                Ok(())
            } else {
                Err(format!("document {id} not found").into())
            }
        }
    }
}
