//! The PIN gate state machine.
//!
//! ```text
//! Creating -> Confirming -> Verified        (first-time setup, and reset)
//! Entering -> Verified | Entering(rejected) (established PIN)
//! Entering -> Locked                        (third consecutive rejection)
//! Locked   -> Creating                      (credential-validated reset only)
//! ```
//!
//! A confirmation mismatch during setup returns to Creating with the buffer
//! cleared; it never touches the failed-attempt counter. Reset-credential
//! failures keep their own error path and also never touch that counter.

use crate::auth::Authenticator;
use crate::error::{PinError, Result};
use crate::session::Session;

use super::store::PinStore;

/// Consecutive wrong entries before the gate locks.
pub const MAX_ATTEMPTS: u32 = 3;

/// Digits in a PIN.
pub const PIN_LEN: usize = 4;

/// Where the gate currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPhase {
    /// Awaiting the first 4 digits of a new PIN.
    Creating,
    /// Awaiting the repeat entry of the new PIN.
    Confirming,
    /// A PIN exists; awaiting 4 digits to verify.
    Entering,
    /// Access granted for this session.
    Verified,
    /// Attempts exhausted; numeric input is disabled.
    Locked,
}

/// Outcome of a completed 4-digit entry (or of a single digit while the
/// buffer is still filling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinEvent {
    /// Buffer not yet full.
    Pending { entered: usize },
    /// First entry captured; repeat it to confirm.
    AwaitingConfirmation,
    /// New PIN stored; gate is verified.
    Created,
    /// Confirmation didn't match; back to Creating with a cleared buffer.
    ConfirmationMismatch,
    /// Entry matched the stored PIN.
    Verified,
    /// Entry didn't match; attempts remain.
    Rejected { attempts_remaining: u32 },
    /// Entry didn't match and attempts are exhausted.
    LockedOut,
}

impl PinEvent {
    /// User-facing message for the outcomes that carry one.
    pub fn message(&self) -> Option<String> {
        match self {
            PinEvent::ConfirmationMismatch => Some("Los PINs no coinciden".to_string()),
            PinEvent::Rejected { attempts_remaining } => Some(format!(
                "PIN incorrecto. Intentos restantes: {attempts_remaining}"
            )),
            PinEvent::LockedOut => {
                Some("PIN bloqueado. Restablécelo con tus credenciales".to_string())
            }
            _ => None,
        }
    }
}

/// Gate guarding a trip's document vault behind a 4-digit PIN.
pub struct PinGate<S: PinStore> {
    store: S,
    phase: PinPhase,
    buffer: String,
    /// First entry during creation, held until confirmed.
    first: Option<String>,
}

impl<S: PinStore> PinGate<S> {
    /// Build the gate from stored state: locked if attempts are exhausted,
    /// entering if a PIN exists, creating otherwise.
    pub fn new(store: S) -> Result<Self> {
        let phase = if store.attempts()? >= MAX_ATTEMPTS {
            PinPhase::Locked
        } else if store.pin()?.is_some() {
            PinPhase::Entering
        } else {
            PinPhase::Creating
        };
        Ok(Self {
            store,
            phase,
            buffer: String::new(),
            first: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> PinPhase {
        self.phase
    }

    pub fn digits_entered(&self) -> usize {
        self.buffer.len()
    }

    pub fn attempts_remaining(&self) -> Result<u32> {
        Ok(MAX_ATTEMPTS.saturating_sub(self.store.attempts()?))
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Append one digit. The 4th digit completes the buffer and drives the
    /// transition belonging to the current phase.
    pub fn submit_digit(&mut self, digit: char) -> Result<PinEvent> {
        match self.phase {
            PinPhase::Locked => return Err(PinError::Locked.into()),
            PinPhase::Verified => return Ok(PinEvent::Verified),
            _ => {}
        }
        if !digit.is_ascii_digit() {
            return Err(PinError::InvalidDigit(digit).into());
        }

        // Fixed capacity: the buffer can never grow past PIN_LEN because
        // the 4th digit is consumed immediately below.
        self.buffer.push(digit);
        if self.buffer.len() < PIN_LEN {
            return Ok(PinEvent::Pending {
                entered: self.buffer.len(),
            });
        }

        let entered = std::mem::take(&mut self.buffer);
        match self.phase {
            PinPhase::Creating => {
                self.first = Some(entered);
                self.phase = PinPhase::Confirming;
                Ok(PinEvent::AwaitingConfirmation)
            }
            PinPhase::Confirming => {
                if self.first.take().as_deref() == Some(entered.as_str()) {
                    self.store.save_pin(&entered)?;
                    self.phase = PinPhase::Verified;
                    Ok(PinEvent::Created)
                } else {
                    self.phase = PinPhase::Creating;
                    Ok(PinEvent::ConfirmationMismatch)
                }
            }
            PinPhase::Entering => self.check(&entered),
            PinPhase::Verified | PinPhase::Locked => unreachable!("handled above"),
        }
    }

    /// Drop the last buffered digit.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Compare a complete 4-digit entry against the stored credential.
    ///
    /// A match resets the attempt counter and verifies the gate; a mismatch
    /// increments it, locking the gate on the third consecutive failure.
    pub fn verify(&mut self, entered: &str) -> Result<PinEvent> {
        match self.phase {
            PinPhase::Entering => {}
            PinPhase::Locked => return Err(PinError::Locked.into()),
            _ => return Err(PinError::NoPinSet.into()),
        }
        self.buffer.clear();
        self.check(entered)
    }

    fn check(&mut self, entered: &str) -> Result<PinEvent> {
        let stored = self.store.pin()?.ok_or(PinError::NoPinSet)?;
        if stored == entered {
            self.store.reset_attempts()?;
            self.phase = PinPhase::Verified;
            return Ok(PinEvent::Verified);
        }

        let attempts = self.store.record_attempt()?;
        if attempts >= MAX_ATTEMPTS {
            self.phase = PinPhase::Locked;
            Ok(PinEvent::LockedOut)
        } else {
            Ok(PinEvent::Rejected {
                attempts_remaining: MAX_ATTEMPTS - attempts,
            })
        }
    }

    // ── Recovery ─────────────────────────────────────────────────────

    /// Side channel out of Locked (and the forgotten-PIN path): validate
    /// the session owner's login credentials, then re-enter the creation
    /// flow without the old PIN.
    ///
    /// A failed validation leaves the gate exactly where it was; it has its
    /// own failure path and never touches the PIN attempt counter.
    pub fn reset_via_credentials(
        &mut self,
        auth: &dyn Authenticator,
        session: &Session,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let account = auth.login(username, password)?;
        match account {
            Some(account) if account.username == session.username => {
                self.phase = PinPhase::Creating;
                self.buffer.clear();
                self.first = None;
                Ok(())
            }
            _ => Err(PinError::CredentialsRejected.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::model::Account;
    use crate::pin::MemoryPinStore;

    fn enter(gate: &mut PinGate<MemoryPinStore>, pin: &str) -> PinEvent {
        let mut last = PinEvent::Pending { entered: 0 };
        for d in pin.chars() {
            last = gate.submit_digit(d).unwrap();
        }
        last
    }

    #[test]
    fn creation_flow_sets_pin_and_verifies() {
        let mut gate = PinGate::new(MemoryPinStore::new()).unwrap();
        assert_eq!(gate.phase(), PinPhase::Creating);

        assert_eq!(enter(&mut gate, "1234"), PinEvent::AwaitingConfirmation);
        assert_eq!(gate.phase(), PinPhase::Confirming);

        assert_eq!(enter(&mut gate, "1234"), PinEvent::Created);
        assert_eq!(gate.phase(), PinPhase::Verified);
    }

    #[test]
    fn confirmation_mismatch_returns_to_creating_without_counting() {
        let mut gate = PinGate::new(MemoryPinStore::new()).unwrap();
        enter(&mut gate, "1234");
        let event = enter(&mut gate, "5678");
        assert_eq!(event, PinEvent::ConfirmationMismatch);
        assert_eq!(event.message().unwrap(), "Los PINs no coinciden");
        assert_eq!(gate.phase(), PinPhase::Creating);
        assert_eq!(gate.digits_entered(), 0);
        assert_eq!(gate.attempts_remaining().unwrap(), MAX_ATTEMPTS);
    }

    #[test]
    fn three_wrong_entries_lock_the_gate() {
        let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
        assert_eq!(gate.phase(), PinPhase::Entering);

        assert_eq!(
            enter(&mut gate, "1111"),
            PinEvent::Rejected {
                attempts_remaining: 2
            }
        );
        assert_eq!(
            enter(&mut gate, "2222"),
            PinEvent::Rejected {
                attempts_remaining: 1
            }
        );
        assert_eq!(enter(&mut gate, "3333"), PinEvent::LockedOut);
        assert_eq!(gate.phase(), PinPhase::Locked);

        // Input path is disabled entirely.
        assert!(matches!(
            gate.submit_digit('1'),
            Err(CoreError::Pin(PinError::Locked))
        ));
    }

    #[test]
    fn correct_entry_before_lockout_resets_counter() {
        let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
        enter(&mut gate, "1111");
        enter(&mut gate, "2222");
        assert_eq!(enter(&mut gate, "1234"), PinEvent::Verified);
        assert_eq!(gate.phase(), PinPhase::Verified);
        assert_eq!(gate.attempts_remaining().unwrap(), MAX_ATTEMPTS);
    }

    #[test]
    fn rejected_message_reports_remaining_attempts() {
        let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
        let event = enter(&mut gate, "0000");
        assert_eq!(
            event.message().unwrap(),
            "PIN incorrecto. Intentos restantes: 2"
        );
    }

    #[test]
    fn backspace_edits_the_buffer() {
        let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
        gate.submit_digit('9').unwrap();
        gate.submit_digit('9').unwrap();
        gate.backspace();
        gate.backspace();
        gate.backspace(); // empty buffer: no-op
        assert_eq!(gate.digits_entered(), 0);
        assert_eq!(enter(&mut gate, "1234"), PinEvent::Verified);
    }

    #[test]
    fn non_digit_input_is_rejected() {
        let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
        assert!(matches!(
            gate.submit_digit('x'),
            Err(CoreError::Pin(PinError::InvalidDigit('x')))
        ));
        assert_eq!(gate.digits_entered(), 0);
    }

    #[test]
    fn gate_opens_locked_when_attempts_exhausted() {
        let mut store = MemoryPinStore::with_pin("1234");
        for _ in 0..MAX_ATTEMPTS {
            store.record_attempt().unwrap();
        }
        let gate = PinGate::new(store).unwrap();
        assert_eq!(gate.phase(), PinPhase::Locked);
    }

    struct FixedAuth {
        account: Option<Account>,
    }

    impl Authenticator for FixedAuth {
        fn login(&self, username: &str, password: &str) -> Result<Option<Account>> {
            Ok(self.account.clone().filter(|a| {
                a.username == username && a.password == password
            }))
        }
    }

    fn locked_gate() -> PinGate<MemoryPinStore> {
        let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
        for pin in ["1111", "2222", "3333"] {
            enter(&mut gate, pin);
        }
        assert_eq!(gate.phase(), PinPhase::Locked);
        gate
    }

    #[test]
    fn credential_reset_reopens_creation_without_old_pin() {
        let mut gate = locked_gate();
        let auth = FixedAuth {
            account: Some(Account {
                username: "ana".into(),
                password: "pw".into(),
            }),
        };
        let session = Session::new("ana");

        gate.reset_via_credentials(&auth, &session, "ana", "pw").unwrap();
        assert_eq!(gate.phase(), PinPhase::Creating);

        enter(&mut gate, "4321");
        assert_eq!(enter(&mut gate, "4321"), PinEvent::Created);
        assert_eq!(gate.attempts_remaining().unwrap(), MAX_ATTEMPTS);
    }

    #[test]
    fn failed_credential_reset_stays_locked_and_leaves_counter_alone() {
        let mut gate = locked_gate();
        let auth = FixedAuth {
            account: Some(Account {
                username: "ana".into(),
                password: "pw".into(),
            }),
        };
        let session = Session::new("ana");

        let err = gate
            .reset_via_credentials(&auth, &session, "ana", "wrong")
            .unwrap_err();
        assert!(matches!(err, CoreError::Pin(PinError::CredentialsRejected)));
        assert_eq!(gate.phase(), PinPhase::Locked);
        assert_eq!(gate.attempts_remaining().unwrap(), 0);
    }

    #[test]
    fn credential_reset_requires_the_session_owner() {
        let mut gate = locked_gate();
        let auth = FixedAuth {
            account: Some(Account {
                username: "bob".into(),
                password: "pw".into(),
            }),
        };
        // Valid credentials, but for someone other than the session owner.
        let session = Session::new("ana");
        assert!(gate
            .reset_via_credentials(&auth, &session, "bob", "pw")
            .is_err());
        assert_eq!(gate.phase(), PinPhase::Locked);
    }
}
