//! Vault access flow: PIN gate over real account storage.

use wayfarer_core::pin::MemoryPinStore;
use wayfarer_core::{CoreError, Database, PinEvent, PinGate, PinPhase};

fn enter(gate: &mut PinGate<MemoryPinStore>, pin: &str) -> PinEvent {
    let mut last = PinEvent::Pending { entered: 0 };
    for d in pin.chars() {
        last = gate.submit_digit(d).unwrap();
    }
    last
}

#[test]
fn first_time_setup_then_reentry() {
    // Setup: create and confirm.
    let mut gate = PinGate::new(MemoryPinStore::new()).unwrap();
    enter(&mut gate, "2468");
    assert_eq!(enter(&mut gate, "2468"), PinEvent::Created);

    // A later session against the same stored credential verifies.
    let mut gate = PinGate::new(MemoryPinStore::with_pin("2468")).unwrap();
    assert_eq!(gate.phase(), PinPhase::Entering);
    assert_eq!(enter(&mut gate, "2468"), PinEvent::Verified);
}

#[test]
fn lockout_and_credential_reset_against_database_auth() {
    let db = Database::open_memory().unwrap();
    wayfarer_core::auth::register(&db, "ana", "hunter2").unwrap();
    let session = wayfarer_core::auth::login(&db, "ana", "hunter2")
        .unwrap()
        .unwrap();

    let mut gate = PinGate::new(MemoryPinStore::with_pin("1234")).unwrap();
    for wrong in ["0000", "1111", "2222"] {
        enter(&mut gate, wrong);
    }
    assert_eq!(gate.phase(), PinPhase::Locked);

    // Wrong password: still locked, PIN counter untouched.
    assert!(gate
        .reset_via_credentials(&db, &session, "ana", "wrong")
        .is_err());
    assert_eq!(gate.phase(), PinPhase::Locked);
    assert_eq!(gate.attempts_remaining().unwrap(), 0);
    assert!(matches!(
        gate.submit_digit('5'),
        Err(CoreError::Pin(wayfarer_core::PinError::Locked))
    ));

    // Correct credentials reopen the creation flow without the old PIN.
    gate.reset_via_credentials(&db, &session, "ana", "hunter2")
        .unwrap();
    assert_eq!(gate.phase(), PinPhase::Creating);
    enter(&mut gate, "9876");
    assert_eq!(enter(&mut gate, "9876"), PinEvent::Created);
    assert_eq!(gate.attempts_remaining().unwrap(), 3);
}
