//! PIN-gated access to the document vault.

pub mod gate;
pub mod store;

pub use gate::{PinEvent, PinGate, PinPhase, MAX_ATTEMPTS, PIN_LEN};
pub use store::{KeyringPinStore, MemoryPinStore, PinScope, PinStore};
