//! PIN credential storage.
//!
//! The 4-digit secret lives in the OS keyring (encrypted at rest by the
//! platform); the failed-attempt counter lives in the database kv store.
//! Both are keyed by a [`PinScope`]: the historical behavior is one PIN per
//! device installation, but the scope can be widened to per-account via
//! configuration instead of silently sharing one lockout counter between
//! accounts.

use keyring::Entry;

use crate::error::Result;
use crate::storage::Database;

const KEYRING_SERVICE: &str = "wayfarer";

/// What a PIN credential is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinScope {
    /// One PIN and one attempt counter per device installation.
    Device,
    /// One PIN and one attempt counter per account.
    Account(String),
}

impl PinScope {
    pub fn key(&self) -> String {
        match self {
            PinScope::Device => "device".to_string(),
            PinScope::Account(username) => format!("account:{username}"),
        }
    }
}

/// Backing store for one PIN credential: the secret plus its
/// failed-attempt counter. `save_pin` always resets the counter.
pub trait PinStore {
    fn pin(&self) -> Result<Option<String>>;
    fn save_pin(&mut self, pin: &str) -> Result<()>;
    fn clear_pin(&mut self) -> Result<()>;
    fn attempts(&self) -> Result<u32>;
    /// Increment and return the new counter value.
    fn record_attempt(&mut self) -> Result<u32>;
    fn reset_attempts(&mut self) -> Result<()>;
}

/// Production store: secret in the OS keyring, counter in the database.
pub struct KeyringPinStore<'a> {
    db: &'a Database,
    scope: PinScope,
}

impl<'a> KeyringPinStore<'a> {
    pub fn new(db: &'a Database, scope: PinScope) -> Self {
        Self { db, scope }
    }

    fn entry(&self) -> Result<Entry> {
        Ok(Entry::new(
            KEYRING_SERVICE,
            &format!("pin:{}", self.scope.key()),
        )?)
    }

    fn counter_key(&self) -> String {
        format!("pin_attempts:{}", self.scope.key())
    }
}

impl PinStore for KeyringPinStore<'_> {
    fn pin(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(pin) => Ok(Some(pin)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_pin(&mut self, pin: &str) -> Result<()> {
        self.entry()?.set_password(pin)?;
        self.reset_attempts()
    }

    fn clear_pin(&mut self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }
        self.reset_attempts()
    }

    fn attempts(&self) -> Result<u32> {
        let stored = self.db.kv_get(&self.counter_key())?;
        Ok(stored.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    fn record_attempt(&mut self) -> Result<u32> {
        let next = self.attempts()? + 1;
        self.db.kv_set(&self.counter_key(), &next.to_string())?;
        Ok(next)
    }

    fn reset_attempts(&mut self) -> Result<()> {
        self.db.kv_set(&self.counter_key(), "0")?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    pin: Option<String>,
    attempts: u32,
}

impl MemoryPinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pin(pin: &str) -> Self {
        Self {
            pin: Some(pin.to_string()),
            attempts: 0,
        }
    }
}

impl PinStore for MemoryPinStore {
    fn pin(&self) -> Result<Option<String>> {
        Ok(self.pin.clone())
    }

    fn save_pin(&mut self, pin: &str) -> Result<()> {
        self.pin = Some(pin.to_string());
        self.attempts = 0;
        Ok(())
    }

    fn clear_pin(&mut self) -> Result<()> {
        self.pin = None;
        self.attempts = 0;
        Ok(())
    }

    fn attempts(&self) -> Result<u32> {
        Ok(self.attempts)
    }

    fn record_attempt(&mut self) -> Result<u32> {
        self.attempts += 1;
        Ok(self.attempts)
    }

    fn reset_attempts(&mut self) -> Result<()> {
        self.attempts = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_keys_are_distinct() {
        assert_eq!(PinScope::Device.key(), "device");
        assert_eq!(PinScope::Account("ana".into()).key(), "account:ana");
        assert_ne!(
            PinScope::Account("ana".into()).key(),
            PinScope::Account("bob".into()).key()
        );
    }

    #[test]
    fn memory_store_counter_resets_on_save() {
        let mut store = MemoryPinStore::new();
        assert!(store.pin().unwrap().is_none());
        store.record_attempt().unwrap();
        store.record_attempt().unwrap();
        assert_eq!(store.attempts().unwrap(), 2);

        store.save_pin("1234").unwrap();
        assert_eq!(store.pin().unwrap().unwrap(), "1234");
        assert_eq!(store.attempts().unwrap(), 0);
    }
}
