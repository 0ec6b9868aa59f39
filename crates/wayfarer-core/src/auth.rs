//! Account authentication.
//!
//! Credentials are compared verbatim against the stored value; a hashed
//! backend would implement [`Authenticator`] over a different store.

use crate::error::Result;
use crate::model::Account;
use crate::session::Session;
use crate::storage::Database;

/// Credential check consumed by login and by the PIN reset side channel.
pub trait Authenticator {
    /// Returns the account only when username and password both match.
    fn login(&self, username: &str, password: &str) -> Result<Option<Account>>;
}

impl Authenticator for Database {
    fn login(&self, username: &str, password: &str) -> Result<Option<Account>> {
        Ok(Database::login(self, username, password)?)
    }
}

/// Register a new account. Returns false when the username is taken.
pub fn register(db: &Database, username: &str, password: &str) -> Result<bool> {
    Ok(db.insert_account(&Account {
        username: username.to_string(),
        password: password.to_string(),
    })?)
}

/// Validate credentials and open a session.
pub fn login(db: &Database, username: &str, password: &str) -> Result<Option<Session>> {
    let account = Authenticator::login(db, username, password)?;
    Ok(account.map(|a| Session::new(a.username)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_round_trip() {
        let db = Database::open_memory().unwrap();
        assert!(register(&db, "ana", "pw").unwrap());
        assert!(!register(&db, "ana", "other").unwrap());

        let session = login(&db, "ana", "pw").unwrap().unwrap();
        assert_eq!(session.username, "ana");
        assert!(login(&db, "ana", "wrong").unwrap().is_none());
        assert!(login(&db, "ghost", "pw").unwrap().is_none());
    }
}
