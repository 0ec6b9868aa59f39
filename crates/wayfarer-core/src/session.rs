//! Authenticated-session context.
//!
//! Constructed once at login and passed explicitly to the components that
//! need to know who is acting; its lifetime is the session, not the
//! process.

/// The account the current session acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
}

impl Session {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
