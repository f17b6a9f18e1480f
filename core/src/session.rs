//! Admin session gate.
//!
//! The password check is a convenience gate, not a security boundary. The
//! "logged in" flag lives in whatever [`SessionStore`] the host injects and
//! persists until an explicit logout.

use std::cell::Cell;

use crate::error::ApiError;

/// Key under which the admin flag is stored.
pub const SESSION_KEY: &str = "admin-ok";

/// Persistence for the single admin-session flag.
pub trait SessionStore {
    fn is_set(&self) -> bool;
    fn set(&self) -> Result<(), ApiError>;
    fn clear(&self) -> Result<(), ApiError>;
}

/// Store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    flag: Cell<bool>,
}

impl SessionStore for MemorySessionStore {
    fn is_set(&self) -> bool {
        self.flag.get()
    }

    fn set(&self) -> Result<(), ApiError> {
        self.flag.set(true);
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        self.flag.set(false);
        Ok(())
    }
}

#[derive(Debug)]
pub struct AdminSession<S> {
    store: S,
    authenticated: bool,
}

impl<S: SessionStore> AdminSession<S> {
    /// Pick up a session persisted by an earlier login.
    pub fn restore(store: S) -> Self {
        let authenticated = store.is_set();
        Self { store, authenticated }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn login(&mut self, password: &str, expected: &str) -> Result<(), ApiError> {
        if password != expected {
            return Err(ApiError::Unauthorized);
        }
        self.store.set()?;
        self.authenticated = true;
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.store.clear()?;
        self.authenticated = false;
        Ok(())
    }

    /// Fail unless logged in.
    pub fn require(&self) -> Result<(), ApiError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
