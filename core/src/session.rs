//! Explicit session context.
//!
//! A `Session` is created by a successful login, passed by reference into
//! every request builder, and ended on logout. Persistence goes through a
//! [`SessionStore`] keyed by two fixed names; both keys are written and
//! removed together.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::types::Profile;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the last-fetched profile as JSON.
pub const PROFILE_KEY: &str = "user";

/// Key-value persistence for session state (browser local storage, a file, …).
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-process store, used by tests and hosts without persistent storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// The current bearer token and profile, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    profile: Option<Profile>,
}

impl Session {
    /// A session with no credentials; requests go out without `Authorization`.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Start a session from a successful login.
    pub fn establish(token: String, profile: Profile) -> Self {
        Self {
            token: Some(token),
            profile: Some(profile),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_venue_manager(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.venue_manager)
    }

    /// Replace the cached profile after a profile fetch or update.
    pub fn update_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// Write token and profile to `store`.
    pub fn persist(&self, store: &dyn SessionStore) {
        match &self.token {
            Some(token) => store.set(TOKEN_KEY, token.clone()),
            None => store.remove(TOKEN_KEY),
        }
        match self.profile.as_ref().map(serde_json::to_string) {
            Some(Ok(json)) => store.set(PROFILE_KEY, json),
            Some(Err(e)) => warn!(error = %e, "could not serialize profile for storage"),
            None => store.remove(PROFILE_KEY),
        }
    }

    /// Rebuild a session from `store`. A corrupt profile entry is dropped.
    pub fn restore(store: &dyn SessionStore) -> Self {
        let token = store.get(TOKEN_KEY);
        let profile = store
            .get(PROFILE_KEY)
            .and_then(|json| match serde_json::from_str::<Profile>(&json) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable stored profile");
                    None
                }
            });
        debug!(authenticated = token.is_some(), "session restored");
        Self { token, profile }
    }

    /// Log out: clear both stored keys and return an anonymous session.
    pub fn end(self, store: &dyn SessionStore) -> Self {
        store.remove(TOKEN_KEY);
        store.remove(PROFILE_KEY);
        Self::anonymous()
    }
}
