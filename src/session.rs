// src/session.rs
//! Session store: who is logged in, persisted to durable storage

use serde::{Deserialize, Serialize};

use crate::app_log;
use crate::core::SharedStorage;

pub const AUTH_FLAG_KEY: &str = "isAuthenticated";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    /// First character of the email, uppercased. Empty for an empty email.
    pub avatar: String,
}

impl User {
    /// Build the user record the demo login derives from an email address.
    pub fn from_email(email: &str) -> Self {
        let name = email.split('@').next().unwrap_or(email).to_string();
        let avatar = email
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default();

        Self {
            email: email.to_string(),
            name,
            avatar,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

pub struct SessionStore {
    storage: SharedStorage,
    session: Session,
}

impl SessionStore {
    /// Restore the session from storage. Never fails: unreadable storage,
    /// a missing user record or malformed JSON all mean "logged out".
    pub fn initialize(storage: SharedStorage) -> Self {
        let session = Self::restore(&storage);
        app_log!(
            info,
            "Session initialized: authenticated={}",
            session.is_authenticated
        );
        Self { storage, session }
    }

    fn restore(storage: &SharedStorage) -> Session {
        let flag = match storage.get(AUTH_FLAG_KEY) {
            Ok(flag) => flag,
            Err(e) => {
                app_log!(warn, "Could not read auth flag: {}", e);
                return Session::default();
            }
        };

        if flag.as_deref() != Some("true") {
            return Session::default();
        }

        let raw_user = match storage.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                app_log!(warn, "Auth flag set without a stored user, treating as logged out");
                return Session::default();
            }
            Err(e) => {
                app_log!(warn, "Could not read stored user: {}", e);
                return Session::default();
            }
        };

        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Session {
                is_authenticated: true,
                user: Some(user),
            },
            Err(e) => {
                app_log!(warn, "Stored user is malformed, ignoring: {}", e);
                Session::default()
            }
        }
    }

    /// Demo login: any email and password are accepted. This is the seam to
    /// replace with a real authentication call.
    pub fn login(&mut self, email: &str, _password: &str) -> bool {
        let user = User::from_email(email);
        app_log!(info, "User {} logged in", user.email);

        self.session = Session {
            is_authenticated: true,
            user: Some(user),
        };
        self.persist();
        true
    }

    pub fn logout(&mut self) {
        if let Some(user) = &self.session.user {
            app_log!(info, "User {} logged out", user.email);
        }

        self.session = Session::default();

        if let Err(e) = self.storage.remove(USER_KEY) {
            app_log!(warn, "Could not remove stored user: {}", e);
        }
        if let Err(e) = self.storage.set(AUTH_FLAG_KEY, "false") {
            app_log!(warn, "Could not persist auth flag: {}", e);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn persist(&self) {
        let flag = if self.session.is_authenticated {
            "true"
        } else {
            "false"
        };
        if let Err(e) = self.storage.set(AUTH_FLAG_KEY, flag) {
            app_log!(warn, "Could not persist auth flag: {}", e);
        }

        if let Some(user) = &self.session.user {
            match serde_json::to_string(user) {
                Ok(json) => {
                    if let Err(e) = self.storage.set(USER_KEY, &json) {
                        app_log!(warn, "Could not persist user: {}", e);
                    }
                }
                Err(e) => app_log!(error, "Failed to serialize user: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MemoryStorage, UnavailableStorage};
    use std::sync::Arc;

    #[test]
    fn test_fresh_storage_is_logged_out() {
        let store = SessionStore::initialize(MemoryStorage::shared());
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_login_logout_scenario() {
        let storage = MemoryStorage::shared();
        let mut store = SessionStore::initialize(storage.clone());

        assert!(store.login("alice@example.com", "x"));
        assert!(store.is_authenticated());
        let user = store.user().unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.avatar, "A");
        assert_eq!(storage.get(AUTH_FLAG_KEY).unwrap().as_deref(), Some("true"));

        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert_eq!(storage.get(AUTH_FLAG_KEY).unwrap().as_deref(), Some("false"));
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_login_accepts_anything() {
        let mut store = SessionStore::initialize(MemoryStorage::shared());

        assert!(store.login("", ""));
        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().name, "");
        assert_eq!(store.user().unwrap().avatar, "");

        assert!(store.login("no-at-sign", "whatever"));
        assert_eq!(store.user().unwrap().name, "no-at-sign");

        assert!(store.login("bob@a@b", ""));
        assert_eq!(store.user().unwrap().name, "bob");
    }

    #[test]
    fn test_reload_restores_login() {
        let storage = MemoryStorage::shared();
        let mut store = SessionStore::initialize(storage.clone());
        store.login("carol@example.com", "pw");

        let reloaded = SessionStore::initialize(storage);
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user(), store.user());
    }

    #[test]
    fn test_logout_then_reload_is_logged_out() {
        let storage = MemoryStorage::shared();
        let mut store = SessionStore::initialize(storage.clone());
        store.login("dave@example.com", "pw");
        store.logout();

        let reloaded = SessionStore::initialize(storage);
        assert!(!reloaded.is_authenticated());
        assert!(reloaded.user().is_none());
    }

    #[test]
    fn test_malformed_user_is_treated_as_absent() {
        let storage = MemoryStorage::shared();
        storage.set(AUTH_FLAG_KEY, "true").unwrap();
        storage.set(USER_KEY, "{broken").unwrap();

        let store = SessionStore::initialize(storage);
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_flag_must_be_literal_true() {
        let storage = MemoryStorage::shared();
        storage.set(AUTH_FLAG_KEY, "TRUE").unwrap();
        storage
            .set(USER_KEY, &serde_json::to_string(&User::from_email("e@x")).unwrap())
            .unwrap();

        assert!(!SessionStore::initialize(storage).is_authenticated());
    }

    #[test]
    fn test_unavailable_storage_degrades_to_memory() {
        let mut store = SessionStore::initialize(Arc::new(UnavailableStorage));
        assert!(!store.is_authenticated());

        assert!(store.login("erin@example.com", "pw"));
        assert!(store.is_authenticated());

        store.logout();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_non_ascii_avatar() {
        let user = User::from_email("ärger@example.com");
        assert_eq!(user.avatar, "Ä");
        assert_eq!(user.name, "ärger");
    }
}
