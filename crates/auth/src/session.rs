//! Local session hints: the fast-path `authed`/`role` cache.
//!
//! The cache is written by login and logout flows only and read synchronously
//! by the gates. It is a hint, never ground truth: bans applied after login
//! are invisible to it, which is why the ban check always asks the backend.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::Role;

pub const AUTHED_KEY: &str = "authed";
pub const ROLE_KEY: &str = "role";

/// Read-only view of the cached session flags.
pub trait SessionHints {
    fn authed(&self) -> bool;

    fn role(&self) -> Option<Role>;
}

/// Fixed hint values, for injection into gates (and for tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionContext {
    authed: bool,
    role: Option<Role>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(role: Role) -> Self {
        Self {
            authed: true,
            role: Some(role),
        }
    }

    pub fn new(authed: bool, role: Option<Role>) -> Self {
        Self { authed, role }
    }
}

impl SessionHints for SessionContext {
    fn authed(&self) -> bool {
        self.authed
    }

    fn role(&self) -> Option<Role> {
        self.role
    }
}

/// String key/value cache holding `authed = "true"` and `role = "<role>"`.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: RwLock<HashMap<String, String>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Written once by the login flow.
    pub fn record_login(&self, role: Role) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(AUTHED_KEY.to_string(), "true".to_string());
        entries.insert(ROLE_KEY.to_string(), role.as_str().to_string());
    }

    /// Cleared by the logout flow.
    pub fn record_logout(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(AUTHED_KEY);
        entries.remove(ROLE_KEY);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Snapshot the current flags.
    pub fn snapshot(&self) -> SessionContext {
        SessionContext::new(self.authed(), self.role())
    }
}

impl SessionHints for SessionCache {
    fn authed(&self) -> bool {
        self.get(AUTHED_KEY).as_deref() == Some("true")
    }

    fn role(&self) -> Option<Role> {
        self.get(ROLE_KEY).and_then(|r| r.parse().ok())
    }
}

impl<T: SessionHints + ?Sized> SessionHints for &T {
    fn authed(&self) -> bool {
        (**self).authed()
    }

    fn role(&self) -> Option<Role> {
        (**self).role()
    }
}

impl<T: SessionHints + ?Sized> SessionHints for std::sync::Arc<T> {
    fn authed(&self) -> bool {
        (**self).authed()
    }

    fn role(&self) -> Option<Role> {
        (**self).role()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_then_logout() {
        let cache = SessionCache::new();
        assert!(!cache.authed());
        assert_eq!(cache.role(), None);

        cache.record_login(Role::Company);
        assert!(cache.authed());
        assert_eq!(cache.role(), Some(Role::Company));
        assert_eq!(cache.get(AUTHED_KEY).as_deref(), Some("true"));

        cache.record_logout();
        assert_eq!(cache.snapshot(), SessionContext::anonymous());
    }

    #[test]
    fn unknown_cached_role_reads_as_none() {
        let cache = SessionCache::new();
        cache.record_login(Role::Student);
        cache
            .entries
            .write()
            .unwrap()
            .insert(ROLE_KEY.to_string(), "superuser".to_string());
        assert!(cache.authed());
        assert_eq!(cache.role(), None);
    }
}
