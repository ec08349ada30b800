use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobgate_auth::Role;
use jobgate_core::{AccountStatus, UserId};

use super::{AdminProbe, BackendError, ProfileDirectory, ProfileTable, Session, SessionSource};

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<String, Session>,
    roles: HashMap<UserId, Role>,
    seeker_profiles: HashMap<UserId, AccountStatus>,
    company_profiles: HashMap<UserId, AccountStatus>,
}

impl Tables {
    fn profiles(&self, table: ProfileTable) -> &HashMap<UserId, AccountStatus> {
        match table {
            ProfileTable::Seeker => &self.seeker_profiles,
            ProfileTable::Company => &self.company_profiles,
        }
    }

    fn profiles_mut(&mut self, table: ProfileTable) -> &mut HashMap<UserId, AccountStatus> {
        match table {
            ProfileTable::Seeker => &mut self.seeker_profiles,
            ProfileTable::Company => &mut self.company_profiles,
        }
    }
}

/// In-memory stand-in for the hosted backend.
///
/// Intended for tests/dev. `set_unavailable` and `set_latency` inject the
/// failure modes the gate has to survive.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    latency: Mutex<Duration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a backend from seed data, issuing each account's session at `now`.
    pub fn from_seed(seed: &SeedData, now: DateTime<Utc>) -> Self {
        let backend = Self::new();
        for account in &seed.accounts {
            let user_id = account.user_id.unwrap_or_default();
            backend.set_role(user_id, account.role);
            if let Some(table) = account.profile_table() {
                backend.set_status(table, user_id, account.status);
            }
            backend.insert_session(
                user_id,
                account.access_token.clone(),
                now + chrono::Duration::hours(account.ttl_hours),
            );
        }
        backend
    }

    pub fn insert_session(
        &self,
        user_id: UserId,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Session {
        let session = Session {
            user_id,
            access_token: access_token.into(),
            expires_at,
        };
        self.write()
            .sessions
            .insert(session.access_token.clone(), session.clone());
        session
    }

    pub fn revoke_session(&self, access_token: &str) -> Option<Session> {
        self.write().sessions.remove(access_token)
    }

    pub fn set_role(&self, user_id: UserId, role: Role) {
        self.write().roles.insert(user_id, role);
    }

    pub fn grant_admin(&self, user_id: UserId) {
        self.set_role(user_id, Role::Admin);
    }

    /// Insert or overwrite the profile row's status (what an admin ban does).
    pub fn set_status(&self, table: ProfileTable, user_id: UserId, status: AccountStatus) {
        self.write().profiles_mut(table).insert(user_id, status);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = latency;
    }

    /// Resolve a token to its session. Unknown and expired tokens resolve to
    /// `None`.
    pub async fn session_for_token(&self, token: &str) -> Result<Option<Session>, BackendError> {
        self.round_trip().await?;
        let tables = self.read()?;
        Ok(tables
            .sessions
            .get(token)
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned())
    }

    async fn round_trip(&self) -> Result<(), BackendError> {
        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable);
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, BackendError> {
        self.tables.read().map_err(|_| BackendError::Unavailable)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryBackend {
    async fn account_status(
        &self,
        table: ProfileTable,
        user_id: UserId,
    ) -> Result<Option<AccountStatus>, BackendError> {
        self.round_trip().await?;
        Ok(self.read()?.profiles(table).get(&user_id).copied())
    }

    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, BackendError> {
        self.round_trip().await?;
        Ok(self.read()?.roles.get(&user_id).copied())
    }
}

/// A backend handle bound to one caller's access token (the equivalent of
/// the auth client's current session).
#[derive(Debug, Clone)]
pub struct TokenSession {
    backend: Arc<InMemoryBackend>,
    token: Option<String>,
}

impl TokenSession {
    pub fn new(backend: Arc<InMemoryBackend>, token: Option<String>) -> Self {
        Self { backend, token }
    }

    pub fn anonymous(backend: Arc<InMemoryBackend>) -> Self {
        Self::new(backend, None)
    }
}

#[async_trait]
impl SessionSource for TokenSession {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        match &self.token {
            Some(token) => self.backend.session_for_token(token).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AdminProbe for TokenSession {
    async fn is_admin(&self) -> Result<bool, BackendError> {
        let Some(session) = self.current_session().await? else {
            return Ok(false);
        };
        let role = self.backend.role_of(session.user_id).await?;
        Ok(role == Some(Role::Admin))
    }
}

/// Seed file format for dev servers and black-box tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
}

impl SeedData {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAccount {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub role: Role,
    #[serde(default)]
    pub status: AccountStatus,
    pub access_token: String,
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
}

impl SeedAccount {
    /// Admins have no profile row.
    fn profile_table(&self) -> Option<ProfileTable> {
        match self.role {
            Role::Admin => None,
            role => Some(ProfileTable::for_role(Some(role))),
        }
    }
}

fn default_ttl_hours() -> i64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with_student(status: AccountStatus) -> (Arc<InMemoryBackend>, UserId) {
        let backend = Arc::new(InMemoryBackend::new());
        let user = UserId::new();
        backend.set_role(user, Role::Student);
        backend.set_status(ProfileTable::Seeker, user, status);
        backend.insert_session(user, "tok-1", Utc::now() + chrono::Duration::hours(1));
        (backend, user)
    }

    #[tokio::test]
    async fn token_session_resolves_known_tokens_only() {
        let (backend, user) = backend_with_student(AccountStatus::Active);

        let known = TokenSession::new(backend.clone(), Some("tok-1".into()));
        assert_eq!(known.current_session().await.unwrap().unwrap().user_id, user);

        let unknown = TokenSession::new(backend.clone(), Some("nope".into()));
        assert_eq!(unknown.current_session().await.unwrap(), None);

        let anon = TokenSession::anonymous(backend);
        assert_eq!(anon.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_are_absent() {
        let backend = InMemoryBackend::new();
        backend.insert_session(UserId::new(), "old", Utc::now() - chrono::Duration::seconds(1));
        assert_eq!(backend.session_for_token("old").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_backend_fails_every_call() {
        let (backend, user) = backend_with_student(AccountStatus::Banned);
        backend.set_unavailable(true);
        let err = backend
            .account_status(ProfileTable::Seeker, user)
            .await
            .unwrap_err();
        assert_eq!(err, BackendError::Unavailable);

        backend.set_unavailable(false);
        let status = backend.account_status(ProfileTable::Seeker, user).await.unwrap();
        assert_eq!(status, Some(AccountStatus::Banned));
    }

    #[tokio::test]
    async fn admin_probe_turns_true_once_admin_is_granted() {
        let (backend, user) = backend_with_student(AccountStatus::Active);
        let session = TokenSession::new(backend.clone(), Some("tok-1".into()));
        assert!(!session.is_admin().await.unwrap());

        backend.grant_admin(user);
        assert!(session.is_admin().await.unwrap());
        assert_eq!(backend.role_of(user).await.unwrap(), Some(Role::Admin));
        assert!(!TokenSession::anonymous(backend).is_admin().await.unwrap());
    }

    #[test]
    fn seed_creates_rows_per_role() {
        let seed = SeedData::from_json(
            r#"{"accounts": [
                {"role": "student", "access_token": "s", "status": "banned"},
                {"role": "company", "access_token": "c"},
                {"role": "admin", "access_token": "a"}
            ]}"#,
        )
        .unwrap();
        let backend = InMemoryBackend::from_seed(&seed, Utc::now());
        let tables = backend.read().unwrap();

        assert_eq!(tables.sessions.len(), 3);
        assert_eq!(tables.seeker_profiles.values().copied().collect::<Vec<_>>(), vec![AccountStatus::Banned]);
        assert_eq!(tables.company_profiles.values().copied().collect::<Vec<_>>(), vec![AccountStatus::Active]);
        assert_eq!(tables.roles.values().filter(|r| **r == Role::Admin).count(), 1);
    }
}
