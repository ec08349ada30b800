//! Ports to the hosted backend (auth provider and profile tables).
//!
//! Every call is async and may fail; callers decide how a failure degrades.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jobgate_auth::Role;
use jobgate_core::{AccountStatus, UserId};

pub mod in_memory;

pub use in_memory::{InMemoryBackend, SeedAccount, SeedData, TokenSession};

/// An authenticated session as reported by the auth provider.
///
/// The access token is opaque; it is never inspected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unavailable")]
    Unavailable,

    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),
}

/// Profile table holding an identity's account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTable {
    Seeker,
    Company,
}

impl ProfileTable {
    /// `company` reads the company table; anything else (including no cached
    /// role) reads the seeker table.
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Company) => ProfileTable::Company,
            _ => ProfileTable::Seeker,
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            ProfileTable::Seeker => "seeker_profiles",
            ProfileTable::Company => "company_profiles",
        }
    }
}

/// Session accessor.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// The current session, or `None` for an anonymous visitor.
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;
}

/// Point reads against the role and profile tables, keyed by user id.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// `None` when the identity has no row in `table`.
    async fn account_status(
        &self,
        table: ProfileTable,
        user_id: UserId,
    ) -> Result<Option<AccountStatus>, BackendError>;

    async fn role_of(&self, user_id: UserId) -> Result<Option<Role>, BackendError>;
}

/// Admin-session probe for the current session.
#[async_trait]
pub trait AdminProbe: Send + Sync {
    async fn is_admin(&self) -> Result<bool, BackendError>;
}
