//! The ban-check routine shared by the background monitor and the HTTP gate.

use std::time::Duration;

use tracing::debug;

use jobgate_auth::routes::{BANNED, HOME};
use jobgate_auth::{BanCheck, Role, SessionHints};

use crate::backend::{BackendError, ProfileDirectory, ProfileTable, SessionSource};

/// Result of one ban check at a given path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanCheckOutcome {
    /// Always resolved (`Banned` or `NotBanned`).
    pub status: BanCheck,
    /// Full-page navigation the transition calls for, if any.
    pub navigate_to: Option<&'static str>,
}

impl BanCheckOutcome {
    /// Not subject to bans; never navigates.
    fn exempt() -> Self {
        Self {
            status: BanCheck::NotBanned,
            navigate_to: None,
        }
    }

    fn resolved(banned: bool, path: &str) -> Self {
        let navigate_to = match (banned, path == BANNED) {
            (true, false) => Some(BANNED),
            (false, true) => Some(HOME),
            _ => None,
        };
        Self {
            status: BanCheck::from_banned(banned),
            navigate_to,
        }
    }
}

/// Check whether the current session's account is banned.
///
/// - no session: not banned (anonymous visitors cannot be banned), no navigation
/// - cached role `admin`: not banned, backend not consulted, no navigation
/// - otherwise the role's profile table decides; a missing row is not a ban
///
/// The cached role only picks the table. The status itself always comes
/// from the backend.
pub async fn check_ban_status<H>(
    sessions: &dyn SessionSource,
    profiles: &dyn ProfileDirectory,
    hints: &H,
    path: &str,
) -> Result<BanCheckOutcome, BackendError>
where
    H: SessionHints + ?Sized,
{
    let Some(session) = sessions.current_session().await? else {
        debug!(path, "ban check: no session");
        return Ok(BanCheckOutcome::exempt());
    };

    let role = hints.role();
    if role == Some(Role::Admin) {
        debug!(path, user_id = %session.user_id, "ban check: admin bypass");
        return Ok(BanCheckOutcome::exempt());
    }

    let table = ProfileTable::for_role(role);
    let status = profiles.account_status(table, session.user_id).await?;
    let banned = status.is_some_and(|s| s.is_banned());
    debug!(
        path,
        user_id = %session.user_id,
        table = table.table_name(),
        ?status,
        "ban check: profile status read"
    );

    Ok(BanCheckOutcome::resolved(banned, path))
}

/// [`check_ban_status`] bounded by `limit`; running out of time is a
/// [`BackendError::Timeout`].
pub async fn check_ban_status_within<H>(
    limit: Duration,
    sessions: &dyn SessionSource,
    profiles: &dyn ProfileDirectory,
    hints: &H,
    path: &str,
) -> Result<BanCheckOutcome, BackendError>
where
    H: SessionHints + ?Sized,
{
    tokio::time::timeout(limit, check_ban_status(sessions, profiles, hints, path))
        .await
        .map_err(|_| BackendError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use jobgate_auth::SessionContext;
    use jobgate_core::{AccountStatus, UserId};

    use super::*;
    use crate::backend::{InMemoryBackend, TokenSession};

    struct Fixture {
        backend: Arc<InMemoryBackend>,
        session: TokenSession,
        user: UserId,
    }

    fn fixture() -> Fixture {
        let backend = Arc::new(InMemoryBackend::new());
        let user = UserId::new();
        backend.insert_session(user, "tok", Utc::now() + chrono::Duration::hours(1));
        let session = TokenSession::new(backend.clone(), Some("tok".into()));
        Fixture {
            backend,
            session,
            user,
        }
    }

    #[tokio::test]
    async fn anonymous_is_never_banned() {
        let f = fixture();
        let anon = TokenSession::anonymous(f.backend.clone());
        let out = check_ban_status(&anon, f.backend.as_ref(), &SessionContext::anonymous(), "/banned")
            .await
            .unwrap();
        assert_eq!(out.status, BanCheck::NotBanned);
        assert_eq!(out.navigate_to, None);
    }

    #[tokio::test]
    async fn banned_seeker_is_sent_to_banned_page() {
        let f = fixture();
        f.backend.set_status(ProfileTable::Seeker, f.user, AccountStatus::Banned);
        let hints = SessionContext::signed_in(Role::Student);

        let out = check_ban_status(&f.session, f.backend.as_ref(), &hints, "/seekers/opportunities")
            .await
            .unwrap();
        assert_eq!(out.status, BanCheck::Banned);
        assert_eq!(out.navigate_to, Some("/banned"));

        let on_banned = check_ban_status(&f.session, f.backend.as_ref(), &hints, "/banned")
            .await
            .unwrap();
        assert_eq!(on_banned.navigate_to, None);
    }

    #[tokio::test]
    async fn company_role_reads_company_table() {
        let f = fixture();
        f.backend.set_status(ProfileTable::Seeker, f.user, AccountStatus::Banned);
        f.backend.set_status(ProfileTable::Company, f.user, AccountStatus::Active);

        let out = check_ban_status(
            &f.session,
            f.backend.as_ref(),
            &SessionContext::signed_in(Role::Company),
            "/company/jobs",
        )
        .await
        .unwrap();
        assert_eq!(out.status, BanCheck::NotBanned);
    }

    #[tokio::test]
    async fn missing_role_falls_back_to_seeker_table() {
        let f = fixture();
        f.backend.set_status(ProfileTable::Seeker, f.user, AccountStatus::Banned);

        let out = check_ban_status(&f.session, f.backend.as_ref(), &SessionContext::new(true, None), "/x")
            .await
            .unwrap();
        assert_eq!(out.status, BanCheck::Banned);
    }

    #[tokio::test]
    async fn admin_bypasses_profile_lookup() {
        let f = fixture();
        f.backend.set_status(ProfileTable::Seeker, f.user, AccountStatus::Banned);
        f.backend.set_status(ProfileTable::Company, f.user, AccountStatus::Banned);

        let out = check_ban_status(
            &f.session,
            f.backend.as_ref(),
            &SessionContext::signed_in(Role::Admin),
            "/admin/users",
        )
        .await
        .unwrap();
        assert_eq!(out.status, BanCheck::NotBanned);
        assert_eq!(out.navigate_to, None);
    }

    #[tokio::test]
    async fn missing_profile_row_is_not_a_ban() {
        let f = fixture();
        let out = check_ban_status(
            &f.session,
            f.backend.as_ref(),
            &SessionContext::signed_in(Role::Student),
            "/seekers/dashboard",
        )
        .await
        .unwrap();
        assert_eq!(out.status, BanCheck::NotBanned);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let f = fixture();
        f.backend.set_latency(Duration::from_secs(10));
        let err = check_ban_status_within(
            Duration::from_secs(5),
            &f.session,
            f.backend.as_ref(),
            &SessionContext::signed_in(Role::Student),
            "/seekers/dashboard",
        )
        .await
        .unwrap_err();
        assert_eq!(err, BackendError::Timeout(Duration::from_secs(5)));
    }
}
