use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use jobgate_auth::routes::ADMIN_LOGIN;
use jobgate_auth::{
    AdminSession, BanCheck, Decision, GateInput, Location, RoleGate, RouteFamily, SessionHints,
    explain,
};
use jobgate_infra::backend::{AdminProbe, InMemoryBackend, TokenSession};
use jobgate_infra::check_ban_status_within;

use crate::context::RequestSession;

const LOADING_SHELL: &str = "<!doctype html><html><head><title>Loading</title></head>\
<body><div class=\"spinner\" role=\"status\" aria-live=\"polite\">Loading…</div></body></html>";

#[derive(Clone)]
pub struct GateState {
    pub backend: Arc<InMemoryBackend>,
    /// Bound on each backend round trip made on behalf of a request.
    pub check_timeout: Duration,
}

impl GateState {
    pub fn new(backend: Arc<InMemoryBackend>, check_timeout: Duration) -> Self {
        Self {
            backend,
            check_timeout,
        }
    }

    fn session_for(&self, hints: &RequestSession) -> TokenSession {
        TokenSession::new(self.backend.clone(), hints.token().map(str::to_string))
    }
}

/// Global page gate.
///
/// Resolves the admin probe for `/admin*` and the ban status for signed-in
/// visitors, then lets the decision engine pick the response. A ban or unban
/// transition short-circuits into a redirect to `/banned` or `/home`.
pub async fn gate_middleware(State(state): State<GateState>, req: Request, next: Next) -> Response {
    let location = request_location(&req);
    let hints = RequestSession::from_headers(req.headers());
    let session = state.session_for(&hints);

    let mut input = GateInput::new(&location, &hints);
    match location.family() {
        RouteFamily::Admin if location.path() != ADMIN_LOGIN => {
            input = input.with_admin(probe_admin(&state, &session).await);
        }
        RouteFamily::General | RouteFamily::BannedPage if hints.authed() => {
            let limit = state.check_timeout;
            let ban = match check_ban_status_within(
                limit,
                &session,
                state.backend.as_ref(),
                &hints,
                location.path(),
            )
            .await
            {
                Ok(outcome) => {
                    if let Some(target) = outcome.navigate_to {
                        debug!(path = location.path(), to = target, "ban status transition");
                        return Redirect::to(target).into_response();
                    }
                    outcome.status
                }
                Err(err) => {
                    warn!(path = location.path(), error = %err, "ban check failed, failing open");
                    BanCheck::NotBanned
                }
            };
            input = input.with_ban(ban);
        }
        _ => {}
    }

    let verdict = explain(&input);
    debug!(path = location.path(), rule = ?verdict.rule, decision = ?verdict.decision, "page gate");
    respond(verdict.decision, req, next).await
}

/// Role gate for one route family, configured by its state.
pub async fn role_gate(State(gate): State<RoleGate>, req: Request, next: Next) -> Response {
    let location = request_location(&req);
    let hints = RequestSession::from_headers(req.headers());
    let decision = gate.decide(&location, &hints);
    if !decision.is_render() {
        debug!(path = location.path(), role = ?hints.role(), ?decision, "role gate");
    }
    respond(decision, req, next).await
}

async fn probe_admin(state: &GateState, session: &TokenSession) -> AdminSession {
    match tokio::time::timeout(state.check_timeout, session.is_admin()).await {
        Ok(Ok(is_admin)) => AdminSession::from_probe(is_admin),
        Ok(Err(err)) => {
            warn!(error = %err, "admin probe failed");
            AdminSession::Checking
        }
        Err(_) => {
            warn!(timeout = ?state.check_timeout, "admin probe timed out");
            AdminSession::Checking
        }
    }
}

async fn respond(decision: Decision, req: Request, next: Next) -> Response {
    match decision {
        Decision::Render => next.run(req).await,
        Decision::Redirect(target) => Redirect::to(&target).into_response(),
        Decision::Loading => (
            StatusCode::OK,
            [(header::REFRESH, "1"), (header::CACHE_CONTROL, "no-store")],
            Html(LOADING_SHELL),
        )
            .into_response(),
        Decision::Blank => (StatusCode::OK, [(header::CACHE_CONTROL, "no-store")]).into_response(),
    }
}

/// Location as the visitor sees it, even inside nested routers.
fn request_location(req: &Request) -> Location {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|o| &o.0)
        .unwrap_or_else(|| req.uri());
    match uri.query() {
        Some(query) => Location::new(uri.path()).with_query(query),
        None => Location::new(uri.path()),
    }
}
