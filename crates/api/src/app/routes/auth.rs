use std::future::Future;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};

use jobgate_auth::Role;
use jobgate_infra::backend::{BackendError, ProfileDirectory};

use crate::app::dto::{LoginRequest, LoginResponse, landing_page};
use crate::app::errors::{backend_error_to_response, json_error};
use crate::context::{AUTHED_COOKIE, ROLE_COOKIE, RequestSession, SESSION_COOKIE};
use crate::middleware::GateState;

pub fn router(state: GateState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

/// Exchange an access token for the session cookies.
pub async fn login(State(state): State<GateState>, Json(req): Json<LoginRequest>) -> Response {
    let token = req.access_token.trim();
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_graphic() && c != ';') {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "access_token must be a non-empty cookie-safe string",
        );
    }

    let limit = state.check_timeout;
    let session = match bounded(limit, state.backend.session_for_token(token)).await {
        Ok(Some(session)) => session,
        Ok(None) => {
            return json_error(
                StatusCode::UNAUTHORIZED,
                "invalid_session",
                "unknown or expired access token",
            );
        }
        Err(err) => {
            warn!(error = %err, "login: session lookup failed");
            return backend_error_to_response(err);
        }
    };

    let role = match bounded(limit, state.backend.role_of(session.user_id)).await {
        Ok(role) => role,
        Err(err) => {
            warn!(user_id = %session.user_id, error = %err, "login: role lookup failed");
            return backend_error_to_response(err);
        }
    };

    info!(user_id = %session.user_id, role = ?role, "signed in");

    let body = LoginResponse {
        user_id: session.user_id.to_string(),
        role,
        redirect_to: landing_page(req.next.as_deref(), role),
    };
    (AppendHeaders(session_cookies(token, role)), Json(body)).into_response()
}

/// Clear the session cookies and revoke the token, if one was presented.
pub async fn logout(State(state): State<GateState>, headers: HeaderMap) -> Response {
    let session = RequestSession::from_headers(&headers);
    if let Some(token) = session.token() {
        if state.backend.revoke_session(token).is_some() {
            info!("signed out");
        }
    }
    (StatusCode::NO_CONTENT, AppendHeaders(cleared_cookies())).into_response()
}

fn session_cookies(token: &str, role: Option<Role>) -> Vec<(axum::http::HeaderName, String)> {
    let mut cookies = vec![
        (
            SET_COOKIE,
            format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"),
        ),
        (SET_COOKIE, format!("{AUTHED_COOKIE}=true; Path=/; SameSite=Lax")),
    ];
    match role {
        Some(role) => cookies.push((
            SET_COOKIE,
            format!("{ROLE_COOKIE}={}; Path=/; SameSite=Lax", role.as_str()),
        )),
        None => cookies.push((SET_COOKIE, expired(ROLE_COOKIE))),
    }
    cookies
}

fn cleared_cookies() -> Vec<(axum::http::HeaderName, String)> {
    [SESSION_COOKIE, AUTHED_COOKIE, ROLE_COOKIE]
        .into_iter()
        .map(|name| (SET_COOKIE, expired(name)))
        .collect()
}

fn expired(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; SameSite=Lax")
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, BackendError>>,
) -> Result<T, BackendError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| BackendError::Timeout(limit))?
}
