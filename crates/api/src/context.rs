use axum::http::HeaderMap;
use axum::http::header::COOKIE;

use jobgate_auth::{Role, SessionHints};

pub const SESSION_COOKIE: &str = "jg_sid";
pub const AUTHED_COOKIE: &str = "jg_authed";
pub const ROLE_COOKIE: &str = "jg_role";

/// Session hints carried by the request's cookies.
///
/// The cookies play the part of the browser-side cache: written at login,
/// cleared at logout, trusted only as hints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSession {
    token: Option<String>,
    authed: bool,
    role: Option<Role>,
}

impl RequestSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut session = Self::default();

        let pairs = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='));

        for (name, value) in pairs {
            match name {
                SESSION_COOKIE if !value.is_empty() => session.token = Some(value.to_string()),
                AUTHED_COOKIE => session.authed = value == "true",
                ROLE_COOKIE => session.role = value.parse().ok(),
                _ => {}
            }
        }

        session
    }

    /// Access token to hand to the backend, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl SessionHints for RequestSession {
    fn authed(&self) -> bool {
        self.authed
    }

    fn role(&self) -> Option<Role> {
        self.role
    }
}
