use serde::{Deserialize, Serialize};

use jobgate_auth::Role;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub access_token: String,
    /// Page to land on after sign-in, as carried by the login redirect.
    #[serde(default)]
    pub next: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub role: Option<Role>,
    pub redirect_to: String,
}

/// Only origin-relative paths are honoured; anything else lands on the
/// role's home page (or `/home` without a role).
pub fn landing_page(next: Option<&str>, role: Option<Role>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => role
            .map(|r| r.home_path())
            .unwrap_or(jobgate_auth::routes::HOME)
            .to_string(),
    }
}

/// Browsers read `/\host` like `//host` and drop tabs and newlines before
/// parsing, so backslashes and control characters are refused along with
/// protocol-relative targets.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}
