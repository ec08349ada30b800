use axum::{
    Router,
    extract::OriginalUri,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::get,
};

use jobgate_auth::routes::{ADMIN_LOGIN, BANNED, HOME, LOGIN, ROOT};
use jobgate_auth::{Role, RoleGate};

use crate::middleware;

/// Page routes. The caller wraps the whole router in the global gate; the
/// role families carry their own role gate on top.
pub fn router() -> Router {
    Router::new()
        .route(ROOT, get(root))
        .route(HOME, get(page))
        .route(LOGIN, get(page))
        .route("/signup", get(page))
        .route("/signup/verify", get(page))
        .route("/forgot-password", get(page))
        .route("/reset-password", get(page))
        .route("/about", get(page))
        .route("/contact", get(page))
        .route(BANNED, get(page))
        .route("/admin", get(page))
        // Covers `/admin/login` too.
        .route("/admin/*page", get(page))
        .merge(role_family("/seekers/*page", Role::Student))
        .merge(role_family("/company/*page", Role::Company))
        .fallback(not_found)
}

fn role_family(pattern: &str, role: Role) -> Router {
    Router::new()
        .route(pattern, get(page))
        .route_layer(axum::middleware::from_fn_with_state(
            RoleGate::new([role]),
            middleware::role_gate,
        ))
}

async fn root() -> Redirect {
    Redirect::to(HOME)
}

async fn page(OriginalUri(uri): OriginalUri) -> Html<String> {
    Html(shell(title_for(uri.path())))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(shell("Not found")))
}

fn title_for(path: &str) -> &'static str {
    match path {
        HOME => "Home",
        LOGIN => "Sign in",
        "/signup" | "/signup/verify" => "Sign up",
        "/forgot-password" | "/reset-password" => "Reset password",
        "/about" => "About",
        "/contact" => "Contact",
        BANNED => "Account suspended",
        ADMIN_LOGIN => "Admin sign in",
        p if p.starts_with("/admin") => "Admin",
        p if p.starts_with("/seekers/") => "Job seekers",
        p if p.starts_with("/company/") => "Companies",
        _ => "Jobgate",
    }
}

fn shell(title: &str) -> String {
    format!(
        "<!doctype html><html><head><title>{title}</title></head>\
         <body><main><h1>{title}</h1></main></body></html>"
    )
}
