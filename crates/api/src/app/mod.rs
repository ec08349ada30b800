//! HTTP application wiring (Axum router).
//!
//! - `routes/`: page, auth, and system handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use axum::Router;
use tower::ServiceBuilder;

use crate::middleware::{self, GateState};

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every page sits behind the global gate; `/health` and `/auth/*` do not.
pub fn build_app(state: GateState) -> Router {
    let pages = routes::pages::router().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::gate_middleware,
    ));

    Router::new()
        .merge(pages)
        .merge(routes::system::router())
        .merge(routes::auth::router(state))
        .layer(ServiceBuilder::new())
}
