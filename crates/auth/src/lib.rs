//! `jobgate-auth`: the access decision engine (pure, no IO).
//!
//! Every input the engine needs (cached session hints, admin probe state, ban
//! poll state, current location) is handed in by the caller; the engine only
//! computes what to render. Polling and backend calls live in `jobgate-infra`.

pub mod decision;
pub mod gates;
pub mod probe;
pub mod roles;
pub mod routes;
pub mod session;

pub use decision::{Decision, GateInput, GateRule, GateVerdict, evaluate, explain};
pub use gates::{RoleGate, admin_gate};
pub use probe::{AdminSession, BanCheck};
pub use roles::Role;
pub use routes::{Location, RouteFamily};
pub use session::{SessionCache, SessionContext, SessionHints};
