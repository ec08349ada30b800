//! HTTP surface: page gate middleware, session cookies, login/logout.

pub mod app;
pub mod context;
pub mod middleware;
