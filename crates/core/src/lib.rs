//! `jobgate-core`: domain primitives shared by the gate crates.
//!
//! This crate is **pure** (no IO, no async, no backend concerns).

pub mod error;
pub mod id;
pub mod status;

pub use error::DomainError;
pub use id::UserId;
pub use status::AccountStatus;
