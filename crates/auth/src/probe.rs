//! Tri-state results of the asynchronous checks feeding the gate.
//!
//! `Checking` is a first-class value: the gate always has a defined answer
//! while a check is in flight, failed, or has not started yet.

use serde::{Deserialize, Serialize};

/// Outcome of the admin-session probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSession {
    #[default]
    Checking,
    Admin,
    NotAdmin,
}

impl AdminSession {
    pub fn from_probe(is_admin: bool) -> Self {
        if is_admin {
            AdminSession::Admin
        } else {
            AdminSession::NotAdmin
        }
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, AdminSession::Checking)
    }
}

/// Outcome of the account-ban check for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BanCheck {
    #[default]
    Checking,
    Banned,
    NotBanned,
}

impl BanCheck {
    pub fn from_banned(banned: bool) -> Self {
        if banned {
            BanCheck::Banned
        } else {
            BanCheck::NotBanned
        }
    }

    pub fn is_checking(&self) -> bool {
        matches!(self, BanCheck::Checking)
    }

    pub fn is_resolved(&self) -> bool {
        !self.is_checking()
    }
}
