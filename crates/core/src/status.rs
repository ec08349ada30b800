//! Account status of a seeker or company profile.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Per-account moderation flag, mutated by administrators out-of-band.
///
/// Admin accounts carry no status; the gate never checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Banned => "banned",
        }
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, AccountStatus::Banned)
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "banned" => Ok(AccountStatus::Banned),
            other => Err(DomainError::validation(format!("unknown account status '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&AccountStatus::Banned).unwrap();
        assert_eq!(json, "\"banned\"");
        let back: AccountStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(back, AccountStatus::Active);
    }

    #[test]
    fn parse_is_exact() {
        assert!("Banned".parse::<AccountStatus>().is_err());
        assert!("banned".parse::<AccountStatus>().unwrap().is_banned());
    }
}
