use core::str::FromStr;

use serde::{Deserialize, Serialize};

use jobgate_core::DomainError;

/// Coarse-grained category of an identity.
///
/// Decides which route families an identity may reach and which backing
/// profile table holds its account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Seeker (student or job-seeker).
    Student,
    Company,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Company, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Company => "company",
            Role::Admin => "admin",
        }
    }

    /// Landing page for an authenticated identity of this role.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Student => "/seekers/dashboard",
            Role::Company => "/company/dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "company" => Ok(Role::Company),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}
