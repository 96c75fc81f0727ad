/// Clinic roles
use crate::error::ClinicError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff role carried by every user and principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
    /// Manages staff accounts
    Admin,
    /// Sees own patients, appointments and records
    Doctor,
    /// Registers patients and books appointments
    Reception,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Doctor, Role::Reception];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Reception => "reception",
        }
    }

    /// Human readable name used in tables and menus
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Doctor => "Doctor",
            Role::Reception => "Reception",
        }
    }

    /// Default landing route for this role
    pub fn home_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Doctor => "/doctor",
            Role::Reception => "/reception",
        }
    }
}

impl FromStr for Role {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "reception" => Ok(Role::Reception),
            _ => Err(ClinicError::Validation(format!("Invalid role: {}", s))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ClinicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
