use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The access level of a user account.
///
/// Stored as TEXT in the `users.role` column; serialized in lowercase on the
/// wire (`"admin"` / `"guard"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Guard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Guard => "guard",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "guard" => Ok(Role::Guard),
            other => Err(ValidationError::InvalidValue(
                "role",
                format!("unknown role `{other}`"),
            )),
        }
    }
}
