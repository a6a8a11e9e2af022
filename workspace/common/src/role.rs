use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Access tier of a user, lowest to highest: executive, management, admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Management,
    Executive,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Management => "management",
            Role::Executive => "executive",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin | Role::Management)
    }

    /// Executives and admins may record expenses.
    pub fn can_enter_expenses(&self) -> bool {
        matches!(self, Role::Executive | Role::Admin)
    }

    /// Executives only ever see their own expenses.
    pub fn can_view_all_expenses(&self) -> bool {
        self.can_manage()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "management" => Ok(Role::Management),
            "executive" => Ok(Role::Executive),
            other => Err(format!("invalid role '{}'", other)),
        }
    }
}
