use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `user` object returned by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// Login outcome handed to the application layer. Nothing in the crate
/// reads session state from anywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: AuthenticatedUser,
}

/// Which dashboard a session lands on after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    CohortView,
    StudentView,
}

impl Session {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self { user }
    }

    /// Builds a session from a login response body
    /// (`{"message": ..., "user": {...}}`).
    pub fn from_login_response(body: &str) -> ViewResult<Self> {
        #[derive(Deserialize)]
        struct LoginResponse {
            user: AuthenticatedUser,
        }

        let response: LoginResponse = serde_json::from_str(body)?;
        Ok(Self::new(response.user))
    }

    pub fn landing(&self) -> Landing {
        match self.user.role {
            Role::Admin => Landing::CohortView,
            Role::Student => Landing::StudentView,
        }
    }

    pub fn require_admin(&self) -> ViewResult<()> {
        match self.user.role {
            Role::Admin => Ok(()),
            other => Err(ViewError::AdminRequired(other.to_string())),
        }
    }
}
