/// Session and principal state
///
/// A session starts in `Bootstrapping`, resolves to `Authenticated` or
/// `Unauthenticated` once per bootstrap attempt, and afterwards changes only
/// through explicit login and logout.

pub mod manager;

pub use manager::SessionManager;

use crate::models::{Role, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Bootstrapping,
    Authenticated,
    Unauthenticated,
}

/// The authenticated identity behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub display_name: String,
    pub must_change_password: bool,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Principal {
            display_name: user.display_name(),
            id: user.id,
            email: user.email,
            role: user.role,
            must_change_password: user.must_change_password,
        }
    }
}

/// Current session
///
/// `status == Authenticated` exactly when both `principal` and `token` are
/// present. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    principal: Option<Principal>,
    #[serde(skip)]
    token: Option<String>,
    status: SessionStatus,
}

impl Session {
    pub fn bootstrapping() -> Self {
        Self {
            principal: None,
            token: None,
            status: SessionStatus::Bootstrapping,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            principal: None,
            token: None,
            status: SessionStatus::Unauthenticated,
        }
    }

    pub fn authenticated(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            principal: Some(principal),
            token: Some(token.into()),
            status: SessionStatus::Authenticated,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.principal.as_ref().map(|p| p.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    pub fn is_resolved(&self) -> bool {
        self.status != SessionStatus::Bootstrapping
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::bootstrapping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: "u1".to_string(),
            email: "u1@clinic.test".to_string(),
            role,
            display_name: "Test User".to_string(),
            must_change_password: false,
        }
    }

    #[test]
    fn test_constructors_hold_invariant() {
        let s = Session::bootstrapping();
        assert!(!s.is_resolved());
        assert!(s.principal().is_none() && s.token().is_none());

        let s = Session::unauthenticated();
        assert!(s.is_resolved());
        assert!(!s.is_authenticated());
        assert_eq!(s.role(), None);

        let s = Session::authenticated(principal(Role::Doctor), "t1");
        assert!(s.is_authenticated());
        assert_eq!(s.token(), Some("t1"));
        assert_eq!(s.role(), Some(Role::Doctor));
    }

    #[test]
    fn test_token_is_never_serialized() {
        let s = Session::authenticated(principal(Role::Admin), "secret-token");
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"status\":\"authenticated\""));
    }

    #[test]
    fn test_principal_from_user() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "u9",
            "email": "house@clinic.test",
            "role": "doctor",
            "firstName": "Greg",
            "lastName": "House",
            "mustChangePassword": true
        }))
        .unwrap();

        let p = Principal::from(user);
        assert_eq!(p.display_name, "Greg House");
        assert_eq!(p.role, Role::Doctor);
        assert!(p.must_change_password);
    }
}
