/// Role-based access gate and route table
///
/// Everything here is pure: decisions are computed from a `Session` value
/// and never perform I/O.
use crate::{
    models::Role,
    session::{Session, SessionStatus},
};
use serde::{Deserialize, Serialize};

/// Sign-in page path
pub const SIGN_IN_PATH: &str = "/signin";

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const DOCTOR_ONLY: &[Role] = &[Role::Doctor];
const RECEPTION_ONLY: &[Role] = &[Role::Reception];

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "role", rename_all = "camelCase")]
pub enum Decision {
    Render,
    RedirectToLogin,
    RedirectToRoleHome(Role),
}

impl Decision {
    /// Target path for redirects; `None` for `Render`
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            Decision::Render => None,
            Decision::RedirectToLogin => Some(SIGN_IN_PATH),
            Decision::RedirectToRoleHome(role) => Some(role.home_route()),
        }
    }
}

/// Access gate for protected views
pub struct AccessGate;

impl AccessGate {
    /// Decide whether a view requiring `required_roles` may render
    ///
    /// An empty role set admits any authenticated principal. A session that
    /// is still bootstrapping is treated as signed out.
    pub fn decide(session: &Session, required_roles: &[Role]) -> Decision {
        let principal = match (session.status(), session.principal()) {
            (SessionStatus::Authenticated, Some(principal)) => principal,
            _ => return Decision::RedirectToLogin,
        };

        if !required_roles.is_empty() && !required_roles.contains(&principal.role) {
            return Decision::RedirectToRoleHome(principal.role);
        }

        Decision::Render
    }
}

/// Application routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRoute {
    SignIn,
    Admin,
    Doctor,
    Reception,
    Root,
    Unknown(String),
}

impl AppRoute {
    /// Parse a path, ignoring query string, fragment and trailing slash
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => AppRoute::Root,
            "/signin" => AppRoute::SignIn,
            "/admin" => AppRoute::Admin,
            "/doctor" => AppRoute::Doctor,
            "/reception" => AppRoute::Reception,
            _ => AppRoute::Unknown(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            AppRoute::SignIn => SIGN_IN_PATH,
            AppRoute::Admin => "/admin",
            AppRoute::Doctor => "/doctor",
            AppRoute::Reception => "/reception",
            AppRoute::Root => "/",
            AppRoute::Unknown(path) => path,
        }
    }

    /// Roles admitted to a protected panel; `None` for unprotected routes
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            AppRoute::Admin => Some(ADMIN_ONLY),
            AppRoute::Doctor => Some(DOCTOR_ONLY),
            AppRoute::Reception => Some(RECEPTION_ONLY),
            _ => None,
        }
    }

    /// Home panel for `role`
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Admin => AppRoute::Admin,
            Role::Doctor => AppRoute::Doctor,
            Role::Reception => AppRoute::Reception,
        }
    }
}

/// Resolve a requested path to the route that should actually be shown
///
/// Signed-out sessions only ever see the sign-in page. Signed-in sessions
/// are sent to their role home from the sign-in page, the root and unknown
/// paths; protected panels go through `AccessGate::decide`.
pub fn resolve_route(session: &Session, path: &str) -> AppRoute {
    let requested = AppRoute::parse(path);

    let Some(role) = session.role().filter(|_| session.is_authenticated()) else {
        return AppRoute::SignIn;
    };

    match requested.required_roles() {
        Some(required) => match AccessGate::decide(session, required) {
            Decision::Render => requested,
            Decision::RedirectToLogin => AppRoute::SignIn,
            Decision::RedirectToRoleHome(role) => AppRoute::home_for(role),
        },
        None => AppRoute::home_for(role),
    }
}

/// Sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub path: &'static str,
    pub label: &'static str,
    /// Whether the gate admits `role` to this entry
    pub accessible: bool,
}

/// Sidebar entries as seen by `role`
pub fn navigation_for(role: Role) -> Vec<NavItem> {
    const ENTRIES: [(&str, &str, Role); 3] = [
        ("/admin", "User Management", Role::Admin),
        ("/doctor", "Doctor Panel", Role::Doctor),
        ("/reception", "Reception Panel", Role::Reception),
    ];

    ENTRIES
        .iter()
        .map(|&(path, label, owner)| NavItem {
            path,
            label,
            accessible: owner == role,
        })
        .collect()
}
