/// Clinic Core - session, access and data layer for a role-gated clinic client
///
/// Owns the authenticated session, the four linked entity collections
/// (users, patients, appointments, medical records) and the role-based access
/// gate that every page of the clinic front end depends on.

pub mod access;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod relations;
pub mod session;
pub mod storage;
pub mod store;
pub mod validation;

pub use access::{navigation_for, resolve_route, AccessGate, AppRoute, Decision};
pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{ClinicError, ClinicResult, FailureKind, FailureReport, Outcome};
pub use relations::RelationalIndex;
pub use session::{Principal, Session, SessionManager, SessionStatus};
