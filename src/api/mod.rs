/// Remote REST API client
///
/// Endpoints consumed by the session manager and the remote user collection:
/// - POST /auth/login
/// - GET  /auth/me
/// - POST /auth/change-password
/// - GET/POST /users, PATCH/DELETE /users/:id
///
/// Both API surfaces sit behind traits so the session and collection layers
/// can be exercised against in-process stubs.

pub mod http;

pub use http::HttpApi;

use crate::{
    error::{ClinicError, ClinicResult},
    models::{NewUser, User, UserPatch},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

/// Body of `POST /auth/change-password`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Authentication endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token and principal
    async fn login(&self, email: &str, password: &str) -> ClinicResult<LoginResponse>;

    /// Resolve the principal behind a bearer token
    async fn me(&self, token: &str) -> ClinicResult<User>;

    async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> ClinicResult<()>;
}

/// User administration endpoints
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn list_users(&self, token: &str) -> ClinicResult<Vec<User>>;

    /// Create a user; returns the row as stored by the server
    async fn create_user(&self, token: &str, draft: &NewUser) -> ClinicResult<User>;

    /// Patch a user; returns the row as stored by the server
    async fn update_user(&self, token: &str, id: &str, patch: &UserPatch) -> ClinicResult<User>;

    async fn delete_user(&self, token: &str, id: &str) -> ClinicResult<()>;
}

/// Decode a user list that is either a bare array or an object wrapping one
///
/// Wrapped lists are looked up under `users`, then `data`, then
/// `data.users`. Rows that fail to decode are skipped.
pub fn parse_user_list(body: Value) -> ClinicResult<Vec<User>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => {
            let wrapped = match obj.remove("users") {
                Some(users) => Some(users),
                None => match obj.remove("data") {
                    Some(Value::Object(mut data)) => data.remove("users"),
                    other => other,
                },
            };

            match wrapped {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ClinicError::MalformedResponse(
                        "User list envelope has no array".to_string(),
                    ))
                }
            }
        }
        _ => {
            return Err(ClinicError::MalformedResponse(
                "User list is neither an array nor an object".to_string(),
            ))
        }
    };

    let users = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<User>(item) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Skipping undecodable user row: {}", e);
                None
            }
        })
        .collect();

    Ok(users)
}
