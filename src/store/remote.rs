/// Remote user backing over the `/users` endpoints
use crate::{
    api::UsersApi,
    error::{ClinicError, ClinicResult},
    models::{NewUser, User, UserPatch},
    store::{replace_row, without_row, Backing, Change},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Supplies the bearer token for authenticated calls
pub trait BearerSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// User collection backing that round-trips every write to the server
///
/// The server's response is authoritative: created and updated rows are
/// taken from the response body, not from the local draft or patch.
pub struct RemoteUserBacking {
    api: Arc<dyn UsersApi>,
    auth: Arc<dyn BearerSource>,
}

impl RemoteUserBacking {
    pub fn new(api: Arc<dyn UsersApi>, auth: Arc<dyn BearerSource>) -> Self {
        Self { api, auth }
    }

    fn token(&self) -> ClinicResult<String> {
        self.auth
            .bearer_token()
            .ok_or_else(|| ClinicError::Authentication("No active session".to_string()))
    }
}

#[async_trait]
impl Backing<User> for RemoteUserBacking {
    async fn load(&self) -> ClinicResult<Vec<User>> {
        let token = self.token()?;
        self.api.list_users(&token).await
    }

    async fn insert(&self, current: &[User], draft: NewUser) -> ClinicResult<Change<User>> {
        let token = self.token()?;
        let row = self.api.create_user(&token, &draft).await?;

        let mut rows = current.to_vec();
        rows.push(row.clone());

        Ok(Change { row, rows })
    }

    async fn update(
        &self,
        current: &[User],
        id: &str,
        patch: &UserPatch,
    ) -> ClinicResult<Option<Change<User>>> {
        if !current.iter().any(|u| u.id == id) {
            return Ok(None);
        }

        let token = self.token()?;
        let row = self.api.update_user(&token, id, patch).await?;
        let rows = replace_row(current, id, &row);

        Ok(Some(Change { row, rows }))
    }

    async fn remove(&self, current: &[User], id: &str) -> ClinicResult<Option<Vec<User>>> {
        if !current.iter().any(|u| u.id == id) {
            return Ok(None);
        }

        let token = self.token()?;
        self.api.delete_user(&token, id).await?;

        Ok(Some(without_row(current, id)))
    }

    fn is_remote(&self) -> bool {
        true
    }
}
