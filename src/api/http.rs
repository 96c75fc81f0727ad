/// reqwest-backed implementation of the remote API traits
use crate::{
    api::{parse_user_list, AuthApi, ChangePasswordRequest, LoginRequest, LoginResponse, UsersApi},
    config::ApiConfig,
    error::{ClinicError, ClinicResult},
    models::{NewUser, User, UserPatch},
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the clinic REST API
#[derive(Debug, Clone)]
pub struct HttpApi {
    http_client: Client,
    base_url: String,
}

impl HttpApi {
    /// Create a new API client
    pub fn new(config: &ApiConfig) -> ClinicResult<Self> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClinicError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn non-2xx responses into `ClinicError::Status`
    async fn check(response: Response) -> ClinicResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        Err(ClinicError::from_status(status, message))
    }

    /// Decode a 2xx body, reporting shape mismatches as malformed responses
    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> ClinicResult<T> {
        let body: Value = response
            .json()
            .await
            .map_err(|e| ClinicError::MalformedResponse(format!("{}: {}", what, e)))?;

        serde_json::from_value(body)
            .map_err(|e| ClinicError::MalformedResponse(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> ClinicResult<LoginResponse> {
        debug!("POST /auth/login");

        let response = self
            .http_client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let response = Self::check(response).await?;
        Self::decode(response, "login payload").await
    }

    async fn me(&self, token: &str) -> ClinicResult<User> {
        debug!("GET /auth/me");

        let response = self
            .http_client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Self::decode(response, "principal").await
    }

    async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> ClinicResult<()> {
        debug!("POST /auth/change-password");

        let response = self
            .http_client
            .post(self.url("/auth/change-password"))
            .bearer_auth(token)
            .json(&ChangePasswordRequest {
                current_password,
                new_password,
            })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl UsersApi for HttpApi {
    async fn list_users(&self, token: &str) -> ClinicResult<Vec<User>> {
        debug!("GET /users");

        let response = self
            .http_client
            .get(self.url("/users"))
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let body: Value = Self::decode(response, "user list").await?;
        parse_user_list(body)
    }

    async fn create_user(&self, token: &str, draft: &NewUser) -> ClinicResult<User> {
        debug!("POST /users");

        let response = self
            .http_client
            .post(self.url("/users"))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Self::decode(response, "created user").await
    }

    async fn update_user(&self, token: &str, id: &str, patch: &UserPatch) -> ClinicResult<User> {
        debug!("PATCH /users/{}", id);

        let response = self
            .http_client
            .patch(self.url(&format!("/users/{}", id)))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;

        let response = Self::check(response).await?;
        Self::decode(response, "updated user").await
    }

    async fn delete_user(&self, token: &str, id: &str) -> ClinicResult<()> {
        debug!("DELETE /users/{}", id);

        let response = self
            .http_client
            .delete(self.url(&format!("/users/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_base_url_is_normalized() {
        let mut config = ClientConfig::default().api;
        config.base_url = "https://clinic.test/api/".to_string();

        let api = HttpApi::new(&config).unwrap();
        assert_eq!(api.base_url(), "https://clinic.test/api");
        assert_eq!(api.url("/auth/me"), "https://clinic.test/api/auth/me");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_persistence_failure() {
        let mut config = ClientConfig::default().api;
        // Port 9 (discard) on loopback refuses connections
        config.base_url = "http://127.0.0.1:9".to_string();
        config.timeout_secs = 2;

        let api = HttpApi::new(&config).unwrap();
        let err = api.me("t1").await.unwrap_err();
        assert!(matches!(err, ClinicError::Http(_)));
        assert_eq!(err.kind(), crate::error::FailureKind::Persistence);
    }
}
