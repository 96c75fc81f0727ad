//! In-process stand-ins for the clinic REST API
#![allow(dead_code)]

use async_trait::async_trait;
use clinic_core::{
    api::{AuthApi, LoginResponse, UsersApi},
    config::{ClientConfig, UsersBacking},
    models::{NewUser, Role, User, UserPatch},
    storage::{KeyValueStore, MemoryStore},
    AppContext, ClinicError, ClinicResult,
};
use std::sync::{Arc, Mutex};

pub const ADMIN_EMAIL: &str = "admin@clinic.test";
pub const ADMIN_PASSWORD: &str = "password123";

pub fn user(id: &str, role: Role, first: &str, last: &str) -> User {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": format!("{}@clinic.test", id),
        "role": role.as_str(),
        "firstName": first,
        "lastName": last,
    }))
    .unwrap()
}

/// Fake server: one admin account, token "t1", an editable user table
pub struct StubServer {
    pub users: Mutex<Vec<User>>,
    pub fail_writes: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
}

impl StubServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            users: Mutex::new(vec![
                user("u1", Role::Admin, "Ada", "Admin"),
                user("doc1", Role::Doctor, "Greg", "House"),
            ]),
            fail_writes: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        *self.fail_writes.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn authorize(&self, token: &str) -> ClinicResult<()> {
        if token == "t1" {
            Ok(())
        } else {
            Err(ClinicError::Status { status: 401, message: "Unauthorized".into() })
        }
    }

    fn check_writes(&self) -> ClinicResult<()> {
        if *self.fail_writes.lock().unwrap() {
            Err(ClinicError::Status { status: 500, message: "Internal Server Error".into() })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AuthApi for StubServer {
    async fn login(&self, email: &str, password: &str) -> ClinicResult<LoginResponse> {
        self.record("POST /auth/login");
        if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
            Ok(LoginResponse {
                access_token: "t1".to_string(),
                user: user("u1", Role::Admin, "Ada", "Admin"),
            })
        } else {
            Err(ClinicError::Status { status: 401, message: "Unauthorized".into() })
        }
    }

    async fn me(&self, token: &str) -> ClinicResult<User> {
        self.record("GET /auth/me");
        self.authorize(token)?;
        Ok(user("u1", Role::Admin, "Ada", "Admin"))
    }

    async fn change_password(&self, token: &str, current: &str, _new: &str) -> ClinicResult<()> {
        self.record("POST /auth/change-password");
        self.authorize(token)?;
        if current != ADMIN_PASSWORD {
            return Err(ClinicError::Status { status: 400, message: "Wrong password".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl UsersApi for StubServer {
    async fn list_users(&self, token: &str) -> ClinicResult<Vec<User>> {
        self.record("GET /users");
        self.authorize(token)?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, token: &str, draft: &NewUser) -> ClinicResult<User> {
        self.record("POST /users");
        self.authorize(token)?;
        self.check_writes()?;
        let mut users = self.users.lock().unwrap();
        let mut created = user(&format!("u{}", users.len() + 10), draft.role, &draft.first_name, &draft.last_name);
        created.email = draft.email.clone();
        created.must_change_password = true;
        users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, token: &str, id: &str, patch: &UserPatch) -> ClinicResult<User> {
        self.record(format!("PATCH /users/{}", id));
        self.authorize(token)?;
        self.check_writes()?;
        let mut users = self.users.lock().unwrap();
        let row = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ClinicError::Status { status: 404, message: "Not Found".into() })?;
        clinic_core::models::Entity::apply_patch(row, patch);
        Ok(row.clone())
    }

    async fn delete_user(&self, token: &str, id: &str) -> ClinicResult<()> {
        self.record(format!("DELETE /users/{}", id));
        self.authorize(token)?;
        self.check_writes()?;
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

/// Context over a memory store and the stub server
pub async fn context(
    store: Arc<MemoryStore>,
    server: Arc<StubServer>,
    users_backing: UsersBacking,
) -> AppContext {
    let mut config = ClientConfig::default();
    config.storage.users_backing = users_backing;
    let storage: Arc<dyn KeyValueStore> = store;
    AppContext::with_backends(config, storage, server.clone(), server)
        .await
        .unwrap()
}
