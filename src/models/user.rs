/// Staff user accounts
use crate::models::{id_from_any, Entity, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Administrative account record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set when the account still carries a temporary password
    #[serde(default)]
    pub must_change_password: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// `name`, else `firstName lastName`, else the email address
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if full.is_empty() {
            self.email.clone()
        } else {
            full
        }
    }
}

/// Create-user request; the body posted to `POST /users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub temporary_password: String,
}

/// Partial user update; the body sent with `PATCH /users/:id`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<bool>,
}

impl Entity for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";

    // v1: flat `name`, plaintext `password`, free-form role casing
    const SCHEMA_VERSION: u32 = 2;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewUser) -> Self {
        User {
            id,
            email: draft.email,
            role: draft.role,
            first_name: Some(draft.first_name),
            last_name: Some(draft.last_name),
            name: None,
            must_change_password: true,
            created_at: Some(created_at),
        }
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = Some(last_name.clone());
        }
        if let Some(name) = &patch.name {
            self.name = Some(name.clone());
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(flag) = patch.must_change_password {
            self.must_change_password = flag;
        }
    }

    fn migrate_row(from_version: u32, mut row: Value) -> Value {
        if from_version >= 2 {
            return row;
        }

        let Some(obj) = row.as_object_mut() else {
            return row;
        };

        // Credentials never belong in the local mirror
        obj.remove("password");

        if let Some(role) = obj.get("role").and_then(Value::as_str).map(str::to_lowercase) {
            obj.insert("role".to_string(), Value::String(role));
        }

        let has_split_name = obj.contains_key("firstName") || obj.contains_key("lastName");
        if !has_split_name {
            if let Some(name) = obj.get("name").and_then(Value::as_str).map(str::to_string) {
                let mut parts = name.trim().splitn(2, char::is_whitespace);
                if let Some(first) = parts.next().filter(|p| !p.is_empty()) {
                    obj.insert("firstName".to_string(), Value::String(first.to_string()));
                }
                if let Some(last) = parts.next().map(str::trim).filter(|p| !p.is_empty()) {
                    obj.insert("lastName".to_string(), Value::String(last.to_string()));
                }
            }
        }

        row
    }
}
