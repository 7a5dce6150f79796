//! Logged-in user session.
//!
//! A `Session` is produced by a successful login and handed to every
//! role-gated workflow. It is never stored in process-wide state; callers own
//! it and drop it on logout.

use serde::{Deserialize, Serialize};

use crate::models::Role;

// ═══════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════

/// Body of `POST /login` and `POST /register`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "ID", deserialize_with = "id_as_string")]
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "Estado", default)]
    pub estado: String,
    #[serde(rename = "Tipo", default)]
    pub tipo: String,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for ID, got {other}"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

/// An authenticated patient or doctor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    email: String,
    role: Role,
    /// Account state as reported by the backend (`Estado`).
    account_state: String,
    /// Account kind as reported by the backend (`Tipo`).
    account_kind: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
            account_state: String::new(),
            account_kind: String::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn account_state(&self) -> &str {
        &self.account_state
    }

    pub fn account_kind(&self) -> &str {
        &self.account_kind
    }

    pub fn is_patient(&self) -> bool {
        self.role == Role::Patient
    }

    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Self {
            user_id: resp.id,
            email: resp.email,
            role: resp.role,
            account_state: resp.estado,
            account_kind: resp.tipo,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
