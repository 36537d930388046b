//! Session data model.

use crate::{SessionError, SessionResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend identifiers arrive as strings or integers; both become a string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Account role as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Agent,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Customer => "CUSTOMER",
            Role::Agent => "AGENT",
            Role::Admin => "ADMIN",
        };
        f.write_str(s)
    }
}

/// Signed-in user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Shallow merge: every field present in `patch` replaces ours.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(last_login) = patch.last_login {
            self.last_login = Some(last_login);
        }
    }
}

/// Partial user update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self == &UserPatch::default()
    }
}

/// Access/refresh token pair.
///
/// Accepts both `access_token`/`refresh_token` and `accessToken`/`refreshToken`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "refreshToken")]
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    pub fn validate(&self) -> SessionResult<()> {
        if self.access_token.trim().is_empty() {
            return Err(SessionError::InvalidToken("access token"));
        }
        if self.refresh_token.trim().is_empty() {
            return Err(SessionError::InvalidToken("refresh token"));
        }
        Ok(())
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Body returned by login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: Option<User>,
    #[serde(default, alias = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

impl AuthPayload {
    /// Split into user and tokens; both tokens must be present and non-empty.
    pub fn into_parts(self) -> SessionResult<(User, TokenPair)> {
        let access = self.access_token.filter(|t| !t.is_empty());
        let refresh = self.refresh_token.filter(|t| !t.is_empty());
        match (self.user, access, refresh) {
            (Some(user), Some(access), Some(refresh)) => Ok((user, TokenPair::new(access, refresh))),
            _ => Err(SessionError::MissingTokens),
        }
    }
}

/// In-memory session state.
///
/// `hydrated` is per-process and never persisted.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(skip)]
    pub hydrated: bool,
}

impl Session {
    /// Everything an authenticated session requires is present.
    pub fn is_complete(&self) -> bool {
        self.user.is_some()
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
            && self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Drop a state that claims authentication without the data to back it.
    pub fn normalized(self) -> Self {
        if self.is_authenticated && !self.is_complete() {
            Session {
                hydrated: self.hydrated,
                ..Session::default()
            }
        } else {
            self
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Reset to the signed-out state, keeping the hydration flag.
    pub fn clear(&mut self) {
        let hydrated = self.hydrated;
        *self = Session {
            hydrated,
            ..Session::default()
        };
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.as_ref().map(|u| &u.id))
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("is_authenticated", &self.is_authenticated)
            .field("hydrated", &self.hydrated)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_user() -> User {
        User {
            id: "u-1".into(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: "555-0100".into(),
            role: Role::Agent,
            avatar: None,
            is_active: true,
            date_joined: "2024-01-01T00:00:00Z".into(),
            last_login: None,
        }
    }

    #[test]
    fn test_token_pair_accepts_both_conventions() {
        let snake: TokenPair =
            serde_json::from_value(json!({ "access_token": "a", "refresh_token": "r" })).unwrap();
        let camel: TokenPair =
            serde_json::from_value(json!({ "accessToken": "a", "refreshToken": "r" })).unwrap();
        assert_eq!(snake, camel);
    }

    #[test]
    fn test_auth_payload_requires_both_tokens() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "user": sample_user_json(),
            "accessToken": "a"
        }))
        .unwrap();
        assert_eq!(payload.into_parts().unwrap_err(), SessionError::MissingTokens);

        let payload: AuthPayload = serde_json::from_value(json!({
            "user": sample_user_json(),
            "access_token": "a",
            "refreshToken": "r"
        }))
        .unwrap();
        let (user, tokens) = payload.into_parts().unwrap();
        assert_eq!(user.role, Role::Agent);
        assert_eq!(tokens, TokenPair::new("a", "r"));
    }

    fn sample_user_json() -> serde_json::Value {
        json!({
            "id": "u-1",
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "phone": "555-0100",
            "role": "AGENT",
            "is_active": true,
            "date_joined": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_user_id_accepts_integers() {
        let mut raw = sample_user_json();
        raw["id"] = json!(42);
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.id, "42");
    }

    #[test]
    fn test_user_apply_is_shallow_merge() {
        let mut user = sample_user();
        user.apply(UserPatch {
            first_name: Some("Augusta".into()),
            avatar: Some("/a.png".into()),
            ..Default::default()
        });

        assert_eq!(user.first_name, "Augusta");
        assert_eq!(user.last_name, "Lovelace");
        assert_eq!(user.avatar.as_deref(), Some("/a.png"));
        assert_eq!(user.full_name(), "Augusta Lovelace");
    }

    #[test]
    fn test_incomplete_authenticated_session_normalizes_to_cleared() {
        let session = Session {
            user: Some(sample_user()),
            access_token: Some("a".into()),
            refresh_token: None,
            is_authenticated: true,
            hydrated: true,
        };
        let normalized = session.normalized();
        assert!(!normalized.is_authenticated);
        assert!(normalized.user.is_none());
        assert!(normalized.hydrated);
    }

    #[test]
    fn test_session_debug_hides_tokens() {
        let session = Session {
            access_token: Some("secret-access".into()),
            ..Default::default()
        };
        assert!(!format!("{session:?}").contains("secret-access"));
    }
}
