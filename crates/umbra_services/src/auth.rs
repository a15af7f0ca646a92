//! Authentication types and the in-memory token session

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Login form
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    /// Multipart form fields, in submission order
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        vec![("email", self.email.as_str()), ("password", self.password.as_str())]
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration form
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterData {
    /// Multipart form fields, in submission order
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
        ]
    }
}

impl std::fmt::Debug for RegisterData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterData")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// User summary returned with a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Login / register response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthEnvelope {
    Nested { data: AuthResponse },
    Flat(AuthResponse),
}

impl AuthResponse {
    /// Decode a response body. The payload may be nested under `data`.
    pub fn from_json(body: &str) -> ApiResult<Self> {
        let envelope: AuthEnvelope = serde_json::from_str(body)?;
        match envelope {
            AuthEnvelope::Nested { data } => Ok(data),
            AuthEnvelope::Flat(response) => Ok(response),
        }
    }

    /// Bearer token for later requests; `None` if the server sent an empty one
    pub fn bearer(&self) -> Option<BearerToken> {
        BearerToken::new(self.token.clone())
    }
}

/// Full user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// `GET /api/v1/auth/me` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileResponse {
    #[serde(default)]
    pub success: bool,
    pub data: User,
}

/// Access token sent as `Authorization: Bearer <token>`
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a token; blank tokens are rejected
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == token.len() {
            Some(Self(token))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(<{} chars>)", self.0.len())
    }
}

/// Holds the token of the signed-in user
#[derive(Debug, Default)]
pub struct AuthSession {
    token: Mutex<Option<BearerToken>>,
}

impl AuthSession {
    /// Create a signed-out session
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the token from a login or register response
    pub fn store(&self, response: &AuthResponse) -> ApiResult<BearerToken> {
        let token = response.bearer().ok_or(ApiError::Unauthenticated)?;
        *self.token.lock() = Some(token.clone());
        log::info!("Signed in as {}", response.user.email);
        Ok(token)
    }

    /// Current token
    pub fn token(&self) -> Option<BearerToken> {
        self.token.lock().clone()
    }

    /// Current token, or [`ApiError::Unauthenticated`]
    pub fn require_token(&self) -> ApiResult<BearerToken> {
        self.token().ok_or(ApiError::Unauthenticated)
    }

    /// Forget the token
    pub fn logout(&self) {
        if self.token.lock().take().is_some() {
            log::info!("Signed out");
        }
    }

    /// Check whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.token.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str =
        r#"{ "token": "abc", "user": { "id": "u1", "name": "Ada", "email": "ada@example.com" } }"#;
    const NESTED: &str = r#"{ "success": true, "data": { "token": "abc", "user": { "id": "u1", "name": "Ada", "email": "ada@example.com" } } }"#;

    #[test]
    fn test_flat_and_nested_responses() {
        let flat = AuthResponse::from_json(FLAT).unwrap();
        let nested = AuthResponse::from_json(NESTED).unwrap();
        assert_eq!(flat, nested);
        assert_eq!(flat.user.name, "Ada");
    }

    #[test]
    fn test_response_without_token() {
        let err = AuthResponse::from_json(r#"{ "message": "bad credentials" }"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_bearer_token() {
        let token = BearerToken::new(" abc ").unwrap();
        assert_eq!(token.as_str(), "abc");
        assert_eq!(token.header_value(), "Bearer abc");
        assert!(BearerToken::new("   ").is_none());
        assert!(!format!("{:?}", token).contains("abc"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = LoginCredentials {
            email: "ada@example.com".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", credentials).contains("hunter2"));
        assert_eq!(credentials.form_fields()[1], ("password", "hunter2"));
    }

    #[test]
    fn test_session_lifecycle() {
        let session = AuthSession::new();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_token(), Err(ApiError::Unauthenticated)));

        let token = session.store(&AuthResponse::from_json(FLAT).unwrap()).unwrap();
        assert_eq!(session.token(), Some(token));

        session.logout();
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let session = AuthSession::new();
        let mut response = AuthResponse::from_json(FLAT).unwrap();
        response.token.clear();

        assert!(session.store(&response).is_err());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_profile_response() {
        let profile: UserProfileResponse = serde_json::from_str(
            r#"{ "success": true, "data": { "id": "u1", "name": "Ada", "email": "ada@example.com", "created_at": "2024-01-01" } }"#,
        )
        .unwrap();
        assert_eq!(profile.data.created_at.as_deref(), Some("2024-01-01"));
        assert_eq!(profile.data.updated_at, None);
    }
}
