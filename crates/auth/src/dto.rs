use super::*;
use serde::Deserialize;
use serde::Serialize;
use uam_directory::Account;

/// Token scheme reported alongside issued tokens.
pub const BEARER: &str = "bearer";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role_code: Option<String>,
}

impl LoginRequest {
    /// The requested role, with blank values treated as absent.
    pub fn role(&self) -> Option<&str> {
        self.role_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Account>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl From<Result<Grant, Refusal>> for LoginResponse {
    fn from(outcome: Result<Grant, Refusal>) -> Self {
        match outcome {
            Ok(grant) => Self {
                success: true,
                message: String::from("Login successful"),
                user: Some(grant.account),
                access_token: Some(grant.access_token),
                refresh_token: Some(grant.refresh_token),
                token_type: Some(BEARER),
                expires_in: Some(grant.expires_in),
            },
            Err(refusal) => Self {
                success: false,
                message: refusal.to_string(),
                user: None,
                access_token: None,
                refresh_token: None,
                token_type: None,
                expires_in: None,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Bare `{success, message}` acknowledgement or failure body.
#[derive(Debug, Serialize)]
pub struct Message {
    pub success: bool,
    pub message: String,
}

impl Message {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_roles_are_absent() {
        let parse = |json| serde_json::from_str::<LoginRequest>(json).unwrap();
        assert_eq!(parse(r#"{"username":"a","password":"b"}"#).role(), None);
        assert_eq!(parse(r#"{"username":"a","password":"b","role_code":" "}"#).role(), None);
        assert_eq!(parse(r#"{"username":"a","password":"b","role_code":"PIN"}"#).role(), Some("PIN"));
    }

    #[test]
    fn refusals_carry_only_a_message() {
        let json = serde_json::to_value(LoginResponse::from(Err::<Grant, Refusal>(Refusal::Suspended))).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Account has been suspended. Please contact administrator.");
        assert!(json.get("access_token").is_none());
    }
}
