use std::collections::BTreeMap;
use uam_core::ID;
use uam_directory::Account;

/// Token payload. `sub` is the account id rendered as a string.
/// Access tokens carry `role`; refresh tokens carry `type = "refresh"`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Claims {
    pub fn access(subject: ID<Account>, role: Option<&str>, lifetime: u64) -> Self {
        let now = jsonwebtoken::get_current_timestamp();
        Self {
            sub: subject.to_string(),
            iat: now,
            exp: now + lifetime,
            role: role.map(str::to_string),
            kind: None,
            extra: BTreeMap::new(),
        }
    }
    pub fn refresh(subject: ID<Account>, lifetime: u64) -> Self {
        let now = jsonwebtoken::get_current_timestamp();
        Self {
            sub: subject.to_string(),
            iat: now,
            exp: now + lifetime,
            role: None,
            kind: Some(uam_core::REFRESH.to_string()),
            extra: BTreeMap::new(),
        }
    }
    /// Attaches an extra claim.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
    /// The account named by `sub`, if it names one.
    pub fn subject(&self) -> Option<ID<Account>> {
        self.sub.parse().ok()
    }
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
    pub fn is_refresh(&self) -> bool {
        self.kind.as_deref() == Some(uam_core::REFRESH)
    }
}
