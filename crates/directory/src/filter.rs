use super::*;

/// Equality constraints for account lookups. Unset fields match anything.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Filter {
    pub username: Option<String>,
    pub role_code: Option<String>,
    pub active: Option<bool>,
}

impl Filter {
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
    pub fn role(mut self, code: impl Into<String>) -> Self {
        self.role_code = Some(code.into());
        self
    }
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
    pub fn matches(&self, account: &Account) -> bool {
        self.username.as_ref().is_none_or(|u| *u == account.username)
            && self.role_code.as_ref().is_none_or(|c| *c == account.role_code)
            && self.active.is_none_or(|a| a == account.active)
    }
}

/// Fields carrying a uniqueness guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Email,
    RoleCode,
    RoleName,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Username => write!(f, "Username"),
            Self::Email => write!(f, "Email"),
            Self::RoleCode => write!(f, "Role code"),
            Self::RoleName => write!(f, "Role name"),
        }
    }
}

/// Case-insensitive substring match used by the search operations.
pub fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
