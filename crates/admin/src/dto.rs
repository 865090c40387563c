use serde::Deserialize;
use serde::Serialize;
use uam_core::ID;
use uam_directory::Account;
use uam_directory::Filter;
use uam_directory::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Suspended,
}

/// Query string of the account listing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserQuery {
    pub role_code: Option<String>,
    pub status: Option<Status>,
}

impl UserQuery {
    pub fn filter(&self) -> Filter {
        Filter {
            username: None,
            role_code: self
                .role_code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            active: self.status.map(|s| s == Status::Active),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub role_code: Option<String>,
    pub status: Option<Status>,
}

impl SearchQuery {
    pub fn filter(&self) -> Filter {
        UserQuery {
            role_code: self.role_code.clone(),
            status: self.status,
        }
        .filter()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct RoleSearch {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub role_id: ID<Role>,
}

/// Partial account update; absent fields are left alone.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<ID<Role>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkSuspend {
    pub user_ids: Vec<ID<Account>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub user_id: ID<Account>,
    pub message: String,
}

/// Outcome of a bulk suspension; one failure entry per id not suspended.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub role_name: String,
    pub role_code: String,
    pub dashboard_route: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateRole {
    pub role_name: Option<String>,
    pub role_code: Option<String>,
    pub dashboard_route: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filters() {
        let query = serde_json::from_str::<UserQuery>(r#"{"status":"suspended","role_code":""}"#).unwrap();
        assert_eq!(query.filter(), Filter::default().active(false));
        let query = serde_json::from_str::<UserQuery>(r#"{"status":"active","role_code":"PIN"}"#).unwrap();
        assert_eq!(query.filter(), Filter::default().role("PIN").active(true));
        assert!(serde_json::from_str::<UserQuery>(r#"{"status":"gone"}"#).is_err());
    }

    #[test]
    fn cascade_defaults_off() {
        let query = serde_json::from_str::<DeleteQuery>("{}").unwrap();
        assert!(!query.cascade);
    }
}
