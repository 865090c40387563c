use uam_core::ID;
use uam_core::Unique;

/// A role: who an account is, and where its dashboard lives.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Role {
    pub id: ID<Self>,
    #[serde(rename = "role_name")]
    pub name: String,
    #[serde(rename = "role_code")]
    pub code: String,
    #[serde(rename = "dashboard_route")]
    pub route: String,
    pub description: Option<String>,
    #[serde(rename = "is_active")]
    pub active: bool,
}

impl Role {
    /// Role codes are stored trimmed and uppercase.
    pub fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }
    /// The roles every deployment starts with.
    pub fn defaults() -> Vec<NewRole> {
        vec![
            NewRole::new("User Admin", uam_core::USER_ADMIN, "/dashboard/admin"),
            NewRole::new("PIN", uam_core::PIN, "/dashboard/pin"),
            NewRole::new("CSR Rep", uam_core::CSR_REP, "/dashboard/csr"),
            NewRole::new("Platform Management", uam_core::PLATFORM_MGMT, "/dashboard/platform"),
        ]
    }
}

impl Unique for Role {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Insert shape for a role. New roles start active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    pub code: String,
    pub route: String,
    pub description: Option<String>,
}

impl NewRole {
    pub fn new(name: &str, code: &str, route: &str) -> Self {
        Self {
            name: name.to_string(),
            code: Role::normalize(code),
            route: route.to_string(),
            description: None,
        }
    }
}

/// Partial update of a role. `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoleChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub route: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

impl RoleChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.route.is_none()
            && self.description.is_none()
            && self.active.is_none()
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use uam_pg::*;

    impl Schema for Role {
        fn name() -> &'static str {
            ROLES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                ROLES,
                " (
                    id              BIGSERIAL PRIMARY KEY,
                    role_name       VARCHAR(100) NOT NULL,
                    role_code       VARCHAR(50)  NOT NULL,
                    dashboard_route VARCHAR(255) NOT NULL CHECK (dashboard_route <> ''),
                    description     TEXT,
                    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
                    CONSTRAINT ",
                ROLES_NAME_KEY,
                " UNIQUE (role_name),
                    CONSTRAINT ",
                ROLES_CODE_KEY,
                " UNIQUE (role_code)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_roles_active ON ",
                ROLES,
                " (is_active);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_uppercased() {
        assert_eq!(Role::normalize("  csr_rep "), "CSR_REP");
        assert_eq!(NewRole::new("x", "pin", "/p").code, "PIN");
    }

    #[test]
    fn defaults_cover_the_well_known_codes() {
        let codes = Role::defaults().into_iter().map(|r| r.code).collect::<Vec<_>>();
        assert!(codes.contains(&uam_core::USER_ADMIN.to_string()));
        assert!(codes.contains(&uam_core::CSR_REP.to_string()));
        assert!(Role::defaults().iter().all(|r| !r.route.is_empty()));
    }

    #[test]
    fn serializes_with_wire_names() {
        let role = Role {
            id: ID::from(1),
            name: "User Admin".into(),
            code: "USER_ADMIN".into(),
            route: "/dashboard/admin".into(),
            description: None,
            active: true,
        };
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["role_code"], "USER_ADMIN");
        assert_eq!(json["dashboard_route"], "/dashboard/admin");
        assert_eq!(json["is_active"], true);
    }
}
