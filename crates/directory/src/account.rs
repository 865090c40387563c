use super::*;
use chrono::DateTime;
use chrono::Utc;
use uam_core::ID;
use uam_core::Unique;

/// A user account as every caller sees it: joined with its role, and
/// without the stored credential.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    pub id: ID<Self>,
    pub username: String,
    pub full_name: String,
    pub email: String,
    #[serde(rename = "role_id")]
    pub role: ID<Role>,
    pub role_name: String,
    pub role_code: String,
    pub dashboard_route: String,
    #[serde(rename = "is_active")]
    pub active: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl Unique for Account {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Account {
    /// Joins a stored account row with the role it references.
    pub fn joined(id: ID<Self>, row: &NewAccount, role: &Role) -> Self {
        Self {
            id,
            username: row.username.clone(),
            full_name: row.full_name.clone(),
            email: row.email.clone(),
            role: role.id,
            role_name: role.name.clone(),
            role_code: role.code.clone(),
            dashboard_route: role.route.clone(),
            active: true,
            last_login: None,
        }
    }
}

/// Insert shape for an account. `credential` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub credential: String,
    pub full_name: String,
    pub email: String,
    pub role: ID<Role>,
}

/// Partial update of an account. `None` leaves the column untouched.
/// `credential`, when present, is already hashed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub credential: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<ID<Role>>,
    pub active: Option<bool>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.credential.is_none()
            && self.full_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.active.is_none()
    }
    pub fn activity(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use uam_pg::*;

    /// Schema implementation for Account (users table plus the joined view).
    /// Note: the password column is database-only, not part of the Account type.
    impl Schema for Account {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id          BIGSERIAL PRIMARY KEY,
                    username    VARCHAR(50)  NOT NULL,
                    password    TEXT         NOT NULL,
                    full_name   VARCHAR(255) NOT NULL,
                    email       VARCHAR(255) NOT NULL,
                    role_id     BIGINT       NOT NULL REFERENCES ",
                ROLES,
                "(id),
                    is_active   BOOLEAN      NOT NULL DEFAULT TRUE,
                    last_login  TIMESTAMPTZ,
                    created_at  TIMESTAMPTZ  NOT NULL DEFAULT now(),
                    CONSTRAINT ",
                USERS_USERNAME_KEY,
                " UNIQUE (username),
                    CONSTRAINT ",
                USERS_EMAIL_KEY,
                " UNIQUE (email)
                );
                CREATE OR REPLACE VIEW ",
                USER_DETAILS,
                " AS
                    SELECT u.id, u.username, u.full_name, u.email, u.role_id,
                           r.role_name, r.role_code, r.dashboard_route,
                           u.is_active, u.last_login
                    FROM ",
                USERS,
                " u JOIN ",
                ROLES,
                " r ON r.id = u.role_id;"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_role ON ",
                USERS,
                " (role_id);
                 CREATE INDEX IF NOT EXISTS idx_users_active ON ",
                USERS,
                " (is_active);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_account_never_has_a_credential() {
        let role = Role {
            id: ID::from(2),
            name: "CSR Rep".into(),
            code: "CSR_REP".into(),
            route: "/dashboard/csr".into(),
            description: None,
            active: true,
        };
        let row = NewAccount {
            username: "alice".into(),
            credential: "$argon2id$v=19$...".into(),
            full_name: "Alice A".into(),
            email: "alice@x.com".into(),
            role: role.id,
        };
        let json = serde_json::to_value(Account::joined(ID::from(1), &row, &role)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("credential").is_none());
        assert_eq!(json["role_id"], 2);
        assert_eq!(json["role_code"], "CSR_REP");
        assert_eq!(json["last_login"], serde_json::Value::Null);
    }

    #[test]
    fn empty_changes() {
        assert!(AccountChanges::default().is_empty());
        assert!(!AccountChanges::activity(false).is_empty());
    }
}
