use super::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use uam_core::ID;
use uam_pg::*;

type Param<'a> = &'a (dyn ToSql + Sync);

const ACCOUNT_COLUMNS: &str = "id, username, full_name, email, role_id, role_name, role_code, dashboard_route, is_active, last_login";
const ROLE_COLUMNS: &str = "id, role_name, role_code, dashboard_route, description, is_active";

/// Creates the tables and view if they are missing and seeds the default roles.
pub async fn prepare(client: &Client) -> Result<(), PgErr> {
    install::<Role>(client).await?;
    install::<Account>(client).await?;
    for role in Role::defaults() {
        client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    ROLES,
                    " (role_name, role_code, dashboard_route) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING"
                ),
                &[&role.name, &role.code, &role.route],
            )
            .await?;
    }
    Ok(())
}

impl From<PgErr> for DirectoryError {
    fn from(e: PgErr) -> Self {
        let constraint = e.as_db_error().and_then(|db| db.constraint());
        match (e.code(), constraint) {
            (Some(code), Some(USERS_USERNAME_KEY)) if *code == SqlState::UNIQUE_VIOLATION => Self::Duplicate(Field::Username),
            (Some(code), Some(USERS_EMAIL_KEY)) if *code == SqlState::UNIQUE_VIOLATION => Self::Duplicate(Field::Email),
            (Some(code), Some(ROLES_CODE_KEY)) if *code == SqlState::UNIQUE_VIOLATION => Self::Duplicate(Field::RoleCode),
            (Some(code), Some(ROLES_NAME_KEY)) if *code == SqlState::UNIQUE_VIOLATION => Self::Duplicate(Field::RoleName),
            (Some(code), _) if *code == SqlState::FOREIGN_KEY_VIOLATION => Self::Reference,
            _ => Self::Unavailable(e.to_string()),
        }
    }
}

fn account(row: &Row) -> Account {
    Account {
        id: ID::from(row.get::<_, i64>(0)),
        username: row.get(1),
        full_name: row.get(2),
        email: row.get(3),
        role: ID::from(row.get::<_, i64>(4)),
        role_name: row.get(5),
        role_code: row.get(6),
        dashboard_route: row.get(7),
        active: row.get(8),
        last_login: row.get(9),
    }
}

fn role(row: &Row) -> Role {
    Role {
        id: ID::from(row.get::<_, i64>(0)),
        name: row.get(1),
        code: row.get(2),
        route: row.get(3),
        description: row.get(4),
        active: row.get(5),
    }
}

/// ILIKE pattern matching `text` anywhere, with wildcards in `text` escaped.
fn pattern(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends `column = $n` to `sets` for a present value.
fn assign<'a>(sets: &mut Vec<String>, params: &mut Vec<Param<'a>>, column: &str, value: Option<Param<'a>>) {
    if let Some(value) = value {
        params.push(value);
        sets.push(format!("{} = ${}", column, params.len()));
    }
}

#[async_trait::async_trait]
impl Directory for Arc<Client> {
    async fn ping(&self) -> Result<(), DirectoryError> {
        self.execute("SELECT 1", &[]).await?;
        Ok(())
    }

    async fn find_accounts(&self, filter: &Filter) -> Result<Vec<Account>, DirectoryError> {
        Ok(self
            .query(
                const_format::concatcp!(
                    "SELECT ",
                    ACCOUNT_COLUMNS,
                    " FROM ",
                    USER_DETAILS,
                    " WHERE ($1::TEXT IS NULL OR username  = $1)
                        AND ($2::TEXT IS NULL OR role_code = $2)
                        AND ($3::BOOL IS NULL OR is_active = $3)
                      ORDER BY id"
                ),
                &[&filter.username, &filter.role_code, &filter.active],
            )
            .await?
            .iter()
            .map(account)
            .collect())
    }

    async fn search_accounts(&self, text: &str, filter: &Filter) -> Result<Vec<Account>, DirectoryError> {
        let ref like = pattern(text);
        Ok(self
            .query(
                const_format::concatcp!(
                    "SELECT ",
                    ACCOUNT_COLUMNS,
                    " FROM ",
                    USER_DETAILS,
                    " WHERE (username ILIKE $1 OR full_name ILIKE $1 OR email ILIKE $1)
                        AND ($2::TEXT IS NULL OR username  = $2)
                        AND ($3::TEXT IS NULL OR role_code = $3)
                        AND ($4::BOOL IS NULL OR is_active = $4)
                      ORDER BY id"
                ),
                &[like, &filter.username, &filter.role_code, &filter.active],
            )
            .await?
            .iter()
            .map(account)
            .collect())
    }

    async fn account(&self, id: ID<Account>) -> Result<Option<Account>, DirectoryError> {
        Ok(self
            .query_opt(
                const_format::concatcp!("SELECT ", ACCOUNT_COLUMNS, " FROM ", USER_DETAILS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            .as_ref()
            .map(account))
    }

    async fn credential(&self, username: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self
            .query_opt(
                const_format::concatcp!("SELECT password FROM ", USERS, " WHERE username = $1"),
                &[&username],
            )
            .await?
            .map(|row| row.get::<_, String>(0)))
    }

    async fn touch(&self, id: ID<Account>) -> Result<(), DirectoryError> {
        self.execute(
            const_format::concatcp!("UPDATE ", USERS, " SET last_login = now() WHERE id = $1"),
            &[&id.inner()],
        )
        .await?;
        Ok(())
    }

    async fn taken(&self, field: Field, value: &str, except: Option<i64>) -> Result<bool, DirectoryError> {
        let sql = match field {
            Field::Username => const_format::concatcp!(
                "SELECT 1 FROM ", USERS, " WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2)"
            ),
            Field::Email => const_format::concatcp!(
                "SELECT 1 FROM ", USERS, " WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)"
            ),
            Field::RoleCode => const_format::concatcp!(
                "SELECT 1 FROM ", ROLES, " WHERE role_code = $1 AND ($2::BIGINT IS NULL OR id <> $2)"
            ),
            Field::RoleName => const_format::concatcp!(
                "SELECT 1 FROM ", ROLES, " WHERE role_name = $1 AND ($2::BIGINT IS NULL OR id <> $2)"
            ),
        };
        Ok(self.query(sql, &[&value, &except]).await?.first().is_some())
    }

    async fn insert_account(&self, new: &NewAccount) -> Result<Account, DirectoryError> {
        let row = self
            .query_one(
                const_format::concatcp!(
                    "INSERT INTO ",
                    USERS,
                    " (username, password, full_name, email, role_id, is_active)
                      VALUES ($1, $2, $3, $4, $5, TRUE)
                      RETURNING id"
                ),
                &[&new.username, &new.credential, &new.full_name, &new.email, &new.role.inner()],
            )
            .await?;
        self.account(ID::from(row.get::<_, i64>(0)))
            .await?
            .ok_or(DirectoryError::Reference)
    }

    async fn update_account(
        &self,
        id: ID<Account>,
        changes: &AccountChanges,
    ) -> Result<Option<Account>, DirectoryError> {
        let role = changes.role.map(|r| r.inner());
        let key = id.inner();
        let mut sets = Vec::new();
        let mut params = Vec::<Param>::new();
        assign(&mut sets, &mut params, "username", changes.username.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "password", changes.credential.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "full_name", changes.full_name.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "email", changes.email.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "role_id", role.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "is_active", changes.active.as_ref().map(|v| v as Param));
        if sets.is_empty() {
            return self.account(id).await;
        }
        params.push(&key);
        let ref sql = format!("UPDATE {} SET {} WHERE id = ${}", USERS, sets.join(", "), params.len());
        match self.execute(sql.as_str(), &params).await? {
            0 => Ok(None),
            _ => self.account(id).await,
        }
    }

    async fn count_accounts_by_role(&self, role: ID<Role>) -> Result<u64, DirectoryError> {
        let row = self
            .query_one(
                const_format::concatcp!("SELECT COUNT(*) FROM ", USERS, " WHERE role_id = $1"),
                &[&role.inner()],
            )
            .await?;
        Ok(row.get::<_, i64>(0).max(0) as u64)
    }

    async fn roles(&self) -> Result<Vec<Role>, DirectoryError> {
        Ok(self
            .query(
                const_format::concatcp!("SELECT ", ROLE_COLUMNS, " FROM ", ROLES, " ORDER BY id"),
                &[],
            )
            .await?
            .iter()
            .map(role)
            .collect())
    }

    async fn role(&self, id: ID<Role>) -> Result<Option<Role>, DirectoryError> {
        Ok(self
            .query_opt(
                const_format::concatcp!("SELECT ", ROLE_COLUMNS, " FROM ", ROLES, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?
            .as_ref()
            .map(role))
    }

    async fn search_roles(&self, text: &str) -> Result<Vec<Role>, DirectoryError> {
        let ref like = pattern(text);
        Ok(self
            .query(
                const_format::concatcp!(
                    "SELECT ",
                    ROLE_COLUMNS,
                    " FROM ",
                    ROLES,
                    " WHERE role_name ILIKE $1 OR role_code ILIKE $1 ORDER BY id"
                ),
                &[like],
            )
            .await?
            .iter()
            .map(role)
            .collect())
    }

    async fn insert_role(&self, new: &NewRole) -> Result<Role, DirectoryError> {
        let row = self
            .query_one(
                const_format::concatcp!(
                    "INSERT INTO ",
                    ROLES,
                    " (role_name, role_code, dashboard_route, description)
                      VALUES ($1, $2, $3, $4)
                      RETURNING ",
                    ROLE_COLUMNS
                ),
                &[&new.name, &new.code, &new.route, &new.description],
            )
            .await?;
        Ok(role(&row))
    }

    async fn update_role(&self, id: ID<Role>, changes: &RoleChanges) -> Result<Option<Role>, DirectoryError> {
        let key = id.inner();
        let mut sets = Vec::new();
        let mut params = Vec::<Param>::new();
        assign(&mut sets, &mut params, "role_name", changes.name.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "role_code", changes.code.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "dashboard_route", changes.route.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "description", changes.description.as_ref().map(|v| v as Param));
        assign(&mut sets, &mut params, "is_active", changes.active.as_ref().map(|v| v as Param));
        if sets.is_empty() {
            return self.role(id).await;
        }
        params.push(&key);
        let ref sql = format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
            ROLES,
            sets.join(", "),
            params.len(),
            ROLE_COLUMNS
        );
        Ok(self.query_opt(sql.as_str(), &params).await?.as_ref().map(role))
    }

    async fn delete_role(&self, id: ID<Role>, cascade: bool) -> Result<Option<u64>, DirectoryError> {
        let row = self
            .query_one(
                const_format::concatcp!(
                    "WITH doomed AS (DELETE FROM ",
                    USERS,
                    " WHERE role_id = $1 AND $2 RETURNING id),
                          gone   AS (DELETE FROM ",
                    ROLES,
                    " WHERE id = $1 RETURNING id)
                     SELECT (SELECT COUNT(*) FROM doomed), (SELECT COUNT(*) FROM gone)"
                ),
                &[&id.inner(), &cascade],
            )
            .await?;
        match row.get::<_, i64>(1) {
            0 => Ok(None),
            _ => Ok(Some(row.get::<_, i64>(0).max(0) as u64)),
        }
    }
}
