use super::*;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uam_core::ID;
use uam_core::Unique;

/// A stored account row: the record plus the credential callers never see.
#[derive(Debug, Clone)]
struct Stored {
    username: String,
    credential: String,
    full_name: String,
    email: String,
    role: ID<Role>,
    active: bool,
    last_login: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Default)]
struct State {
    roles: BTreeMap<ID<Role>, Role>,
    accounts: BTreeMap<ID<Account>, Stored>,
    sequence: i64,
    outage: bool,
    touchy: bool,
}

impl State {
    fn next(&mut self) -> i64 {
        self.sequence += 1;
        self.sequence
    }
    fn check(&self) -> Result<(), DirectoryError> {
        match self.outage {
            true => Err(DirectoryError::Unavailable("simulated outage".into())),
            false => Ok(()),
        }
    }
    fn join(&self, id: ID<Account>, row: &Stored) -> Option<Account> {
        self.roles.get(&row.role).map(|role| Account {
            id,
            username: row.username.clone(),
            full_name: row.full_name.clone(),
            email: row.email.clone(),
            role: role.id,
            role_name: role.name.clone(),
            role_code: role.code.clone(),
            dashboard_route: role.route.clone(),
            active: row.active,
            last_login: row.last_login,
        })
    }
    fn joined(&self) -> impl Iterator<Item = Account> + '_ {
        self.accounts
            .iter()
            .filter_map(|(id, row)| self.join(*id, row))
    }
    fn taken(&self, field: Field, value: &str, except: Option<i64>) -> bool {
        let other = |id: i64| except.is_none_or(|e| e != id);
        match field {
            Field::Username => self
                .accounts
                .iter()
                .any(|(id, a)| a.username == value && other(id.inner())),
            Field::Email => self
                .accounts
                .iter()
                .any(|(id, a)| a.email == value && other(id.inner())),
            Field::RoleCode => self
                .roles
                .values()
                .any(|r| r.code == value && other(r.id.inner())),
            Field::RoleName => self
                .roles
                .values()
                .any(|r| r.name == value && other(r.id.inner())),
        }
    }
}

/// In-process [`Directory`] with the same uniqueness and reference rules
/// as the database schema. Ids come from one shared sequence.
///
/// Two knobs simulate failures: [`Memory::set_outage`] fails every call,
/// and [`Memory::set_touch_failure`] fails only last-login updates.
#[derive(Debug, Default)]
pub struct Memory {
    state: RwLock<State>,
}

impl Memory {
    /// A directory holding only the default roles.
    pub async fn seeded() -> Self {
        let memory = Self::default();
        for role in Role::defaults() {
            memory
                .insert_role(&role)
                .await
                .expect("default roles are distinct");
        }
        memory
    }
    pub async fn set_outage(&self, outage: bool) {
        self.state.write().await.outage = outage;
    }
    pub async fn set_touch_failure(&self, fail: bool) {
        self.state.write().await.touchy = fail;
    }
    /// Stores a raw credential for `username`, bypassing hashing.
    /// Used to stage legacy rows.
    pub async fn set_credential(&self, username: &str, credential: &str) -> bool {
        let mut state = self.state.write().await;
        match state.accounts.values_mut().find(|a| a.username == username) {
            Some(row) => {
                row.credential = credential.to_string();
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl Directory for Memory {
    async fn ping(&self) -> Result<(), DirectoryError> {
        self.state.read().await.check()
    }

    async fn find_accounts(&self, filter: &Filter) -> Result<Vec<Account>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state.joined().filter(|a| filter.matches(a)).collect())
    }

    async fn search_accounts(&self, text: &str, filter: &Filter) -> Result<Vec<Account>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        let text = text.trim();
        Ok(state
            .joined()
            .filter(|a| filter.matches(a))
            .filter(|a| {
                contains(&a.username, text) || contains(&a.full_name, text) || contains(&a.email, text)
            })
            .collect())
    }

    async fn account(&self, id: ID<Account>) -> Result<Option<Account>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state.accounts.get(&id).and_then(|row| state.join(id, row)))
    }

    async fn credential(&self, username: &str) -> Result<Option<String>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username == username)
            .map(|a| a.credential.clone()))
    }

    async fn touch(&self, id: ID<Account>) -> Result<(), DirectoryError> {
        let mut state = self.state.write().await;
        state.check()?;
        if state.touchy {
            return Err(DirectoryError::Unavailable("simulated last login failure".into()));
        }
        if let Some(row) = state.accounts.get_mut(&id) {
            row.last_login = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn taken(&self, field: Field, value: &str, except: Option<i64>) -> Result<bool, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state.taken(field, value, except))
    }

    async fn insert_account(&self, new: &NewAccount) -> Result<Account, DirectoryError> {
        let mut state = self.state.write().await;
        state.check()?;
        if state.taken(Field::Username, &new.username, None) {
            return Err(DirectoryError::Duplicate(Field::Username));
        }
        if state.taken(Field::Email, &new.email, None) {
            return Err(DirectoryError::Duplicate(Field::Email));
        }
        let role = state.roles.get(&new.role).cloned().ok_or(DirectoryError::Reference)?;
        let id = ID::from(state.next());
        state.accounts.insert(
            id,
            Stored {
                username: new.username.clone(),
                credential: new.credential.clone(),
                full_name: new.full_name.clone(),
                email: new.email.clone(),
                role: role.id,
                active: true,
                last_login: None,
            },
        );
        Ok(Account::joined(id, new, &role))
    }

    async fn update_account(
        &self,
        id: ID<Account>,
        changes: &AccountChanges,
    ) -> Result<Option<Account>, DirectoryError> {
        let mut state = self.state.write().await;
        state.check()?;
        if !state.accounts.contains_key(&id) {
            return Ok(None);
        }
        if let Some(username) = changes.username.as_deref() {
            if state.taken(Field::Username, username, Some(id.inner())) {
                return Err(DirectoryError::Duplicate(Field::Username));
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if state.taken(Field::Email, email, Some(id.inner())) {
                return Err(DirectoryError::Duplicate(Field::Email));
            }
        }
        if let Some(role) = changes.role {
            if !state.roles.contains_key(&role) {
                return Err(DirectoryError::Reference);
            }
        }
        let Some(row) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.username {
            row.username = v.clone();
        }
        if let Some(v) = &changes.credential {
            row.credential = v.clone();
        }
        if let Some(v) = &changes.full_name {
            row.full_name = v.clone();
        }
        if let Some(v) = &changes.email {
            row.email = v.clone();
        }
        if let Some(v) = changes.role {
            row.role = v;
        }
        if let Some(v) = changes.active {
            row.active = v;
        }
        let row = row.clone();
        Ok(state.join(id, &row))
    }

    async fn count_accounts_by_role(&self, role: ID<Role>) -> Result<u64, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state.accounts.values().filter(|a| a.role == role).count() as u64)
    }

    async fn roles(&self) -> Result<Vec<Role>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state.roles.values().cloned().collect())
    }

    async fn role(&self, id: ID<Role>) -> Result<Option<Role>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        Ok(state.roles.get(&id).cloned())
    }

    async fn search_roles(&self, text: &str) -> Result<Vec<Role>, DirectoryError> {
        let state = self.state.read().await;
        state.check()?;
        let text = text.trim();
        Ok(state
            .roles
            .values()
            .filter(|r| contains(&r.name, text) || contains(&r.code, text))
            .cloned()
            .collect())
    }

    async fn insert_role(&self, new: &NewRole) -> Result<Role, DirectoryError> {
        let mut state = self.state.write().await;
        state.check()?;
        if state.taken(Field::RoleCode, &new.code, None) {
            return Err(DirectoryError::Duplicate(Field::RoleCode));
        }
        if state.taken(Field::RoleName, &new.name, None) {
            return Err(DirectoryError::Duplicate(Field::RoleName));
        }
        let role = Role {
            id: ID::from(state.next()),
            name: new.name.clone(),
            code: new.code.clone(),
            route: new.route.clone(),
            description: new.description.clone(),
            active: true,
        };
        state.roles.insert(role.id(), role.clone());
        Ok(role)
    }

    async fn update_role(&self, id: ID<Role>, changes: &RoleChanges) -> Result<Option<Role>, DirectoryError> {
        let mut state = self.state.write().await;
        state.check()?;
        if let Some(code) = changes.code.as_deref() {
            if state.taken(Field::RoleCode, code, Some(id.inner())) {
                return Err(DirectoryError::Duplicate(Field::RoleCode));
            }
        }
        if let Some(name) = changes.name.as_deref() {
            if state.taken(Field::RoleName, name, Some(id.inner())) {
                return Err(DirectoryError::Duplicate(Field::RoleName));
            }
        }
        let Some(role) = state.roles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &changes.name {
            role.name = v.clone();
        }
        if let Some(v) = &changes.code {
            role.code = v.clone();
        }
        if let Some(v) = &changes.route {
            role.route = v.clone();
        }
        if let Some(v) = &changes.description {
            role.description = Some(v.clone());
        }
        if let Some(v) = changes.active {
            role.active = v;
        }
        Ok(Some(role.clone()))
    }

    async fn delete_role(&self, id: ID<Role>, cascade: bool) -> Result<Option<u64>, DirectoryError> {
        let mut state = self.state.write().await;
        state.check()?;
        if !state.roles.contains_key(&id) {
            return Ok(None);
        }
        let members = state.accounts.values().filter(|a| a.role == id).count() as u64;
        match (members, cascade) {
            (0, _) => {}
            (_, false) => return Err(DirectoryError::Reference),
            (_, true) => state.accounts.retain(|_, a| a.role != id),
        }
        state.roles.remove(&id);
        Ok(Some(members))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice(role: ID<Role>) -> NewAccount {
        NewAccount {
            username: "alice".into(),
            credential: "hash".into(),
            full_name: "Alice A".into(),
            email: "alice@x.com".into(),
            role,
        }
    }

    async fn csr(memory: &Memory) -> Role {
        memory
            .role_by_code(uam_core::CSR_REP)
            .await
            .expect("seeded role")
    }

    impl Memory {
        async fn role_by_code(&self, code: &str) -> Option<Role> {
            self.roles().await.ok()?.into_iter().find(|r| r.code == code)
        }
    }

    #[tokio::test]
    async fn seeded_roles_are_ordered() {
        let memory = Memory::seeded().await;
        let roles = memory.roles().await.unwrap();
        assert_eq!(roles.len(), 4);
        assert!(roles.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn insert_joins_role_and_hides_credential() {
        let memory = Memory::seeded().await;
        let role = csr(&memory).await;
        let account = memory.insert_account(&alice(role.id)).await.unwrap();
        assert_eq!(account.role_code, uam_core::CSR_REP);
        assert!(account.active);
        assert_eq!(memory.credential("alice").await.unwrap().as_deref(), Some("hash"));
        assert_eq!(memory.credential("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicates_and_dangling_roles_are_rejected() {
        let memory = Memory::seeded().await;
        let role = csr(&memory).await;
        memory.insert_account(&alice(role.id)).await.unwrap();
        assert_eq!(
            memory.insert_account(&alice(role.id)).await,
            Err(DirectoryError::Duplicate(Field::Username))
        );
        let mut other = alice(role.id);
        other.username = "alicia".into();
        assert_eq!(
            memory.insert_account(&other).await,
            Err(DirectoryError::Duplicate(Field::Email))
        );
        other.email = "alicia@x.com".into();
        other.role = ID::from(999);
        assert_eq!(memory.insert_account(&other).await, Err(DirectoryError::Reference));
    }

    #[tokio::test]
    async fn filters_and_search() {
        let memory = Memory::seeded().await;
        let role = csr(&memory).await;
        let account = memory.insert_account(&alice(role.id)).await.unwrap();
        let hits = memory.find_accounts(&Filter::default().username("alice")).await.unwrap();
        assert_eq!(hits, vec![account.clone()]);
        let miss = memory
            .find_accounts(&Filter::default().username("alice").role(uam_core::PIN))
            .await
            .unwrap();
        assert!(miss.is_empty());
        let found = memory.search_accounts("ALI", &Filter::default()).await.unwrap();
        assert_eq!(found.len(), 1);
        let none = memory
            .search_accounts("x.com", &Filter::default().active(false))
            .await
            .unwrap();
        assert!(none.is_empty());
        assert_eq!(memory.search_roles("admin").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_reports_missing_and_conflicting_rows() {
        let memory = Memory::seeded().await;
        let role = csr(&memory).await;
        let a = memory.insert_account(&alice(role.id)).await.unwrap();
        let mut bob = alice(role.id);
        bob.username = "bob".into();
        bob.email = "bob@x.com".into();
        memory.insert_account(&bob).await.unwrap();
        let clash = AccountChanges {
            email: Some("bob@x.com".into()),
            ..AccountChanges::default()
        };
        assert_eq!(
            memory.update_account(a.id, &clash).await,
            Err(DirectoryError::Duplicate(Field::Email))
        );
        let same = AccountChanges {
            email: Some("alice@x.com".into()),
            ..AccountChanges::default()
        };
        assert!(memory.update_account(a.id, &same).await.unwrap().is_some());
        let suspended = memory
            .update_account(a.id, &AccountChanges::activity(false))
            .await
            .unwrap()
            .unwrap();
        assert!(!suspended.active);
        assert_eq!(
            memory
                .update_account(ID::from(999), &AccountChanges::activity(false))
                .await,
            Ok(None)
        );
    }

    #[tokio::test]
    async fn role_removal_rejects_or_cascades() {
        let memory = Memory::seeded().await;
        let role = csr(&memory).await;
        memory.insert_account(&alice(role.id)).await.unwrap();
        assert_eq!(memory.count_accounts_by_role(role.id).await, Ok(1));
        assert_eq!(memory.delete_role(role.id, false).await, Err(DirectoryError::Reference));
        assert_eq!(memory.delete_role(role.id, true).await, Ok(Some(1)));
        assert_eq!(memory.delete_role(role.id, true).await, Ok(None));
        assert_eq!(memory.credential("alice").await, Ok(None));
    }

    #[tokio::test]
    async fn outage_fails_every_call() {
        let memory = Memory::seeded().await;
        memory.set_outage(true).await;
        assert!(matches!(memory.ping().await, Err(DirectoryError::Unavailable(_))));
        assert!(memory.roles().await.is_err());
        memory.set_outage(false).await;
        assert!(memory.ping().await.is_ok());
    }

    #[tokio::test]
    async fn touch_stamps_last_login() {
        let memory = Memory::seeded().await;
        let role = csr(&memory).await;
        let a = memory.insert_account(&alice(role.id)).await.unwrap();
        assert!(a.last_login.is_none());
        memory.touch(a.id).await.unwrap();
        assert!(memory.account(a.id).await.unwrap().unwrap().last_login.is_some());
        memory.set_touch_failure(true).await;
        assert!(memory.touch(a.id).await.is_err());
    }
}
