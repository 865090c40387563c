use super::*;
use uam_core::ID;

/// Storage interface for accounts and roles.
///
/// Implementations are shared across request handlers as
/// `Arc<dyn Directory>` and must not hold request state. Every method is
/// a single round trip; consistency between concurrent callers is the
/// store's own.
#[async_trait::async_trait]
pub trait Directory: Send + Sync {
    /// Cheap liveness probe of the backing store.
    async fn ping(&self) -> Result<(), DirectoryError>;

    /// Accounts matching every set field of `filter`, ordered by id.
    async fn find_accounts(&self, filter: &Filter) -> Result<Vec<Account>, DirectoryError>;
    /// Accounts whose username, full name, or email contains `text`
    /// (case-insensitive) and which match `filter`, ordered by id.
    /// Empty `text` matches every account.
    async fn search_accounts(&self, text: &str, filter: &Filter) -> Result<Vec<Account>, DirectoryError>;
    async fn account(&self, id: ID<Account>) -> Result<Option<Account>, DirectoryError>;
    /// The stored credential for `username`: a hash, or legacy plaintext.
    async fn credential(&self, username: &str) -> Result<Option<String>, DirectoryError>;
    /// Stamps the account's last login with the current time.
    async fn touch(&self, id: ID<Account>) -> Result<(), DirectoryError>;
    /// Whether `value` is already used for `field` by a record other than `except`.
    async fn taken(&self, field: Field, value: &str, except: Option<i64>) -> Result<bool, DirectoryError>;
    async fn insert_account(&self, account: &NewAccount) -> Result<Account, DirectoryError>;
    /// Applies `changes`; `None` when no such account exists.
    async fn update_account(
        &self,
        id: ID<Account>,
        changes: &AccountChanges,
    ) -> Result<Option<Account>, DirectoryError>;
    async fn count_accounts_by_role(&self, role: ID<Role>) -> Result<u64, DirectoryError>;

    /// Every role, ordered by id.
    async fn roles(&self) -> Result<Vec<Role>, DirectoryError>;
    async fn role(&self, id: ID<Role>) -> Result<Option<Role>, DirectoryError>;
    /// Roles whose name or code contains `text` (case-insensitive), ordered by id.
    async fn search_roles(&self, text: &str) -> Result<Vec<Role>, DirectoryError>;
    async fn insert_role(&self, role: &NewRole) -> Result<Role, DirectoryError>;
    /// Applies `changes`; `None` when no such role exists.
    async fn update_role(&self, id: ID<Role>, changes: &RoleChanges) -> Result<Option<Role>, DirectoryError>;
    /// Removes the role, first removing its accounts when `cascade` is set.
    /// Returns the number of accounts removed, or `None` when no such role exists.
    /// Without `cascade`, a role still referenced yields [`DirectoryError::Reference`].
    async fn delete_role(&self, id: ID<Role>, cascade: bool) -> Result<Option<u64>, DirectoryError>;
}
