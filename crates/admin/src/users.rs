//! Account administration.
use super::*;
use uam_core::ID;
use uam_directory::Account;
use uam_directory::AccountChanges;
use uam_directory::Directory;
use uam_directory::Field;
use uam_directory::NewAccount;
use uam_directory::Role;

async fn hash(password: &str) -> Result<String, AdminError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || uam_auth::password::hash(&password))
        .await
        .map_err(|e| AdminError::unavailable("hashing task", e))?
        .map_err(|e| AdminError::unavailable("hashing password", e))
}

async fn role_exists(directory: &dyn Directory, role: ID<Role>) -> Result<(), AdminError> {
    match directory.role(role).await? {
        Some(_) => Ok(()),
        None => Err(AdminError::invalid("Role does not exist")),
    }
}

async fn unique(directory: &dyn Directory, field: Field, value: &str, except: Option<ID<Account>>) -> Result<(), AdminError> {
    match directory.taken(field, value, except.map(|id| id.inner())).await? {
        true => Err(AdminError::Duplicate(field)),
        false => Ok(()),
    }
}

pub async fn list(directory: &dyn Directory, query: &UserQuery) -> Result<Vec<Account>, AdminError> {
    Ok(directory.find_accounts(&query.filter()).await?)
}

/// Case-insensitive match on username, full name, or email.
pub async fn search(directory: &dyn Directory, query: &SearchQuery) -> Result<Vec<Account>, AdminError> {
    Ok(directory.search_accounts(query.q.trim(), &query.filter()).await?)
}

pub async fn get(directory: &dyn Directory, id: ID<Account>) -> Result<Account, AdminError> {
    directory.account(id).await?.ok_or(AdminError::NotFound("User"))
}

/// Validates, checks uniqueness, hashes the password, and stores the account.
pub async fn create(directory: &dyn Directory, req: &CreateUser) -> Result<Account, AdminError> {
    let username = req.username.trim();
    let email = req.email.trim();
    let full_name = req.full_name.trim();
    validate::username(username)?;
    validate::email(email)?;
    validate::full_name(full_name)?;
    validate::password(&req.password)?;
    role_exists(directory, req.role_id).await?;
    unique(directory, Field::Username, username, None).await?;
    unique(directory, Field::Email, email, None).await?;
    let account = directory
        .insert_account(&NewAccount {
            username: username.to_string(),
            credential: hash(&req.password).await?,
            full_name: full_name.to_string(),
            email: email.to_string(),
            role: req.role_id,
        })
        .await?;
    log::info!("created account {} ({})", account.username, account.role_code);
    Ok(account)
}

/// Applies a partial update. At least one field must be present.
pub async fn update(directory: &dyn Directory, id: ID<Account>, req: &UpdateUser) -> Result<Account, AdminError> {
    get(directory, id).await?;
    let mut changes = AccountChanges::default();
    if let Some(username) = req.username.as_deref().map(str::trim) {
        validate::username(username)?;
        unique(directory, Field::Username, username, Some(id)).await?;
        changes.username = Some(username.to_string());
    }
    if let Some(full_name) = req.full_name.as_deref().map(str::trim) {
        validate::full_name(full_name)?;
        changes.full_name = Some(full_name.to_string());
    }
    if let Some(email) = req.email.as_deref().map(str::trim) {
        validate::email(email)?;
        unique(directory, Field::Email, email, Some(id)).await?;
        changes.email = Some(email.to_string());
    }
    if let Some(role) = req.role_id {
        role_exists(directory, role).await?;
        changes.role = Some(role);
    }
    if let Some(password) = req.password.as_deref() {
        validate::password(password)?;
        changes.credential = Some(hash(password).await?);
    }
    changes.active = req.is_active;
    if changes.is_empty() {
        return Err(AdminError::invalid("No fields provided for update."));
    }
    directory
        .update_account(id, &changes)
        .await?
        .ok_or(AdminError::NotFound("User"))
}

async fn activity(directory: &dyn Directory, id: ID<Account>, active: bool) -> Result<Account, AdminError> {
    let account = get(directory, id).await?;
    if account.active == active {
        return Err(AdminError::conflict(match active {
            true => format!("User \"{}\" is already active.", account.username),
            false => format!("User \"{}\" is already suspended.", account.username),
        }));
    }
    let account = directory
        .update_account(id, &AccountChanges::activity(active))
        .await?
        .ok_or(AdminError::NotFound("User"))?;
    log::info!("account {} active={}", account.username, active);
    Ok(account)
}

/// Suspends an active account. Suspended accounts cannot log in.
pub async fn suspend(directory: &dyn Directory, id: ID<Account>) -> Result<Account, AdminError> {
    activity(directory, id, false).await
}

pub async fn activate(directory: &dyn Directory, id: ID<Account>) -> Result<Account, AdminError> {
    activity(directory, id, true).await
}

pub async fn toggle(directory: &dyn Directory, id: ID<Account>) -> Result<Account, AdminError> {
    let account = get(directory, id).await?;
    activity(directory, id, !account.active).await
}

/// Suspends each id in turn; one failure never stops the rest.
pub async fn suspend_many(directory: &dyn Directory, ids: &[ID<Account>]) -> BulkReport {
    let mut report = BulkReport::default();
    for id in ids.iter().copied() {
        match suspend(directory, id).await {
            Ok(_) => report.success_count += 1,
            Err(e) => {
                report.failure_count += 1;
                report.failures.push(BulkFailure {
                    user_id: id,
                    message: e.to_string(),
                });
            }
        }
    }
    report
}
