use super::*;
use uam_directory::Account;
use uam_directory::Directory;
use uam_directory::Filter;

/// A successful login.
#[derive(Debug, Clone)]
pub struct Grant {
    pub account: Account,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

/// Why a login was refused. The rendered messages are what callers see;
/// they never say which of username, password, or role was wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Refusal {
    #[error("Invalid username, password, or role")]
    InvalidCredentials,
    #[error("Account has been suspended. Please contact administrator.")]
    Suspended,
    #[error("An error occurred during login. Please try again.")]
    Failed,
}

fn failed(stage: &str, error: impl std::fmt::Display) -> Refusal {
    log::error!("login failed while {}: {}", stage, error);
    Refusal::Failed
}

/// Resolves, checks, and verifies an account, then mints its tokens.
///
/// Suspension is reported before the password is checked. A failed
/// last-login update is logged and does not fail the login.
pub async fn authenticate(
    directory: &dyn Directory,
    crypto: &Crypto,
    verifier: Verifier,
    request: &LoginRequest,
) -> Result<Grant, Refusal> {
    let mut filter = Filter::default().username(request.username.as_str());
    if let Some(role) = request.role() {
        filter = filter.role(role);
    }
    let account = directory
        .find_accounts(&filter)
        .await
        .map_err(|e| failed("resolving account", e))?
        .into_iter()
        .next()
        .ok_or(Refusal::InvalidCredentials)?;
    if !account.active {
        log::info!("refused suspended account {}", account.username);
        return Err(Refusal::Suspended);
    }
    let stored = directory
        .credential(&account.username)
        .await
        .map_err(|e| failed("reading credential", e))?
        .ok_or(Refusal::InvalidCredentials)?;
    let password = request.password.clone();
    let verified = tokio::task::spawn_blocking(move || verifier.verify(&password, &stored))
        .await
        .map_err(|e| failed("verifying credential", e))?;
    if !verified {
        return Err(Refusal::InvalidCredentials);
    }
    if let Err(e) = directory.touch(account.id).await {
        log::warn!("last login not recorded for {}: {}", account.username, e);
    }
    let access_token = crypto
        .issue_access(account.id, Some(&account.role_code))
        .map_err(|e| failed("issuing access token", e))?;
    let refresh_token = crypto
        .issue_refresh(account.id)
        .map_err(|e| failed("issuing refresh token", e))?;
    log::info!("login {} ({})", account.username, account.role_code);
    Ok(Grant {
        account,
        access_token,
        refresh_token,
        expires_in: crypto.expires_in(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uam_directory::Memory;
    use uam_directory::NewAccount;

    async fn directory() -> Memory {
        let memory = Memory::seeded().await;
        let csr = memory
            .roles()
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.code == uam_core::CSR_REP)
            .unwrap();
        memory
            .insert_account(&NewAccount {
                username: "alice".into(),
                credential: password::hash("secret1").unwrap(),
                full_name: "Alice A".into(),
                email: "alice@x.com".into(),
                role: csr.id,
            })
            .await
            .unwrap();
        memory
    }

    fn request(username: &str, password: &str, role: Option<&str>) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
            role_code: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn correct_credentials_grant_tokens() {
        let memory = directory().await;
        let crypto = Crypto::new("secret");
        let grant = authenticate(&memory, &crypto, Verifier::default(), &request("alice", "secret1", Some("CSR_REP")))
            .await
            .unwrap();
        assert!(!grant.access_token.is_empty());
        assert!(!grant.refresh_token.is_empty());
        assert_eq!(grant.expires_in, 3600);
        assert_eq!(grant.account.dashboard_route, "/dashboard/csr");
        let claims = crypto.decode(&grant.access_token).unwrap();
        assert_eq!(claims.role(), Some("CSR_REP"));
        assert_eq!(claims.subject(), Some(grant.account.id));
        let stamped = memory.account(grant.account.id).await.unwrap().unwrap();
        assert!(stamped.last_login.is_some());
    }

    #[tokio::test]
    async fn failures_are_indistinguishable() {
        let memory = directory().await;
        let crypto = Crypto::new("secret");
        let v = Verifier::default();
        for r in [
            request("alice", "wrong", None),
            request("nobody", "secret1", None),
            request("alice", "secret1", Some("USER_ADMIN")),
        ] {
            assert_eq!(authenticate(&memory, &crypto, v, &r).await.unwrap_err(), Refusal::InvalidCredentials);
        }
        assert!(authenticate(&memory, &crypto, v, &request("alice", "secret1", Some(""))).await.is_ok());
    }

    #[tokio::test]
    async fn suspension_wins_over_password() {
        let memory = directory().await;
        let crypto = Crypto::new("secret");
        let id = memory.find_accounts(&Filter::default().username("alice")).await.unwrap()[0].id;
        memory
            .update_account(id, &uam_directory::AccountChanges::activity(false))
            .await
            .unwrap();
        for password in ["secret1", "wrong"] {
            let outcome = authenticate(&memory, &crypto, Verifier::default(), &request("alice", password, None)).await;
            assert_eq!(outcome.unwrap_err(), Refusal::Suspended);
        }
    }

    #[tokio::test]
    async fn legacy_rows_need_the_flag() {
        let memory = directory().await;
        memory.set_credential("alice", "plain").await;
        let crypto = Crypto::new("secret");
        let r = request("alice", "plain", None);
        assert!(authenticate(&memory, &crypto, Verifier::new(true), &r).await.is_ok());
        assert_eq!(
            authenticate(&memory, &crypto, Verifier::new(false), &r).await.unwrap_err(),
            Refusal::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn last_login_failure_is_tolerated() {
        let memory = directory().await;
        memory.set_touch_failure(true).await;
        let crypto = Crypto::new("secret");
        assert!(authenticate(&memory, &crypto, Verifier::default(), &request("alice", "secret1", None)).await.is_ok());
    }

    #[tokio::test]
    async fn outages_become_generic_failures() {
        let memory = directory().await;
        memory.set_outage(true).await;
        let crypto = Crypto::new("secret");
        let outcome = authenticate(&memory, &crypto, Verifier::default(), &request("alice", "secret1", None)).await;
        assert_eq!(outcome.unwrap_err(), Refusal::Failed);
        assert_eq!(
            Refusal::Failed.to_string(),
            "An error occurred during login. Please try again."
        );
    }
}
