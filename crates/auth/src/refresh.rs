use super::*;
use uam_core::ID;
use uam_directory::Account;

impl Crypto {
    /// The subject of a valid refresh token.
    /// Access tokens, and tokens without a usable `sub`, yield `None`.
    pub fn redeem(&self, token: &str) -> Option<ID<Account>> {
        self.decode(token)
            .filter(Claims::is_refresh)
            .and_then(|claims| claims.subject())
    }
    /// Exchanges a refresh token for an access token without consulting
    /// the directory, so the minted token carries no `role` claim and
    /// clears no role gate. The HTTP exchange pairs [`Crypto::redeem`]
    /// with an account lookup instead. The refresh token stays valid
    /// until its own expiry.
    pub fn refresh(&self, token: &str) -> Option<String> {
        self.redeem(token)
            .and_then(|subject| self.issue_access(subject, None).ok())
    }
}
