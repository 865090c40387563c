use super::*;
use uam_core::ID;
use uam_directory::Account;

/// Token service: HMAC signing and verification under one process-wide
/// secret and algorithm, with fixed access and refresh lifetimes.
pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    header: jsonwebtoken::Header,
    validation: jsonwebtoken::Validation,
    access: u64,
    refresh: u64,
}

impl From<&Settings> for Crypto {
    fn from(settings: &Settings) -> Self {
        let mut validation = jsonwebtoken::Validation::new(settings.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: jsonwebtoken::DecodingKey::from_secret(settings.secret.as_bytes()),
            header: jsonwebtoken::Header::new(settings.algorithm),
            validation,
            access: settings.access_minutes * 60,
            refresh: settings.refresh_days * 24 * 60 * 60,
        }
    }
}

impl Crypto {
    pub fn new(secret: &str) -> Self {
        Self::from(&Settings::new(secret))
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&self.header, claims, &self.encoding)
    }
    /// Verified claims, or `None` for a bad signature, a foreign
    /// algorithm, a malformed token, or an `exp` already in the past.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .ok()
    }
    pub fn issue_access(&self, subject: ID<Account>, role: Option<&str>) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode(&Claims::access(subject, role, self.access))
    }
    pub fn issue_refresh(&self, subject: ID<Account>) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode(&Claims::refresh(subject, self.refresh))
    }
    /// Access token lifetime in seconds.
    pub fn expires_in(&self) -> u64 {
        self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_tokens_round_trip() {
        let crypto = Crypto::new("secret");
        let token = crypto.issue_access(ID::from(7), Some("USER_ADMIN")).unwrap();
        let claims = crypto.decode(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role(), Some("USER_ADMIN"));
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_refresh());
        assert_eq!(crypto.decode(&token), Some(claims));
    }

    #[test]
    fn refresh_tokens_are_marked() {
        let crypto = Crypto::new("secret");
        let claims = crypto.decode(&crypto.issue_refresh(ID::from(7)).unwrap()).unwrap();
        assert!(claims.is_refresh());
        assert_eq!(claims.role(), None);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
    }

    #[test]
    fn expired_tokens_are_invalid() {
        let crypto = Crypto::new("secret");
        let mut claims = Claims::access(ID::from(7), Some("PIN"), 0);
        claims.iat -= 120;
        claims.exp -= 60;
        assert_eq!(crypto.decode(&crypto.encode(&claims).unwrap()), None);
    }

    #[test]
    fn foreign_tokens_are_invalid() {
        let ours = Crypto::new("secret");
        let theirs = Crypto::new("other");
        let token = theirs.issue_access(ID::from(7), Some("PIN")).unwrap();
        assert_eq!(ours.decode(&token), None);
        assert_eq!(ours.decode("not.a.token"), None);
        assert_eq!(ours.decode(""), None);
        let mut hs512 = Settings::new("secret");
        hs512.algorithm = jsonwebtoken::Algorithm::HS512;
        let token = Crypto::from(&hs512).issue_access(ID::from(7), None).unwrap();
        assert_eq!(ours.decode(&token), None);
    }

    #[test]
    fn extra_claims_survive() {
        let crypto = Crypto::new("secret");
        let claims = Claims::access(ID::from(1), Some("PIN"), 60).with("tenant", "north");
        let back = crypto.decode(&crypto.encode(&claims).unwrap()).unwrap();
        assert_eq!(back.extra["tenant"], "north");
    }
}
