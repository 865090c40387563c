use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

fn salt() -> Result<SaltString, argon2::password_hash::Error> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes)
}

/// Argon2id PHC string for `password` under a fresh salt.
/// Every write path stores this, never the plaintext.
pub fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt()?)
        .map(|h| h.to_string())
}

fn argon(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

fn bcrypt(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// Credential verification policy.
///
/// Stored credentials are recognised by prefix: `$argon2` for Argon2 PHC
/// strings, `$2a$`/`$2b$`/`$2y$` for bcrypt. Anything else is a legacy
/// plaintext row, accepted on exact equality only when `legacy` is set.
/// Malformed hashes verify as `false`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Verifier {
    legacy: bool,
}

impl Verifier {
    pub fn new(legacy: bool) -> Self {
        Self { legacy }
    }
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match stored {
            "" => false,
            s if s.starts_with("$argon2") => argon(password, s),
            s if ["$2a$", "$2b$", "$2y$"].iter().any(|p| s.starts_with(p)) => bcrypt(password, s),
            s => self.legacy && s.as_bytes() == password.as_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_their_password() {
        let h = hash("secret1").unwrap();
        assert!(h.starts_with("$argon2id$"));
        assert!(Verifier::default().verify("secret1", &h));
        assert!(!Verifier::default().verify("secret2", &h));
        assert_ne!(h, hash("secret1").unwrap());
    }

    #[test]
    fn bcrypt_rows_verify() {
        let h = ::bcrypt::hash("secret1", 4).unwrap();
        assert!(Verifier::default().verify("secret1", &h));
        assert!(!Verifier::default().verify("nope", &h));
    }

    #[test]
    fn malformed_hashes_are_false() {
        let v = Verifier::new(true);
        assert!(!v.verify("x", "$argon2id$garbage"));
        assert!(!v.verify("$2b$garbage", "$2b$garbage"));
        assert!(!v.verify("", ""));
    }

    #[test]
    fn plaintext_needs_legacy_mode() {
        assert!(Verifier::new(true).verify("hunter2", "hunter2"));
        assert!(!Verifier::new(true).verify("hunter3", "hunter2"));
        assert!(!Verifier::new(false).verify("hunter2", "hunter2"));
    }
}
