use jsonwebtoken::Algorithm;

/// Token and credential configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_minutes: u64,
    pub refresh_days: u64,
    pub allow_legacy_plaintext: bool,
}

impl Settings {
    /// Reads `JWT_SECRET` (required), `JWT_ALGORITHM`,
    /// `ACCESS_TOKEN_EXPIRE_MINUTES`, `REFRESH_TOKEN_EXPIRE_DAYS`,
    /// and `ALLOW_LEGACY_PLAINTEXT`.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let algorithm = uam_core::env("JWT_ALGORITHM", String::from("HS256")).map_err(anyhow::Error::msg)?;
        let settings = Self {
            secret,
            algorithm: Self::algorithm(&algorithm)?,
            access_minutes: uam_core::env("ACCESS_TOKEN_EXPIRE_MINUTES", uam_core::ACCESS_TOKEN_MINUTES)
                .map_err(anyhow::Error::msg)?,
            refresh_days: uam_core::env("REFRESH_TOKEN_EXPIRE_DAYS", uam_core::REFRESH_TOKEN_DAYS)
                .map_err(anyhow::Error::msg)?,
            allow_legacy_plaintext: uam_core::flag("ALLOW_LEGACY_PLAINTEXT"),
        };
        if settings.allow_legacy_plaintext {
            log::warn!("legacy plaintext credentials are accepted");
        }
        Ok(settings)
    }

    /// Parses an HMAC algorithm name. Asymmetric algorithms need key
    /// material this service does not hold, so they are refused.
    pub fn algorithm(name: &str) -> anyhow::Result<Algorithm> {
        match name.trim().to_ascii_uppercase().parse::<Algorithm>() {
            Ok(a @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(a),
            Ok(a) => Err(anyhow::anyhow!("JWT_ALGORITHM {:?} is not an HMAC algorithm", a)),
            Err(_) => Err(anyhow::anyhow!("JWT_ALGORITHM {} is not recognised", name)),
        }
    }

    /// Defaults around a given secret.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            algorithm: Algorithm::HS256,
            access_minutes: uam_core::ACCESS_TOKEN_MINUTES,
            refresh_days: uam_core::REFRESH_TOKEN_DAYS,
            allow_legacy_plaintext: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_hmac_algorithms() {
        assert_eq!(Settings::algorithm("HS256").unwrap(), Algorithm::HS256);
        assert_eq!(Settings::algorithm("hs512").unwrap(), Algorithm::HS512);
        assert!(Settings::algorithm("RS256").is_err());
        assert!(Settings::algorithm("none").is_err());
    }

    #[test]
    fn defaults() {
        let s = Settings::new("k");
        assert_eq!(s.access_minutes, 60);
        assert_eq!(s.refresh_days, 7);
        assert!(!s.allow_legacy_plaintext);
    }
}
