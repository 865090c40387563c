//! Core identifiers, constants, and runtime utilities.
//!
//! This crate provides the foundational types shared by every crate in
//! the workspace: typed record identifiers, the well-known role codes,
//! validation bounds, token lifetimes, and process setup helpers.

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for directory records.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::str::FromStr;

/// Database-assigned identifier, tagged with the record type it names
/// so an account id can never be passed where a role id is expected.
pub struct ID<T> {
    inner: i64,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> i64 {
        self.inner
    }
}

impl<T> From<ID<T>> for i64 {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<i64> for ID<T> {
    fn from(inner: i64) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> FromStr for ID<T> {
    type Err = std::num::ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self::from)
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.inner)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        <i64 as serde::Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// ROLE CODES
// Machine codes of the roles every deployment ships with. Codes are stored
// uppercase and drive both authorization and dashboard routing.
// ============================================================================
/// Administers accounts and roles; the only role admitted to admin endpoints.
pub const USER_ADMIN: &str = "USER_ADMIN";
/// Person-in-need accounts.
pub const PIN: &str = "PIN";
/// Corporate social responsibility representatives.
pub const CSR_REP: &str = "CSR_REP";
/// Platform management staff.
pub const PLATFORM_MGMT: &str = "PLATFORM_MGMT";

// ============================================================================
// TOKEN LIFETIMES
// ============================================================================
/// Default access token lifetime.
pub const ACCESS_TOKEN_MINUTES: u64 = 60;
/// Default refresh token lifetime.
pub const REFRESH_TOKEN_DAYS: u64 = 7;
/// Marker carried in the `type` claim of refresh tokens.
pub const REFRESH: &str = "refresh";

// ============================================================================
// FIELD BOUNDS
// ============================================================================
/// Shortest accepted username.
pub const USERNAME_MIN: usize = 3;
/// Longest accepted username.
pub const USERNAME_MAX: usize = 50;
/// Shortest accepted full name.
pub const FULL_NAME_MIN: usize = 2;

// ============================================================================
// CONFIGURATION
// ============================================================================
/// Read an environment variable, parsing it into `T`.
/// Missing variables yield `default`; unparseable ones yield an error naming the key.
pub fn env<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) if raw.trim().is_empty() => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("{} is invalid ({}): {}", key, raw, e)),
    }
}

/// Interpret the usual spellings of a boolean flag.
pub fn flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() -> std::io::Result<()> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Error)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).map_err(std::io::Error::other)
}

/// Register Ctrl+C handler for immediate termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn id_parses_and_displays() {
        let id = "42".parse::<ID<Thing>>().unwrap();
        assert_eq!(id.inner(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("forty-two".parse::<ID<Thing>>().is_err());
    }

    #[test]
    fn id_serializes_as_bare_integer() {
        let id = ID::<Thing>::from(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
        let back = serde_json::from_str::<ID<Thing>>(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn env_falls_back_and_rejects_garbage() {
        assert_eq!(env::<u64>("UAM_CORE_TEST_UNSET_VARIABLE", 60), Ok(60));
        unsafe { std::env::set_var("UAM_CORE_TEST_GARBAGE", "sixty") };
        assert!(env::<u64>("UAM_CORE_TEST_GARBAGE", 60).is_err());
        unsafe { std::env::set_var("UAM_CORE_TEST_NUMBER", " 15 ") };
        assert_eq!(env::<u64>("UAM_CORE_TEST_NUMBER", 60), Ok(15));
    }
}
