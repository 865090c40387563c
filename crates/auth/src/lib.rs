//! Authentication and authorization core.
//!
//! Stateless: every login, refresh, and gate check stands alone. Accounts
//! are read from an injected [`uam_directory::Directory`] and never cached.
//!
//! ## Credentials
//!
//! - [`password`] — Argon2 hashing, and verification across Argon2, bcrypt,
//!   and (when enabled) legacy plaintext
//! - [`Verifier`] — The verification policy
//!
//! ## Tokens
//!
//! - [`Crypto`] — Signs, verifies, and exchanges access and refresh tokens
//! - [`Claims`] — Token payload
//! - [`Settings`] — Secret, algorithm, and lifetimes from the environment
//!
//! ## Flows
//!
//! - [`authenticate`] — Username/password/role login
//! - [`Grant`] / [`Refusal`] — Login outcome
//!
//! ## HTTP (feature `server`)
//!
//! - [`Gate`] / [`Auth`] — Bearer token extractors
//! - [`Denial`] — Gate rejections (401/403)
//! - `login`, `refresh`, `logout`, `me` handlers
mod claims;
mod crypto;
mod dto;
mod login;
pub mod password;
mod refresh;
mod settings;

pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use login::*;
pub use password::Verifier;
pub use settings::*;

#[cfg(feature = "server")]
mod gate;
#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use gate::*;
#[cfg(feature = "server")]
pub use handlers::*;
