//! Account directory: the system of record for accounts and roles.
//!
//! The authentication core and the administrative operations never talk to
//! storage directly. They hold an injected `Arc<dyn Directory>` and use the
//! narrow query/update surface defined here.
//!
//! ## Records
//!
//! - [`Account`] — A user account joined with its role (never the credential)
//! - [`Role`] — A role with its machine code and dashboard route
//! - [`NewAccount`], [`AccountChanges`], [`NewRole`], [`RoleChanges`] — write shapes
//!
//! ## Access
//!
//! - [`Directory`] — The storage interface
//! - [`Filter`] — Equality filters for account lookups
//! - [`Field`] — Unique fields, for duplicate checks and errors
//!
//! ## Implementations
//!
//! - `Arc<tokio_postgres::Client>` (feature `database`)
//! - [`Memory`] (feature `memory`) — in-process directory for tests
mod account;
mod directory;
mod error;
mod filter;
mod role;

pub use account::*;
pub use directory::*;
pub use error::*;
pub use filter::*;
pub use role::*;

#[cfg(feature = "database")]
mod postgres;
#[cfg(feature = "database")]
pub use postgres::*;

#[cfg(any(test, feature = "memory"))]
mod memory;
#[cfg(any(test, feature = "memory"))]
pub use memory::*;
