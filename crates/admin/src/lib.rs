//! Account and role administration.
//!
//! One implementation per operation, each taking the injected directory.
//! The HTTP layer (feature `server`) puts every route behind
//! `Gate<UserAdmin>`.
//!
//! ## Accounts
//!
//! - [`users::list`], [`users::search`], [`users::get`]
//! - [`users::create`], [`users::update`]
//! - [`users::suspend`], [`users::activate`], [`users::toggle`], [`users::suspend_many`]
//!
//! ## Roles
//!
//! - [`roles::list`], [`roles::search`], [`roles::get`]
//! - [`roles::create`], [`roles::update`], [`roles::toggle`], [`roles::delete`]
mod dto;
mod error;
pub mod roles;
pub mod users;
mod validate;

pub use dto::*;
pub use error::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
pub use handlers::*;
