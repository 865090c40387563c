use super::*;

/// Failures surfaced by a [`Directory`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// A unique constraint rejected the write.
    #[error("{0} already exists")]
    Duplicate(Field),
    /// A foreign key rejected the write: the referenced role is missing,
    /// or the role being removed is still referenced by accounts.
    #[error("record reference violated")]
    Reference,
    /// The backing store could not serve the request.
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
