//! Error types produced by the key database.
//!
//! | Error | Raised by | Description |
//! |-------|-----------|-------------|
//! | [`InvalidName`](KeyDbError::InvalidName) | [`KeyName::parse`](crate::KeyName::parse), [`KeyName::child`](crate::KeyName::child) | Name is empty, has an unknown namespace or no leading `/`; segment is not a single literal segment |
//! | [`MountConflict`](KeyDbError::MountConflict) | [`Kdb::mount`](crate::Kdb::mount) | Mountpoint already taken |
//! | [`Backend`](KeyDbError::Backend) | [`Backend::get`](crate::Backend::get) | Storage failed (I/O, parse, poisoned lock) |

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyDbError {
    #[error("invalid key name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
    #[error("mountpoint '{0}' is already in use")]
    MountConflict(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl KeyDbError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    pub(crate) fn invalid_name(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
