//! Error types for the lab filesystem.
//!
//! Every variant is an expected, recoverable condition. Payloads carry the
//! path (or pattern, mode text, user name) the caller supplied so the shell
//! layer can print coreutils-style messages.

use serde::{Deserialize, Serialize};

/// Errors from filesystem operations.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VfsError {
    /// Target or an intermediate segment does not exist
    #[error("{0}: No such file or directory")]
    NotFound(String),

    /// Create-style operation targets an occupied name
    #[error("{0}: File exists")]
    AlreadyExists(String),

    /// Operation requiring a file was given a directory
    #[error("{0}: Is a directory")]
    IsADirectory(String),

    /// Operation requiring a directory was given something else
    #[error("{0}: Not a directory")]
    NotADirectory(String),

    /// Non-recursive removal of a populated directory
    #[error("{0}: Directory not empty")]
    DirectoryNotEmpty(String),

    /// Caller lacks the privilege for the operation
    #[error("{0}: Operation not permitted")]
    PermissionDenied(String),

    /// A `find -name` glob failed to compile
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Glob as given by the caller
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Mode text that is not an octal number in range
    #[error("invalid mode: '{0}'")]
    InvalidMode(String),

    /// No user with the given name
    #[error("user '{0}' does not exist")]
    UnknownUser(String),

    /// Session snapshot could not be encoded or decoded
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Payload-free discriminant of [`VfsError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    IsADirectory,
    NotADirectory,
    DirectoryNotEmpty,
    PermissionDenied,
    InvalidPattern,
    InvalidMode,
    UnknownUser,
    Snapshot,
}

impl VfsError {
    /// Create a not-found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a permission error for `path`.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied(path.into())
    }

    /// Create an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// The kind of this error, without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VfsError::NotFound(_) => ErrorKind::NotFound,
            VfsError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            VfsError::IsADirectory(_) => ErrorKind::IsADirectory,
            VfsError::NotADirectory(_) => ErrorKind::NotADirectory,
            VfsError::DirectoryNotEmpty(_) => ErrorKind::DirectoryNotEmpty,
            VfsError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            VfsError::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            VfsError::InvalidMode(_) => ErrorKind::InvalidMode,
            VfsError::UnknownUser(_) => ErrorKind::UnknownUser,
            VfsError::Snapshot(_) => ErrorKind::Snapshot,
        }
    }

    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a permission error.
    pub fn is_permission_denied(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }
}

impl From<serde_json::Error> for VfsError {
    fn from(err: serde_json::Error) -> Self {
        VfsError::Snapshot(err.to_string())
    }
}

/// Result alias used across the crate.
pub type VfsResult<T> = Result<T, VfsError>;
