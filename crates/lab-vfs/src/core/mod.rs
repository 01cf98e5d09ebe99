//! Core filesystem types and utilities

mod error;
pub mod path;
mod permissions;
mod types;

pub use error::{ErrorKind, VfsError, VfsResult};
pub use permissions::{Access, IntoMode, Permissions, PERMISSION_BITS, SPECIAL_BITS};
pub use types::{
    FindOptions, FindType, FsNode, Gid, ListEntry, ListOptions, LongFormat, NodeContent, NodeKind,
    Stat, Timestamps, Uid, DIRECTORY_SIZE,
};
