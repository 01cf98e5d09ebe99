//! Core types for the lab filesystem.
//!
//! Defines the tree node, its timestamps, and the records returned by
//! `stat`, `ls` and `find`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::permissions::Permissions;

/// Reported size of every directory, regardless of contents.
pub const DIRECTORY_SIZE: u64 = 4096;

/// User identifier.
pub type Uid = u32;

/// Group identifier.
pub type Gid = u32;

/// Millisecond timestamps of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last access (read)
    pub atime: i64,
    /// Last content modification
    pub mtime: i64,
    /// Last metadata or content change
    pub ctime: i64,
}

impl Timestamps {
    /// All three timestamps set to `now`.
    pub fn at(now: i64) -> Self {
        Self {
            atime: now,
            mtime: now,
            ctime: now,
        }
    }
}

/// Payload of a node. A directory exclusively owns its children.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeContent {
    /// Regular file bytes
    File(Vec<u8>),
    /// Child name to child node
    Directory(BTreeMap<String, FsNode>),
    /// Reserved: link target. Never created by the engine.
    Symlink(String),
}

/// Type of filesystem entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
    Symlink,
}

impl NodeKind {
    /// Single-letter type as used by `find -type`.
    pub fn letter(&self) -> char {
        match self {
            NodeKind::File => 'f',
            NodeKind::Directory => 'd',
            NodeKind::Symlink => 'l',
        }
    }
}

/// A node of the in-memory tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsNode {
    pub content: NodeContent,
    pub permissions: Permissions,
    pub uid: Uid,
    pub gid: Gid,
    pub times: Timestamps,
}

impl FsNode {
    /// Create an empty directory.
    pub fn new_directory(permissions: Permissions, uid: Uid, gid: Gid, now: i64) -> Self {
        Self {
            content: NodeContent::Directory(BTreeMap::new()),
            permissions,
            uid,
            gid,
            times: Timestamps::at(now),
        }
    }

    /// Create a file holding `data`.
    pub fn new_file(data: Vec<u8>, permissions: Permissions, uid: Uid, gid: Gid, now: i64) -> Self {
        Self {
            content: NodeContent::File(data),
            permissions,
            uid,
            gid,
            times: Timestamps::at(now),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.content {
            NodeContent::File(_) => NodeKind::File,
            NodeContent::Directory(_) => NodeKind::Directory,
            NodeContent::Symlink(_) => NodeKind::Symlink,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.content, NodeContent::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self.content, NodeContent::File(_))
    }

    /// Byte length for files and symlinks, [`DIRECTORY_SIZE`] for directories.
    pub fn size(&self) -> u64 {
        match &self.content {
            NodeContent::File(data) => data.len() as u64,
            NodeContent::Directory(_) => DIRECTORY_SIZE,
            NodeContent::Symlink(target) => target.len() as u64,
        }
    }

    /// Display-only link count: 2 for directories, 1 otherwise.
    pub fn link_count(&self) -> u32 {
        if self.is_directory() {
            2
        } else {
            1
        }
    }

    /// Children of a directory, `None` for other kinds.
    pub fn children(&self) -> Option<&BTreeMap<String, FsNode>> {
        match &self.content {
            NodeContent::Directory(children) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut BTreeMap<String, FsNode>> {
        match &mut self.content {
            NodeContent::Directory(children) => Some(children),
            _ => None,
        }
    }

    /// File bytes, `None` for other kinds.
    pub fn data(&self) -> Option<&[u8]> {
        match &self.content {
            NodeContent::File(data) => Some(data),
            _ => None,
        }
    }

    /// Apply `f` to this node and every descendant.
    pub fn for_each_mut(&mut self, f: &mut impl FnMut(&mut FsNode)) {
        f(self);
        if let Some(children) = self.children_mut() {
            for child in children.values_mut() {
                child.for_each_mut(f);
            }
        }
    }
}

/// Metadata returned by `stat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Canonical absolute path
    pub path: String,
    pub kind: NodeKind,
    pub size: u64,
    pub permissions: Permissions,
    /// Numeric mode, e.g. `0o644`
    pub mode: u32,
    /// Zero-padded octal mode, e.g. `"0644"`
    pub mode_octal: String,
    pub uid: Uid,
    pub gid: Gid,
    /// User name, or the numeric uid if unknown
    pub owner: String,
    /// Group name, or the numeric gid if unknown
    pub group: String,
    pub link_count: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

/// Options for `ls`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include dot-entries, plus `.` and `..`
    pub all: bool,
    /// Fill in [`ListEntry::long`]
    pub long: bool,
}

impl ListOptions {
    /// `ls -a`
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    /// `ls -l`
    pub fn long() -> Self {
        Self {
            long: true,
            ..Self::default()
        }
    }
}

/// One row of an `ls` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    pub kind: NodeKind,
    pub size: u64,
    /// Present when listed with `long`
    pub long: Option<LongFormat>,
}

/// Extra columns of `ls -l`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongFormat {
    /// e.g. `-rw-r--r--`
    pub permissions: String,
    pub link_count: u32,
    pub owner: String,
    pub group: String,
    pub size: u64,
    /// e.g. `Jan  5 09:30`
    pub modified: String,
}

impl ListEntry {
    /// Render as one `ls -l` line, or just the name when not long.
    pub fn to_line(&self) -> String {
        match &self.long {
            Some(l) => format!(
                "{} {:>2} {:<8} {:<8} {:>6} {} {}",
                l.permissions, l.link_count, l.owner, l.group, l.size, l.modified, self.name
            ),
            None => self.name.clone(),
        }
    }
}

/// Type filter for `find`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindType {
    File,
    Directory,
}

impl FindType {
    /// Parse a `-type` letter (`f` or `d`).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'f' => Some(FindType::File),
            'd' => Some(FindType::Directory),
            _ => None,
        }
    }

    pub fn matches(&self, kind: NodeKind) -> bool {
        matches!(
            (self, kind),
            (FindType::File, NodeKind::File) | (FindType::Directory, NodeKind::Directory)
        )
    }
}

/// Options for `find`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Glob matched against each entry's basename
    pub name: Option<String>,
    pub kind: Option<FindType>,
}

impl FindOptions {
    pub fn name(glob: impl Into<String>) -> Self {
        Self {
            name: Some(glob.into()),
            kind: None,
        }
    }

    pub fn kind(kind: FindType) -> Self {
        Self {
            name: None,
            kind: Some(kind),
        }
    }
}
