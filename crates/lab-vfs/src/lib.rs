//! Terminal Lab Virtual Filesystem
//!
//! An in-memory Unix-like filesystem that backs a simulated shell session.
//! Nothing touches a real disk; the whole tree lives inside one
//! [`Filesystem`] value owned by the session.
//!
//! - **Core**: node model, octal permission codec, path resolution, errors
//! - **Filesystem**: the operation surface (mkdir, write, rm, cp, mv, ls,
//!   stat, chmod, chown, find, du) plus cwd, environment and prompt
//! - **Bootstrap**: the seeded server image every lesson starts from
//! - **Users**: user and group lookup tables
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Shell / command layer                       │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ calls
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Filesystem                             │
//! │  • cwd (path string)    • effective uid    • environment      │
//! │  • ops: mkdir/write/rm/cp/mv/chmod/chown                      │
//! │  • queries: ls/stat/find/du/exists                            │
//! │                                                               │
//! │        path::resolve ──► walk from root ──► FsNode            │
//! │                                             ├── File(bytes)   │
//! │                                             └── Directory(map)│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use lab_vfs::{Filesystem, ListOptions};
//!
//! let mut fs = Filesystem::new().unwrap();
//! fs.write_file("~/hello.txt", "hello").unwrap();
//! fs.append_file("~/hello.txt", " world").unwrap();
//! assert_eq!(fs.read_to_string("~/hello.txt").unwrap(), "hello world");
//!
//! let names: Vec<String> = fs
//!     .ls("~", ListOptions::default())
//!     .unwrap()
//!     .into_iter()
//!     .map(|e| e.name)
//!     .collect();
//! assert!(names.contains(&String::from("hello.txt")));
//! ```

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod core;
pub mod filesystem;
pub mod glob;
pub mod usage;
pub mod users;

// Convenient re-exports at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LabConfig;
pub use crate::core::path::resolve;
pub use crate::core::{
    Access, ErrorKind, FindOptions, FindType, FsNode, IntoMode, ListEntry, ListOptions, LongFormat,
    NodeContent, NodeKind, Permissions, Stat, Timestamps, VfsError, VfsResult,
};
pub use filesystem::{CreateOptions, Filesystem, SessionSnapshot};
pub use usage::DiskUsage;
pub use users::{Group, User, UserTable};
