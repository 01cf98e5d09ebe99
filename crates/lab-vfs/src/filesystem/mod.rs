//! The lab filesystem engine.
//!
//! A [`Filesystem`] exclusively owns the root node; every other node is
//! reachable only by walking down from it by name. The working directory is
//! kept as a path string and re-resolved on use, so removing an ancestor of
//! the cwd never leaves a dangling reference.

mod ops;
mod query;
mod session;

use std::collections::BTreeMap;

use tracing::info;

use crate::bootstrap;
use crate::clock::{Clock, SystemClock};
use crate::config::LabConfig;
use crate::core::{path, FsNode, Gid, Permissions, Uid, VfsResult};
use crate::users::UserTable;

pub use ops::CreateOptions;
pub use query::format_list_date;
pub use session::SessionSnapshot;

/// Mode of directories created without an explicit one.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Mode of files created without an explicit one.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// In-memory Unix-like filesystem driving one simulated shell session.
pub struct Filesystem {
    root: FsNode,
    cwd: String,
    current_uid: Uid,
    env: BTreeMap<String, String>,
    users: UserTable,
    config: LabConfig,
    clock: Box<dyn Clock>,
}

impl Filesystem {
    /// Seeded filesystem with the default config and the wall clock.
    pub fn new() -> VfsResult<Self> {
        Self::with_config(LabConfig::default(), SystemClock)
    }

    /// Seeded filesystem for `config`, timestamped by `clock`.
    pub fn with_config(config: LabConfig, clock: impl Clock + 'static) -> VfsResult<Self> {
        let mut fs = Self::empty(config, clock);
        fs.rebuild()?;
        Ok(fs)
    }

    /// Filesystem holding only `/`, with the user table seeded.
    pub fn empty(config: LabConfig, clock: impl Clock + 'static) -> Self {
        let clock: Box<dyn Clock> = Box::new(clock);
        let now = clock.now_millis();
        let mut fs = Self {
            root: FsNode::new_directory(Permissions::decode(DEFAULT_DIR_MODE), 0, 0, now),
            cwd: String::from("/"),
            current_uid: config.uid,
            env: BTreeMap::new(),
            users: UserTable::seeded(&config),
            config,
            clock,
        };
        fs.env = fs.default_env();
        fs.set_env_var("PWD", "/");
        fs
    }

    /// Discard everything and build the seed image again.
    fn rebuild(&mut self) -> VfsResult<()> {
        let now = self.now();
        self.root = FsNode::new_directory(Permissions::decode(DEFAULT_DIR_MODE), 0, 0, now);
        self.users = UserTable::seeded(&self.config);
        self.current_uid = 0;

        bootstrap::seed(self)?;

        let home = self.config.home();
        self.current_uid = self.config.uid;
        self.env = self.default_env();
        self.cwd = if self.is_dir(&home) { home } else { String::from("/") };
        let cwd = self.cwd.clone();
        self.set_env_var("PWD", &cwd);

        info!(
            host = %self.config.hostname,
            user = %self.config.username,
            "lab filesystem seeded"
        );
        Ok(())
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn users(&self) -> &UserTable {
        &self.users
    }

    /// The root directory node.
    pub fn root(&self) -> &FsNode {
        &self.root
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Primary group of the effective user, or the uid if unknown.
    fn current_gid(&self) -> Gid {
        self.users
            .user_by_uid(self.current_uid)
            .map(|u| u.gid)
            .unwrap_or(self.current_uid)
    }

    /// Node at a path, resolved against the cwd.
    pub fn node(&self, path: &str) -> Option<&FsNode> {
        self.lookup(&self.resolve_path(path))
    }

    /// Node at a canonical absolute path.
    fn lookup(&self, abs: &str) -> Option<&FsNode> {
        let mut node = &self.root;
        for name in path::components(abs) {
            node = node.children()?.get(name)?;
        }
        Some(node)
    }

    fn lookup_mut(&mut self, abs: &str) -> Option<&mut FsNode> {
        let mut node = &mut self.root;
        for name in path::components(abs) {
            node = node.children_mut()?.get_mut(name)?;
        }
        Some(node)
    }

    /// Parent directory of `abs` (if it exists and is a directory) and the
    /// basename to create or remove in it.
    fn lookup_parent_mut(&mut self, abs: &str) -> (Option<&mut FsNode>, String) {
        let name = path::filename(abs).to_string();
        let parent = self
            .lookup_mut(&path::parent_path(abs))
            .filter(|node| node.is_directory());
        (parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn empty_fs() -> Filesystem {
        Filesystem::empty(LabConfig::default(), ManualClock::new(1000))
    }

    #[test]
    fn test_empty_has_only_root() {
        let fs = empty_fs();
        assert!(fs.root().is_directory());
        assert!(fs.root().children().unwrap().is_empty());
        assert_eq!(fs.cwd(), "/");
    }

    #[test]
    fn test_lookup_walks_directories_only() {
        let mut fs = empty_fs();
        fs.write_file("/a/file", "x").unwrap();
        assert!(fs.lookup("/a/file").is_some());
        assert!(fs.lookup("/a/file/below").is_none());
        assert!(fs.lookup("/missing/file").is_none());
    }

    #[test]
    fn test_lookup_parent() {
        let mut fs = empty_fs();
        fs.mkdir_p("/srv/app").unwrap();
        let (parent, name) = fs.lookup_parent_mut("/srv/app/config.yml");
        assert!(parent.is_some());
        assert_eq!(name, "config.yml");

        let (parent, _) = fs.lookup_parent_mut("/nope/config.yml");
        assert!(parent.is_none());
    }

    #[test]
    fn test_default_construction_is_seeded() {
        let fs = Filesystem::new().unwrap();
        assert!(fs.is_file("/etc/hostname"));
        assert!(fs.is_dir("/home/student"));
    }

    #[test]
    fn test_new_is_seeded() {
        let fs = Filesystem::with_config(LabConfig::default(), ManualClock::new(0)).unwrap();
        assert!(fs.is_dir("/etc"));
        assert_eq!(fs.cwd(), "/home/student");
        assert_eq!(fs.current_uid(), 1000);
    }
}
