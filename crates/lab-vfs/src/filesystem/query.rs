//! Read-side operations: read, ls, stat, find, du and existence probes.

use chrono::DateTime;
use regex::Regex;

use super::Filesystem;
use crate::core::{
    path, FindOptions, FsNode, ListEntry, ListOptions, LongFormat, NodeContent, Stat, VfsError,
    VfsResult,
};
use crate::glob;
use crate::usage::DiskUsage;

/// `ls -l` date column, e.g. `Mar  4 09:15`.
pub fn format_list_date(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%b %e %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

impl Filesystem {
    /// Read a file's bytes and bump its access time.
    pub fn read_file(&mut self, path: &str) -> VfsResult<Vec<u8>> {
        let abs = self.resolve_path(path);
        let now = self.now();

        let node = self
            .lookup_mut(&abs)
            .ok_or_else(|| VfsError::not_found(&abs))?;
        match &node.content {
            NodeContent::File(data) => {
                let data = data.clone();
                node.times.atime = now;
                Ok(data)
            }
            NodeContent::Directory(_) => Err(VfsError::IsADirectory(abs)),
            NodeContent::Symlink(_) => Err(VfsError::not_found(abs)),
        }
    }

    /// [`read_file`](Self::read_file) decoded as UTF-8, lossily.
    pub fn read_to_string(&mut self, path: &str) -> VfsResult<String> {
        let data = self.read_file(path)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    pub fn exists(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.node(path).is_some_and(|n| n.is_directory())
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.node(path).is_some_and(|n| n.is_file())
    }

    /// List a directory, or describe a single non-directory entry.
    ///
    /// Entries are sorted by name. Dot-entries are hidden unless `all` is
    /// set, in which case `.` and `..` are included as well.
    pub fn ls(&self, path: &str, opts: ListOptions) -> VfsResult<Vec<ListEntry>> {
        let abs = self.resolve_path(path);
        let node = self
            .lookup(&abs)
            .ok_or_else(|| VfsError::not_found(&abs))?;

        let children = match node.children() {
            Some(children) => children,
            None => {
                let name = if path.is_empty() { path::filename(&abs) } else { path };
                return Ok(vec![self.list_entry(name, node, opts.long)]);
            }
        };

        let mut entries: Vec<ListEntry> = children
            .iter()
            .filter(|(name, _)| opts.all || !name.starts_with('.'))
            .map(|(name, child)| self.list_entry(name, child, opts.long))
            .collect();

        if opts.all {
            let parent = self.lookup(&path::parent_path(&abs)).unwrap_or(node);
            entries.push(self.list_entry(".", node, opts.long));
            entries.push(self.list_entry("..", parent, opts.long));
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(entries)
    }

    fn list_entry(&self, name: &str, node: &FsNode, long: bool) -> ListEntry {
        let long = long.then(|| LongFormat {
            permissions: node.permissions.render(node.is_directory()),
            link_count: node.link_count(),
            owner: self.users.user_name(node.uid),
            group: self.users.group_name(node.gid),
            size: node.size(),
            modified: format_list_date(node.times.mtime),
        });
        ListEntry {
            name: name.to_string(),
            kind: node.kind(),
            size: node.size(),
            long,
        }
    }

    /// Metadata of a node, or `None` if absent.
    pub fn stat(&self, path: &str) -> Option<Stat> {
        let abs = self.resolve_path(path);
        let node = self.lookup(&abs)?;
        Some(Stat {
            kind: node.kind(),
            size: node.size(),
            permissions: node.permissions,
            mode: node.permissions.encode(),
            mode_octal: node.permissions.octal_string(),
            uid: node.uid,
            gid: node.gid,
            owner: self.users.user_name(node.uid),
            group: self.users.group_name(node.gid),
            link_count: node.link_count(),
            atime: node.times.atime,
            mtime: node.times.mtime,
            ctime: node.times.ctime,
            path: abs,
        })
    }

    /// Pre-order walk from `start`, returning matching absolute paths.
    ///
    /// A missing start yields an empty list. The name glob is matched
    /// against each entry's basename.
    pub fn find(&self, start: &str, opts: &FindOptions) -> VfsResult<Vec<String>> {
        let pattern = opts.name.as_deref().map(glob::compile).transpose()?;
        let abs = self.resolve_path(start);

        let mut found = Vec::new();
        if let Some(node) = self.lookup(&abs) {
            collect_matches(node, &abs, opts, pattern.as_ref(), &mut found);
        }
        Ok(found)
    }

    /// Total file bytes under `path`.
    pub fn du(&self, path: &str) -> VfsResult<DiskUsage> {
        let abs = self.resolve_path(path);
        let node = self
            .lookup(&abs)
            .ok_or_else(|| VfsError::not_found(&abs))?;

        let mut usage = DiskUsage::new();
        accumulate_usage(node, &mut usage);
        Ok(usage)
    }
}

fn collect_matches(
    node: &FsNode,
    node_path: &str,
    opts: &FindOptions,
    pattern: Option<&Regex>,
    found: &mut Vec<String>,
) {
    let kind_ok = opts.kind.map_or(true, |k| k.matches(node.kind()));
    let name_ok = pattern.map_or(true, |re| re.is_match(path::filename(node_path)));
    if kind_ok && name_ok {
        found.push(node_path.to_string());
    }

    if let Some(children) = node.children() {
        for (name, child) in children {
            collect_matches(child, &path::join_path(node_path, name), opts, pattern, found);
        }
    }
}

fn accumulate_usage(node: &FsNode, usage: &mut DiskUsage) {
    match &node.content {
        NodeContent::File(data) => usage.add_file(data.len() as u64),
        NodeContent::Directory(children) => {
            usage.add_directory();
            for child in children.values() {
                accumulate_usage(child, usage);
            }
        }
        NodeContent::Symlink(_) => {}
    }
}
