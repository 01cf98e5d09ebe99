//! Mutating operations: create, write, remove, copy, move, chmod, chown.

use tracing::{debug, warn};

use super::{Filesystem, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::core::{
    path, FsNode, Gid, IntoMode, NodeContent, Permissions, Timestamps, Uid, VfsError, VfsResult,
};

/// Mode and ownership for newly created nodes. Unset fields fall back to
/// the default mode and the effective user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub mode: Option<u32>,
    pub uid: Option<Uid>,
    pub gid: Option<Gid>,
}

impl CreateOptions {
    pub fn mode(mode: u32) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, uid: Uid, gid: Gid) -> Self {
        self.uid = Some(uid);
        self.gid = Some(gid);
        self
    }
}

impl Filesystem {
    fn owner_for(&self, opts: &CreateOptions) -> (Uid, Gid) {
        (
            opts.uid.unwrap_or(self.current_uid),
            opts.gid.unwrap_or_else(|| self.current_gid()),
        )
    }

    // ========== Directory Operations ==========

    /// Create a single directory. The parent must already exist.
    pub fn mkdir(&mut self, path: &str, mode: impl IntoMode) -> VfsResult<()> {
        let perms = mode.into_mode()?;
        let abs = self.resolve_path(path);
        let (uid, gid) = (self.current_uid, self.current_gid());
        let now = self.now();

        let (parent, name) = self.lookup_parent_mut(&abs);
        if name.is_empty() {
            return Err(VfsError::AlreadyExists(abs));
        }
        let children = parent
            .and_then(|p| p.children_mut())
            .ok_or_else(|| VfsError::not_found(&abs))?;
        if children.contains_key(&name) {
            return Err(VfsError::AlreadyExists(abs));
        }
        children.insert(name, FsNode::new_directory(perms, uid, gid, now));

        debug!(path = %abs, uid, "mkdir");
        Ok(())
    }

    /// Create a directory and any missing parents with the default mode.
    pub fn mkdir_p(&mut self, path: &str) -> VfsResult<()> {
        self.mkdir_p_with(path, &CreateOptions::default())
    }

    /// Create a directory and any missing parents. Existing directories
    /// along the way are left untouched.
    pub fn mkdir_p_with(&mut self, path: &str, opts: &CreateOptions) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        let perms = Permissions::decode(opts.mode.unwrap_or(DEFAULT_DIR_MODE));
        let (uid, gid) = self.owner_for(opts);
        let now = self.now();

        let mut node = &mut self.root;
        let mut walked = String::from("/");
        for name in path::components(&abs) {
            let children = match node.children_mut() {
                Some(children) => children,
                None => return Err(VfsError::NotADirectory(walked)),
            };
            node = children
                .entry(name.to_string())
                .or_insert_with(|| FsNode::new_directory(perms, uid, gid, now));
            walked = path::join_path(&walked, name);
        }

        if !node.is_directory() {
            return Err(VfsError::NotADirectory(walked));
        }
        debug!(path = %abs, uid, "mkdir -p");
        Ok(())
    }

    // ========== File Operations ==========

    /// Create or replace a file, creating missing parent directories.
    pub fn write_file(&mut self, path: &str, content: impl AsRef<[u8]>) -> VfsResult<()> {
        self.write_file_with(path, content, &CreateOptions::default())
    }

    /// Create or replace a file with explicit mode/ownership.
    ///
    /// Replacing an existing file keeps its mode and owner unless `opts`
    /// overrides them.
    pub fn write_file_with(
        &mut self,
        path: &str,
        content: impl AsRef<[u8]>,
        opts: &CreateOptions,
    ) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        if abs == "/" {
            return Err(VfsError::IsADirectory(abs));
        }

        let parent_opts = CreateOptions {
            mode: None,
            ..*opts
        };
        self.mkdir_p_with(&path::parent_path(&abs), &parent_opts)?;

        let (uid, gid) = self.owner_for(opts);
        let now = self.now();
        let data = content.as_ref().to_vec();

        let (parent, name) = self.lookup_parent_mut(&abs);
        let children = parent
            .and_then(|p| p.children_mut())
            .ok_or_else(|| VfsError::not_found(&abs))?;

        match children.get_mut(&name) {
            Some(existing) if existing.is_directory() => {
                return Err(VfsError::IsADirectory(abs));
            }
            Some(existing) => {
                existing.content = NodeContent::File(data);
                existing.times.mtime = now;
                existing.times.ctime = now;
                if let Some(mode) = opts.mode {
                    existing.permissions = Permissions::decode(mode);
                }
                if let Some(uid) = opts.uid {
                    existing.uid = uid;
                }
                if let Some(gid) = opts.gid {
                    existing.gid = gid;
                }
            }
            None => {
                let perms = Permissions::decode(opts.mode.unwrap_or(DEFAULT_FILE_MODE));
                children.insert(name, FsNode::new_file(data, perms, uid, gid, now));
            }
        }

        debug!(path = %abs, uid, "write");
        Ok(())
    }

    /// Append to a file, creating it if absent.
    pub fn append_file(&mut self, path: &str, content: impl AsRef<[u8]>) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        let now = self.now();

        match self.lookup_mut(&abs) {
            None => self.write_file(&abs, content),
            Some(node) => match &mut node.content {
                NodeContent::File(data) => {
                    data.extend_from_slice(content.as_ref());
                    node.times.mtime = now;
                    node.times.ctime = now;
                    debug!(path = %abs, "append");
                    Ok(())
                }
                NodeContent::Directory(_) => Err(VfsError::IsADirectory(abs)),
                NodeContent::Symlink(_) => Err(VfsError::not_found(abs)),
            },
        }
    }

    /// Create an empty file, or refresh the timestamps of an existing node.
    pub fn touch(&mut self, path: &str) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        let now = self.now();

        if let Some(node) = self.lookup_mut(&abs) {
            node.times = Timestamps::at(now);
            return Ok(());
        }

        let (uid, gid) = (self.current_uid, self.current_gid());
        let (parent, name) = self.lookup_parent_mut(&abs);
        let children = parent
            .and_then(|p| p.children_mut())
            .ok_or_else(|| VfsError::not_found(&abs))?;
        children.insert(
            name,
            FsNode::new_file(Vec::new(), Permissions::decode(DEFAULT_FILE_MODE), uid, gid, now),
        );
        debug!(path = %abs, uid, "touch");
        Ok(())
    }

    /// Remove an entry. Populated directories need `recursive`.
    pub fn rm(&mut self, path: &str, recursive: bool) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        if abs == "/" {
            return Err(VfsError::permission_denied(abs));
        }

        let (parent, name) = self.lookup_parent_mut(&abs);
        let children = parent
            .and_then(|p| p.children_mut())
            .ok_or_else(|| VfsError::not_found(&abs))?;

        let populated = match children.get(&name) {
            None => return Err(VfsError::not_found(abs)),
            Some(node) => node.children().is_some_and(|c| !c.is_empty()),
        };
        if populated && !recursive {
            return Err(VfsError::DirectoryNotEmpty(abs));
        }
        children.remove(&name);

        debug!(path = %abs, recursive, "rm");
        Ok(())
    }

    /// Copy a file. If `dst` is an existing directory the copy lands inside
    /// it under the source's name. Returns the destination path.
    pub fn cp(&mut self, src: &str, dst: &str) -> VfsResult<String> {
        let src_abs = self.resolve_path(src);
        let source = self
            .lookup(&src_abs)
            .ok_or_else(|| VfsError::not_found(&src_abs))?;
        if source.is_directory() {
            return Err(VfsError::IsADirectory(src_abs));
        }

        let now = self.now();
        let mut copy = source.clone();
        copy.times.mtime = now;
        copy.times.ctime = now;

        let mut dst_abs = self.resolve_path(dst);
        if self.is_dir(&dst_abs) {
            dst_abs = path::join_path(&dst_abs, path::filename(&src_abs));
        }
        if dst_abs == src_abs {
            return Ok(dst_abs);
        }

        let (parent, name) = self.lookup_parent_mut(&dst_abs);
        let children = parent
            .and_then(|p| p.children_mut())
            .ok_or_else(|| VfsError::not_found(&dst_abs))?;
        if children.get(&name).is_some_and(|n| n.is_directory()) {
            return Err(VfsError::IsADirectory(dst_abs));
        }
        children.insert(name, copy);

        debug!(from = %src_abs, to = %dst_abs, "cp");
        Ok(dst_abs)
    }

    /// Move a file: a copy followed by removal of the source.
    ///
    /// Not atomic. If the copy fails nothing changes; if the removal fails
    /// the copy stays in place.
    pub fn mv(&mut self, src: &str, dst: &str) -> VfsResult<String> {
        let src_abs = self.resolve_path(src);
        let dst_abs = self.cp(&src_abs, dst)?;
        if dst_abs != src_abs {
            self.rm(&src_abs, false)?;
        }
        Ok(dst_abs)
    }

    // ========== Metadata Operations ==========

    /// Replace the permission bits of a node.
    pub fn chmod(&mut self, path: &str, mode: impl IntoMode) -> VfsResult<()> {
        let perms = mode.into_mode()?;
        let abs = self.resolve_path(path);
        let now = self.now();

        let node = self
            .lookup_mut(&abs)
            .ok_or_else(|| VfsError::not_found(&abs))?;
        node.permissions = perms;
        node.times.ctime = now;

        debug!(path = %abs, mode = %perms.octal_string(), "chmod");
        Ok(())
    }

    /// Change owner and/or group by name. Root only.
    ///
    /// A name that matches no user or group leaves that field unchanged.
    pub fn chown(&mut self, path: &str, owner: Option<&str>, group: Option<&str>) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        if self.current_uid != 0 {
            warn!(path = %abs, uid = self.current_uid, "chown refused for non-root user");
            return Err(VfsError::permission_denied(abs));
        }

        let uid = owner.and_then(|name| self.users.user_by_name(name)).map(|u| u.uid);
        let gid = group.and_then(|name| self.users.group_by_name(name)).map(|g| g.gid);
        let now = self.now();

        let node = self
            .lookup_mut(&abs)
            .ok_or_else(|| VfsError::not_found(&abs))?;
        if let Some(uid) = uid {
            node.uid = uid;
        }
        if let Some(gid) = gid {
            node.gid = gid;
        }
        node.times.ctime = now;

        debug!(path = %abs, ?uid, ?gid, "chown");
        Ok(())
    }

    /// Set uid/gid on a node and everything below it, bypassing the root
    /// check. Used when building the seed image.
    pub(crate) fn set_owner_recursive(&mut self, path: &str, uid: Uid, gid: Gid) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        let node = self
            .lookup_mut(&abs)
            .ok_or_else(|| VfsError::not_found(&abs))?;
        node.for_each_mut(&mut |n| {
            n.uid = uid;
            n.gid = gid;
        });
        Ok(())
    }
}
