//! Session state: working directory, effective user, environment, prompt,
//! snapshots and lesson resets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Filesystem;
use crate::core::{path, Uid, VfsError, VfsResult};

/// Serializable view of the session, without the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub cwd: String,
    pub current_uid: Uid,
    pub env: BTreeMap<String, String>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> VfsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> VfsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Filesystem {
    /// Environment of a fresh login for the configured user.
    pub(super) fn default_env(&self) -> BTreeMap<String, String> {
        let config = &self.config;
        let home = config.home();
        let mut env = BTreeMap::new();
        env.insert(String::from("HOME"), home.clone());
        env.insert(String::from("USER"), config.username.clone());
        env.insert(String::from("PATH"), config.path.clone());
        env.insert(String::from("PWD"), home);
        env.insert(String::from("HOSTNAME"), config.hostname.clone());
        env.insert(String::from("SHELL"), config.shell.clone());
        env.insert(String::from("PS1"), String::from("\\u@\\h:\\w\\$ "));
        env.insert(String::from("LANG"), config.lang.clone());
        env
    }

    /// Resolve a path against the cwd and `$HOME`.
    pub fn resolve_path(&self, path: &str) -> String {
        path::resolve(path, &self.cwd, self.home())
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// `$HOME`, or `/` if unset.
    pub fn home(&self) -> &str {
        self.env.get("HOME").map(String::as_str).unwrap_or("/")
    }

    /// Change the working directory.
    pub fn chdir(&mut self, path: &str) -> VfsResult<()> {
        let abs = self.resolve_path(path);
        match self.lookup(&abs) {
            None => return Err(VfsError::not_found(abs)),
            Some(node) if !node.is_directory() => return Err(VfsError::NotADirectory(abs)),
            Some(_) => {}
        }
        debug!(cwd = %abs, "chdir");
        self.set_env_var("PWD", &abs);
        self.cwd = abs;
        Ok(())
    }

    pub fn current_uid(&self) -> Uid {
        self.current_uid
    }

    /// Set the effective uid without touching the environment.
    pub fn set_current_uid(&mut self, uid: Uid) {
        self.current_uid = uid;
    }

    /// Become another known user, as `su - <name>` would.
    pub fn switch_user(&mut self, name: &str) -> VfsResult<()> {
        let user = self
            .users
            .user_by_name(name)
            .cloned()
            .ok_or_else(|| VfsError::UnknownUser(name.to_string()))?;

        self.current_uid = user.uid;
        self.set_env_var("USER", &user.name);
        self.set_env_var("HOME", &user.home);
        self.cwd = if self.is_dir(&user.home) {
            user.home
        } else {
            String::from("/")
        };
        let cwd = self.cwd.clone();
        self.set_env_var("PWD", &cwd);

        info!(user = name, uid = self.current_uid, "switched user");
        Ok(())
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    pub fn set_env_var(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    /// Shell prompt, e.g. `student@lab-server:~/www$ `.
    pub fn prompt(&self) -> String {
        let user = self.users.user_name(self.current_uid);
        let host = self.env_var("HOSTNAME").unwrap_or(self.config.hostname.as_str());
        let cwd = path::abbreviate_home(&self.cwd, self.home());
        format!("{}@{}:{}$ ", user, host, cwd)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cwd: self.cwd.clone(),
            current_uid: self.current_uid,
            env: self.env.clone(),
        }
    }

    /// The session snapshot as JSON. The tree is not included.
    pub fn to_json(&self) -> VfsResult<String> {
        self.snapshot().to_json()
    }

    /// Apply a snapshot's cwd, uid and environment.
    pub fn restore_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.cwd = path::normalize(&snapshot.cwd);
        self.current_uid = snapshot.current_uid;
        self.env = snapshot.env;
    }

    /// Rebuild the seed image, then let `setup` customize it.
    pub fn reset_to_lesson<F>(&mut self, setup: F) -> VfsResult<()>
    where
        F: FnOnce(&mut Filesystem) -> VfsResult<()>,
    {
        info!("resetting lab filesystem");
        self.rebuild()?;
        setup(self)
    }

    /// Rebuild the seed image with no lesson customization.
    pub fn reset(&mut self) -> VfsResult<()> {
        self.reset_to_lesson(|_| Ok(()))
    }
}
