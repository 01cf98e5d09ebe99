//! User and group records.
//!
//! The table is filled once when the filesystem is built. Operations only
//! read it; `chown` never creates entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::LabConfig;
use crate::core::{Gid, Uid};

/// A login account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: Uid,
    pub gid: Gid,
    pub name: String,
    pub home: String,
    pub shell: String,
    /// Supplementary group names
    pub groups: Vec<String>,
}

/// A group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub gid: Gid,
    pub name: String,
    /// Member user names
    pub members: Vec<String>,
}

impl Group {
    pub fn new(gid: Gid, name: &str, members: Vec<String>) -> Self {
        Self {
            gid,
            name: name.to_string(),
            members,
        }
    }
}

/// Lookup tables for users and groups, keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTable {
    users: BTreeMap<Uid, User>,
    groups: BTreeMap<Gid, Group>,
}

impl UserTable {
    /// Accounts of a stock server plus the interactive user from `config`.
    pub fn seeded(config: &LabConfig) -> Self {
        let mut table = Self::default();

        table.add_user(User {
            uid: 0,
            gid: 0,
            name: String::from("root"),
            home: String::from("/root"),
            shell: String::from("/bin/bash"),
            groups: vec![String::from("root")],
        });
        table.add_user(User {
            uid: 33,
            gid: 33,
            name: String::from("www-data"),
            home: String::from("/var/www"),
            shell: String::from("/usr/sbin/nologin"),
            groups: vec![String::from("www-data")],
        });
        table.add_user(User {
            uid: 65534,
            gid: 65534,
            name: String::from("nobody"),
            home: String::from("/nonexistent"),
            shell: String::from("/usr/sbin/nologin"),
            groups: vec![String::from("nogroup")],
        });

        let admins = vec![config.username.clone()];
        table.add_group(Group::new(0, "root", Vec::new()));
        table.add_group(Group::new(4, "adm", admins.clone()));
        table.add_group(Group::new(27, "sudo", admins));
        table.add_group(Group::new(33, "www-data", Vec::new()));
        table.add_group(Group::new(42, "shadow", Vec::new()));
        table.add_group(Group::new(65534, "nogroup", Vec::new()));

        if config.uid != 0 {
            table.add_user(User {
                uid: config.uid,
                gid: config.gid,
                name: config.username.clone(),
                home: config.home(),
                shell: config.shell.clone(),
                groups: vec![config.username.clone(), String::from("adm"), String::from("sudo")],
            });
            table.add_group(Group::new(config.gid, &config.username, Vec::new()));
        }

        table
    }

    /// Insert or replace a user.
    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.uid, user);
    }

    /// Insert or replace a group.
    pub fn add_group(&mut self, group: Group) {
        self.groups.insert(group.gid, group);
    }

    pub fn user_by_uid(&self, uid: Uid) -> Option<&User> {
        self.users.get(&uid)
    }

    pub fn user_by_name(&self, name: &str) -> Option<&User> {
        self.users.values().find(|u| u.name == name)
    }

    pub fn group_by_gid(&self, gid: Gid) -> Option<&Group> {
        self.groups.get(&gid)
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.values().find(|g| g.name == name)
    }

    /// User name for `uid`, or the number itself if unknown.
    pub fn user_name(&self, uid: Uid) -> String {
        self.user_by_uid(uid)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| uid.to_string())
    }

    /// Group name for `gid`, or the number itself if unknown.
    pub fn group_name(&self, gid: Gid) -> String {
        self.group_by_gid(gid)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| gid.to_string())
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// `/etc/passwd` contents, one line per user ordered by uid.
    pub fn passwd(&self) -> String {
        self.users
            .values()
            .map(|u| {
                format!(
                    "{}:x:{}:{}:{}:{}:{}\n",
                    u.name, u.uid, u.gid, u.name, u.home, u.shell
                )
            })
            .collect()
    }

    /// `/etc/group` contents, one line per group ordered by gid.
    pub fn group_file(&self) -> String {
        self.groups
            .values()
            .map(|g| format!("{}:x:{}:{}\n", g.name, g.gid, g.members.join(",")))
            .collect()
    }

    /// `/etc/shadow` contents with locked placeholder hashes.
    pub fn shadow(&self) -> String {
        self.users
            .values()
            .map(|u| {
                let hash = if u.uid == 0 || (1000..65534).contains(&u.uid) {
                    "$6$lab$"
                } else {
                    "*"
                };
                format!("{}:{}:19000:0:99999:7:::\n", u.name, hash)
            })
            .collect()
    }
}
