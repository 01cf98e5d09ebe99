//! Lab configuration.
//!
//! Names the host and the interactive account the seed image is built for.

use serde::{Deserialize, Serialize};

use crate::core::{Gid, Uid, VfsResult};

/// Default `PATH` of a fresh session.
pub const DEFAULT_PATH: &str = "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";

/// Settings for building a lab filesystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub hostname: String,
    /// Interactive account the session starts as
    pub username: String,
    pub uid: Uid,
    pub gid: Gid,
    pub shell: String,
    pub path: String,
    pub lang: String,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            hostname: String::from("lab-server"),
            username: String::from("student"),
            uid: 1000,
            gid: 1000,
            shell: String::from("/bin/bash"),
            path: String::from(DEFAULT_PATH),
            lang: String::from("en_US.UTF-8"),
        }
    }
}

impl LabConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> VfsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Home directory of the interactive account.
    pub fn home(&self) -> String {
        if self.uid == 0 {
            String::from("/root")
        } else {
            format!("/home/{}", self.username)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LabConfig::default();
        assert_eq!(config.username, "student");
        assert_eq!(config.home(), "/home/student");
    }

    #[test]
    fn test_partial_json() {
        let config = LabConfig::from_json(r#"{"username": "alice", "hostname": "web01"}"#).unwrap();
        assert_eq!(config.username, "alice");
        assert_eq!(config.hostname, "web01");
        assert_eq!(config.uid, 1000);
        assert_eq!(config.home(), "/home/alice");
    }

    #[test]
    fn test_root_home() {
        let config = LabConfig::from_json(r#"{"username": "root", "uid": 0, "gid": 0}"#).unwrap();
        assert_eq!(config.home(), "/root");
    }

    #[test]
    fn test_bad_json() {
        assert!(LabConfig::from_json("{not json").is_err());
    }
}
