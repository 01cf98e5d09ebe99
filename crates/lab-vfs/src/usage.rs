//! Disk usage accounting for `du`.

use serde::{Deserialize, Serialize};

/// Size of one `du` block in bytes.
pub const BLOCK_SIZE: u64 = 1024;

/// Disk usage of a subtree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUsage {
    /// Sum of file sizes; directories contribute nothing
    pub bytes: u64,

    /// Number of files
    pub file_count: u64,

    /// Number of directories, including the root of the walk
    pub directory_count: u64,
}

impl DiskUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the usage stats.
    pub fn add_file(&mut self, size: u64) {
        self.file_count += 1;
        self.bytes += size;
    }

    /// Add a directory to the usage stats.
    pub fn add_directory(&mut self) {
        self.directory_count += 1;
    }

    /// 1 KiB blocks, rounded up.
    pub fn blocks(&self) -> u64 {
        self.bytes.div_ceil(BLOCK_SIZE)
    }
}
