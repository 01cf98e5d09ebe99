//! Octal mode codec.
//!
//! Converts between the numeric mode (`0o644`) and the structured
//! owner/group/other triples, and renders `ls -l` style strings.

use serde::{Deserialize, Serialize};

use super::error::{VfsError, VfsResult};

/// Mask for the nine rwx bits.
pub const PERMISSION_BITS: u32 = 0o777;

/// Mask for setuid, setgid and sticky.
pub const SPECIAL_BITS: u32 = 0o7000;

/// Read/write/execute flags for one class of user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Access {
    fn from_bits(bits: u32) -> Self {
        Self {
            read: bits & 0o4 != 0,
            write: bits & 0o2 != 0,
            execute: bits & 0o1 != 0,
        }
    }

    fn bits(&self) -> u32 {
        (self.read as u32) << 2 | (self.write as u32) << 1 | self.execute as u32
    }

    fn push_rwx(&self, out: &mut String) {
        out.push(if self.read { 'r' } else { '-' });
        out.push(if self.write { 'w' } else { '-' });
        out.push(if self.execute { 'x' } else { '-' });
    }
}

/// Unix permission bits of a node.
///
/// The setuid/setgid/sticky bits are kept as-is so a mode like `01777`
/// survives a decode/encode cycle, but they are not rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    pub owner: Access,
    pub group: Access,
    pub other: Access,
    special: u32,
}

impl Permissions {
    /// Decode a numeric mode. Bits above `0o7777` are ignored.
    pub fn decode(mode: u32) -> Self {
        Self {
            owner: Access::from_bits(mode >> 6 & 0o7),
            group: Access::from_bits(mode >> 3 & 0o7),
            other: Access::from_bits(mode & 0o7),
            special: mode & SPECIAL_BITS,
        }
    }

    /// Parse an octal string such as `"755"` or `"0640"`.
    pub fn parse(text: &str) -> VfsResult<Self> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
        match u32::from_str_radix(digits, 8) {
            Ok(mode) if !digits.is_empty() && mode <= 0o7777 => Ok(Self::decode(mode)),
            _ => Err(VfsError::InvalidMode(text.to_string())),
        }
    }

    /// Numeric mode, including any special bits.
    pub fn encode(&self) -> u32 {
        self.special | self.owner.bits() << 6 | self.group.bits() << 3 | self.other.bits()
    }

    /// The setuid/setgid/sticky bits carried by this mode.
    pub fn special_bits(&self) -> u32 {
        self.special
    }

    /// Mode as a zero-padded octal string, e.g. `0644` or `1777`.
    pub fn octal_string(&self) -> String {
        format!("{:04o}", self.encode())
    }

    /// Ten-character `ls -l` string, e.g. `drwxr-xr-x`.
    pub fn render(&self, is_directory: bool) -> String {
        let mut out = String::with_capacity(10);
        out.push(if is_directory { 'd' } else { '-' });
        self.owner.push_rwx(&mut out);
        self.group.push_rwx(&mut out);
        self.other.push_rwx(&mut out);
        out
    }
}

impl From<u32> for Permissions {
    fn from(mode: u32) -> Self {
        Self::decode(mode)
    }
}

/// Anything that can be turned into a mode: a number or octal text.
pub trait IntoMode {
    fn into_mode(self) -> VfsResult<Permissions>;
}

impl IntoMode for u32 {
    fn into_mode(self) -> VfsResult<Permissions> {
        if self > 0o7777 {
            return Err(VfsError::InvalidMode(format!("{:o}", self)));
        }
        Ok(Permissions::decode(self))
    }
}

impl IntoMode for &str {
    fn into_mode(self) -> VfsResult<Permissions> {
        Permissions::parse(self)
    }
}

impl IntoMode for Permissions {
    fn into_mode(self) -> VfsResult<Permissions> {
        Ok(self)
    }
}
