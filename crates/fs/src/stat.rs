use std::{fmt, fs::Metadata, time::SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filesystem metadata carried by a record.
///
/// The default value is the "empty" record attached to files that arrive
/// without any metadata: every field unset or zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Permission bits. `None` means "leave unspecified", which is not the
    /// same as mode `0`.
    pub mode: Option<u32>,
    /// Last modification time
    pub mtime: Option<DateTime<Utc>>,
    pub size: u64,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl Stat {
    /// Capture the parts of `metadata` a record carries.
    ///
    /// Pass `symlink_metadata` output to keep `is_symlink` meaningful;
    /// `metadata` follows links and always reports `false`.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Stat {
            mode: mode_bits(metadata),
            mtime: to_datetime(metadata.modified().ok()),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            is_dir: metadata.is_dir(),
            is_symlink: metadata.file_type().is_symlink(),
        }
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

// No portable permission bits outside unix; leave the mode unspecified.
#[cfg(not(unix))]
fn mode_bits(_metadata: &Metadata) -> Option<u32> {
    None
}

fn to_datetime(t: Option<SystemTime>) -> Option<DateTime<Utc>> {
    t.map(DateTime::<Utc>::from)
}

/// Write disposition later handed to the actual disk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteFlag {
    /// Create the file or truncate an existing one.
    #[serde(rename = "w")]
    Truncate,
    /// Create the file, failing if it already exists.
    #[serde(rename = "wx")]
    Exclusive,
}

impl WriteFlag {
    #[inline]
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            WriteFlag::Truncate
        } else {
            WriteFlag::Exclusive
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteFlag::Truncate => "w",
            WriteFlag::Exclusive => "wx",
        }
    }
}

impl fmt::Display for WriteFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "stat_tests.rs"]
mod tests;
