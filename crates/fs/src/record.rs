use std::{
    io,
    path::{Path, PathBuf},
};

use prepare_runtime::process_cwd;
use serde::{Deserialize, Serialize};

use crate::{
    path::{absolutize, normalize, relative},
    stat::{Stat, WriteFlag},
};

/// Raw description of a file as handed over by whatever produced it
/// (a glob, a directory walk, a test). Only `path` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    #[serde(default)]
    pub base: Option<PathBuf>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub stat: Option<Stat>,
    #[serde(default, skip_serializing)]
    pub contents: Option<Vec<u8>>,
    #[serde(default)]
    pub source_map: Option<serde_json::Value>,
    /// Logical location of a symlink when it differs from the resolved
    /// `path`.
    #[serde(default)]
    pub symlink_target: Option<PathBuf>,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDescriptor {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Canonical in-memory file flowing through a pipeline stage.
///
/// `path`, `base` and `cwd` are absolute. Stages take records by value and
/// hand them back, so whoever holds a record may mutate it freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub cwd: PathBuf,
    pub base: PathBuf,
    pub path: PathBuf,
    pub stat: Option<Stat>,
    /// Set by the write-preparation stage; absent before it.
    pub flag: Option<WriteFlag>,
    #[serde(default, skip_serializing)]
    pub contents: Option<Vec<u8>>,
    pub source_map: Option<serde_json::Value>,
    pub symlink_target: Option<PathBuf>,
}

impl FileRecord {
    /// Record rooted at `base`, with `cwd` equal to `base`.
    pub fn new(base: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        let base = base.into();
        FileRecord {
            cwd: base.clone(),
            base,
            path: path.into(),
            stat: None,
            flag: None,
            contents: None,
            source_map: None,
            symlink_target: None,
        }
    }

    /// Wrap a raw descriptor into canonical form.
    ///
    /// `cwd` falls back to the process working directory and `base` to
    /// `cwd`. Every path comes out normalized and absolute.
    pub fn from_descriptor(desc: FileDescriptor) -> io::Result<Self> {
        let cwd = match desc.cwd {
            Some(cwd) if cwd.is_absolute() => normalize(&cwd),
            Some(cwd) => absolutize(&cwd, &process_cwd()?),
            None => process_cwd()?,
        };
        let base = match desc.base {
            Some(base) => absolutize(&base, &cwd),
            None => cwd.clone(),
        };
        let path = absolutize(&desc.path, &cwd);
        let symlink_target = desc.symlink_target.map(|t| absolutize(&t, &cwd));

        Ok(FileRecord {
            cwd,
            base,
            path,
            stat: desc.stat,
            flag: None,
            contents: desc.contents,
            source_map: desc.source_map,
            symlink_target,
        })
    }

    pub fn with_stat(mut self, stat: Stat) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.stat.get_or_insert_with(Stat::default).mode = Some(mode);
        self
    }

    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn with_source_map(mut self, map: serde_json::Value) -> Self {
        self.source_map = Some(map);
        self
    }

    pub fn with_symlink_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.symlink_target = Some(target.into());
        self
    }

    /// `path` relative to `base`. Not guarded: a path outside `base`
    /// yields a `..`-prefixed result.
    #[inline]
    pub fn relative(&self) -> PathBuf {
        relative(&self.base, &self.path)
    }

    pub fn dirname(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    /// Lowercase extension without the dot, e.g. `js`.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|os| os.to_str())
            .map(|s| s.to_ascii_lowercase())
    }

    pub fn mode(&self) -> Option<u32> {
        self.stat.as_ref().and_then(|s| s.mode)
    }

    /// Replace `path` with the symlink override, if one is present. A
    /// relative override is taken against `cwd`, so `path` stays absolute.
    /// Returns whether anything changed.
    pub fn apply_symlink_target(&mut self) -> bool {
        match self.symlink_target.take() {
            Some(target) => {
                self.path = absolutize(&target, &self.cwd);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
