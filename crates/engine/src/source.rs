use std::time::SystemTime;

use chrono::{DateTime, Utc};
use log::debug;
use prepare_fs::{FileDescriptor, FileRecord};

use crate::{
    error::{PrepareError, Result},
    option::Opt,
    stream::{Emitted, Transform},
};

/// What a producer may hand to the source stage.
#[derive(Debug, Clone)]
pub enum SourceItem {
    /// Still needs wrapping into a [`FileRecord`].
    Descriptor(FileDescriptor),
    /// Already canonical; passes through as is.
    Record(FileRecord),
}

impl SourceItem {
    fn into_record(self) -> Result<FileRecord> {
        match self {
            SourceItem::Descriptor(desc) => {
                FileRecord::from_descriptor(desc).map_err(PrepareError::Descriptor)
            }
            SourceItem::Record(record) => Ok(record),
        }
    }
}

impl From<FileDescriptor> for SourceItem {
    fn from(desc: FileDescriptor) -> Self {
        SourceItem::Descriptor(desc)
    }
}

impl From<FileRecord> for SourceItem {
    fn from(record: FileRecord) -> Self {
        SourceItem::Record(record)
    }
}

/// Modification threshold. Files modified at or before it are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Since {
    At(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// RFC 3339 date-time, or milliseconds since the epoch as text.
    Text(String),
}

impl Since {
    /// The threshold as a point in time, or `None` if it does not denote one.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Since::At(at) => Some(*at),
            Since::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            Since::Text(text) => {
                let text = text.trim();
                if let Ok(at) = DateTime::parse_from_rfc3339(text) {
                    return Some(at.with_timezone(&Utc));
                }
                text.parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
            }
        }
    }
}

impl From<DateTime<Utc>> for Since {
    fn from(at: DateTime<Utc>) -> Self {
        Since::At(at)
    }
}

impl From<SystemTime> for Since {
    fn from(at: SystemTime) -> Self {
        Since::At(at.into())
    }
}

impl From<i64> for Since {
    fn from(ms: i64) -> Self {
        Since::Millis(ms)
    }
}

impl From<&str> for Since {
    fn from(text: &str) -> Self {
        Since::Text(text.to_owned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SrcOptions {
    pub since: Option<Opt<Since>>,
}

impl SrcOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, since: impl Into<Since>) -> Self {
        self.since = Some(Opt::Literal(since.into()));
        self
    }

    pub fn since_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&FileRecord) -> Since + Send + Sync + 'static,
    {
        self.since = Some(Opt::with(f));
        self
    }
}

/// Source-side normalization: wraps incoming items into records, applies
/// symlink overrides and drops files that have not changed since the
/// configured threshold.
#[derive(Debug, Clone, Default)]
pub struct Src {
    options: SrcOptions,
}

impl Src {
    pub fn new(options: SrcOptions) -> Self {
        Src { options }
    }

    /// The record to forward, or `None` when it is filtered out.
    pub fn normalize(&self, item: SourceItem) -> Result<Option<FileRecord>> {
        let mut file = item.into_record()?;
        file.apply_symlink_target();

        let Some(since) = &self.options.since else {
            return Ok(Some(file));
        };

        let threshold = since
            .resolve(&file)
            .map_err(|e| PrepareError::option("since", e))?
            .as_ref()
            .and_then(Since::to_datetime)
            .ok_or(PrepareError::InvalidSince)?;

        // Without an mtime staleness cannot be shown, so the file stays.
        let mtime = file.stat.as_ref().and_then(|s| s.mtime);
        match mtime {
            Some(mtime) if mtime <= threshold => {
                debug!(
                    "[src] skipping {}: modified {mtime}, not after {threshold}",
                    file.path.display()
                );
                Ok(None)
            }
            _ => Ok(Some(file)),
        }
    }
}

impl Transform for Src {
    type Input = SourceItem;

    fn transform(&self, item: SourceItem) -> Result<Emitted> {
        Ok(self.normalize(item)?.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
