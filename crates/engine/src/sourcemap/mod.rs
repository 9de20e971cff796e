use std::path::PathBuf;

use prepare_fs::FileRecord;

use crate::{
    error::{PrepareError, Result},
    option::{Opt, resolve_field},
    stream::Emitted,
};

mod writer;

pub use writer::FileSourcemapWriter;

/// Source map settings as configured, each field fixed or per file.
#[derive(Debug, Clone, Default)]
pub struct SourcemapTemplate {
    /// Directory for side-car maps, relative to the file's base. Absent
    /// means the map is inlined into the file.
    pub path: Option<Opt<PathBuf>>,
    pub include_content: Option<Opt<bool>>,
    pub add_comment: Option<Opt<bool>>,
    pub source_root: Option<Opt<String>>,
    /// Side-car file name, relative to `path`. Defaults to the file's
    /// relative path plus `.map`.
    pub map_file: Option<Opt<PathBuf>>,
    /// Root that `path` is resolved against instead of the file's base.
    pub dest_path: Option<Opt<PathBuf>>,
    pub source_mapping_url_prefix: Option<Opt<String>>,
    /// Replaces the computed URL in the comment verbatim.
    pub source_mapping_url: Option<Opt<String>>,
}

/// Source map settings resolved for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcemapConfig {
    pub path: Option<PathBuf>,
    pub include_content: Option<bool>,
    pub add_comment: Option<bool>,
    pub source_root: Option<String>,
    pub map_file: Option<PathBuf>,
    pub dest_path: Option<PathBuf>,
    pub source_mapping_url_prefix: Option<String>,
    pub source_mapping_url: Option<String>,
}

impl SourcemapTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<Opt<PathBuf>>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn include_content(mut self, include: impl Into<Opt<bool>>) -> Self {
        self.include_content = Some(include.into());
        self
    }

    pub fn add_comment(mut self, add: impl Into<Opt<bool>>) -> Self {
        self.add_comment = Some(add.into());
        self
    }

    pub fn source_root(mut self, root: impl Into<Opt<String>>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    pub fn map_file(mut self, name: impl Into<Opt<PathBuf>>) -> Self {
        self.map_file = Some(name.into());
        self
    }

    pub fn dest_path(mut self, dest: impl Into<Opt<PathBuf>>) -> Self {
        self.dest_path = Some(dest.into());
        self
    }

    pub fn source_mapping_url_prefix(mut self, prefix: impl Into<Opt<String>>) -> Self {
        self.source_mapping_url_prefix = Some(prefix.into());
        self
    }

    pub fn source_mapping_url(mut self, url: impl Into<Opt<String>>) -> Self {
        self.source_mapping_url = Some(url.into());
        self
    }

    /// Resolve every field against `file`.
    pub fn resolve(&self, file: &FileRecord) -> Result<SourcemapConfig> {
        fn field<T: Clone>(
            name: &'static str,
            opt: Option<&Opt<T>>,
            file: &FileRecord,
        ) -> Result<Option<T>> {
            resolve_field(opt, file).map_err(|e| PrepareError::option(name, e))
        }

        Ok(SourcemapConfig {
            path: field("sourcemaps.path", self.path.as_ref(), file)?,
            include_content: field(
                "sourcemaps.includeContent",
                self.include_content.as_ref(),
                file,
            )?,
            add_comment: field("sourcemaps.addComment", self.add_comment.as_ref(), file)?,
            source_root: field("sourcemaps.sourceRoot", self.source_root.as_ref(), file)?,
            map_file: field("sourcemaps.mapFile", self.map_file.as_ref(), file)?,
            dest_path: field("sourcemaps.destPath", self.dest_path.as_ref(), file)?,
            source_mapping_url_prefix: field(
                "sourcemaps.sourceMappingURLPrefix",
                self.source_mapping_url_prefix.as_ref(),
                file,
            )?,
            source_mapping_url: field(
                "sourcemaps.sourceMappingURL",
                self.source_mapping_url.as_ref(),
                file,
            )?,
        })
    }
}

/// Writes a file's source map, inline or as a side-car record.
///
/// Returns the records to emit in place of `file`: the file itself and,
/// when a side-car map was produced, the map record after it.
pub trait SourcemapWriter: Send + Sync {
    fn write(&self, file: FileRecord, config: &SourcemapConfig) -> anyhow::Result<Emitted>;
}

impl<F> SourcemapWriter for F
where
    F: Fn(FileRecord, &SourcemapConfig) -> anyhow::Result<Emitted> + Send + Sync,
{
    fn write(&self, file: FileRecord, config: &SourcemapConfig) -> anyhow::Result<Emitted> {
        self(file, config)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
