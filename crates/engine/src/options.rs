use std::path::PathBuf;

use log::debug;
use prepare_fs::FileRecord;
use prepare_runtime::process_cwd;
use serde_json::{Map, Value};

use crate::{
    error::{PrepareError, Result},
    option::{Opt, resolve_field},
    sourcemap::SourcemapTemplate,
};

/// How source maps were asked for, before coercion.
#[derive(Debug, Clone)]
pub enum SourcemapSetting {
    /// `true` enables maps with every setting at its default.
    Enabled(bool),
    /// Shorthand for a side-car directory.
    Path(String),
    Config(SourcemapTemplate),
    /// Any other shape. Treated as disabled rather than rejected.
    Unrecognized,
}

impl SourcemapSetting {
    /// Coerce into a template, or `None` when maps are off.
    pub fn into_template(self) -> Option<SourcemapTemplate> {
        match self {
            SourcemapSetting::Enabled(true) => Some(SourcemapTemplate::default()),
            SourcemapSetting::Enabled(false) => None,
            SourcemapSetting::Path(path) => Some(SourcemapTemplate::new().path(path.as_str())),
            SourcemapSetting::Config(template) => Some(template),
            SourcemapSetting::Unrecognized => {
                debug!("[options] unrecognized sourcemaps value, source maps disabled");
                None
            }
        }
    }
}

impl From<bool> for SourcemapSetting {
    fn from(value: bool) -> Self {
        SourcemapSetting::Enabled(value)
    }
}

impl From<&str> for SourcemapSetting {
    fn from(value: &str) -> Self {
        SourcemapSetting::Path(value.to_owned())
    }
}

impl From<SourcemapTemplate> for SourcemapSetting {
    fn from(value: SourcemapTemplate) -> Self {
        SourcemapSetting::Config(value)
    }
}

/// Loosely-typed settings, e.g. from a JSON config file. Booleans,
/// strings and objects are understood; anything else disables maps.
impl From<Value> for SourcemapSetting {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => SourcemapSetting::Enabled(b),
            Value::String(s) => SourcemapSetting::Path(s),
            Value::Object(fields) => SourcemapSetting::Config(template_from_json(&fields)),
            _ => SourcemapSetting::Unrecognized,
        }
    }
}

// Fields of the wrong type are skipped, matching the leniency above.
fn template_from_json(fields: &Map<String, Value>) -> SourcemapTemplate {
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_owned);
    let flag = |key: &str| fields.get(key).and_then(Value::as_bool);

    SourcemapTemplate {
        path: text("path").map(|s| Opt::literal(PathBuf::from(s))),
        include_content: flag("includeContent").map(Opt::literal),
        add_comment: flag("addComment").map(Opt::literal),
        source_root: text("sourceRoot").map(Opt::literal),
        map_file: text("mapFile").map(|s| Opt::literal(PathBuf::from(s))),
        dest_path: text("destPath").map(|s| Opt::literal(PathBuf::from(s))),
        source_mapping_url_prefix: text("sourceMappingURLPrefix").map(Opt::literal),
        source_mapping_url: text("sourceMappingURL").map(Opt::literal),
    }
}

/// Options of the write-preparation stage. Unset fields take their
/// defaults per file.
#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    /// Directory a relative output folder is resolved against.
    /// Defaults to the process working directory.
    pub cwd: Option<Opt<PathBuf>>,
    /// Defaults to the file's current mode.
    pub mode: Option<Opt<u32>>,
    /// Defaults to `true`.
    pub overwrite: Option<Opt<bool>>,
    /// Defaults to disabled.
    pub sourcemaps: Option<Opt<SourcemapSetting>>,
}

/// Options resolved for a single file.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    /// As configured; may still be relative.
    pub cwd: PathBuf,
    pub mode: Option<u32>,
    pub overwrite: bool,
    pub sourcemaps: Option<SourcemapTemplate>,
}

impl PrepareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cwd(mut self, cwd: impl Into<Opt<PathBuf>>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<Opt<u32>>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn overwrite(mut self, overwrite: impl Into<Opt<bool>>) -> Self {
        self.overwrite = Some(overwrite.into());
        self
    }

    pub fn sourcemaps(mut self, sourcemaps: impl Into<SourcemapSetting>) -> Self {
        self.sourcemaps = Some(Opt::Literal(sourcemaps.into()));
        self
    }

    pub fn sourcemaps_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&FileRecord) -> SourcemapSetting + Send + Sync + 'static,
    {
        self.sourcemaps = Some(Opt::with(f));
        self
    }

    /// Resolve every option for `file`.
    ///
    /// A value produced by the caller wins; otherwise the default applies.
    /// `default_mode` is the file's mode captured before any mutation.
    pub fn resolve(&self, file: &FileRecord, default_mode: Option<u32>) -> Result<ResolvedOptions> {
        let cwd = match resolve_field(self.cwd.as_ref(), file)
            .map_err(|e| PrepareError::option("cwd", e))?
        {
            Some(cwd) => cwd,
            None => process_cwd().map_err(PrepareError::CurrentDir)?,
        };

        let mode = resolve_field(self.mode.as_ref(), file)
            .map_err(|e| PrepareError::option("mode", e))?
            .or(default_mode);

        let overwrite = resolve_field(self.overwrite.as_ref(), file)
            .map_err(|e| PrepareError::option("overwrite", e))?
            .unwrap_or(true);

        let sourcemaps = resolve_field(self.sourcemaps.as_ref(), file)
            .map_err(|e| PrepareError::option("sourcemaps", e))?
            .and_then(SourcemapSetting::into_template);

        Ok(ResolvedOptions {
            cwd,
            mode,
            overwrite,
            sourcemaps,
        })
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;
