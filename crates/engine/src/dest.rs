//! Write preparation: decides where each file lands and how it is written.
//!
//! For every record the stage resolves the output options, re-roots the
//! record's path from its current base onto the output folder, stamps the
//! write metadata, and hands files that want source maps to a
//! [`SourcemapWriter`].

use std::{path::PathBuf, sync::Arc};

use log::debug;
use prepare_fs::{
    FileRecord, Stat, WriteFlag,
    path::{absolutize, normalize, resolve, with_trailing_separator},
};
use prepare_runtime::process_cwd;
use smallvec::smallvec;

use crate::{
    error::{PrepareError, Result},
    option::Opt,
    options::{PrepareOptions, ResolvedOptions},
    sourcemap::{FileSourcemapWriter, SourcemapWriter},
    stream::{Emitted, Transform},
};

pub struct Dest {
    out_folder: Opt<PathBuf>,
    options: PrepareOptions,
    writer: Arc<dyn SourcemapWriter>,
}

impl Dest {
    /// Prepare files for writing under `out_folder`, resolved per file
    /// against the `cwd` option.
    ///
    /// A literal empty folder is rejected here. A computed folder that comes
    /// out empty fails only the file it was computed for.
    pub fn new(out_folder: impl Into<Opt<PathBuf>>, options: PrepareOptions) -> Result<Self> {
        let out_folder = out_folder.into();
        if matches!(&out_folder, Opt::Literal(folder) if folder.as_os_str().is_empty()) {
            return Err(PrepareError::InvalidOutputFolder);
        }

        Ok(Dest {
            out_folder,
            options,
            writer: Arc::new(FileSourcemapWriter),
        })
    }

    pub fn with_writer(mut self, writer: Arc<dyn SourcemapWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Re-root `file` under the output folder and stamp its write metadata.
    ///
    /// Source maps are not touched here; the resolved options say whether
    /// they are wanted.
    pub fn prepare(&self, mut file: FileRecord) -> Result<(FileRecord, ResolvedOptions)> {
        let default_mode = file.mode();
        let options = self.options.resolve(&file, default_mode)?;
        let flag = WriteFlag::from_overwrite(options.overwrite);

        let cwd = if options.cwd.is_absolute() {
            normalize(&options.cwd)
        } else {
            absolutize(&options.cwd, &process_cwd().map_err(PrepareError::CurrentDir)?)
        };

        let out_folder = self
            .out_folder
            .resolve(&file)
            .map_err(|e| PrepareError::option("outFolder", e))?
            .filter(|folder| !folder.as_os_str().is_empty())
            .ok_or(PrepareError::InvalidOutputFolder)?;

        let base_path = resolve(&cwd, &out_folder);
        let write_path = resolve(&base_path, &file.relative());

        debug!(
            "[dest] {} -> {} ({flag})",
            file.path.display(),
            write_path.display()
        );

        file.stat.get_or_insert_with(Stat::default).mode = options.mode;
        file.flag = Some(flag);
        file.cwd = cwd;
        file.base = with_trailing_separator(&base_path);
        file.path = write_path;

        Ok((file, options))
    }
}

impl Transform for Dest {
    type Input = FileRecord;

    fn transform(&self, file: FileRecord) -> Result<Emitted> {
        let (file, options) = self.prepare(file)?;

        let Some(template) = options.sourcemaps else {
            return Ok(smallvec![file]);
        };

        let config = template.resolve(&file)?;
        self.writer
            .write(file, &config)
            .map_err(PrepareError::Sourcemap)
    }
}

#[cfg(all(test, unix))]
#[path = "dest_tests.rs"]
mod tests;
