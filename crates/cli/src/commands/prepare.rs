use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
    thread,
};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use clap::Args;
use crossbeam::channel::{self, Sender};
use log::{debug, error, info};
use prepare_engine::{
    Dest, PrepareError, PrepareOptions, Since, SourceItem, Src, SrcOptions, spawn_stage,
};
use prepare_fs::{FileDescriptor, Stat, path::absolutize};
use prepare_runtime::{SOURCEMAP_EXTENSION, STAGE_CHANNEL_CAPACITY, process_cwd};

use crate::printer::RecordPrinter;

#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Output folder, resolved against --cwd.
    pub out_dir: PathBuf,

    /// Files to prepare.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory relative paths are resolved against. Defaults to the
    /// current directory.
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Directory the inputs are taken relative to. Defaults to --cwd.
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Octal permission bits for every output, e.g. 644.
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<u32>,

    /// Refuse to replace files that already exist.
    #[arg(long)]
    pub no_overwrite: bool,

    /// Emit source maps. Inline without a value, side-car files under DIR
    /// when given as `--sourcemaps=DIR`. Existing `<file>.map` files are
    /// picked up as input maps.
    #[arg(long, value_name = "DIR", num_args = 0..=1, require_equals = true)]
    pub sourcemaps: Option<Option<String>>,

    /// Skip files not modified after this RFC 3339 date or millisecond
    /// timestamp.
    #[arg(long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,
}

pub fn run(args: PrepareArgs) -> ExitCode {
    match execute(args) {
        Ok(code) => code,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[prepare] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: PrepareArgs) -> Result<ExitCode> {
    let process_dir = process_cwd().context("cannot read the current directory")?;
    let cwd = match &args.cwd {
        Some(dir) => absolutize(dir, &process_dir),
        None => process_dir,
    };
    let base = args.base.as_deref().map(|b| absolutize(b, &cwd));
    let load_maps = args.sourcemaps.is_some();

    let prepare = Dest::new(args.out_dir.clone(), prepare_options(&args, &cwd))
        .with_context(|| format!("cannot prepare into {:?}", args.out_dir))?;

    let (tx, rx) = channel::bounded::<SourceItem>(STAGE_CHANNEL_CAPACITY);
    let src = spawn_stage(Src::new(src_options(&args)), rx);
    let dest = spawn_stage(prepare, src.output.clone());

    let files = args.files;
    let reader = thread::spawn(move || feed(&files, &cwd, base.as_deref(), load_maps, tx));

    let mut printer = RecordPrinter::stdout();
    let mut printed = 0usize;
    for record in dest.output.iter() {
        printer.print_record(&record)?;
        printed += 1;
    }

    // Output disconnected, so both stages have sent every error they had.
    let mut failures: Vec<String> = reader
        .join()
        .map_err(|_| anyhow!("file reader panicked"))?
        .iter()
        .map(|e| format!("{e:#}"))
        .collect();
    failures.extend(src.errors.try_iter().map(|e| e.to_string()));
    failures.extend(dest.errors.try_iter().map(|e| e.to_string()));

    let src_summary = src.join().map_err(|_| anyhow!("source stage panicked"))?;
    let dest_summary = dest.join().map_err(|_| anyhow!("dest stage panicked"))?;
    info!("[prepare] src {src_summary:?}, dest {dest_summary:?}");

    for failure in &failures {
        printer.print_error(failure)?;
    }
    printer.finish(printed, src_summary.dropped, failures.len())?;

    if failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn prepare_options(args: &PrepareArgs, cwd: &Path) -> PrepareOptions {
    let mut options = PrepareOptions::new()
        .cwd(cwd.to_path_buf())
        .overwrite(!args.no_overwrite);
    if let Some(mode) = args.mode {
        options = options.mode(mode);
    }
    match &args.sourcemaps {
        Some(Some(dir)) => options.sourcemaps(dir.as_str()),
        Some(None) => options.sourcemaps(true),
        None => options,
    }
}

fn src_options(args: &PrepareArgs) -> SrcOptions {
    match args.since {
        Some(since) => SrcOptions::new().since(since),
        None => SrcOptions::new(),
    }
}

/// Describe each input and hand it to the source stage. Returns the inputs
/// that could not be read.
fn feed(
    files: &[PathBuf],
    cwd: &Path,
    base: Option<&Path>,
    load_maps: bool,
    tx: Sender<SourceItem>,
) -> Vec<anyhow::Error> {
    let mut failed = Vec::new();

    for file in files {
        match describe(file, cwd, base, load_maps) {
            Ok(desc) => {
                if tx.send(desc.into()).is_err() {
                    debug!("[prepare] source stage stopped, not reading further inputs");
                    break;
                }
            }
            Err(e) => failed.push(e),
        }
    }

    failed
}

/// Build the descriptor for `file` from what the filesystem says about it.
///
/// Symlinks are followed: the descriptor points at the target and carries
/// the link's own location as the override.
pub fn describe(
    file: &Path,
    cwd: &Path,
    base: Option<&Path>,
    load_maps: bool,
) -> Result<FileDescriptor> {
    let location = absolutize(file, cwd);
    let link_meta = fs::symlink_metadata(&location)
        .with_context(|| format!("cannot stat {}", location.display()))?;

    let mut desc = FileDescriptor::new(&location);
    desc.cwd = Some(cwd.to_path_buf());
    desc.base = base.map(Path::to_path_buf);
    desc.stat = Some(Stat::from_metadata(&link_meta));

    if link_meta.file_type().is_symlink() {
        let target = fs::canonicalize(&location)
            .with_context(|| format!("cannot resolve link {}", location.display()))?;
        let target_meta = fs::metadata(&target)
            .with_context(|| format!("cannot stat {}", target.display()))?;
        desc.stat = Some(Stat {
            is_symlink: true,
            ..Stat::from_metadata(&target_meta)
        });
        desc.path = target;
        desc.symlink_target = Some(location.clone());
    }

    let is_file = desc.stat.as_ref().is_some_and(|s| !s.is_dir);
    if load_maps && is_file {
        desc.contents = Some(
            fs::read(&desc.path).with_context(|| format!("cannot read {}", desc.path.display()))?,
        );
        desc.source_map = read_input_map(&location)?;
    }

    Ok(desc)
}

fn read_input_map(file: &Path) -> Result<Option<serde_json::Value>> {
    let mut name = OsString::from(file.as_os_str());
    name.push(".");
    name.push(SOURCEMAP_EXTENSION);
    let map_path = PathBuf::from(name);

    if !map_path.is_file() {
        return Ok(None);
    }
    let bytes =
        fs::read(&map_path).with_context(|| format!("cannot read {}", map_path.display()))?;
    let map = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a valid source map", map_path.display()))?;
    Ok(Some(map))
}

/// Octal permission bits, with or without a `0`/`0o` prefix.
pub fn parse_mode(s: &str) -> std::result::Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    let mode =
        u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode `{s}`: {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode `{s}` is out of range"));
    }
    Ok(mode)
}

pub fn parse_since(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    Since::from(s)
        .to_datetime()
        .ok_or_else(|| PrepareError::InvalidSince.to_string())
}

#[cfg(test)]
#[path = "prepare_tests.rs"]
mod tests;
