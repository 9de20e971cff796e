use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::debug;
use prepare_fs::{
    FileRecord, Stat,
    path::{absolutize, relative, resolve, to_unix_string},
};
use prepare_runtime::{INLINE_SOURCEMAP_PREFIX, SOURCEMAP_EXTENSION};
use serde_json::Value;
use smallvec::smallvec;

use super::{SourcemapConfig, SourcemapWriter};
use crate::stream::Emitted;

/// Default writer: serializes `FileRecord::source_map` either into a
/// base64 comment on the file or into a side-car `.map` record.
///
/// Files without a source map pass through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSourcemapWriter;

impl SourcemapWriter for FileSourcemapWriter {
    fn write(&self, mut file: FileRecord, config: &SourcemapConfig) -> anyhow::Result<Emitted> {
        let Some(mut map) = file.source_map.take() else {
            return Ok(smallvec![file]);
        };

        let Some(fields) = map.as_object_mut() else {
            bail!(
                "source map of {} is not a JSON object",
                file.path.display()
            );
        };

        fields.insert(
            "file".to_owned(),
            Value::String(to_unix_string(&file.relative())),
        );
        if let Some(root) = &config.source_root {
            fields.insert("sourceRoot".to_owned(), Value::String(root.clone()));
        }
        if config.include_content == Some(false) {
            fields.remove("sourcesContent");
        }

        let encoded = serde_json::to_vec(&map)
            .with_context(|| format!("cannot encode source map of {}", file.path.display()))?;

        let (url, sidecar) = match &config.path {
            None => {
                let url = format!("{INLINE_SOURCEMAP_PREFIX}{}", STANDARD.encode(&encoded));
                (url, None)
            }
            Some(dir) => {
                let map_path = sidecar_path(&file, dir, config);
                let url = mapping_url(&file, &map_path, config);
                debug!(
                    "[sourcemap] {} -> {}",
                    file.path.display(),
                    map_path.display()
                );
                (url, Some(sidecar_record(&file, map_path, encoded)))
            }
        };

        if config.add_comment != Some(false) {
            append_comment(&mut file, &url);
        }
        file.source_map = Some(map);

        let mut out: Emitted = smallvec![file];
        out.extend(sidecar);
        Ok(out)
    }
}

fn sidecar_path(file: &FileRecord, dir: &Path, config: &SourcemapConfig) -> PathBuf {
    let root = match &config.dest_path {
        Some(dest) => absolutize(dest, &file.base),
        None => file.base.clone(),
    };
    let map_dir = resolve(&root, dir);

    let name = match &config.map_file {
        Some(name) => name.clone(),
        None => with_map_extension(&file.relative()),
    };
    resolve(&map_dir, &name)
}

fn with_map_extension(path: &Path) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(".");
    raw.push(SOURCEMAP_EXTENSION);
    PathBuf::from(raw)
}

/// URL written into the comment, in order of precedence: the explicit
/// override, the prefix plus the map's path under base, or the map's path
/// relative to the file's own directory.
fn mapping_url(file: &FileRecord, map_path: &Path, config: &SourcemapConfig) -> String {
    if let Some(url) = &config.source_mapping_url {
        return url.clone();
    }

    match &config.source_mapping_url_prefix {
        Some(prefix) => format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            to_unix_string(&relative(&file.base, map_path))
        ),
        None => to_unix_string(&relative(file.dirname(), map_path)),
    }
}

fn sidecar_record(file: &FileRecord, path: PathBuf, encoded: Vec<u8>) -> FileRecord {
    let stat = Stat {
        mode: file.mode(),
        size: encoded.len() as u64,
        ..Stat::default()
    };

    FileRecord {
        cwd: file.cwd.clone(),
        base: file.base.clone(),
        path,
        stat: Some(stat),
        flag: file.flag,
        contents: Some(encoded),
        source_map: None,
        symlink_target: None,
    }
}

/// Append a `sourceMappingURL` comment in the file's own comment syntax.
/// Types without a known syntax, and files without contents, are left
/// alone.
fn append_comment(file: &mut FileRecord, url: &str) {
    let comment = match file.extension().as_deref() {
        Some("js") | Some("mjs") | Some("cjs") => format!("\n//# sourceMappingURL={url}\n"),
        Some("css") => format!("\n/*# sourceMappingURL={url} */\n"),
        _ => return,
    };

    if let Some(contents) = file.contents.as_mut() {
        contents.extend_from_slice(comment.as_bytes());
        if let Some(stat) = file.stat.as_mut() {
            stat.size = contents.len() as u64;
        }
    }
}

#[cfg(all(test, unix))]
#[path = "writer_tests.rs"]
mod tests;
