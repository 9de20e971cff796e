//! Lexical path algebra.
//!
//! None of these functions touch the filesystem: symlinks are not followed
//! and `..` is folded purely on components. Every output path of the
//! write-preparation stage is built from these.

use std::{
    ffi::OsString,
    path::{Component, MAIN_SEPARATOR, Path, PathBuf, is_separator},
};

/// Fold `.` and `..` components.
///
/// `..` never climbs above a root; on a relative path leading `..`
/// components are kept. An empty result becomes `"."`. Trailing separators
/// are dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }

    out.iter().collect()
}

/// Resolve `segment` against `base`.
///
/// An absolute `segment` wins outright. An empty `segment` yields `base`.
#[inline]
pub fn resolve(base: &Path, segment: &Path) -> PathBuf {
    normalize(&base.join(segment))
}

/// Make `path` absolute against `cwd`, which must itself be absolute.
#[inline]
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    resolve(cwd, path)
}

/// Path that leads from `from` to `to`.
///
/// Equal inputs give an empty path. Nothing stops the result from starting
/// with `..` when `to` is not under `from`.
pub fn relative(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);

    let from_comps: Vec<Component<'_>> = from.components().collect();
    let to_comps: Vec<Component<'_>> = to.components().collect();

    let common = from_comps
        .iter()
        .zip(&to_comps)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from_comps.len() {
        out.push("..");
    }
    for comp in &to_comps[common..] {
        out.push(comp.as_os_str());
    }
    out
}

/// Whether the textual form of `path` ends in a separator.
///
/// `Path` equality ignores trailing separators, so this looks at the raw
/// encoded bytes instead.
pub fn ends_with_separator(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| b.is_ascii() && is_separator(b as char))
}

/// Normalize `path` and terminate it with exactly one separator.
pub fn with_trailing_separator(path: &Path) -> PathBuf {
    let normalized = normalize(path);
    if ends_with_separator(&normalized) {
        // Roots such as `/` already end in one.
        return normalized;
    }

    let mut raw: OsString = normalized.into_os_string();
    raw.push(MAIN_SEPARATOR.to_string());
    PathBuf::from(raw)
}

/// Render a relative `path` with `/` separators regardless of platform, as
/// URLs and source maps expect.
pub fn to_unix_string(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| match c {
            Component::RootDir => String::new(),
            other => other.as_os_str().to_string_lossy().into_owned(),
        })
        .collect();

    match parts.as_slice() {
        [only] if only.is_empty() => "/".to_string(),
        _ => parts.join("/"),
    }
}

#[cfg(all(test, unix))]
#[path = "path_tests.rs"]
mod tests;
