use std::{io, path::PathBuf};

pub const PROGRAM_NAME: &str = "prepare";
pub const PROGRAM_LOG_LEVEL: &str = "PREPARE_LOG_LEVEL";

/// Number of records a stage may hold in its output channel before the
/// producer blocks. Keeps a fast upstream from running ahead of a slow
/// downstream consumer.
pub const STAGE_CHANNEL_CAPACITY: usize = 16;

/// Extension appended to a file's relative path to name its side-car map.
pub const SOURCEMAP_EXTENSION: &str = "map";

/// Prefix of an inline source map URL.
pub const INLINE_SOURCEMAP_PREFIX: &str = "data:application/json;charset=utf8;base64,";

/// Current working directory of the process, read at call time.
///
/// Never cached: callers that resolve defaults per file must observe the
/// directory as it is when that file is processed.
pub fn process_cwd() -> io::Result<PathBuf> {
    std::env::current_dir()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
