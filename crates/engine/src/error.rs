use std::io;

use thiserror::Error;

/// Why a single file could not be prepared.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Invalid output folder")]
    InvalidOutputFolder,

    #[error("expected since option to be a date or timestamp")]
    InvalidSince,

    #[error("failed to resolve option `{name}`: {source}")]
    Option {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot read current working directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("cannot wrap file descriptor: {0}")]
    Descriptor(#[source] io::Error),

    /// Reported exactly as the source-map writer worded it.
    #[error(transparent)]
    Sourcemap(anyhow::Error),
}

impl PrepareError {
    pub(crate) fn option(name: &'static str, source: anyhow::Error) -> Self {
        PrepareError::Option { name, source }
    }

    /// Whether the error invalidates the stage itself rather than one file.
    /// A stage stops after reporting such an error.
    pub fn aborts_stream(&self) -> bool {
        matches!(self, PrepareError::InvalidSince)
    }
}

pub type Result<T> = std::result::Result<T, PrepareError>;
