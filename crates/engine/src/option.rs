use std::{fmt, path::PathBuf, sync::Arc};

use prepare_fs::FileRecord;

type Compute<T> = dyn Fn(&FileRecord) -> anyhow::Result<Option<T>> + Send + Sync;

/// A per-file setting: either fixed up front or computed from the file it
/// applies to.
///
/// A computed option may decline (`Ok(None)`), in which case the
/// component's default applies just as if the option was never given.
pub enum Opt<T> {
    Literal(T),
    Computed(Arc<Compute<T>>),
}

impl<T: Clone> Opt<T> {
    pub fn literal(value: T) -> Self {
        Opt::Literal(value)
    }

    /// Computed from the file, always yielding a value.
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&FileRecord) -> T + Send + Sync + 'static,
    {
        Opt::Computed(Arc::new(move |file| Ok(Some(f(file)))))
    }

    /// Computed from the file; `None` defers to the default.
    pub fn maybe<F>(f: F) -> Self
    where
        F: Fn(&FileRecord) -> Option<T> + Send + Sync + 'static,
    {
        Opt::Computed(Arc::new(move |file| Ok(f(file))))
    }

    /// Computed from the file and allowed to fail. A failure is fatal for
    /// that file.
    pub fn try_with<F>(f: F) -> Self
    where
        F: Fn(&FileRecord) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Opt::Computed(Arc::new(move |file| f(file).map(Some)))
    }

    pub fn resolve(&self, file: &FileRecord) -> anyhow::Result<Option<T>> {
        match self {
            Opt::Literal(value) => Ok(Some(value.clone())),
            Opt::Computed(f) => f(file),
        }
    }
}

/// Resolve an optional template field; an absent field resolves to `None`.
pub(crate) fn resolve_field<T: Clone>(
    opt: Option<&Opt<T>>,
    file: &FileRecord,
) -> anyhow::Result<Option<T>> {
    match opt {
        Some(opt) => opt.resolve(file),
        None => Ok(None),
    }
}

impl<T> Clone for Opt<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Opt::Literal(value) => Opt::Literal(value.clone()),
            Opt::Computed(f) => Opt::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Opt<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opt::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Opt::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl<T> From<T> for Opt<T> {
    fn from(value: T) -> Self {
        Opt::Literal(value)
    }
}

impl From<&str> for Opt<PathBuf> {
    fn from(value: &str) -> Self {
        Opt::Literal(PathBuf::from(value))
    }
}

impl From<&str> for Opt<String> {
    fn from(value: &str) -> Self {
        Opt::Literal(value.to_owned())
    }
}

#[cfg(test)]
#[path = "option_tests.rs"]
mod tests;
