mod dest;
mod error;
mod option;
mod options;
mod source;
pub mod sourcemap;
mod stream;

pub use dest::Dest;
pub use error::{PrepareError, Result};
pub use option::Opt;
pub use options::{PrepareOptions, ResolvedOptions, SourcemapSetting};
pub use source::{Since, SourceItem, Src, SrcOptions};
pub use sourcemap::{FileSourcemapWriter, SourcemapConfig, SourcemapTemplate, SourcemapWriter};
pub use stream::{Emitted, Stage, StageSummary, Transform, run_all, spawn_stage};
