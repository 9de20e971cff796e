mod config;
pub mod logging;

pub use config::{
    INLINE_SOURCEMAP_PREFIX, PROGRAM_LOG_LEVEL, PROGRAM_NAME, SOURCEMAP_EXTENSION,
    STAGE_CHANNEL_CAPACITY, process_cwd,
};

pub use logging::init;
