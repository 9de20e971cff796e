pub mod path;
mod record;
mod stat;

pub use record::{FileDescriptor, FileRecord};
pub use stat::{Stat, WriteFlag};
