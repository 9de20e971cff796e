pub mod prepare;

pub use prepare::PrepareArgs;
