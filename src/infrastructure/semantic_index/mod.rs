//! Local per-context semantic index and its persistence

mod fs_storage;
mod local;

pub use fs_storage::FsIndexStorage;
pub use local::LocalSemanticIndex;
