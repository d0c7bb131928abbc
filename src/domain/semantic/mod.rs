//! Local semantic tier: nearest-neighbor index over query embeddings

mod index;
mod storage;

pub use index::{FlatIndex, NearestNeighbor};
pub use storage::IndexStorage;

#[cfg(test)]
pub use storage::mock::MockIndexStorage;
