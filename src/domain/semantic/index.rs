//! Flat nearest-neighbor index with a parallel text list

use serde::{Deserialize, Serialize};

use crate::domain::embedding::squared_l2_distance;
use crate::domain::error::DomainError;

/// One neighbor returned by [`FlatIndex::nearest`]
#[derive(Debug, Clone, PartialEq)]
pub struct NearestNeighbor {
    /// Squared-L2 distance to the query vector; lower is closer
    pub distance: f32,
    /// Insertion-order position of the matched vector
    pub position: usize,
    /// Original query text stored at that position
    pub text: String,
}

/// Brute-force vector index over a fixed embedding dimension.
///
/// Vectors and their source texts live in two parallel lists whose positions
/// correspond 1:1 in insertion order; positions are never reused or
/// compacted. Entries are immutable once inserted, so duplicate insertions of
/// the same query are tolerated rather than deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
    texts: Vec<String>,
}

impl FlatIndex {
    /// Build an empty index over vectors of the given dimension
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a vector and its source text, returning the assigned position
    pub fn insert(&mut self, vector: Vec<f32>, text: impl Into<String>) -> Result<usize, DomainError> {
        if vector.len() != self.dimensions {
            return Err(DomainError::internal(format!(
                "vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dimensions
            )));
        }

        let position = self.vectors.len();
        self.vectors.push(vector);
        self.texts.push(text.into());

        Ok(position)
    }

    /// The `k` closest stored vectors, ascending by distance.
    ///
    /// An empty index yields an empty result, not an error.
    pub fn nearest(&self, vector: &[f32], k: usize) -> Vec<NearestNeighbor> {
        let mut neighbors: Vec<NearestNeighbor> = self
            .vectors
            .iter()
            .zip(&self.texts)
            .enumerate()
            .map(|(position, (stored, text))| NearestNeighbor {
                distance: squared_l2_distance(vector, stored),
                position,
                text: text.clone(),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(k);

        neighbors
    }

    /// Text stored at an insertion-order position
    pub fn text_at(&self, position: usize) -> Option<&str> {
        self.texts.get(position).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_on_empty_index() {
        let index = FlatIndex::new(3);

        assert!(index.nearest(&[0.0, 0.0, 0.0], 5).is_empty());
    }

    #[test]
    fn test_insert_assigns_sequential_positions() {
        let mut index = FlatIndex::new(2);

        assert_eq!(index.insert(vec![0.0, 0.0], "a").unwrap(), 0);
        assert_eq!(index.insert(vec![1.0, 1.0], "b").unwrap(), 1);
        assert_eq!(index.text_at(1), Some("b"));
    }

    #[test]
    fn test_insert_rejects_wrong_dimension() {
        let mut index = FlatIndex::new(3);

        assert!(index.insert(vec![1.0], "short").is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_identical_vector_is_top_match_with_zero_distance() {
        let mut index = FlatIndex::new(2);
        index.insert(vec![0.3, 0.7], "stored").unwrap();
        index.insert(vec![5.0, 5.0], "far").unwrap();

        let neighbors = index.nearest(&[0.3, 0.7], 1);

        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].text, "stored");
        assert_eq!(neighbors[0].position, 0);
        assert!(neighbors[0].distance < 1e-6);
    }

    #[test]
    fn test_nearest_orders_ascending_by_distance() {
        let mut index = FlatIndex::new(1);
        index.insert(vec![10.0], "far").unwrap();
        index.insert(vec![1.0], "near").unwrap();
        index.insert(vec![4.0], "mid").unwrap();

        let neighbors = index.nearest(&[0.0], 3);
        let texts: Vec<&str> = neighbors.iter().map(|n| n.text.as_str()).collect();

        assert_eq!(texts, vec!["near", "mid", "far"]);
        assert!(neighbors[0].distance <= neighbors[1].distance);
        assert!(neighbors[1].distance <= neighbors[2].distance);
    }

    #[test]
    fn test_duplicate_insertions_are_tolerated() {
        let mut index = FlatIndex::new(1);
        index.insert(vec![1.0], "same").unwrap();
        index.insert(vec![1.0], "same").unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest(&[1.0], 5).len(), 2);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut index = FlatIndex::new(2);
        index.insert(vec![0.1, 0.2], "q1").unwrap();

        let blob = serde_json::to_string(&index).unwrap();
        let restored: FlatIndex = serde_json::from_str(&blob).unwrap();

        assert_eq!(restored.dimensions(), 2);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.text_at(0), Some("q1"));
    }
}
