//! Flat vector storage, parallel to the docstore.

use serde::{Deserialize, Serialize};

use crate::types::FragmentId;

/// The vector half of the index: one fixed-dimension row per fragment,
/// stored flat in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VecStore {
    dimension: u32,
    ids: Vec<FragmentId>,
    data: Vec<f32>,
}

impl VecStore {
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension,
            ids: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append a row. Caller guarantees the dimension matches; checked in
    /// debug builds.
    pub fn push(&mut self, id: FragmentId, vector: &[f32]) {
        debug_assert_eq!(
            vector.len(),
            self.dimension as usize,
            "vector dimension must match the store"
        );
        debug_assert!(
            self.ids.last().is_none_or(|last| *last < id),
            "vector ids must be appended in increasing order"
        );
        self.ids.push(id);
        self.data.extend_from_slice(vector);
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row at a given insertion position.
    pub fn row(&self, position: usize) -> Option<&[f32]> {
        let dim = self.dimension as usize;
        if dim == 0 || position >= self.ids.len() {
            return None;
        }
        self.data.get(position * dim..(position + 1) * dim)
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        let dim = (self.dimension as usize).max(1);
        self.data.chunks_exact(dim)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = FragmentId> + '_ {
        self.ids.iter().copied()
    }

    /// Internal consistency: one row of `dimension` floats per id.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.ids.len() * self.dimension as usize
    }
}
