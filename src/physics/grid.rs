//! Spatial Grid Broadphase
//!
//! Uniform grid keyed by integer cell coordinates. Cells live in a BTreeMap
//! so pair emission order depends only on the inserted data.

use std::collections::BTreeMap;

use crate::core::fixed::Fix64;
use super::body::BodyId;
use super::geometry::Aabb;

/// Integer cell coordinate.
pub type CellKey = (i32, i32, i32);

/// Uniform grid of body ids, rebuilt every step.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: Fix64,
    cells: BTreeMap<CellKey, Vec<BodyId>>,
}

impl SpatialGrid {
    /// Create an empty grid. Cell sizes below one unit are raised to one.
    pub fn new(cell_size: Fix64) -> Self {
        let cell_size = cell_size.max(Fix64::ONE);
        Self { cell_size, cells: BTreeMap::new() }
    }

    /// Edge length of one cell.
    pub fn cell_size(&self) -> Fix64 {
        self.cell_size
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell containing a coordinate: floor(v / cell_size), integer only.
    #[inline]
    pub fn cell_coord(&self, value: Fix64) -> i32 {
        let cell = value.raw().div_euclid(self.cell_size.raw());
        cell.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    /// Add `id` to every cell the box spans.
    pub fn insert_aabb(&mut self, id: BodyId, aabb: &Aabb) {
        let (x0, x1) = (self.cell_coord(aabb.min.x), self.cell_coord(aabb.max.x));
        let (y0, y1) = (self.cell_coord(aabb.min.y), self.cell_coord(aabb.max.y));
        let (z0, z1) = (self.cell_coord(aabb.min.z), self.cell_coord(aabb.max.z));

        for x in x0..=x1 {
            for y in y0..=y1 {
                for z in z0..=z1 {
                    self.cells.entry((x, y, z)).or_default().push(id);
                }
            }
        }
    }

    /// Every unordered pair sharing a cell, in cell-key order.
    ///
    /// Bodies sharing several cells produce the pair once per cell.
    pub fn query_pairs(&self, out: &mut Vec<(BodyId, BodyId)>) {
        out.clear();
        for ids in self.cells.values() {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    out.push((ids[i], ids[j]));
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
