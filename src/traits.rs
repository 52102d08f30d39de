//! # Traits
//!
//! Seams between the projection engine and the model packages that are drawn on a
//! cross-section. The engine never asks what kind of package it is looking at: a
//! boundary condition only has to say which cells it occupies, and anything with a
//! value per cell can be colored onto a cross-section.
//!
//! ```
//! use aquigrid::prelude::*;
//! use std::collections::BTreeSet;
//!
//! /// a boundary along the western edge of every layer
//! struct WestBoundary;
//!
//! impl BoundaryCondition for WestBoundary {
//!     fn name(&self) -> &str {
//!         "CHD"
//!     }
//!
//!     fn cells(&self, grid: &Grid, _kper: usize) -> BTreeSet<(usize, usize)> {
//!         let structured = grid.as_structured().unwrap();
//!         (0..grid.nlay())
//!             .flat_map(|layer| (0..structured.nrow()).map(move |row| (layer, row)))
//!             .map(|(layer, row)| (layer, structured.node(row, 0)))
//!             .collect()
//!     }
//! }
//! ```

use crate::grid::Grid;

use std::collections::BTreeSet;

/// A model package that occupies a set of cells in a given stress period.
///
/// Cells are `(layer, node)` pairs, where `node` is the horizontal cell number in
/// the grid. Cells that do not exist in `grid` are ignored when drawing.
pub trait BoundaryCondition {
    /// short package name, used as a label when plotting
    fn name(&self) -> &str;

    /// the `(layer, node)` cells the package applies to during stress period `kper`
    fn cells(&self, grid: &Grid, kper: usize) -> BTreeSet<(usize, usize)>;
}

/// Values that can be looked up for a single `(layer, node)` cell.
///
/// `None` marks a cell without a value (masked), which is drawn without color.
pub trait CellValues {
    fn value(&self, layer: usize, node: usize) -> Option<f64>;
}

impl<F> CellValues for F
where
    F: Fn(usize, usize) -> Option<f64>,
{
    fn value(&self, layer: usize, node: usize) -> Option<f64> {
        self(layer, node)
    }
}

impl<T: BoundaryCondition> BoundaryCondition for &T {
    fn name(&self) -> &str {
        (*self).name()
    }

    fn cells(&self, grid: &Grid, kper: usize) -> BTreeSet<(usize, usize)> {
        (*self).cells(grid, kper)
    }
}
