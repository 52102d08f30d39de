//! # Model grids
//!
//! A [`Grid`] describes the discretization of a groundwater model: the plan-view
//! shape of every horizontal cell and the elevation of every layer interface.
//! Two kinds of grids are supported:
//!
//! * [`StructuredGrid`]: rows and columns of rectangular cells, defined by the row
//!   and column widths (`delc`, `delr`). Row 0 is the northern-most row and column
//!   0 the western-most column.
//! * [`VertexGrid`]: an arbitrary polygon per horizontal cell, referencing a shared
//!   vertex list.
//!
//! Horizontal cells are addressed with a single node number. For structured grids
//! the node of `(row, col)` is `row * ncol + col`.
//!
//! Layer `k` of a cell spans from `top_of(k, node)` down to `bottom_of(k, node)`.
//! An optional idomain array marks cells that do not take part in the simulation
//! (a value of `0`); those are never drawn on a cross-section.
//!
//! All arrays are validated when the grid is built, so every grid that exists
//! can be projected.

mod structured;
mod vertex;

pub use structured::StructuredGrid;
pub use vertex::VertexGrid;

use crate::footprint::Rect;
use crate::Point;

/// Closed set of grid kinds the projection engine understands
#[derive(Debug, Clone, PartialEq)]
pub enum Grid {
    Structured(StructuredGrid),
    Vertex(VertexGrid),
}

impl Grid {
    pub fn nlay(&self) -> usize {
        match self {
            Grid::Structured(g) => g.nlay(),
            Grid::Vertex(g) => g.nlay(),
        }
    }

    /// number of horizontal cells per layer
    pub fn ncpl(&self) -> usize {
        match self {
            Grid::Structured(g) => g.ncpl(),
            Grid::Vertex(g) => g.ncpl(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Grid::Structured(_))
    }

    pub fn as_structured(&self) -> Option<&StructuredGrid> {
        match self {
            Grid::Structured(g) => Some(g),
            Grid::Vertex(_) => None,
        }
    }

    /// elevation of the top of `layer` in horizontal cell `node`
    pub fn top_of(&self, layer: usize, node: usize) -> f64 {
        match self {
            Grid::Structured(g) => g.top_of(layer, node),
            Grid::Vertex(g) => g.top_of(layer, node),
        }
    }

    /// elevation of the bottom of `layer` in horizontal cell `node`
    pub fn bottom_of(&self, layer: usize, node: usize) -> f64 {
        match self {
            Grid::Structured(g) => g.bottom_of(layer, node),
            Grid::Vertex(g) => g.bottom_of(layer, node),
        }
    }

    /// true when the grid has no idomain array
    pub fn is_active(&self, layer: usize, node: usize) -> bool {
        match self {
            Grid::Structured(g) => g.is_active(layer, node),
            Grid::Vertex(g) => g.is_active(layer, node),
        }
    }

    pub fn has_idomain(&self) -> bool {
        match self {
            Grid::Structured(g) => g.idomain().is_some(),
            Grid::Vertex(g) => g.idomain().is_some(),
        }
    }

    pub fn cell_center(&self, node: usize) -> Point {
        match self {
            Grid::Structured(g) => {
                let (row, col) = g.row_col(node);
                g.cell_center(row, col)
            }
            Grid::Vertex(g) => g.cell_center(node),
        }
    }

    /// plan-view center of every horizontal cell, by node
    pub fn cell_centers(&self) -> Vec<Point> {
        (0..self.ncpl()).map(|node| self.cell_center(node)).collect()
    }

    /// plan-view extent of the whole grid
    pub fn extent(&self) -> Rect {
        match self {
            Grid::Structured(g) => g.extent(),
            Grid::Vertex(g) => g.extent(),
        }
    }
}

impl From<StructuredGrid> for Grid {
    fn from(x: StructuredGrid) -> Self {
        Grid::Structured(x)
    }
}

impl From<VertexGrid> for Grid {
    fn from(x: VertexGrid) -> Self {
        Grid::Vertex(x)
    }
}
