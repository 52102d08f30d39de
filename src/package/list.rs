use crate::grid::{Grid, StructuredGrid};
use crate::traits::BoundaryCondition;

use std::collections::{BTreeMap, BTreeSet};

/// A boundary condition given as a list of cells per stress period, such as
/// constant head or well cells.
///
/// A period without its own list uses the list of the latest period before it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListBoundary {
    name: String,
    periods: BTreeMap<usize, BTreeSet<(usize, usize)>>,
}

impl ListBoundary {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            periods: BTreeMap::new(),
        }
    }

    /// add a `(layer, node)` cell to the list of period `kper`
    pub fn push(&mut self, kper: usize, layer: usize, node: usize) {
        self.periods.entry(kper).or_default().insert((layer, node));
    }

    /// add a `(layer, row, col)` cell of a structured grid
    pub fn push_structured(
        &mut self,
        grid: &StructuredGrid,
        kper: usize,
        layer: usize,
        row: usize,
        col: usize,
    ) {
        self.push(kper, layer, grid.node(row, col));
    }

    pub fn with_cells<I>(mut self, kper: usize, cells: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        self.periods.entry(kper).or_default().extend(cells);
        self
    }
}

impl BoundaryCondition for ListBoundary {
    fn name(&self) -> &str {
        &self.name
    }

    fn cells(&self, grid: &Grid, kper: usize) -> BTreeSet<(usize, usize)> {
        self.periods
            .range(..=kper)
            .next_back()
            .map(|(_, cells)| {
                cells
                    .iter()
                    .copied()
                    .filter(|(layer, node)| *layer < grid.nlay() && *node < grid.ncpl())
                    .collect()
            })
            .unwrap_or_default()
    }
}
