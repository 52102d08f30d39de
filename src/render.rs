//! # Rendering adapter
//!
//! Turns the projected cells of a [`CrossSection`] into renderer-agnostic drawable
//! [`Collection`]s. The adapter only looks values up by [`CellKey`]: a cell without
//! a value is left out of the output instead of being drawn with a placeholder.
//!
//! Collections can be handed to any 2D polygon renderer, collected on an [`Axes`],
//! or exported with [`write_vtp`](crate::write_vtp).

mod axes;

pub use axes::Axes;

use crate::error::ShapeMismatch;
use crate::prelude::*;

use std::collections::BTreeMap;

/// A filled polygon in (station, elevation) space
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub key: CellKey,
    pub vertices: Vec<Point>,
    pub value: Option<f64>,
}

/// A vector anchored at a (station, elevation) point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub origin: Point,
    pub vector: [f64; 2],
}

/// Drawable primitives that share a label
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Patches { label: String, patches: Vec<Patch> },
    /// open polylines; closed outlines repeat their first vertex
    Lines { label: String, lines: Vec<Vec<Point>> },
    Points { label: String, points: Vec<Point> },
    Arrows { label: String, arrows: Vec<Arrow> },
}

impl Collection {
    pub fn label(&self) -> &str {
        match self {
            Collection::Patches { label, .. }
            | Collection::Lines { label, .. }
            | Collection::Points { label, .. }
            | Collection::Arrows { label, .. } => label,
        }
    }

    /// number of primitives
    pub fn len(&self) -> usize {
        match self {
            Collection::Patches { patches, .. } => patches.len(),
            Collection::Lines { lines, .. } => lines.len(),
            Collection::Points { points, .. } => points.len(),
            Collection::Arrows { arrows, .. } => arrows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Collection::Patches { .. })
    }
}

/// Map every projected cell to a patch, looking its value up in `values`.
///
/// Cells for which `values` has nothing are excluded.
pub fn render<V: CellValues>(
    cells: &BTreeMap<CellKey, ProjectedCell>,
    values: &V,
    label: &str,
) -> Collection {
    let patches = cells
        .iter()
        .filter_map(|(key, cell)| {
            values.value(key.layer, key.node).map(|value| Patch {
                key: *key,
                vertices: cell.vertices().to_vec(),
                value: Some(value),
            })
        })
        .collect();

    Collection::Patches {
        label: label.to_string(),
        patches,
    }
}

impl<'g> CrossSection<'g> {
    /// Color every active cell with a `(nlay, ncpl)` array.
    ///
    /// Values that are NaN or equal to one of `masked_values` are left out.
    pub fn plot_array(
        &self,
        values: ArrayView2<f64>,
        masked_values: &[f64],
    ) -> Result<Collection, Error> {
        self.check_layer_array("values", &values)?;

        let lookup = |layer: usize, node: usize| {
            let value = values[[layer, node]];
            if value.is_nan() || masked_values.contains(&value) {
                None
            } else {
                Some(value)
            }
        };

        Ok(render(self.projected_cells(), &lookup, "array"))
    }

    /// Cells occupied by a boundary condition in stress period `kper`.
    ///
    /// Always a patch collection, possibly empty.
    pub fn plot_bc<B: BoundaryCondition>(&self, bc: &B, kper: usize) -> Collection {
        let occupied = bc.cells(self.grid(), kper);
        let lookup = |layer: usize, node: usize| {
            if occupied.contains(&(layer, node)) {
                Some(1.0)
            } else {
                None
            }
        };

        let collection = render(self.projected_cells(), &lookup, bc.name());
        log::debug!(
            "{} occupies {} projected cells in period {}",
            bc.name(),
            collection.len(),
            kper
        );
        collection
    }

    /// Inactive cells (idomain of 0), which are never part of the projected cells.
    pub fn plot_ibound(&self) -> Collection {
        render(self.inactive_cells(), &|_: usize, _: usize| Some(0.0), "ibound")
    }

    /// Outline of every active projected cell.
    pub fn plot_grid(&self) -> Collection {
        let lines = self
            .projected_cells()
            .values()
            .map(|cell| {
                let mut outline = cell.vertices().to_vec();
                outline.push(outline[0]);
                outline
            })
            .collect();

        Collection::Lines {
            label: "grid".into(),
            lines,
        }
    }

    /// Center of every active projected cell.
    pub fn plot_centers(&self) -> Collection {
        Collection::Points {
            label: "centers".into(),
            points: self.projctr().into_values().collect(),
        }
    }

    /// Specific discharge at the cell centers.
    ///
    /// `qx` and `qy` are projected onto the direction of the line segment each
    /// center lies on; `qz` is drawn as is. Every array has shape `(nlay, ncpl)`.
    pub fn plot_vector(
        &self,
        qx: ArrayView2<f64>,
        qy: ArrayView2<f64>,
        qz: ArrayView2<f64>,
    ) -> Result<Collection, Error> {
        self.check_layer_array("qx", &qx)?;
        self.check_layer_array("qy", &qy)?;
        self.check_layer_array("qz", &qz)?;

        let segments: Vec<_> = self.line().segments().collect();

        let arrows = self
            .projected_cells()
            .iter()
            .filter_map(|(key, cell)| {
                let index = [key.layer, key.node];
                let (x, y, z) = (qx[index], qy[index], qz[index]);
                if x.is_nan() || y.is_nan() || z.is_nan() {
                    return None;
                }

                let center = cell.center();
                let direction = segments[self.line().segment_at(center[0])].direction();

                Some(Arrow {
                    origin: center,
                    vector: [x * direction[0] + y * direction[1], z],
                })
            })
            .collect();

        Ok(Collection::Arrows {
            label: "discharge".into(),
            arrows,
        })
    }

    fn check_layer_array(&self, name: &str, array: &ArrayView2<f64>) -> Result<(), ShapeMismatch> {
        let expected = [self.grid().nlay(), self.grid().ncpl()];
        if array.shape() != &expected[..] {
            return Err(ShapeMismatch::new(
                name.into(),
                expected.to_vec(),
                array.shape().to_vec(),
            ));
        }
        Ok(())
    }
}
