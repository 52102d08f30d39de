use super::structured::{check_finite, check_shape};
use crate::error::{UnsupportedGridError, VertexOutOfRange};
use crate::footprint::{polygon_centroid, Rect};
use crate::Point;

use ndarray::{Array1, Array2, Axis};

/// Grid with an arbitrary polygon per horizontal cell (DISV style).
///
/// `cell2d[node]` lists the indices into `vertices` that make up the outline of
/// the cell. The ring is implicitly closed; a repeated closing vertex is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGrid {
    vertices: Vec<Point>,
    cell2d: Vec<Vec<usize>>,
    top: Array1<f64>,
    botm: Array2<f64>,
    idomain: Option<Array2<i32>>,
}

impl VertexGrid {
    /// Build a grid from its vertex list, the vertex indices of every cell, the
    /// model top `(ncpl,)` and the layer bottoms `(nlay, ncpl)`.
    pub fn new(
        vertices: Vec<Point>,
        cell2d: Vec<Vec<usize>>,
        top: Array1<f64>,
        botm: Array2<f64>,
    ) -> Result<Self, UnsupportedGridError> {
        let ncpl = cell2d.len();

        if ncpl == 0 || botm.len_of(Axis(0)) == 0 {
            return Err(UnsupportedGridError::Empty);
        }

        for (cell, iverts) in cell2d.iter().enumerate() {
            if let Some(vertex) = iverts.iter().find(|iv| **iv >= vertices.len()) {
                return Err(VertexOutOfRange::new(cell, *vertex, vertices.len()).into());
            }
        }

        check_shape("top", &[ncpl], top.shape())?;
        check_shape("botm", &[botm.len_of(Axis(0)), ncpl], botm.shape())?;
        check_finite("vertices", vertices.iter().flatten())?;
        check_finite("top", top.iter())?;
        check_finite("botm", botm.iter())?;

        let cell2d = cell2d
            .into_iter()
            .map(|mut iverts| {
                if iverts.len() > 1 && iverts.first() == iverts.last() {
                    iverts.pop();
                }
                iverts
            })
            .collect();

        Ok(Self {
            vertices,
            cell2d,
            top,
            botm,
            idomain: None,
        })
    }

    /// attach an idomain array with the same shape as `botm`
    pub fn with_idomain(mut self, idomain: Array2<i32>) -> Result<Self, UnsupportedGridError> {
        check_shape("idomain", self.botm.shape(), idomain.shape())?;
        self.idomain = Some(idomain);
        Ok(self)
    }

    pub fn nlay(&self) -> usize {
        self.botm.len_of(Axis(0))
    }

    pub fn ncpl(&self) -> usize {
        self.cell2d.len()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn cell2d(&self) -> &[Vec<usize>] {
        &self.cell2d
    }

    pub fn top(&self) -> &Array1<f64> {
        &self.top
    }

    pub fn botm(&self) -> &Array2<f64> {
        &self.botm
    }

    pub fn idomain(&self) -> Option<&Array2<i32>> {
        self.idomain.as_ref()
    }

    /// outline of a cell as an (implicitly closed) ring
    pub fn cell_polygon(&self, node: usize) -> Vec<Point> {
        self.cell2d[node]
            .iter()
            .map(|iv| self.vertices[*iv])
            .collect()
    }

    pub fn cell_center(&self, node: usize) -> Point {
        polygon_centroid(&self.cell_polygon(node))
    }

    pub fn extent(&self) -> Rect {
        Rect::bounding(self.vertices.iter().copied())
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    pub fn top_of(&self, layer: usize, node: usize) -> f64 {
        if layer == 0 {
            self.top[node]
        } else {
            self.botm[[layer - 1, node]]
        }
    }

    pub fn bottom_of(&self, layer: usize, node: usize) -> f64 {
        self.botm[[layer, node]]
    }

    pub fn is_active(&self, layer: usize, node: usize) -> bool {
        self.idomain
            .as_ref()
            .map(|idomain| idomain[[layer, node]] != 0)
            .unwrap_or(true)
    }
}
