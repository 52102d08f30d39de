use crate::error::{InvalidSpacing, NonFiniteValue, ShapeMismatch, UnsupportedGridError};
use crate::footprint::Rect;
use crate::Point;

use ndarray::{Array1, Array2, Array3, Axis};

/// Rectilinear row / column grid.
///
/// `delr` holds the width of every column (along x) and `delc` the width of
/// every row (along y). The lower left corner of the grid sits at
/// `(xoff, yoff)`; row 0 is at the top (largest y).
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    delr: Array1<f64>,
    delc: Array1<f64>,
    top: Array2<f64>,
    botm: Array3<f64>,
    idomain: Option<Array3<i32>>,
    xoff: f64,
    yoff: f64,
    // derived from delr / delc / offsets
    xedges: Vec<f64>,
    yedges: Vec<f64>,
}

impl StructuredGrid {
    /// Build a grid from column widths, row widths, the model top `(nrow, ncol)`
    /// and the layer bottoms `(nlay, nrow, ncol)`.
    pub fn new(
        delr: Array1<f64>,
        delc: Array1<f64>,
        top: Array2<f64>,
        botm: Array3<f64>,
    ) -> Result<Self, UnsupportedGridError> {
        let ncol = delr.len();
        let nrow = delc.len();

        if nrow == 0 || ncol == 0 || botm.len_of(Axis(0)) == 0 {
            return Err(UnsupportedGridError::Empty);
        }

        check_spacing("delr", &delr)?;
        check_spacing("delc", &delc)?;
        check_shape("top", &[nrow, ncol], top.shape())?;
        check_shape("botm", &[botm.len_of(Axis(0)), nrow, ncol], botm.shape())?;
        check_finite("top", top.iter())?;
        check_finite("botm", botm.iter())?;

        let mut grid = Self {
            delr,
            delc,
            top,
            botm,
            idomain: None,
            xoff: 0.0,
            yoff: 0.0,
            xedges: Vec::new(),
            yedges: Vec::new(),
        };
        grid.compute_edges();

        Ok(grid)
    }

    /// attach an idomain array with the same shape as `botm`
    pub fn with_idomain(mut self, idomain: Array3<i32>) -> Result<Self, UnsupportedGridError> {
        check_shape("idomain", self.botm.shape(), idomain.shape())?;
        self.idomain = Some(idomain);
        Ok(self)
    }

    /// move the lower left corner of the grid
    pub fn with_offset(mut self, xoff: f64, yoff: f64) -> Self {
        self.xoff = xoff;
        self.yoff = yoff;
        self.compute_edges();
        self
    }

    fn compute_edges(&mut self) {
        let mut x = self.xoff;
        self.xedges = std::iter::once(x)
            .chain(self.delr.iter().map(|dx| {
                x += dx;
                x
            }))
            .collect();

        // y edges run from the top of row 0 down to the bottom of the last row
        let mut y = self.yoff + self.delc.sum();
        self.yedges = std::iter::once(y)
            .chain(self.delc.iter().map(|dy| {
                y -= dy;
                y
            }))
            .collect();
    }

    pub fn nrow(&self) -> usize {
        self.delc.len()
    }

    pub fn ncol(&self) -> usize {
        self.delr.len()
    }

    pub fn nlay(&self) -> usize {
        self.botm.len_of(Axis(0))
    }

    pub fn ncpl(&self) -> usize {
        self.nrow() * self.ncol()
    }

    pub fn delr(&self) -> &Array1<f64> {
        &self.delr
    }

    pub fn delc(&self) -> &Array1<f64> {
        &self.delc
    }

    pub fn top(&self) -> &Array2<f64> {
        &self.top
    }

    pub fn botm(&self) -> &Array3<f64> {
        &self.botm
    }

    pub fn idomain(&self) -> Option<&Array3<i32>> {
        self.idomain.as_ref()
    }

    /// x coordinates of the column edges, west to east (`ncol + 1` values)
    pub fn xedges(&self) -> &[f64] {
        &self.xedges
    }

    /// y coordinates of the row edges, north to south (`nrow + 1` values)
    pub fn yedges(&self) -> &[f64] {
        &self.yedges
    }

    pub fn node(&self, row: usize, col: usize) -> usize {
        row * self.ncol() + col
    }

    pub fn row_col(&self, node: usize) -> (usize, usize) {
        (node / self.ncol(), node % self.ncol())
    }

    pub fn cell_bounds(&self, row: usize, col: usize) -> Rect {
        Rect::new(
            self.xedges[col],
            self.xedges[col + 1],
            self.yedges[row + 1],
            self.yedges[row],
        )
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        [
            (self.xedges[col] + self.xedges[col + 1]) / 2.0,
            (self.yedges[row] + self.yedges[row + 1]) / 2.0,
        ]
    }

    pub fn extent(&self) -> Rect {
        Rect::new(
            self.xedges[0],
            self.xedges[self.ncol()],
            self.yedges[self.nrow()],
            self.yedges[0],
        )
    }

    pub fn top_of(&self, layer: usize, node: usize) -> f64 {
        let (row, col) = self.row_col(node);
        if layer == 0 {
            self.top[[row, col]]
        } else {
            self.botm[[layer - 1, row, col]]
        }
    }

    pub fn bottom_of(&self, layer: usize, node: usize) -> f64 {
        let (row, col) = self.row_col(node);
        self.botm[[layer, row, col]]
    }

    pub fn is_active(&self, layer: usize, node: usize) -> bool {
        let (row, col) = self.row_col(node);
        self.idomain
            .as_ref()
            .map(|idomain| idomain[[layer, row, col]] != 0)
            .unwrap_or(true)
    }

    /// thickness of every cell, `(nlay, nrow, ncol)`
    pub fn cell_thickness(&self) -> Array3<f64> {
        let mut thickness = Array3::zeros(self.botm.raw_dim());

        for ((layer, row, col), value) in thickness.indexed_iter_mut() {
            let node = self.node(row, col);
            *value = self.top_of(layer, node) - self.bottom_of(layer, node);
        }

        thickness
    }
}

pub(super) fn check_spacing(
    array_name: &'static str,
    spacing: &Array1<f64>,
) -> Result<(), UnsupportedGridError> {
    match spacing
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || **value <= 0.0)
    {
        Some((index, value)) => Err(InvalidSpacing::new(array_name, index, *value).into()),
        None => Ok(()),
    }
}

/// reject NaN (missing) and infinite values
pub(super) fn check_finite<'a, I>(array_name: &'static str, values: I) -> Result<(), UnsupportedGridError>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values
        .into_iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        Some((index, value)) => Err(NonFiniteValue::new(array_name, index, *value).into()),
        None => Ok(()),
    }
}

pub(super) fn check_shape(
    array_name: &str,
    expected: &[usize],
    actual: &[usize],
) -> Result<(), UnsupportedGridError> {
    if expected != actual {
        let mismatch = ShapeMismatch::new(array_name.into(), expected.to_vec(), actual.to_vec());
        return Err(mismatch.into());
    }
    Ok(())
}
