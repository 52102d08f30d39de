//! # Cross-sections
//!
//! [`CrossSection::new`] runs the whole projection pipeline: the line is
//! normalized, the footprint of every horizontal cell is clipped against every
//! segment, and the resulting station ranges are stacked with the layer elevations
//! into polygons in the vertical plane of the line.
//!
//! The result is immutable. Changing the line or the grid means building a new
//! cross-section.
//!
//! ```
//! use aquigrid::prelude::*;
//! use aquigrid::ndarray::{Array1, Array2, Array3};
//!
//! let grid = StructuredGrid::new(
//!     Array1::ones(4),
//!     Array1::ones(4),
//!     Array2::from_elem((4, 4), 2.0),
//!     Array3::zeros((1, 4, 4)),
//! )
//! .unwrap();
//! let grid = Grid::from(grid);
//!
//! let xsect = CrossSection::new(&grid, &LineSpec::Row(1), ProjectionConfig::default()).unwrap();
//!
//! // one cell per column of row 1
//! assert_eq!(xsect.projected_cells().len(), 4);
//! assert_eq!(xsect.total_length(), 4.0);
//! ```
//!
//! ## Ordering
//!
//! Projected cells are keyed by [`CellKey`], which orders by layer, then by
//! horizontal node number, then by the index of the disjoint station range within
//! the cell. Every map on the cross-section is a `BTreeMap`, so iteration order is
//! identical between runs.

use crate::config::ProjectionConfig;
use crate::footprint::{footprints, Footprint, Rect};
use crate::grid::Grid;
use crate::intersect::{intersect_line, CellIntersection, StationInterval, StationPoint};
use crate::line::{normalize_with_grid, Line, LineSpec};
use crate::{Error, Point};

use derive_more::Display;
use std::collections::BTreeMap;

/// Address of a projected cell.
///
/// A cell that the line enters more than once (a concave cell, or a line that
/// doubles back) produces one part per disjoint station range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "(layer {}, node {}, part {})", layer, node, part)]
pub struct CellKey {
    pub layer: usize,
    pub node: usize,
    pub part: usize,
}

impl CellKey {
    pub fn new(layer: usize, node: usize, part: usize) -> Self {
        Self { layer, node, part }
    }
}

/// Slice of one 3D cell in the plane of the line, in (station, elevation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedCell {
    pub key: CellKey,
    pub start: f64,
    pub end: f64,
    pub top: f64,
    pub bottom: f64,
}

impl ProjectedCell {
    /// polygon outline, clockwise from the upper left corner
    pub fn vertices(&self) -> [Point; 4] {
        [
            [self.start, self.top],
            [self.end, self.top],
            [self.end, self.bottom],
            [self.start, self.bottom],
        ]
    }

    pub fn center(&self) -> Point {
        [
            (self.start + self.end) / 2.0,
            (self.top + self.bottom) / 2.0,
        ]
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }
}

/// What kind of degenerate geometry was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DegenerateKind {
    #[display(fmt = "footprint has zero area")]
    ZeroAreaFootprint,
    #[display(fmt = "line only touches the footprint")]
    ZeroLengthIntersection,
    #[display(fmt = "layer has zero thickness")]
    ZeroThickness,
}

/// Geometry that was skipped while assembling a cross-section.
///
/// Not an error: the cell simply contributes no polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryDegenerateWarning {
    pub kind: DegenerateKind,
    pub node: usize,
    /// `None` when the whole column of cells is affected
    pub layer: Option<usize>,
}

impl std::fmt::Display for GeometryDegenerateWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.layer {
            Some(layer) => write!(f, "node {} layer {}: {}", self.node, layer, self.kind),
            None => write!(f, "node {}: {}", self.node, self.kind),
        }
    }
}

/// Immutable result of projecting a grid onto a line
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection<'g> {
    grid: &'g Grid,
    line: Line,
    config: ProjectionConfig,
    xypts: BTreeMap<usize, Vec<Point>>,
    ranges: BTreeMap<usize, Vec<StationInterval>>,
    touches: BTreeMap<usize, Vec<StationPoint>>,
    cells: BTreeMap<CellKey, ProjectedCell>,
    inactive: BTreeMap<CellKey, ProjectedCell>,
    warnings: Vec<GeometryDegenerateWarning>,
}

impl<'g> CrossSection<'g> {
    /// Project `grid` onto the line described by `spec`.
    pub fn new(grid: &'g Grid, spec: &LineSpec, config: ProjectionConfig) -> Result<Self, Error> {
        config.validate()?;
        let line = normalize_with_grid(spec, grid)?;
        let footprints = footprints(grid);

        log::debug!(
            "projecting {} cells onto a line with {} segments",
            footprints.len(),
            line.num_segments()
        );

        let intersections = intersect_line(&line, &footprints, &config);
        let mut xsect = assemble(grid, line, &footprints, &intersections, config);

        for warning in &xsect.warnings {
            log::warn!("skipped degenerate geometry at {}", warning);
        }

        xsect.warnings.sort_by_key(|w| (w.layer, w.node));

        log::debug!(
            "assembled {} projected cells ({} inactive)",
            xsect.cells.len(),
            xsect.inactive.len()
        );

        Ok(xsect)
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn total_length(&self) -> f64 {
        self.line.length()
    }

    /// plan-view points where the line enters, bends inside and leaves each cell,
    /// plus the points where it only touches a cell
    pub fn xypts(&self) -> &BTreeMap<usize, Vec<Point>> {
        &self.xypts
    }

    /// merged station ranges of every horizontal cell the line overlaps
    pub fn station_ranges(&self) -> &BTreeMap<usize, Vec<StationInterval>> {
        &self.ranges
    }

    /// cells the line only touches, with the touching points
    pub fn touches(&self) -> &BTreeMap<usize, Vec<StationPoint>> {
        &self.touches
    }

    /// active cells with positive thickness, in [`CellKey`] order
    pub fn projected_cells(&self) -> &BTreeMap<CellKey, ProjectedCell> {
        &self.cells
    }

    /// cells marked inactive by the idomain, never part of [`projected_cells`](Self::projected_cells)
    pub fn inactive_cells(&self) -> &BTreeMap<CellKey, ProjectedCell> {
        &self.inactive
    }

    pub fn projpts(&self) -> BTreeMap<CellKey, [Point; 4]> {
        self.cells
            .iter()
            .map(|(key, cell)| (*key, cell.vertices()))
            .collect()
    }

    pub fn projctr(&self) -> BTreeMap<CellKey, Point> {
        self.cells
            .iter()
            .map(|(key, cell)| (*key, cell.center()))
            .collect()
    }

    pub fn warnings(&self) -> &[GeometryDegenerateWarning] {
        &self.warnings
    }

    /// (station, elevation) bounds of every cell drawn on the section, active or
    /// not. `None` if the line misses the grid.
    pub fn extent(&self) -> Option<Rect> {
        self.cells
            .values()
            .chain(self.inactive.values())
            .map(|cell| Rect::new(cell.start, cell.end, cell.bottom, cell.top))
            .reduce(|a, b| a.union(&b))
    }
}

/// Stack the merged station ranges of every cell with the layer elevations.
pub(crate) fn assemble<'g>(
    grid: &'g Grid,
    line: Line,
    footprints: &[Footprint],
    intersections: &[CellIntersection],
    config: ProjectionConfig,
) -> CrossSection<'g> {
    let tol = config.tolerance;
    let mut warnings = Vec::new();

    let line_bounds = line.bounds();
    for (node, footprint) in footprints.iter().enumerate() {
        if footprint.is_degenerate(tol) && footprint.bounds().overlaps(&line_bounds, tol) {
            warnings.push(GeometryDegenerateWarning {
                kind: DegenerateKind::ZeroAreaFootprint,
                node,
                layer: None,
            });
        }
    }

    // intervals and touches of every segment, per node, in segment order
    let mut per_node: BTreeMap<usize, (Vec<StationInterval>, Vec<StationPoint>)> = BTreeMap::new();
    for intersection in intersections {
        let entry = per_node.entry(intersection.node).or_default();
        entry.0.extend(intersection.record.intervals.iter().copied());
        entry.1.extend(intersection.record.touches.iter().copied());
    }

    let mut xypts = BTreeMap::new();
    let mut ranges = BTreeMap::new();
    let mut touches = BTreeMap::new();

    for (node, (mut intervals, mut points)) in per_node {
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));
        points.sort_by(|a, b| a.station.total_cmp(&b.station));

        let merged = merge_intervals(&intervals, tol);

        // touches inside an overlap are already drawn
        points.retain(|p| {
            !merged
                .iter()
                .any(|r| p.station >= r.start - tol && p.station <= r.end + tol)
        });
        points.dedup_by(|b, a| (b.station - a.station).abs() <= tol);

        let mut plan: Vec<(f64, Point)> = intervals
            .iter()
            .flat_map(|r| [(r.start, r.entry), (r.end, r.exit)])
            .chain(points.iter().map(|p| (p.station, p.point)))
            .collect();
        plan.sort_by(|a, b| a.0.total_cmp(&b.0));
        plan.dedup_by(|b, a| (b.0 - a.0).abs() <= tol);
        xypts.insert(node, plan.into_iter().map(|(_, p)| p).collect());

        if merged.is_empty() {
            warnings.push(GeometryDegenerateWarning {
                kind: DegenerateKind::ZeroLengthIntersection,
                node,
                layer: None,
            });
        } else {
            ranges.insert(node, merged);
        }

        if !points.is_empty() {
            touches.insert(node, points);
        }
    }

    let mut cells = BTreeMap::new();
    let mut inactive = BTreeMap::new();

    for layer in 0..grid.nlay() {
        for (node, merged) in &ranges {
            let top = grid.top_of(layer, *node);
            let bottom = grid.bottom_of(layer, *node);

            // NaN elevations compare false, so they land here too
            if !(top - bottom > tol) {
                warnings.push(GeometryDegenerateWarning {
                    kind: DegenerateKind::ZeroThickness,
                    node: *node,
                    layer: Some(layer),
                });
                continue;
            }

            let active = grid.is_active(layer, *node);

            for (part, range) in merged.iter().enumerate() {
                let key = CellKey::new(layer, *node, part);
                let cell = ProjectedCell {
                    key,
                    start: range.start,
                    end: range.end,
                    top,
                    bottom,
                };

                if active {
                    cells.insert(key, cell);
                } else {
                    inactive.insert(key, cell);
                }
            }
        }
    }

    CrossSection {
        grid,
        line,
        config,
        xypts,
        ranges,
        touches,
        cells,
        inactive,
        warnings,
    }
}

/// join sorted intervals that overlap or meet within `tol`
fn merge_intervals(sorted: &[StationInterval], tol: f64) -> Vec<StationInterval> {
    let mut merged: Vec<StationInterval> = Vec::with_capacity(sorted.len());

    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + tol => {
                if interval.end > last.end {
                    last.end = interval.end;
                    last.exit = interval.exit;
                }
            }
            _ => merged.push(*interval),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::grid::{StructuredGrid, VertexGrid};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, Array2, Array3};

    fn unit_grid(n: usize, nlay: usize) -> StructuredGrid {
        let mut botm = Array3::zeros((nlay, n, n));
        for layer in 0..nlay {
            botm.index_axis_mut(ndarray::Axis(0), layer)
                .fill(-(layer as f64 + 1.0));
        }
        StructuredGrid::new(Array1::ones(n), Array1::ones(n), Array2::zeros((n, n)), botm).unwrap()
    }

    #[test]
    fn merge_across_segments() {
        let interval = |start, end| StationInterval {
            start,
            end,
            entry: [start, 0.0],
            exit: [end, 0.0],
        };
        let merged = merge_intervals(&[interval(0.0, 1.0), interval(1.0, 2.0), interval(3.0, 4.0)], 1e-9);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].end, 2.0);
        assert_eq!(merged[0].exit, [2.0, 0.0]);
        assert_eq!(merged[1].start, 3.0);
    }

    #[test]
    fn bend_inside_a_cell_is_one_part() {
        let grid = Grid::from(unit_grid(3, 1));
        let spec = LineSpec::Vertices(vec![[0.25, 1.5], [1.5, 1.5], [1.5, 2.75]]);
        let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

        // center cell: row 1, column 1
        let center = xsect.projected_cells()[&CellKey::new(0, 4, 0)];
        assert_abs_diff_eq!(center.start, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(center.end, 1.75, epsilon = 1e-12);
        assert!(!xsect.projected_cells().contains_key(&CellKey::new(0, 4, 1)));

        // entry, bend, exit
        assert_eq!(xsect.xypts()[&4].len(), 3);
    }

    #[test]
    fn doubling_back_gives_two_parts() {
        let vertices = vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 1.0],
            [2.0, 1.0],
            [2.0, 2.0],
            [1.0, 2.0],
            [1.0, 1.0],
            [0.0, 1.0],
        ];
        let grid = VertexGrid::new(
            vertices,
            vec![(0..8).collect()],
            Array1::from(vec![1.0]),
            Array2::zeros((1, 1)),
        )
        .unwrap();
        let grid = Grid::from(grid);

        // crosses the upward bump of the cell twice
        let spec = LineSpec::TwoPoint([0.5, 1.5], [2.5, 1.5]);
        let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();
        assert_eq!(xsect.projected_cells().len(), 1);

        let spec = LineSpec::Vertices(vec![[1.5, 0.5], [1.5, 1.5], [2.5, 1.5], [2.5, 0.5]]);
        let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();
        let keys: Vec<_> = xsect.projected_cells().keys().copied().collect();
        assert_eq!(keys, vec![CellKey::new(0, 0, 0), CellKey::new(0, 0, 1)]);
    }

    #[test]
    fn zero_thickness_is_skipped() {
        let mut botm = Array3::zeros((2, 1, 2));
        botm[[1, 0, 0]] = -1.0;
        let grid = StructuredGrid::new(Array1::ones(2), Array1::ones(1), Array2::zeros((1, 2)), botm).unwrap();
        let grid = Grid::from(grid);

        let spec = LineSpec::Row(0);
        let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

        // layer 0 is flat everywhere, layer 1 is flat in node 1
        let keys: Vec<_> = xsect.projected_cells().keys().copied().collect();
        assert_eq!(keys, vec![CellKey::new(1, 0, 0)]);
        assert_eq!(
            xsect
                .warnings()
                .iter()
                .filter(|w| w.kind == DegenerateKind::ZeroThickness)
                .count(),
            3
        );
    }

    #[test]
    fn touch_only_cell_is_warned() {
        let grid = Grid::from(unit_grid(2, 1));
        let spec = LineSpec::TwoPoint([0.0, 0.0], [2.0, 2.0]);
        let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

        // row 0 is the northern row: the diagonal runs through nodes 2 and 1
        let nodes: Vec<_> = xsect.projected_cells().keys().map(|k| k.node).collect();
        assert_eq!(nodes, vec![1, 2]);

        let touched: Vec<_> = xsect.touches().keys().copied().collect();
        assert_eq!(touched, vec![0, 3]);
        assert!(xsect
            .warnings()
            .iter()
            .all(|w| w.kind == DegenerateKind::ZeroLengthIntersection));
        assert_eq!(xsect.xypts()[&0], vec![[1.0, 1.0]]);
    }

    #[test]
    fn extent_covers_every_cell() {
        let grid = Grid::from(unit_grid(4, 2));
        let xsect = CrossSection::new(&grid, &LineSpec::Column(2), ProjectionConfig::default()).unwrap();
        let extent = xsect.extent().unwrap();

        assert_eq!(extent, Rect::new(0.0, 4.0, -2.0, 0.0));
        assert_eq!(xsect.projctr()[&CellKey::new(1, 2, 0)], [0.5, -1.5]);
    }

    #[test]
    fn negative_tolerance_is_an_error() {
        let grid = Grid::from(unit_grid(3, 1));
        let config = ProjectionConfig { tolerance: -1.0 };
        let result = CrossSection::new(&grid, &LineSpec::Row(1), config);
        assert!(matches!(
            result,
            Err(Error::InvalidConfig(ConfigError::InvalidTolerance(_)))
        ));
    }

    #[test]
    fn line_outside_grid() {
        let grid = Grid::from(unit_grid(2, 1));
        let spec = LineSpec::TwoPoint([10.0, 10.0], [12.0, 10.0]);
        let xsect = CrossSection::new(&grid, &spec, ProjectionConfig::default()).unwrap();

        assert!(xsect.projected_cells().is_empty());
        assert!(xsect.extent().is_none());
    }
}
