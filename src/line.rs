//! # Line normalization
//!
//! A cross-section line can be written down in several equivalent ways. Every
//! accepted shape is a variant of [`LineSpec`], and [`normalize`] turns all of them
//! into the same [`Line`]: an ordered list of at least two finite vertices, with no
//! vertex repeating its predecessor.
//!
//! ```
//! use aquigrid::line::{normalize, LineSpec, LineString};
//!
//! let a = normalize(&LineSpec::TwoPoint([0.0, 0.0], [10.0, 10.0])).unwrap();
//! let b = normalize(&LineSpec::Vertices(vec![[0.0, 0.0], [10.0, 10.0]])).unwrap();
//! let c = normalize(&LineSpec::Geometry(LineString::new(vec![[0.0, 0.0], [10.0, 10.0]]))).unwrap();
//! let d = normalize(&LineSpec::Raw(serde_json::json!([[0, 0], [10, 10]]))).unwrap();
//!
//! assert_eq!(a, b);
//! assert_eq!(b, c);
//! assert_eq!(c, d);
//! ```
//!
//! Untyped input ([`LineSpec::Raw`]) is checked strictly: a bare pair of numbers
//! such as `[0, 0]` is rejected rather than guessed at.

use crate::error::InvalidLineError;
use crate::footprint::Rect;
use crate::grid::Grid;
use crate::Point;

use serde_json::Value;

/// Every accepted way of describing a cross-section line
#[derive(Debug, Clone, PartialEq)]
pub enum LineSpec {
    /// shorthand for a single segment
    TwoPoint(Point, Point),
    Vertices(Vec<Point>),
    /// a geometry object exposing its coordinate sequence
    Geometry(LineString),
    /// untyped nested arrays (`[[x0, y0], [x1, y1], ...]`) or a GeoJSON
    /// `LineString` object, as found in configuration files
    Raw(Value),
    /// through the cell centers of a structured grid row, west to east
    Row(usize),
    /// through the cell centers of a structured grid column, north to south
    Column(usize),
}

impl From<Vec<Point>> for LineSpec {
    fn from(x: Vec<Point>) -> Self {
        LineSpec::Vertices(x)
    }
}

impl From<(Point, Point)> for LineSpec {
    fn from(x: (Point, Point)) -> Self {
        LineSpec::TwoPoint(x.0, x.1)
    }
}

impl From<LineString> for LineSpec {
    fn from(x: LineString) -> Self {
        LineSpec::Geometry(x)
    }
}

impl From<Value> for LineSpec {
    fn from(x: Value) -> Self {
        LineSpec::Raw(x)
    }
}

/// Minimal line geometry object.
///
/// Mirrors what GIS libraries expose: a coordinate sequence that can be
/// iterated. It can be read from and written to GeoJSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    coords: Vec<Point>,
}

impl LineString {
    pub fn new(coords: Vec<Point>) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> impl Iterator<Item = Point> + '_ {
        self.coords.iter().copied()
    }

    /// read a GeoJSON `LineString` geometry
    pub fn from_geojson(value: &Value) -> Result<Self, InvalidLineError> {
        let object = value
            .as_object()
            .ok_or_else(|| InvalidLineError::Malformed("expected a GeoJSON object".into()))?;

        match object.get("type").and_then(Value::as_str) {
            Some("LineString") => (),
            Some(other) => {
                return Err(InvalidLineError::Malformed(format!(
                    "GeoJSON geometry of type `{other}` is not a LineString"
                )))
            }
            None => {
                return Err(InvalidLineError::Malformed(
                    "GeoJSON object without a `type` member".into(),
                ))
            }
        }

        let coordinates = object.get("coordinates").ok_or_else(|| {
            InvalidLineError::Malformed("GeoJSON LineString without `coordinates`".into())
        })?;

        Ok(Self::new(json_vertices(coordinates)?))
    }

    pub fn to_geojson(&self) -> Value {
        serde_json::json!({
            "type": "LineString",
            "coordinates": self.coords,
        })
    }
}

/// A straight piece of a [`Line`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn delta(&self) -> [f64; 2] {
        [self.end[0] - self.start[0], self.end[1] - self.start[1]]
    }

    pub fn length(&self) -> f64 {
        let [dx, dy] = self.delta();
        dx.hypot(dy)
    }

    /// unit direction vector
    pub fn direction(&self) -> [f64; 2] {
        let [dx, dy] = self.delta();
        let length = self.length();
        [dx / length, dy / length]
    }

    /// point at parameter `t` (0 at `start`, 1 at `end`)
    pub fn point_at(&self, t: f64) -> Point {
        let [dx, dy] = self.delta();
        [self.start[0] + t * dx, self.start[1] + t * dy]
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.start[0].min(self.end[0]),
            self.start[0].max(self.end[0]),
            self.start[1].min(self.end[1]),
            self.start[1].max(self.end[1]),
        )
    }
}

/// Normalized polyline: at least two finite vertices, no consecutive repeats
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    vertices: Vec<Point>,
}

impl Line {
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.vertices.windows(2).map(|w| Segment::new(w[0], w[1]))
    }

    pub fn num_segments(&self) -> usize {
        self.vertices.len() - 1
    }

    /// station (distance along the line) at every vertex, starting at 0
    pub fn station_offsets(&self) -> Vec<f64> {
        let mut station = 0.0;
        std::iter::once(0.0)
            .chain(self.segments().map(|segment| {
                station += segment.length();
                station
            }))
            .collect()
    }

    pub fn length(&self) -> f64 {
        self.segments().map(|segment| segment.length()).sum()
    }

    pub fn bounds(&self) -> Rect {
        // a line always has vertices
        Rect::bounding(self.vertices.iter().copied())
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    /// index of the segment that contains `station`
    pub fn segment_at(&self, station: f64) -> usize {
        let offsets = self.station_offsets();
        let last = self.num_segments() - 1;
        offsets[1..]
            .iter()
            .position(|end| station <= *end)
            .unwrap_or(last)
            .min(last)
    }
}

/// Normalize a line that does not depend on a grid.
///
/// [`LineSpec::Row`] and [`LineSpec::Column`] need a grid to be resolved; use
/// [`normalize_with_grid`] for those.
pub fn normalize(spec: &LineSpec) -> Result<Line, InvalidLineError> {
    match spec {
        LineSpec::TwoPoint(start, end) => from_vertices(vec![*start, *end]),
        LineSpec::Vertices(vertices) => from_vertices(vertices.clone()),
        LineSpec::Geometry(geometry) => from_vertices(geometry.coords().collect()),
        LineSpec::Raw(value) => from_vertices(raw_vertices(value)?),
        LineSpec::Row(_) | LineSpec::Column(_) => Err(InvalidLineError::RequiresStructuredGrid),
    }
}

/// Normalize any line specification, resolving row and column lines against `grid`.
pub fn normalize_with_grid(spec: &LineSpec, grid: &Grid) -> Result<Line, InvalidLineError> {
    let vertices = match spec {
        LineSpec::Row(row) => {
            let grid = grid
                .as_structured()
                .ok_or(InvalidLineError::RequiresStructuredGrid)?;
            if *row >= grid.nrow() {
                return Err(InvalidLineError::RowOutOfRange {
                    row: *row,
                    nrow: grid.nrow(),
                });
            }
            let extent = grid.extent();
            let y = grid.cell_center(*row, 0)[1];
            vec![[extent.xmin, y], [extent.xmax, y]]
        }
        LineSpec::Column(column) => {
            let grid = grid
                .as_structured()
                .ok_or(InvalidLineError::RequiresStructuredGrid)?;
            if *column >= grid.ncol() {
                return Err(InvalidLineError::ColumnOutOfRange {
                    column: *column,
                    ncol: grid.ncol(),
                });
            }
            let extent = grid.extent();
            let x = grid.cell_center(0, *column)[0];
            vec![[x, extent.ymax], [x, extent.ymin]]
        }
        other => return normalize(other),
    };

    from_vertices(vertices)
}

fn from_vertices(vertices: Vec<Point>) -> Result<Line, InvalidLineError> {
    if vertices.is_empty() {
        return Err(InvalidLineError::Empty);
    }

    if let Some(index) = vertices
        .iter()
        .position(|v| !v[0].is_finite() || !v[1].is_finite())
    {
        return Err(InvalidLineError::NonFinite { index });
    }

    if vertices.len() < 2 {
        return Err(InvalidLineError::TooFewVertices {
            found: vertices.len(),
        });
    }

    if let Some(index) = vertices.windows(2).position(|w| w[0] == w[1]) {
        return Err(InvalidLineError::RepeatedVertex { index: index + 1 });
    }

    Ok(Line { vertices })
}

fn raw_vertices(value: &Value) -> Result<Vec<Point>, InvalidLineError> {
    match value {
        Value::Object(_) => Ok(LineString::from_geojson(value)?.coords),
        _ => json_vertices(value),
    }
}

/// nested arrays of numbers to a vertex list
fn json_vertices(value: &Value) -> Result<Vec<Point>, InvalidLineError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Err(InvalidLineError::Empty),
        other => {
            return Err(InvalidLineError::Malformed(format!(
                "expected a list of vertices, got `{other}`"
            )))
        }
    };

    if items.is_empty() {
        return Err(InvalidLineError::Empty);
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| json_point(index, item))
        .collect()
}

fn json_point(index: usize, item: &Value) -> Result<Point, InvalidLineError> {
    match item {
        Value::Array(pair) if pair.len() == 2 => {
            let x = pair[0]
                .as_f64()
                .ok_or(InvalidLineError::NonNumeric { index })?;
            let y = pair[1]
                .as_f64()
                .ok_or(InvalidLineError::NonNumeric { index })?;
            Ok([x, y])
        }
        Value::String(_) | Value::Bool(_) | Value::Null => {
            Err(InvalidLineError::NonNumeric { index })
        }
        // bare numbers, objects, and lists that are not pairs
        _ => Err(InvalidLineError::NotAPair { index }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::StructuredGrid;
    use ndarray::{Array1, Array2, Array3};
    use serde_json::json;

    #[test]
    fn encodings_agree() {
        let expected = vec![[0.0, 0.0], [4.0, 6.0], [10.0, 10.0]];

        let specs = vec![
            LineSpec::Vertices(expected.clone()),
            LineSpec::Geometry(LineString::new(expected.clone())),
            LineSpec::Raw(json!([[0, 0], [4, 6], [10, 10]])),
            LineSpec::Raw(json!({"type": "LineString", "coordinates": [[0, 0], [4, 6], [10, 10]]})),
        ];

        for spec in specs {
            assert_eq!(normalize(&spec).unwrap().vertices(), expected.as_slice());
        }
    }

    #[test]
    fn rejects_degenerate_input() {
        let cases = vec![
            (json!(0), "scalar"),
            (json!([]), "empty"),
            (json!([[]]), "empty pair"),
            (json!([0]), "single number"),
            (json!([0, 0]), "bare pair"),
            (json!([[0, 0]]), "single vertex"),
            (json!([[0, "a"], [1, 1]]), "non numeric"),
            (json!([[0, 0, 0], [1, 1, 1]]), "3d vertices"),
            (json!({"type": "Point", "coordinates": [0, 0]}), "wrong geojson"),
        ];

        for (value, reason) in cases {
            assert!(
                normalize(&LineSpec::Raw(value)).is_err(),
                "{reason} should be rejected"
            );
        }
    }

    #[test]
    fn specific_errors() {
        assert_eq!(
            normalize(&LineSpec::Raw(json!([0, 0]))),
            Err(InvalidLineError::NotAPair { index: 0 })
        );
        assert_eq!(
            normalize(&LineSpec::Raw(json!([[0, 0]]))),
            Err(InvalidLineError::TooFewVertices { found: 1 })
        );
        assert_eq!(
            normalize(&LineSpec::Vertices(vec![])),
            Err(InvalidLineError::Empty)
        );
        assert_eq!(
            normalize(&LineSpec::Vertices(vec![[0.0, 0.0], [0.0, 0.0], [1.0, 1.0]])),
            Err(InvalidLineError::RepeatedVertex { index: 1 })
        );
        assert_eq!(
            normalize(&LineSpec::TwoPoint([0.0, f64::NAN], [1.0, 1.0])),
            Err(InvalidLineError::NonFinite { index: 0 })
        );
    }

    #[test]
    fn stations_accumulate() {
        let line = normalize(&LineSpec::Vertices(vec![[0.0, 0.0], [3.0, 4.0], [3.0, 10.0]])).unwrap();
        assert_eq!(line.station_offsets(), vec![0.0, 5.0, 11.0]);
        assert_eq!(line.length(), 11.0);
        assert_eq!(line.segment_at(2.0), 0);
        assert_eq!(line.segment_at(5.0), 0);
        assert_eq!(line.segment_at(7.0), 1);
        assert_eq!(line.segment_at(50.0), 1);
    }

    #[test]
    fn row_and_column_lines() {
        let grid = StructuredGrid::new(
            Array1::ones(4),
            Array1::from(vec![2.0, 2.0, 2.0]),
            Array2::ones((3, 4)),
            Array3::zeros((1, 3, 4)),
        )
        .unwrap();
        let grid = Grid::from(grid);

        let row = normalize_with_grid(&LineSpec::Row(0), &grid).unwrap();
        assert_eq!(row.vertices(), &[[0.0, 5.0], [4.0, 5.0]]);

        let column = normalize_with_grid(&LineSpec::Column(2), &grid).unwrap();
        assert_eq!(column.vertices(), &[[2.5, 6.0], [2.5, 0.0]]);

        assert_eq!(
            normalize_with_grid(&LineSpec::Row(3), &grid),
            Err(InvalidLineError::RowOutOfRange { row: 3, nrow: 3 })
        );
        assert_eq!(
            normalize(&LineSpec::Column(0)),
            Err(InvalidLineError::RequiresStructuredGrid)
        );
    }

    #[test]
    fn geojson_round_trip() {
        let geometry = LineString::new(vec![[1.0, 2.0], [3.0, 4.0]]);
        let value = geometry.to_geojson();
        assert_eq!(LineString::from_geojson(&value).unwrap(), geometry);
    }
}
