//! # Cell footprints
//!
//! The plan-view shape of every horizontal cell of a grid. Structured grids
//! produce axis-aligned rectangles (which the intersector clips with a fast
//! path), vertex grids produce the polygon stored for each cell.
//!
//! Footprints are a pure read projection of the grid. They are recomputed for
//! each cross-section and never cached on the grid.

use crate::grid::Grid;
use crate::Point;

/// Axis-aligned rectangle in plan view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Rect {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// smallest rectangle containing every point. `None` for an empty iterator
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Rect::new(first[0], first[0], first[1], first[1]);

        Some(points.fold(init, |r, p| {
            Rect::new(
                r.xmin.min(p[0]),
                r.xmax.max(p[0]),
                r.ymin.min(p[1]),
                r.ymax.max(p[1]),
            )
        }))
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// closed containment test, widened by `tol` on every side
    pub fn contains(&self, p: Point, tol: f64) -> bool {
        p[0] >= self.xmin - tol
            && p[0] <= self.xmax + tol
            && p[1] >= self.ymin - tol
            && p[1] <= self.ymax + tol
    }

    /// true if the two (closed) rectangles share at least one point within `tol`
    pub fn overlaps(&self, other: &Rect, tol: f64) -> bool {
        self.xmin <= other.xmax + tol
            && other.xmin <= self.xmax + tol
            && self.ymin <= other.ymax + tol
            && other.ymin <= self.ymax + tol
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.xmin.min(other.xmin),
            self.xmax.max(other.xmax),
            self.ymin.min(other.ymin),
            self.ymax.max(other.ymax),
        )
    }

    /// corners in counter-clockwise order starting at the lower left
    pub fn corners(&self) -> [Point; 4] {
        [
            [self.xmin, self.ymin],
            [self.xmax, self.ymin],
            [self.xmax, self.ymax],
            [self.xmin, self.ymax],
        ]
    }
}

/// Horizontal footprint of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    Rect(Rect),
    /// polygon ring, first vertex not repeated at the end
    Polygon(Vec<Point>),
}

impl Footprint {
    pub fn bounds(&self) -> Rect {
        match self {
            Footprint::Rect(rect) => *rect,
            Footprint::Polygon(ring) => Rect::bounding(ring.iter().copied())
                .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0)),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Footprint::Rect(rect) => rect.area(),
            Footprint::Polygon(ring) => polygon_area(ring),
        }
    }

    /// zero-area footprints are kept, but never contribute geometry
    pub fn is_degenerate(&self, tol: f64) -> bool {
        self.area() <= tol * tol
    }

    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Footprint::Rect(rect) => rect.corners().to_vec(),
            Footprint::Polygon(ring) => ring.clone(),
        }
    }

    pub fn containment(&self, p: Point, tol: f64) -> Containment {
        match self {
            Footprint::Rect(rect) => {
                if !rect.contains(p, tol) {
                    Containment::Outside
                } else if rect.contains(p, -tol) {
                    Containment::Inside
                } else {
                    Containment::Boundary
                }
            }
            Footprint::Polygon(ring) => point_in_polygon(p, ring, tol),
        }
    }
}

/// Where a point lies relative to a closed footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Boundary,
    Outside,
}

impl Containment {
    /// closed inclusion: boundary points belong to the footprint
    pub fn is_covered(self) -> bool {
        !matches!(self, Containment::Outside)
    }
}

/// Footprint of every horizontal cell of `grid`, indexed by node number
pub fn footprints(grid: &Grid) -> Vec<Footprint> {
    match grid {
        Grid::Structured(structured) => (0..structured.ncpl())
            .map(|node| {
                let (row, col) = structured.row_col(node);
                Footprint::Rect(structured.cell_bounds(row, col))
            })
            .collect(),
        Grid::Vertex(vertex) => (0..vertex.ncpl())
            .map(|node| Footprint::Polygon(vertex.cell_polygon(node)))
            .collect(),
    }
}

/// absolute shoelace area of a ring
pub(crate) fn polygon_area(ring: &[Point]) -> f64 {
    signed_area(ring).abs()
}

pub(crate) fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let twice: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum();

    twice / 2.0
}

/// Area weighted centroid of a ring, falling back to the vertex mean for
/// degenerate rings
pub(crate) fn polygon_centroid(ring: &[Point]) -> Point {
    let area = signed_area(ring);

    if area.abs() <= f64::EPSILON {
        let n = ring.len().max(1) as f64;
        let (sx, sy) = ring
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        return [sx / n, sy / n];
    }

    let (cx, cy) = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .fold((0.0, 0.0), |(cx, cy), (a, b)| {
            let cross = a[0] * b[1] - b[0] * a[1];
            (cx + (a[0] + b[0]) * cross, cy + (a[1] + b[1]) * cross)
        });

    [cx / (6.0 * area), cy / (6.0 * area)]
}

/// distance from `p` to the closed segment `a`-`b`
pub(crate) fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len2 = dx * dx + dy * dy;

    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len2).clamp(0.0, 1.0)
    };

    let (cx, cy) = (a[0] + t * dx, a[1] + t * dy);
    (p[0] - cx).hypot(p[1] - cy)
}

/// Closed point-in-polygon test.
///
/// Points within `tol` of an edge are on the boundary; the remaining points are
/// classified by casting a ray in the +x direction and counting edge crossings.
pub(crate) fn point_in_polygon(p: Point, ring: &[Point], tol: f64) -> Containment {
    let n = ring.len();
    if n < 3 {
        return Containment::Outside;
    }

    for i in 0..n {
        if distance_to_segment(p, ring[i], ring[(i + 1) % n]) <= tol {
            return Containment::Boundary;
        }
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);

        if ((yi > p[1]) != (yj > p[1])) && (p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi) {
            inside = !inside;
        }

        j = i;
    }

    if inside {
        Containment::Inside
    } else {
        Containment::Outside
    }
}
