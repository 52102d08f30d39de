//! # Segment / cell intersection
//!
//! Clips a single straight segment of a cross-section line against the closed
//! footprint of one cell. The result is expressed in *stations*: distance along the
//! whole line, so that records of consecutive segments can be merged without any
//! further bookkeeping.
//!
//! Boundaries are inclusive. A segment that runs exactly along the edge shared by
//! two cells overlaps both of them, and a segment that only touches a cell (at a
//! corner, or tangentially) produces a touch instead of an interval. Every decision
//! of the form "are these the same point" is made against
//! [`ProjectionConfig::tolerance`].
//!
//! Rectangular footprints go through a Liang-Barsky style clip; every other
//! footprint is split at its edge crossings and each piece is classified by its
//! midpoint, which handles concave cells that are entered more than once.

use crate::config::ProjectionConfig;
use crate::footprint::{Footprint, Rect};
use crate::line::{Line, Segment};
use crate::Point;

/// Overlap of a segment with a cell, `start <= end`, in stations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationInterval {
    pub start: f64,
    pub end: f64,
    /// plan-view point where the line enters the cell
    pub entry: Point,
    /// plan-view point where the line leaves the cell
    pub exit: Point,
}

impl StationInterval {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// A single point where the line touches a cell without overlapping it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationPoint {
    pub station: f64,
    pub point: Point,
}

/// Everything a segment has in common with one footprint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionRecord {
    /// disjoint overlaps, sorted by station
    pub intervals: Vec<StationInterval>,
    /// isolated touching points, sorted by station
    pub touches: Vec<StationPoint>,
}

impl IntersectionRecord {
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty() && self.touches.is_empty()
    }

    /// the line reaches the cell, but never with positive length
    pub fn is_touch_only(&self) -> bool {
        self.intervals.is_empty() && !self.touches.is_empty()
    }
}

/// Intersection record of one segment of a line with one cell
#[derive(Debug, Clone, PartialEq)]
pub struct CellIntersection {
    /// index of the segment within the line
    pub segment: usize,
    pub node: usize,
    pub record: IntersectionRecord,
}

/// Intersect `segment` with the closed `footprint`.
///
/// `offset` is the station of `segment.start`. Zero-area footprints never intersect
/// anything.
pub fn intersect(
    segment: &Segment,
    footprint: &Footprint,
    offset: f64,
    config: &ProjectionConfig,
) -> IntersectionRecord {
    let tol = config.tolerance;
    let length = segment.length();
    debug_assert!(length > 0.0, "segments of a normalized line have positive length");

    if footprint.is_degenerate(tol) {
        return IntersectionRecord::default();
    }

    let (intervals, mut touches) = match footprint {
        Footprint::Rect(rect) => clip_rect(segment, rect, tol),
        Footprint::Polygon(_) => clip_polygon(segment, footprint, tol),
    };

    let mut record = IntersectionRecord::default();

    for (t0, t1) in intervals {
        if (t1 - t0) * length <= tol {
            touches.push((t0 + t1) / 2.0);
            continue;
        }

        record.intervals.push(StationInterval {
            start: offset + t0 * length,
            end: offset + t1 * length,
            entry: segment.point_at(t0),
            exit: segment.point_at(t1),
        });
    }

    touches.sort_by(f64::total_cmp);
    touches.dedup_by(|b, a| (*b - *a) * length <= tol);

    record.touches = touches
        .into_iter()
        .map(|t| StationPoint {
            station: offset + t * length,
            point: segment.point_at(t),
        })
        .collect();

    record
}

/// Intersect every segment of `line` with every footprint.
///
/// Footprints whose bounds do not reach the segment are skipped without clipping.
/// Results are ordered by segment, then by node, regardless of how the work is
/// scheduled.
pub fn intersect_line(
    line: &Line,
    footprints: &[Footprint],
    config: &ProjectionConfig,
) -> Vec<CellIntersection> {
    let offsets = line.station_offsets();

    line.segments()
        .enumerate()
        .flat_map(|(index, segment)| {
            intersect_segment(index, &segment, offsets[index], footprints, config)
        })
        .collect()
}

fn intersect_segment(
    index: usize,
    segment: &Segment,
    offset: f64,
    footprints: &[Footprint],
    config: &ProjectionConfig,
) -> Vec<CellIntersection> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        footprints
            .par_iter()
            .enumerate()
            .filter_map(|(node, footprint)| {
                intersect_cell(index, segment, offset, node, footprint, config)
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        footprints
            .iter()
            .enumerate()
            .filter_map(|(node, footprint)| {
                intersect_cell(index, segment, offset, node, footprint, config)
            })
            .collect()
    }
}

fn intersect_cell(
    index: usize,
    segment: &Segment,
    offset: f64,
    node: usize,
    footprint: &Footprint,
    config: &ProjectionConfig,
) -> Option<CellIntersection> {
    if !footprint
        .bounds()
        .overlaps(&segment.bounds(), config.tolerance)
    {
        return None;
    }

    let record = intersect(segment, footprint, offset, config);

    if record.is_empty() {
        None
    } else {
        Some(CellIntersection {
            segment: index,
            node,
            record,
        })
    }
}

/// parameter intervals and touching parameters of a segment clip
type Clip = (Vec<(f64, f64)>, Vec<f64>);

fn clip_rect(segment: &Segment, rect: &Rect, tol: f64) -> Clip {
    let [x0, y0] = segment.start;
    let [dx, dy] = segment.delta();
    let slack = tol / segment.length();

    // p_k * t <= q_k for every side of the rectangle
    let p = [-dx, dx, -dy, dy];
    let q = [x0 - rect.xmin, rect.xmax - x0, y0 - rect.ymin, rect.ymax - y0];

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (pk, qk) in p.into_iter().zip(q) {
        if pk.abs() <= tol {
            // parallel to this side
            if qk < -tol {
                return (Vec::new(), Vec::new());
            }
            continue;
        }

        let r = qk / pk;
        if pk < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
    }

    if t0 > t1 + slack {
        return (Vec::new(), Vec::new());
    }

    (vec![(t0, t1.max(t0))], Vec::new())
}

fn clip_polygon(segment: &Segment, footprint: &Footprint, tol: f64) -> Clip {
    let ring = footprint.vertices();
    let length = segment.length();
    let slack = tol / length;
    let r = segment.delta();

    let mut ts = vec![0.0, 1.0];

    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let s = [b[0] - a[0], b[1] - a[1]];
        let qp = [a[0] - segment.start[0], a[1] - segment.start[1]];
        let s_len = s[0].hypot(s[1]);
        if s_len == 0.0 {
            continue;
        }

        let denom = cross(r, s);

        if denom.abs() <= tol * length * s_len {
            // parallel, only collinear edges contribute (their end points)
            if cross(qp, r).abs() / length <= tol {
                for vertex in [*a, b] {
                    let t = dot([vertex[0] - segment.start[0], vertex[1] - segment.start[1]], r)
                        / (length * length);
                    if t > -slack && t < 1.0 + slack {
                        ts.push(t.clamp(0.0, 1.0));
                    }
                }
            }
            continue;
        }

        let t = cross(qp, s) / denom;
        let u = cross(qp, r) / denom;
        let u_slack = tol / s_len;

        if t >= -slack && t <= 1.0 + slack && u >= -u_slack && u <= 1.0 + u_slack {
            ts.push(t.clamp(0.0, 1.0));
        }
    }

    ts.sort_by(f64::total_cmp);
    ts.dedup_by(|b, a| *b - *a <= slack);

    // classify every piece between two consecutive crossings by its midpoint
    let mut intervals: Vec<(f64, f64)> = Vec::new();
    for w in ts.windows(2) {
        let mid = segment.point_at((w[0] + w[1]) / 2.0);
        if !footprint.containment(mid, tol).is_covered() {
            continue;
        }

        match intervals.last_mut() {
            Some(last) if (w[0] - last.1).abs() <= slack => last.1 = w[1],
            _ => intervals.push((w[0], w[1])),
        }
    }

    let touches = ts
        .iter()
        .copied()
        .filter(|t| {
            !intervals
                .iter()
                .any(|(t0, t1)| *t >= t0 - slack && *t <= t1 + slack)
        })
        .filter(|t| footprint.containment(segment.point_at(*t), tol).is_covered())
        .collect();

    (intervals, touches)
}

fn cross(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}
