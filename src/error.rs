//! error types for line normalization, grid validation and package I/O
//!
//! Every failure that is caused by user input lands in one of these types and is
//! surfaced through [`Error`](`crate::Error`). Degenerate geometry found while
//! projecting is *not* an error: it is reported as a
//! [`GeometryDegenerateWarning`](`crate::cross_section::GeometryDegenerateWarning`)
//! on the finished cross-section.

use derive_more::{Constructor, Display, From};

/// Malformed or degenerate line specification.
///
/// Always surfaced to the caller: a bad line is never silently corrected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidLineError {
    #[error("line specification contains no vertices")]
    Empty,
    #[error("a line needs at least 2 vertices, found {found}")]
    TooFewVertices { found: usize },
    #[error("vertex {index} is not an (x, y) pair")]
    NotAPair { index: usize },
    #[error("vertex {index} has a non-numeric coordinate")]
    NonNumeric { index: usize },
    #[error("vertex {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("vertex {index} repeats the previous vertex")]
    RepeatedVertex { index: usize },
    #[error("row {row} is outside of a grid with {nrow} rows")]
    RowOutOfRange { row: usize, nrow: usize },
    #[error("column {column} is outside of a grid with {ncol} columns")]
    ColumnOutOfRange { column: usize, ncol: usize },
    #[error("row and column lines can only be traced across a structured grid")]
    RequiresStructuredGrid,
    #[error("unrecognized line specification: {0}")]
    Malformed(String),
}

/// The grid is missing data the projection needs, or its arrays disagree
/// with each other.
#[derive(Debug, thiserror::Error, From)]
pub enum UnsupportedGridError {
    #[error("{0}")]
    ShapeMismatch(ShapeMismatch),
    #[error("{0}")]
    VertexOutOfRange(VertexOutOfRange),
    #[error("{0}")]
    InvalidSpacing(InvalidSpacing),
    #[error("{0}")]
    NonFinite(NonFiniteValue),
    #[error("grid does not contain any cells")]
    #[from(ignore)]
    Empty,
}

#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(fmt = "array `{}` has shape {:?}, expected {:?}", array_name, actual, expected)]
pub struct ShapeMismatch {
    pub(crate) array_name: String,
    pub(crate) expected: Vec<usize>,
    pub(crate) actual: Vec<usize>,
}

impl std::error::Error for ShapeMismatch {}

#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(
    fmt = "cell {} references vertex {}, but the grid only has {} vertices",
    cell,
    vertex,
    num_vertices
)]
pub struct VertexOutOfRange {
    cell: usize,
    vertex: usize,
    num_vertices: usize,
}

#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(fmt = "`{}` entry {} must be finite and positive, got {}", array_name, index, value)]
pub struct InvalidSpacing {
    array_name: &'static str,
    index: usize,
    value: f64,
}

/// Missing (NaN) or infinite elevation or coordinate data.
///
/// `index` counts the values of the array in row-major order.
#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(fmt = "`{}` value {} must be finite, got {}", array_name, index, value)]
pub struct NonFiniteValue {
    array_name: &'static str,
    index: usize,
    value: f64,
}

/// Settings that would make every geometric decision meaningless
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tolerance must be finite and positive, got {0}")]
    InvalidTolerance(f64),
}

/// Errors reading, writing or checking a package file.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("unexpected end of file while reading {what}")]
    UnexpectedEof { what: String },
    #[error("parameter input is not supported ({npar} parameters declared)")]
    Parameters { npar: i64 },
    #[error("unsupported array control record `{0}`")]
    UnsupportedArrayControl(String),
    #[error("invalid recharge option {0}, expected 1, 2 or 3")]
    InvalidOption(i64),
    #[error("specified-layer recharge requires an `irch` array")]
    MissingLayerArray,
    #[error("{0}")]
    Shape(#[from] ShapeMismatch),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
}

impl PackageError {
    pub(crate) fn parse<T: Into<String>>(line: usize, reason: T) -> Self {
        Self::Parse {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn eof<T: Into<String>>(what: T) -> Self {
        Self::UnexpectedEof { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_message() {
        let err = ShapeMismatch::new("botm".into(), vec![1, 10, 10], vec![1, 10, 9]);
        assert_eq!(
            err.to_string(),
            "array `botm` has shape [1, 10, 9], expected [1, 10, 10]"
        );
    }

    #[test]
    fn non_finite_message() {
        let err: UnsupportedGridError = NonFiniteValue::new("top", 4, f64::NAN).into();
        assert_eq!(err.to_string(), "`top` value 4 must be finite, got NaN");
    }

    #[test]
    fn grid_error_from_detail() {
        let err: UnsupportedGridError = VertexOutOfRange::new(3, 12, 10).into();
        assert!(matches!(err, UnsupportedGridError::VertexOutOfRange(_)));
        assert!(err.to_string().contains("vertex 12"));
    }
}
