#![doc = include_str!("../README.md")]

pub mod config;
pub mod cross_section;
pub mod error;
pub mod footprint;
pub mod grid;
pub mod intersect;
pub mod line;
pub mod package;
pub mod prelude;
pub mod render;
mod traits;
mod write_vtp;

pub use traits::{BoundaryCondition, CellValues};

pub use config::{CheckThresholds, PackageConfig, ProjectionConfig};
pub use cross_section::{CellKey, CrossSection, GeometryDegenerateWarning, ProjectedCell};
pub use error::{ConfigError, InvalidLineError, PackageError, ShapeMismatch, UnsupportedGridError};
pub use grid::{Grid, StructuredGrid, VertexGrid};
pub use line::{Line, LineSpec, LineString, Segment};
pub use render::{Axes, Collection, Patch};

pub use write_vtp::{write_vtp, Encoding};

pub use ndarray;

/// plan-view coordinate `[x, y]`
pub type Point = [f64; 2];

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid cross-section line: {0}")]
    InvalidLine(#[from] InvalidLineError),
    #[error("Invalid projection settings: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Grid cannot be projected: {0}")]
    UnsupportedGrid(#[from] UnsupportedGridError),
    #[error("Array does not match the grid: {0}")]
    ArrayShape(#[from] ShapeMismatch),
    #[error("Package error: {0}")]
    Package(#[from] PackageError),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}
