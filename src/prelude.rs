//! Common traits and types that are useful for working with `aquigrid`
#![allow(unused_imports)]

pub use crate::config::{CheckThresholds, PackageConfig, ProjectionConfig};
pub use crate::cross_section::{CellKey, CrossSection, ProjectedCell};
pub use crate::grid::{Grid, StructuredGrid, VertexGrid};
pub use crate::line::{LineSpec, LineString};
pub use crate::render::{Axes, Collection};
pub use crate::traits::{BoundaryCondition, CellValues};
pub use crate::Point;

pub(crate) use crate::Error;
pub(crate) use std::io::Write;

pub(crate) use ndarray::ArrayView2;
