//! # Model packages
//!
//! Packages carry the stress-period input of a groundwater model and know which
//! cells they apply to, which is what a cross-section needs to draw them (see
//! [`BoundaryCondition`](crate::BoundaryCondition)).
//!
//! The recharge package ([`Recharge`]) can be written to and read from the fixed
//! text format used by MODFLOW-2005:
//!
//! ```text
//! # heading
//!          3         0                       <- NRCHOP, IRCHCB
//!          1        -1 # Stress period 1     <- INRECH, INIRCH
//! CONSTANT         0.001  #rech_1            <- RECH array
//!         -1        -1 # Stress period 2     <- re-use the previous RECH
//! ```
//!
//! Arrays are written as a `CONSTANT` record when every value is the same and as a
//! free-format `INTERNAL` block otherwise.

mod array_io;
mod check;
mod list;
mod recharge;
mod transient;

pub use check::{CheckEntry, CheckSummary, Transmissivity};
pub use list::ListBoundary;
pub use recharge::{Recharge, RechargeOption};
pub use transient::{KperEntry, Transient2d};
