#![forbid(unsafe_code)]
#![deny(
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    missing_docs
)]

//! Deferred values over the outcomes of mid-circuit measurements.
//!
//! A circuit may measure a qubit partway through, and later logic (conditioned gates, returned
//! statistics) must be expressed before the circuit runs. [measure] returns a
//! [MeasurementValue](value::MeasurementValue) standing for the unknown 0/1 outcome. Values are
//! combined with arithmetic, comparison and boolean operators without being evaluated, and every
//! branch of outcomes can be enumerated once the expression is built.
//!
//! # Example
//! ```
//! use qip_midmeasure::prelude::*;
//!
//! # fn main() -> MeasurementResult<()> {
//! // Two independent measurements, possibly on the same wire.
//! let m0 = measure(0)?;
//! let m1 = measure(0)?;
//!
//! // Build a lazy expression of both outcomes.
//! let parity = (&m0 + &m1).equals(1);
//! assert_eq!(parity.measurements().len(), 2);
//!
//! // Enumerate every outcome branch.
//! let branches = parity.branches()?;
//! assert_eq!(branches.len(), 4);
//! assert_eq!(branches.values().filter(|v| v.truthy()).count(), 2);
//!
//! // Branches read big-endian over the (id ordered) measurements.
//! assert_eq!(parity.branch(0b01)?, Outcome::Bool(true));
//! assert!(parity.branch(4).is_err());
//!
//! // Each line reads "if <id>=<bit>,<id>=<bit> => <value>".
//! println!("{}", parity);
//! # Ok(())
//! # }
//! ```
//!
//! # Recording
//! A [LocalRecorder](builder::LocalRecorder) keeps measurements and the gates conditioned on them
//! in circuit order.
//! ```
//! use qip_midmeasure::prelude::*;
//!
//! # fn main() -> MeasurementResult<()> {
//! let mut b = LocalRecorder::default();
//! let m = b.measure(1)?;
//! b.cond(&!&m, "X", 1)?;
//! assert_eq!(b.pipeline_depth(), 2);
//! # Ok(())
//! # }
//! ```

/// A recording builder for measurements and conditioned operations.
pub mod builder;
/// Standard traits for recording builders.
pub mod builder_traits;
/// Measurement error types.
pub mod errors;
/// Mid-circuit measurement requests.
pub mod measurement;
/// Concrete outcomes and the operators defined over deferred values.
pub mod operators;
/// Helpers for converting from synchronous to parallel iterators.
pub(crate) mod rayon_helper;
/// Reusable types.
pub mod types;
/// Utility functions for branch index manipulation.
pub mod utils;
/// Deferred measurement values.
pub mod value;

pub use types::*;
pub use value::measure;

/// Commonly used types and traits.
/// ```
/// use qip_midmeasure::prelude::*;
/// ```
pub mod prelude {
    pub use super::*;
    pub use crate::builder::LocalRecorder;
    pub use crate::builder_traits::*;
    pub use crate::errors::*;
    pub use crate::measurement::{MeasurementProcess, MidMeasure};
    pub use crate::operators::{BinaryOp, Operand, Outcome, UnaryOp};
    pub use crate::value::MeasurementValue;
}
