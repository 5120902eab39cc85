#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Deadline policies and how a submission's timing changes its score.

/// Late periods written as text.
pub mod period;
/// Classification and adjustment.
pub mod resolve;
/// Policy shapes, scopes and extensions.
pub mod spec;

pub use period::LatePeriod;
pub use resolve::{DeadlineResolver, Resolution, TimeStatus, resolve};
pub use spec::{DeadlineSpec, Extension, GradeUnit, Scope};
