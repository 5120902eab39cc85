//! # gradesheet
//!
//! Grading sheets for course-management tools: the criteria tree a part is
//! graded against, filled-out instances of it stored as GML, and the late
//! policies that turn a group's submission time into a score adjustment.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Process-wide settings read from the environment
pub mod config;
/// The criteria tree, filled-out instances and point totals
pub mod criteria;
/// Deadline policies and timing resolution
pub mod deadline;
/// Error types
pub mod error;
/// GML encoding and decoding
pub mod gml;

pub use criteria::{Instance, Sheet, Total, aggregate};
pub use deadline::{DeadlineSpec, Resolution, TimeStatus, resolve};
pub use error::{CriteriaError, DeadlineError, Error, GmlError};
pub use gml::{decode, encode};

/// The outcome of scoring one part for one group.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Totals as graded, before timing is considered.
    pub raw:        Total,
    /// Timing resolution.
    pub resolution: Resolution,
    /// Totals of the policy's scope after the resolution is applied.
    pub adjusted:   Total,
}

/// Aggregates an instance and resolves its submission time in one go.
///
/// `assignment` holds the whole-assignment totals, used when the policy
/// affects every part; when `None`, the instance's own totals stand in for
/// them.
pub fn score(
    instance: &Instance,
    spec: &DeadlineSpec,
    submission: chrono::DateTime<chrono::Utc>,
    assignment: Option<Total>,
) -> Result<Score, DeadlineError> {
    let raw = aggregate(instance);
    let scoped = spec.scope().select(raw, assignment.unwrap_or(raw));
    let resolution = resolve(spec, submission, scoped.out_of, scoped.earned)?;

    tracing::info!(
        part = %instance.part(),
        group = %instance.group(),
        status = %resolution.status,
        adjustment = resolution.adjustment,
        "scored submission"
    );
    Ok(Score {
        raw,
        resolution,
        adjusted: resolution.apply_total(scoped),
    })
}
