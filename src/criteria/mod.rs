#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grading criteria tree (sheet, section, subsection, detail), filled-out
//! instances of it, and point aggregation.

/// Earned/out-of totals with unknown-value semantics.
pub mod aggregate;
/// A sheet tied to a part and group.
pub mod instance;
/// The criteria tree itself.
pub mod sheet;

pub use aggregate::{Aggregate, Total, aggregate};
pub use instance::{GroupId, Instance, PartId, SheetType};
pub use sheet::{Detail, Section, SectionId, Sheet, Subsection, SubsectionId};
