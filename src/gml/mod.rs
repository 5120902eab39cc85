#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Reading and writing grading instances in GML, the XML-based exchange
//! format:
//!
//! ```text
//! <grading-sheet version="..." type="ADDITIVE">
//!   <section name="...">
//!     <comments>free text</comments>
//!     <subsection name="..." outOf="10.0" earned="8.0">
//!       <detail>free text</detail>
//!     </subsection>
//!   </section>
//! </grading-sheet>
//! ```

use std::path::Path;

use crate::{
    criteria::{GroupId, Instance, PartId},
    error::GmlError,
};

/// Document to instance.
pub mod decode;
/// Instance to document.
pub mod encode;
/// The underlying markup reader.
pub mod markup;

pub use decode::decode;
pub use encode::encode;

/// Root element tag.
pub const ROOT: &str = "grading-sheet";
/// Section element tag.
pub const SECTION: &str = "section";
/// Section comment element tag.
pub const COMMENTS: &str = "comments";
/// Subsection element tag.
pub const SUBSECTION: &str = "subsection";
/// Detail element tag.
pub const DETAIL: &str = "detail";

/// Root attribute carrying the format version.
pub const ATTR_VERSION: &str = "version";
/// Root attribute carrying the sheet type.
pub const ATTR_TYPE: &str = "type";
/// Name attribute of sections and subsections.
pub const ATTR_NAME: &str = "name";
/// Out-of attribute of subsections.
pub const ATTR_OUT_OF: &str = "outOf";
/// Earned attribute of subsections.
pub const ATTR_EARNED: &str = "earned";

/// Reads and decodes a GML file.
pub fn decode_file(
    path: impl AsRef<Path>,
    part: impl Into<PartId>,
    group: impl Into<GroupId>,
) -> Result<Instance, GmlError> {
    let document = std::fs::read_to_string(path.as_ref())?;
    decode(&document, part, group)
}

/// Encodes an instance and writes it to `path`, replacing any existing file.
pub fn encode_to_file(instance: &Instance, path: impl AsRef<Path>) -> Result<(), GmlError> {
    std::fs::write(path.as_ref(), encode(instance))?;
    Ok(())
}
