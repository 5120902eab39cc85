#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{Detail, SectionId, Sheet, SubsectionId};
use crate::{config, error::CriteriaError};

/// Identifies the assignment part a grading instance belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartId(String);

/// Identifies the student group a grading instance belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(String);

/// Implements the shared conversions for the id newtypes.
macro_rules! id_conversions {
    ($ty:ident) => {
        impl $ty {
            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_conversions!(PartId);
id_conversions!(GroupId);

/// Whether points are earned up from zero or deducted from the maximum. The
/// engine never computes with this; it is carried for the editing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetType {
    /// Points are added up from zero.
    Additive,
    /// Points are deducted from the maximum.
    Subtractive,
}

impl SheetType {
    /// The tag written to GML.
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetType::Additive => "ADDITIVE",
            SheetType::Subtractive => "SUBTRACTIVE",
        }
    }
}

impl FromStr for SheetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADDITIVE" => Ok(SheetType::Additive),
            "SUBTRACTIVE" => Ok(SheetType::Subtractive),
            other => Err(format!("Unknown sheet type `{other}`")),
        }
    }
}

impl Display for SheetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filled-out grading sheet for one (part, group) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    /// Part being graded.
    part:    PartId,
    /// Group being graded.
    group:   GroupId,
    /// Format version, written back verbatim.
    version: String,
    /// Sheet type tag, written back verbatim.
    kind:    String,
    /// The graded sheet.
    sheet:   Sheet,
}

impl Instance {
    /// Creates an instance. Sections may not declare a section-level out-of,
    /// since the exchange format records out-of values on subsections only,
    /// and every subsection must carry an earned value. Sort keys are replaced
    /// by positions.
    pub fn new(
        part: impl Into<PartId>,
        group: impl Into<GroupId>,
        version: impl Into<String>,
        kind: impl Into<String>,
        sheet: Sheet,
    ) -> Result<Self, CriteriaError> {
        if let Some(section) = sheet.sections().iter().find(|s| s.out_of().is_some()) {
            return Err(CriteriaError::SectionOutOfInInstance(section.name().to_string()));
        }
        for section in sheet.sections() {
            if let Some(subsection) = section.subsections().iter().find(|s| s.earned().is_none()) {
                return Err(CriteriaError::Ungraded {
                    section:    section.name().to_string(),
                    subsection: subsection.name().to_string(),
                });
            }
        }

        let mut sheet = sheet;
        sheet.renumber();

        Ok(Self {
            part: part.into(),
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            sheet,
        })
    }

    /// Creates an instance stamped with the configured default version and
    /// sheet type.
    pub fn from_sheet(
        part: impl Into<PartId>,
        group: impl Into<GroupId>,
        sheet: Sheet,
    ) -> Result<Self, CriteriaError> {
        let cfg = config::get();
        Self::new(part, group, cfg.gml_version(), cfg.sheet_type(), sheet)
    }

    /// Part this instance grades.
    pub fn part(&self) -> &PartId {
        &self.part
    }

    /// Group this instance grades.
    pub fn group(&self) -> &GroupId {
        &self.group
    }

    /// Format version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Raw sheet type tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The sheet type, if the tag is one of the known values.
    pub fn sheet_type(&self) -> Option<SheetType> {
        self.kind.parse().ok()
    }

    /// The graded sheet.
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Sets the points earned on one subsection. An instance is always
    /// graded, so there is no way to clear the value.
    pub fn set_earned(&mut self, id: SubsectionId, earned: f64) -> Result<(), CriteriaError> {
        self.sheet.subsection_mut(id)?.set_earned(Some(earned))
    }

    /// Adds a comment to a section that has none.
    pub fn add_comment(
        &mut self,
        section: SectionId,
        comment: impl Into<String>,
    ) -> Result<(), CriteriaError> {
        self.sheet.section_mut(section)?.add_comment(comment)
    }

    /// Replaces or removes a section's comment.
    pub fn set_comment(
        &mut self,
        section: SectionId,
        comment: Option<String>,
    ) -> Result<(), CriteriaError> {
        self.sheet.section_mut(section)?.set_comment(comment);
        Ok(())
    }

    /// Appends a detail to a subsection and returns its index.
    pub fn add_detail(
        &mut self,
        id: SubsectionId,
        text: impl Into<String>,
    ) -> Result<usize, CriteriaError> {
        Ok(self.sheet.subsection_mut(id)?.add_detail(text))
    }

    /// Rewrites the text of one detail.
    pub fn set_detail_text(
        &mut self,
        id: SubsectionId,
        index: usize,
        text: impl Into<String>,
    ) -> Result<(), CriteriaError> {
        self.sheet
            .subsection_mut(id)?
            .detail_mut(index)?
            .set_text(text);
        Ok(())
    }

    /// Removes one detail and returns it. The remaining details are
    /// renumbered to their positions.
    pub fn remove_detail(&mut self, id: SubsectionId, index: usize) -> Result<Detail, CriteriaError> {
        let removed = self.sheet.subsection_mut(id)?.remove_detail(index)?;
        self.sheet.renumber();
        Ok(removed)
    }
}
