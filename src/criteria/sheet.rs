#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::bon;
use serde::Serialize;

use crate::error::CriteriaError;

/// Checks that a point value is usable as an out-of value.
fn check_out_of(field: &str, value: f64) -> Result<f64, CriteriaError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CriteriaError::InvalidPoints {
            field: field.to_string(),
            value,
        })
    }
}

/// Checks that a point value is usable as an earned value. Negative values are
/// allowed since subtractive sheets can deduct below zero.
fn check_earned(field: &str, value: f64) -> Result<f64, CriteriaError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CriteriaError::InvalidPoints {
            field: field.to_string(),
            value,
        })
    }
}

/// Rejects blank names.
fn check_name(kind: &'static str, name: String) -> Result<String, CriteriaError> {
    if name.trim().is_empty() {
        Err(CriteriaError::EmptyName(kind))
    } else {
        Ok(name)
    }
}

/// Index of a section within a [`Sheet`], in iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(pub usize);

/// Address of a subsection: its owning section plus its position inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsectionId {
    /// The owning section.
    pub section: SectionId,
    /// Position within the section, in iteration order.
    pub index:   usize,
}

impl Display for SubsectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.section.0, self.index)
    }
}

/// A line of informational text attached to a subsection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detail {
    /// The text shown to graders.
    text:  String,
    /// Sort key.
    order: i32,
}

impl Detail {
    /// Creates a new detail.
    pub fn new(text: impl Into<String>, order: i32) -> Self {
        Self {
            text: text.into(),
            order,
        }
    }

    /// Text of the detail.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sort key of the detail.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Replaces the text of the detail.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// A gradable line item inside a [`Section`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subsection {
    /// Name shown to graders.
    name:    String,
    /// Sort key.
    order:   i32,
    /// Points possible, unless the owning section declares its own out-of.
    out_of:  Option<f64>,
    /// Points earned; `None` means the subsection has not been graded.
    earned:  Option<f64>,
    /// Informational details, sorted by `order`.
    details: Vec<Detail>,
}

#[bon]
impl Subsection {
    /// Builds a subsection. `earned` defaults to zero, as it is for a freshly
    /// configured sheet; call [`Subsection::set_earned`] with `None` to mark
    /// it ungraded.
    #[builder(on(String, into))]
    pub fn new(
        name: String,
        #[builder(default)] order: i32,
        out_of: Option<f64>,
        #[builder(default)] earned: f64,
        #[builder(default)] details: Vec<Detail>,
    ) -> Result<Self, CriteriaError> {
        let name = check_name("subsection", name)?;
        let out_of = out_of.map(|v| check_out_of("outOf", v)).transpose()?;
        let earned = check_earned("earned", earned)?;

        let mut details = details;
        details.sort_by_key(Detail::order);

        Ok(Self {
            name,
            order,
            out_of,
            earned: Some(earned),
            details,
        })
    }
}

impl Subsection {
    /// Name of the subsection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sort key of the subsection.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Declared out-of value, if any.
    pub fn out_of(&self) -> Option<f64> {
        self.out_of
    }

    /// Points earned, or `None` when ungraded.
    pub fn earned(&self) -> Option<f64> {
        self.earned
    }

    /// Details in display order.
    pub fn details(&self) -> &[Detail] {
        &self.details
    }

    /// Mutable access to a single detail.
    pub fn detail_mut(&mut self, index: usize) -> Result<&mut Detail, CriteriaError> {
        self.details
            .get_mut(index)
            .ok_or(CriteriaError::NoSuchNode {
                kind: "detail",
                index,
            })
    }

    /// Sets the points earned. `None` marks the subsection ungraded.
    pub fn set_earned(&mut self, earned: Option<f64>) -> Result<(), CriteriaError> {
        self.earned = earned.map(|v| check_earned("earned", v)).transpose()?;
        Ok(())
    }

    /// Appends a detail after the existing ones and returns its index.
    pub fn add_detail(&mut self, text: impl Into<String>) -> usize {
        let order = self
            .details
            .last()
            .map_or(0, |d| d.order.saturating_add(1));
        self.details.push(Detail::new(text, order));
        self.details.len() - 1
    }

    /// Removes and returns the detail at `index`.
    pub fn remove_detail(&mut self, index: usize) -> Result<Detail, CriteriaError> {
        if index < self.details.len() {
            Ok(self.details.remove(index))
        } else {
            Err(CriteriaError::NoSuchNode {
                kind: "detail",
                index,
            })
        }
    }
}

/// A group of subsections, optionally carrying its own out-of total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Name shown to graders.
    name:        String,
    /// Sort key.
    order:       i32,
    /// Section-wide out-of; when present, subsections carry none.
    out_of:      Option<f64>,
    /// Free-text grader comment.
    comment:     Option<String>,
    /// Subsections sorted by `order`.
    subsections: Vec<Subsection>,
}

#[bon]
impl Section {
    /// Builds a section, enforcing the out-of placement rule: a section with
    /// an out-of owns subsections without one, and a section without an
    /// out-of owns subsections that all declare one.
    #[builder(on(String, into))]
    pub fn new(
        name: String,
        #[builder(default)] order: i32,
        out_of: Option<f64>,
        comment: Option<String>,
        #[builder(default)] subsections: Vec<Subsection>,
    ) -> Result<Self, CriteriaError> {
        let name = check_name("section", name)?;
        let out_of = out_of.map(|v| check_out_of("outOf", v)).transpose()?;

        for subsection in &subsections {
            match (out_of, subsection.out_of) {
                (Some(_), Some(_)) => {
                    return Err(CriteriaError::OutOfOnBoth {
                        section:    name,
                        subsection: subsection.name.clone(),
                    });
                }
                (None, None) => {
                    return Err(CriteriaError::OutOfMissing {
                        section:    name,
                        subsection: subsection.name.clone(),
                    });
                }
                _ => {}
            }
        }

        let mut subsections = subsections;
        subsections.sort_by_key(Subsection::order);

        Ok(Self {
            name,
            order,
            out_of,
            comment,
            subsections,
        })
    }
}

impl Section {
    /// Name of the section.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sort key of the section.
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Declared section-wide out-of, if any.
    pub fn out_of(&self) -> Option<f64> {
        self.out_of
    }

    /// The grader comment, if any.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Subsections in display order.
    pub fn subsections(&self) -> &[Subsection] {
        &self.subsections
    }

    /// Mutable access to a single subsection.
    pub fn subsection_mut(&mut self, index: usize) -> Result<&mut Subsection, CriteriaError> {
        self.subsections
            .get_mut(index)
            .ok_or(CriteriaError::NoSuchNode {
                kind: "subsection",
                index,
            })
    }

    /// Attaches a comment; fails if the section already has one.
    pub fn add_comment(&mut self, comment: impl Into<String>) -> Result<(), CriteriaError> {
        if self.comment.is_some() {
            return Err(CriteriaError::DuplicateComment(self.name.clone()));
        }
        self.comment = Some(comment.into());
        Ok(())
    }

    /// Replaces (or clears) the comment.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }
}

/// The grading criteria for one assignment part.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sheet {
    /// Sections sorted by `order`, ties kept in declaration order.
    sections: Vec<Section>,
}

impl Sheet {
    /// Creates a sheet out of already validated sections.
    pub fn new(sections: Vec<Section>) -> Self {
        let mut sections = sections;
        sections.sort_by_key(Section::order);
        Self { sections }
    }

    /// Sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section.
    pub fn section(&self, id: SectionId) -> Result<&Section, CriteriaError> {
        self.sections.get(id.0).ok_or(CriteriaError::NoSuchNode {
            kind:  "section",
            index: id.0,
        })
    }

    /// Mutable access to a section.
    pub fn section_mut(&mut self, id: SectionId) -> Result<&mut Section, CriteriaError> {
        self.sections.get_mut(id.0).ok_or(CriteriaError::NoSuchNode {
            kind:  "section",
            index: id.0,
        })
    }

    /// Looks up a subsection together with its owning section.
    pub fn subsection(&self, id: SubsectionId) -> Result<(&Section, &Subsection), CriteriaError> {
        let section = self.section(id.section)?;
        let subsection = section
            .subsections
            .get(id.index)
            .ok_or(CriteriaError::NoSuchNode {
                kind:  "subsection",
                index: id.index,
            })?;
        Ok((section, subsection))
    }

    /// Mutable access to a subsection.
    pub fn subsection_mut(&mut self, id: SubsectionId) -> Result<&mut Subsection, CriteriaError> {
        self.section_mut(id.section)?.subsection_mut(id.index)
    }

    /// Ids of every subsection, in display order.
    pub fn subsection_ids(&self) -> impl Iterator<Item = SubsectionId> + '_ {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(s, section)| {
                (0..section.subsections.len()).map(move |index| SubsectionId {
                    section: SectionId(s),
                    index,
                })
            })
    }

    /// Marks every subsection ungraded.
    pub fn clear_earned(&mut self) {
        for subsection in self
            .sections
            .iter_mut()
            .flat_map(|s| s.subsections.iter_mut())
        {
            subsection.earned = None;
        }
    }

    /// Replaces every sort key with the node's position, keeping the current
    /// order. Instances use this since GML records order only by position.
    pub(crate) fn renumber(&mut self) {
        let key = |i: usize| i32::try_from(i).unwrap_or(i32::MAX);
        for (i, section) in self.sections.iter_mut().enumerate() {
            section.order = key(i);
            for (j, subsection) in section.subsections.iter_mut().enumerate() {
                subsection.order = key(j);
                for (k, detail) in subsection.details.iter_mut().enumerate() {
                    detail.order = key(k);
                }
            }
        }
    }

    /// Consumes the sheet, returning its sections.
    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }
}
