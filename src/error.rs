#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Error types shared across the crate.

/// Raised when a grading tree breaks one of its structural rules, either while
/// it is being built or when a single node is edited.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CriteriaError {
    /// The section declares its own out-of, but one of its subsections does
    /// too.
    #[error(
        "Section `{section}` declares an out-of value, so subsection `{subsection}` must not \
         declare one."
    )]
    OutOfOnBoth {
        /// Name of the offending section.
        section:    String,
        /// Name of the offending subsection.
        subsection: String,
    },
    /// Neither the section nor one of its subsections declares an out-of.
    #[error(
        "Section `{section}` does not declare an out-of value, so subsection `{subsection}` must \
         declare one."
    )]
    OutOfMissing {
        /// Name of the offending section.
        section:    String,
        /// Name of the offending subsection.
        subsection: String,
    },
    /// A grading instance was handed a section carrying a section-level
    /// out-of, which GML cannot represent.
    #[error("Section `{0}` declares a section-level out-of, which a grading instance cannot hold.")]
    SectionOutOfInInstance(String),
    /// A grading instance was handed a subsection with no earned value.
    #[error("Subsection `{subsection}` in section `{section}` has not been graded.")]
    Ungraded {
        /// Name of the owning section.
        section:    String,
        /// Name of the ungraded subsection.
        subsection: String,
    },
    /// A section or subsection name is empty (or only whitespace).
    #[error("A {0} name must not be empty.")]
    EmptyName(&'static str),
    /// A point value is NaN, infinite, or (for out-of values) negative.
    #[error("Invalid point value {value} for `{field}`.")]
    InvalidPoints {
        /// Which field was being set, eg. `outOf`.
        field: String,
        /// The rejected value.
        value: f64,
    },
    /// A section already carries a comment.
    #[error("Section `{0}` already has a comment.")]
    DuplicateComment(String),
    /// A section, subsection or detail id does not point at anything.
    #[error("No {kind} at index {index}.")]
    NoSuchNode {
        /// The kind of node looked up.
        kind:  &'static str,
        /// The index that was not found.
        index: usize,
    },
}

/// Raised while reading or decoding a GML document.
#[derive(thiserror::Error, Debug)]
pub enum GmlError {
    /// The text is not well-formed markup.
    #[error("Malformed GML markup at line {line}, column {column}: expected {expected}")]
    Syntax {
        /// Line of the failure (1-based).
        line:     usize,
        /// Column of the failure (1-based).
        column:   usize,
        /// What the reader expected to find.
        expected: String,
    },
    /// An element was closed by a tag with a different name.
    #[error("Element `<{open}>` is closed by `</{close}>`.")]
    MismatchedClose {
        /// Name of the open element.
        open:  String,
        /// Name used by the closing tag.
        close: String,
    },
    /// An element repeats an attribute.
    #[error("Element `<{element}>` repeats attribute `{attribute}`.")]
    DuplicateAttribute {
        /// Element carrying the attribute.
        element:   String,
        /// The repeated attribute.
        attribute: String,
    },
    /// An entity or character reference that is not understood.
    #[error("Unknown entity `&{0};`.")]
    UnknownEntity(String),
    /// The root element is not `grading-sheet`.
    #[error("Expected root element `<{expected}>` but found `<{found}>`.")]
    UnexpectedRoot {
        /// The required root tag.
        expected: &'static str,
        /// The tag that was found.
        found:    String,
    },
    /// A required attribute is absent.
    #[error("Element `<{element}>` is missing required attribute `{attribute}`.")]
    MissingAttribute {
        /// Element missing the attribute.
        element:   String,
        /// The required attribute.
        attribute: &'static str,
    },
    /// An attribute that the element does not allow.
    #[error("Element `<{element}>` does not allow attribute `{attribute}`.")]
    UnexpectedAttribute {
        /// Element carrying the attribute.
        element:   String,
        /// The rejected attribute.
        attribute: String,
    },
    /// A child element that the parent does not allow.
    #[error("Element `<{parent}>` does not allow child `<{child}>`.")]
    UnexpectedChild {
        /// The parent element.
        parent: String,
        /// The rejected child tag.
        child:  String,
    },
    /// A section carries more than one comments element.
    #[error("Section `{0}` has more than one comments element.")]
    DuplicateComment(String),
    /// A numeric attribute did not parse.
    #[error("Attribute `{attribute}` on `<{element}>` is not a number: `{value}`")]
    InvalidNumber {
        /// Element carrying the attribute.
        element:   String,
        /// The attribute.
        attribute: &'static str,
        /// The raw text.
        value:     String,
    },
    /// The decoded tree breaks a model invariant.
    #[error("Decoded grading sheet is invalid: {0}")]
    Invariant(#[from] CriteriaError),
    /// Reading or writing a GML file failed.
    #[error("Could not access GML file: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised when a deadline configuration cannot be resolved.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeadlineError {
    /// A field the policy needs is absent.
    #[error("The {policy} deadline policy requires `{field}`.")]
    MissingField {
        /// Policy name.
        policy: &'static str,
        /// Field name.
        field:  &'static str,
    },
    /// A point value is NaN or infinite.
    #[error("The {policy} deadline policy has a non-finite `{field}`.")]
    NonFinite {
        /// Policy name.
        policy: &'static str,
        /// Field name.
        field:  &'static str,
    },
    /// Two thresholds are out of order.
    #[error("The {policy} deadline policy has `{earlier}` after `{later}`.")]
    ThresholdOrder {
        /// Policy name.
        policy:  &'static str,
        /// The threshold expected to come first.
        earlier: &'static str,
        /// The threshold expected to come second.
        later:   &'static str,
    },
    /// A late period of zero or negative length.
    #[error("Late period must be positive, got `{0}`.")]
    NonPositivePeriod(String),
    /// Late-period text that does not parse.
    #[error("Could not parse late period `{text}`: expected {expected}")]
    PeriodSyntax {
        /// The rejected text.
        text:     String,
        /// What the grammar expected.
        expected: String,
    },
}

/// Crate-level error for callers that want a single type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [`CriteriaError`].
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    /// See [`GmlError`].
    #[error(transparent)]
    Gml(#[from] GmlError),
    /// See [`DeadlineError`].
    #[error(transparent)]
    Deadline(#[from] DeadlineError),
}
