#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::{
    ATTR_EARNED, ATTR_NAME, ATTR_OUT_OF, ATTR_TYPE, ATTR_VERSION, COMMENTS, DETAIL, ROOT, SECTION,
    SUBSECTION,
    markup::{escape_attribute, escape_text},
};
use crate::criteria::{Instance, Section, Subsection};

/// Indentation unit for nested elements.
const INDENT: &str = "  ";

/// Writes points so that parsing the text yields the same `f64`.
fn points(value: f64) -> String {
    format!("{value:?}")
}

/// Accumulates the output document line by line.
struct Writer {
    /// The document so far.
    out: String,
}

impl Writer {
    /// Appends one line at the given depth.
    fn line(&mut self, depth: usize, content: &str) {
        for _ in 0..depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(content);
        self.out.push('\n');
    }

    /// Writes a subsection and its details.
    fn subsection(&mut self, depth: usize, subsection: &Subsection) {
        let mut open = format!(
            "<{SUBSECTION} {ATTR_NAME}=\"{}\"",
            escape_attribute(subsection.name())
        );
        if let Some(out_of) = subsection.out_of() {
            open.push_str(&format!(" {ATTR_OUT_OF}=\"{}\"", points(out_of)));
        }
        if let Some(earned) = subsection.earned() {
            open.push_str(&format!(" {ATTR_EARNED}=\"{}\"", points(earned)));
        }

        if subsection.details().is_empty() {
            self.line(depth, &format!("{open}/>"));
            return;
        }

        self.line(depth, &format!("{open}>"));
        for detail in subsection.details() {
            self.line(depth + 1, &format!("<{DETAIL}>{}</{DETAIL}>", escape_text(detail.text())));
        }
        self.line(depth, &format!("</{SUBSECTION}>"));
    }

    /// Writes a section, its comment and its subsections.
    fn section(&mut self, depth: usize, section: &Section) {
        let open = format!("<{SECTION} {ATTR_NAME}=\"{}\"", escape_attribute(section.name()));
        if section.comment().is_none() && section.subsections().is_empty() {
            self.line(depth, &format!("{open}/>"));
            return;
        }

        self.line(depth, &format!("{open}>"));
        if let Some(comment) = section.comment() {
            self.line(depth + 1, &format!("<{COMMENTS}>{}</{COMMENTS}>", escape_text(comment)));
        }
        for subsection in section.subsections() {
            self.subsection(depth + 1, subsection);
        }
        self.line(depth, &format!("</{SECTION}>"));
    }
}

/// Encodes an instance as a GML document. Sections, subsections and details
/// are written in their stored order; absent values are left out.
pub fn encode(instance: &Instance) -> String {
    let mut writer = Writer { out: String::new() };
    writer.line(0, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>");

    let open = format!(
        "<{ROOT} {ATTR_VERSION}=\"{}\" {ATTR_TYPE}=\"{}\"",
        escape_attribute(instance.version()),
        escape_attribute(instance.kind())
    );
    let sections = instance.sheet().sections();
    if sections.is_empty() {
        writer.line(0, &format!("{open}/>"));
    } else {
        writer.line(0, &format!("{open}>"));
        for section in sections {
            writer.section(1, section);
        }
        writer.line(0, &format!("</{ROOT}>"));
    }

    tracing::debug!(
        part = %instance.part(),
        group = %instance.group(),
        bytes = writer.out.len(),
        "encoded GML document"
    );
    writer.out
}
