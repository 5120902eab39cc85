#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use super::{
    ATTR_EARNED, ATTR_NAME, ATTR_OUT_OF, ATTR_TYPE, ATTR_VERSION, COMMENTS, DETAIL, ROOT, SECTION,
    SUBSECTION,
    markup::{self, Element, Node},
};
use crate::{
    criteria::{Detail, GroupId, Instance, PartId, Section, Sheet, Subsection},
    error::GmlError,
};

/// Rejects any attribute on `element` that is not in `allowed`.
fn only_attributes(element: &Element, allowed: &[&str]) -> Result<(), GmlError> {
    match element
        .attributes
        .iter()
        .find(|(key, _)| !allowed.contains(&key.as_str()))
    {
        Some((key, _)) => Err(GmlError::UnexpectedAttribute {
            element:   element.name.clone(),
            attribute: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Returns a required attribute.
fn required<'a>(element: &'a Element, attribute: &'static str) -> Result<&'a str, GmlError> {
    element
        .attribute(attribute)
        .ok_or_else(|| GmlError::MissingAttribute {
            element: element.name.clone(),
            attribute,
        })
}

/// Parses a numeric attribute value.
fn number(element: &Element, attribute: &'static str, raw: &str) -> Result<f64, GmlError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GmlError::InvalidNumber {
            element: element.name.clone(),
            attribute,
            value: raw.to_string(),
        })
}

/// Returns the child elements of `parent`. Text and comment nodes between
/// them are skipped.
fn child_elements(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(|child| match child {
        Node::Element(e) => Some(e),
        Node::Text(_) | Node::Comment(_) => None,
    })
}

/// Returns the text content of an element that may only hold text.
fn text_only(element: &Element) -> Result<String, GmlError> {
    only_attributes(element, &[])?;
    if let Some(Node::Element(child)) = element
        .children
        .iter()
        .find(|n| matches!(n, Node::Element(_)))
    {
        return Err(GmlError::UnexpectedChild {
            parent: element.name.clone(),
            child:  child.name.clone(),
        });
    }
    Ok(element.text())
}

/// Orders elements by position, clamped into an `i32` sort key.
fn position(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Decodes a `<subsection>` element.
fn subsection(element: &Element, order: i32) -> Result<Subsection, GmlError> {
    only_attributes(element, &[ATTR_NAME, ATTR_OUT_OF, ATTR_EARNED])?;
    let name = required(element, ATTR_NAME)?;
    let out_of = number(element, ATTR_OUT_OF, required(element, ATTR_OUT_OF)?)?;
    let earned = element
        .attribute(ATTR_EARNED)
        .map(|raw| number(element, ATTR_EARNED, raw))
        .transpose()?
        .unwrap_or(0.0);

    let mut details = Vec::new();
    for (i, child) in child_elements(element).enumerate() {
        if child.name != DETAIL {
            return Err(GmlError::UnexpectedChild {
                parent: element.name.clone(),
                child:  child.name.clone(),
            });
        }
        details.push(Detail::new(text_only(child)?, position(i)));
    }

    tracing::trace!(name, out_of, earned, details = details.len(), "decoded subsection");
    Ok(Subsection::builder()
        .name(name)
        .order(order)
        .out_of(out_of)
        .earned(earned)
        .details(details)
        .build()?)
}

/// Decodes a `<section>` element.
fn section(element: &Element, order: i32) -> Result<Section, GmlError> {
    only_attributes(element, &[ATTR_NAME])?;
    let name = required(element, ATTR_NAME)?;

    let mut comment: Option<String> = None;
    let mut subsections = Vec::new();
    for child in child_elements(element) {
        match child.name.as_str() {
            COMMENTS => {
                if comment.is_some() {
                    return Err(GmlError::DuplicateComment(name.to_string()));
                }
                comment = Some(text_only(child)?);
            }
            SUBSECTION => {
                let order = position(subsections.len());
                subsections.push(subsection(child, order)?);
            }
            other => {
                return Err(GmlError::UnexpectedChild {
                    parent: element.name.clone(),
                    child:  other.to_string(),
                });
            }
        }
    }

    Ok(Section::builder()
        .name(name)
        .order(order)
        .maybe_comment(comment)
        .subsections(subsections)
        .build()?)
}

/// Validates a parsed root element and builds the instance from it.
fn instance(root: &Element, part: PartId, group: GroupId) -> Result<Instance, GmlError> {
    if root.name != ROOT {
        return Err(GmlError::UnexpectedRoot {
            expected: ROOT,
            found:    root.name.clone(),
        });
    }
    only_attributes(root, &[ATTR_VERSION, ATTR_TYPE])?;
    let version = required(root, ATTR_VERSION)?;
    let kind = required(root, ATTR_TYPE)?;

    let mut sections = Vec::new();
    for (i, child) in child_elements(root).enumerate() {
        if child.name != SECTION {
            return Err(GmlError::UnexpectedChild {
                parent: root.name.clone(),
                child:  child.name.clone(),
            });
        }
        sections.push(section(child, position(i))?);
    }

    Ok(Instance::new(part, group, version, kind, Sheet::new(sections))?)
}

/// Decodes a GML document into a grading instance for the given part and
/// group. Text and comments between elements are skipped; any other
/// deviation from the format is an error. A missing `earned` reads as zero.
pub fn decode(
    document: &str,
    part: impl Into<PartId>,
    group: impl Into<GroupId>,
) -> Result<Instance, GmlError> {
    let part = part.into();
    let group = group.into();

    let result = markup::parse(document).and_then(|root| instance(&root, part.clone(), group.clone()));
    match &result {
        Ok(decoded) => tracing::debug!(
            %part,
            %group,
            sections = decoded.sheet().sections().len(),
            "decoded GML document"
        ),
        Err(e) => tracing::warn!(%part, %group, error = %e, "rejected GML document"),
    }
    result
}
