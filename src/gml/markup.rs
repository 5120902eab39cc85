#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! A reader for the small markup subset GML documents use: one root element,
//! nested elements with quoted attributes, text, comments, CDATA, and the
//! predefined entities.

use crate::error::GmlError;

/// A node inside an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, with entities already decoded.
    Text(String),
    /// A `<!-- -->` comment.
    Comment(String),
}

/// An element with its attributes (in document order) and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name.
    pub name:       String,
    /// Attributes as written, values decoded.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children:   Vec<Node>,
}

impl Element {
    /// Returns the value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text and CDATA content, ignoring comments.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Borrowed node straight out of the grammar, before entity decoding.
#[derive(Debug)]
enum RawNode<'a> {
    /// A nested element.
    Element(RawElement<'a>),
    /// Raw character data, entities still encoded.
    Text(&'a str),
    /// CDATA content, taken literally.
    CData(&'a str),
    /// Comment content.
    Comment(&'a str),
}

/// Borrowed element straight out of the grammar.
#[derive(Debug)]
struct RawElement<'a> {
    /// Opening tag name.
    name:     &'a str,
    /// Attribute pairs, values still encoded.
    attrs:    Vec<(&'a str, &'a str)>,
    /// Children.
    children: Vec<RawNode<'a>>,
    /// Closing tag name, `None` for self-closing elements.
    close:    Option<&'a str>,
}

peg::parser! {
    /// grammar for the markup subset used by GML documents.
    grammar markup() for str {
        /// matches any number of whitespace characters
        rule _() = quiet!{[' ' | '\n' | '\t' | '\r']*}

        /// matches an element or attribute name
        rule name() -> &'input str
            = quiet!{
                $(['a'..='z' | 'A'..='Z' | '_' | ':']
                  ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | ':' | '-' | '.']*)
              }
            / expected!("a name")

        /// matches a single- or double-quoted attribute value
        rule value() -> &'input str
            = "\"" v:$([^ '"' | '<']*) "\"" { v }
            / "'" v:$([^ '\'' | '<']*) "'" { v }

        /// matches `name="value"`
        rule attribute() -> (&'input str, &'input str)
            = n:name() _ "=" _ v:value() { (n, v) }

        /// matches an `<?xml ... ?>` declaration
        rule declaration()
            = "<?xml" (!"?>" [_])* "?>"

        /// matches a comment and returns its content
        rule comment() -> &'input str
            = "<!--" c:$((!"-->" [_])*) "-->" { c }

        /// matches a CDATA section and returns its content
        rule cdata() -> &'input str
            = "<![CDATA[" c:$((!"]]>" [_])*) "]]>" { c }

        /// matches character data up to the next tag
        rule text() -> &'input str
            = $([^ '<']+)

        /// matches anything that may appear inside an element
        rule node() -> RawNode<'input>
            = c:comment() { RawNode::Comment(c) }
            / c:cdata() { RawNode::CData(c) }
            / e:element() { RawNode::Element(e) }
            / t:text() { RawNode::Text(t) }

        /// matches an element, self-closing or with content
        rule element() -> RawElement<'input>
            = "<" n:name() attrs:(_ a:attribute() { a })* _ "/>"
            {
                RawElement { name: n, attrs, children: Vec::new(), close: None }
            }
            / "<" n:name() attrs:(_ a:attribute() { a })* _ ">"
              children:node()*
              "</" c:name() _ ">"
            {
                RawElement { name: n, attrs, children, close: Some(c) }
            }

        /// matches comments and whitespace outside the root element
        rule misc() = (_ comment())* _

        /// parses a whole document and returns its root element
        pub rule document() -> RawElement<'input>
            = "\u{feff}"? _ declaration()? misc() root:element() misc() ![_] { root }
    }
}

/// Decodes the predefined entities and numeric character references.
pub fn unescape(raw: &str) -> Result<String, GmlError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| GmlError::UnknownEntity(after.chars().take(8).collect()))?;
        let entity = &after[..end];

        let decoded = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse::<u32>().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32)
                    .ok_or_else(|| GmlError::UnknownEntity(entity.to_string()))?
            }
        };

        out.push(decoded);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Escapes character data for use between tags.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a value for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}

/// Turns a grammar element into an owned [`Element`], checking close tags,
/// duplicate attributes and entities on the way.
fn lower(raw: RawElement<'_>) -> Result<Element, GmlError> {
    if let Some(close) = raw.close
        && close != raw.name
    {
        return Err(GmlError::MismatchedClose {
            open:  raw.name.to_string(),
            close: close.to_string(),
        });
    }

    let mut attributes: Vec<(String, String)> = Vec::with_capacity(raw.attrs.len());
    for (key, value) in raw.attrs {
        if attributes.iter().any(|(k, _)| k == key) {
            return Err(GmlError::DuplicateAttribute {
                element:   raw.name.to_string(),
                attribute: key.to_string(),
            });
        }
        attributes.push((key.to_string(), unescape(value)?));
    }

    let children = raw
        .children
        .into_iter()
        .map(|child| {
            Ok(match child {
                RawNode::Element(e) => Node::Element(lower(e)?),
                RawNode::Text(t) => Node::Text(unescape(t)?),
                RawNode::CData(t) => Node::Text(t.to_string()),
                RawNode::Comment(c) => Node::Comment(c.to_string()),
            })
        })
        .collect::<Result<Vec<_>, GmlError>>()?;

    Ok(Element {
        name: raw.name.to_string(),
        attributes,
        children,
    })
}

/// Parses a document and returns its root element.
pub fn parse(document: &str) -> Result<Element, GmlError> {
    let raw = markup::document(document).map_err(|e| GmlError::Syntax {
        line:     e.location.line,
        column:   e.location.column,
        expected: e.expected.to_string(),
    })?;
    lower(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_handles_named_and_numeric_entities() {
        assert_eq!(unescape("a &amp; b &lt;c&gt; &#65;&#x42;").unwrap(), "a & b <c> AB");
        assert!(matches!(unescape("&nbsp;"), Err(GmlError::UnknownEntity(e)) if e == "nbsp"));
        assert!(unescape("dangling & amp").is_err());
    }

    #[test]
    fn escape_then_parse_preserves_attribute_text() {
        let value = "tab\there \"quoted\" & <angled>";
        let doc = format!("<a v=\"{}\"/>", escape_attribute(value));
        let root = parse(&doc).unwrap();
        assert_eq!(root.attribute("v"), Some(value));
    }

    #[test]
    fn parse_reads_nested_elements_and_comments() {
        let root = parse(
            "<?xml version=\"1.0\"?>\n<!-- lead -->\n<a x='1'><b>hi<!-- note --></b><c/></a>\n",
        )
        .unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attribute("x"), Some("1"));
        assert_eq!(root.children.len(), 2);
        match &root.children[0] {
            Node::Element(b) => {
                assert_eq!(b.text(), "hi");
                assert!(matches!(b.children[1], Node::Comment(_)));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_bad_markup() {
        assert!(matches!(parse("<a></b>"), Err(GmlError::MismatchedClose { .. })));
        assert!(matches!(parse("<a x=\"1\" x=\"2\"/>"), Err(GmlError::DuplicateAttribute { .. })));
        assert!(matches!(parse("<a/><b/>"), Err(GmlError::Syntax { .. })));
        assert!(matches!(parse("<a>"), Err(GmlError::Syntax { .. })));
        assert!(matches!(parse(""), Err(GmlError::Syntax { .. })));
    }
}
