//! XML definition of a subform
//!
//! The definition is read into a small element tree so that nested `<form>`
//! children can be rewritten before the field that owns them. Everything
//! that is not an element (declarations, comments, text) is written back
//! untouched.

use super::rewrite::ShowOnRewriter;
use crate::error::{Result, ShowOnError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

const SHOWON_ATTRIBUTE: &str = "showon";
const NESTED_FORM_TAG: &str = "form";

/// One showon attribute touched while rewriting, in application order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRewrite {
    /// `name` attribute of the element, or its tag when unnamed
    pub element: String,
    /// Number of nested `<form>` levels above the element
    pub depth: usize,
    pub before: String,
    pub after: String,
}

/// Result of reworking a subform definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenSource {
    pub source: String,
    pub rewrites: Vec<AttributeRewrite>,
}

/// Rewrite every showon attribute of the subform `source` owned by `field`.
///
/// Children of nested `<form>` elements are handled before the attribute of
/// the element that contains them.
pub fn rewrite_form_source(
    field: &str,
    source: &str,
    rewriter: &ShowOnRewriter<'_>,
) -> Result<RewrittenSource> {
    let mut document = Document::parse(source).map_err(|e| ShowOnError::malformed(field, e))?;

    let mut rewrites = Vec::new();
    rewrite_children(&mut document.root, rewriter, 0, &mut rewrites)
        .map_err(|e| ShowOnError::malformed(field, e))?;

    let source = document
        .to_xml()
        .map_err(|e| ShowOnError::malformed(field, e))?;

    Ok(RewrittenSource { source, rewrites })
}

fn rewrite_children(
    parent: &mut Element,
    rewriter: &ShowOnRewriter<'_>,
    depth: usize,
    rewrites: &mut Vec<AttributeRewrite>,
) -> std::result::Result<(), String> {
    for child in parent.children.iter_mut() {
        let Node::Element(child) = child else {
            continue;
        };

        for nested in child.children.iter_mut() {
            if let Node::Element(nested) = nested {
                if nested.tag() == NESTED_FORM_TAG {
                    rewrite_children(nested, rewriter, depth + 1, rewrites)?;
                }
            }
        }

        let Some(before) = child.attribute(SHOWON_ATTRIBUTE)? else {
            continue;
        };
        if before.is_empty() {
            continue;
        }

        let after = rewriter.rewrite(&before);
        if after != before {
            child.set_attribute(SHOWON_ATTRIBUTE, &after)?;
        }

        let element = child.attribute("name")?.unwrap_or_else(|| child.tag());
        tracing::debug!(%element, depth, %before, %after, "rewrote subform showon");
        rewrites.push(AttributeRewrite {
            element,
            depth,
            before,
            after,
        });
    }
    Ok(())
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Other(Event<'static>),
}

#[derive(Debug)]
struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    fn new(start: BytesStart<'static>, self_closing: bool) -> Self {
        Self {
            start,
            children: Vec::new(),
            self_closing,
        }
    }

    fn tag(&self) -> String {
        String::from_utf8_lossy(self.start.name().as_ref()).into_owned()
    }

    fn attribute(&self, key: &str) -> std::result::Result<Option<String>, String> {
        for attr in self.start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            if attr.key.as_ref() == key.as_bytes() {
                let value = attr.unescape_value().map_err(|e| e.to_string())?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn set_attribute(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let mut start = BytesStart::new(self.tag());
        for attr in self.start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            if attr.key.as_ref() == key.as_bytes() {
                start.push_attribute((key, value));
            } else {
                start.push_attribute(attr);
            }
        }
        self.start = start;
        Ok(())
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> std::result::Result<(), String> {
        if self.self_closing && self.children.is_empty() {
            return emit(writer, Event::Empty(self.start.borrow()));
        }
        emit(writer, Event::Start(self.start.borrow()))?;
        for child in &self.children {
            child.write(writer)?;
        }
        emit(writer, Event::End(self.start.to_end()))
    }
}

impl Node {
    fn write(&self, writer: &mut Writer<Vec<u8>>) -> std::result::Result<(), String> {
        match self {
            Node::Element(element) => element.write(writer),
            Node::Other(event) => emit(writer, event.clone()),
        }
    }
}

/// A parsed definition: exactly one root element plus surrounding nodes
#[derive(Debug)]
struct Document {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut reader = Reader::from_str(text);
        let mut open: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut root: Option<Element> = None;
        let mut epilog = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("XML parse error at byte {}: {}", reader.buffer_position(), e))?;

            let node = match event {
                Event::Eof => break,
                Event::Start(e) => {
                    open.push(Element::new(e.into_owned(), false));
                    continue;
                }
                Event::End(_) => match open.pop() {
                    Some(element) => Node::Element(element),
                    None => {
                        return Err(format!(
                            "unexpected closing tag at byte {}",
                            reader.buffer_position()
                        ))
                    }
                },
                Event::Empty(e) => Node::Element(Element::new(e.into_owned(), true)),
                other => Node::Other(other.into_owned()),
            };

            if let Some(parent) = open.last_mut() {
                parent.children.push(node);
                continue;
            }

            match node {
                Node::Element(_) if root.is_some() => {
                    return Err("more than one root element".to_string())
                }
                Node::Element(element) => root = Some(element),
                Node::Other(Event::Text(text)) if !text.iter().all(u8::is_ascii_whitespace) => {
                    return Err("text outside of the root element".to_string())
                }
                other if root.is_some() => epilog.push(other),
                other => prolog.push(other),
            }
        }

        if let Some(element) = open.last() {
            return Err(format!("unclosed element <{}>", element.tag()));
        }

        let root = root.ok_or_else(|| "no root element".to_string())?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    fn to_xml(&self) -> std::result::Result<String, String> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            node.write(&mut writer)?;
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            node.write(&mut writer)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> std::result::Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}
