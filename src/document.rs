//! In-memory symbol document
//!
//! The symbol file is owned by an external tool; this module only needs to
//! read it, let the merge engine patch it, and write it back without losing
//! anything it does not understand. Unknown elements, attributes, comments,
//! processing instructions and a document type declaration are kept in order
//! and re-emitted on save. Text is kept verbatim; whitespace-only runs between
//! nodes are layout and are regenerated by the indenting writer. The XML
//! declaration is always rewritten as `<?xml version="1.0" encoding="utf-8"?>`.
//!
//! # Node kinds
//!
//! ```text
//! <Symbols>                                   root
//!   <Class Class="#1=T:App.TraceAspect">      producer
//!     <Instance Declaration="#2=T:App.Foo">   scope
//!       <Target Target="#3=M:App.Foo::Run()"> target (explicit or implicit)
//!         <Annotation Description="#4=..."/>  description leaf
//! ```

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, SymweaveError};
use crate::fs_utils;

/// Root element name
pub const ROOT: &str = "Symbols";

/// Producer node: one annotation-producing type
pub const PRODUCER: &str = "Class";
/// Attribute of a producer node holding the producer type reference
pub const PRODUCER_REF: &str = "Class";

/// Scope node: one declaring context the producer was applied to
pub const SCOPE: &str = "Instance";
/// Attribute of a scope node holding the declaration reference
pub const SCOPE_REF: &str = "Declaration";
/// Informational token attribute of a scope node
pub const SCOPE_TOKEN: &str = "Token";

/// Target node: one advised element under a scope
pub const TARGET: &str = "Target";
/// Optional explicit reference of a target node
pub const TARGET_REF: &str = "Target";

/// Description leaf
pub const LEAF: &str = "Annotation";
/// Reference to the description text
pub const LEAF_TEXT: &str = "Description";
/// Reference to the producer type
pub const LEAF_SOURCE: &str = "Source";
/// Reference to the accessor element
pub const LEAF_ACCESSOR: &str = "Accessor";
/// Accessor kind tag (`Getter` / `Setter`)
pub const LEAF_SEMANTIC: &str = "Semantic";
/// Ordinal copied between sibling leaves
pub const LEAF_ORDINAL: &str = "Ordinal";

// ============================================================================
// Tree
// ============================================================================

/// A child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// Processing instruction content between `<?` and `?>`
    Pi(String),
    /// Document type declaration content between `<!DOCTYPE` and `>`
    DocType(String),
}

/// An XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Element name without namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.rfind(':') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }

    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Child elements with the given local name
    pub fn elements_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.is(local_name))
    }

    /// Index (into `children`) of the first child element with `local_name` matching `pred`
    pub fn position<F>(&self, local_name: &str, mut pred: F) -> Option<usize>
    where
        F: FnMut(&Element) -> bool,
    {
        self.children.iter().position(|node| match node {
            Node::Element(el) => el.is(local_name) && pred(el),
            _ => false,
        })
    }

    /// Child element at a `children` index returned by [`Element::position`]
    pub fn element_at(&self, index: usize) -> Option<&Element> {
        match self.children.get(index) {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Mutable child element at an index produced by [`Element::position`]
    /// or [`Element::push_element`].
    ///
    /// # Panics
    ///
    /// If `index` does not point at an element node.
    pub fn child_mut(&mut self, index: usize) -> &mut Element {
        match &mut self.children[index] {
            Node::Element(el) => el,
            _ => panic!("child {} of <{}> is not an element", index, self.name),
        }
    }

    /// Append a child element and return its `children` index
    pub fn push_element(&mut self, element: Element) -> usize {
        self.children.push(Node::Element(element));
        self.children.len() - 1
    }

    /// This element followed by all descendant elements, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order walk over an element subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let el = self.stack.pop()?;
        self.stack.extend(el.elements().rev());
        Some(el)
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed symbol document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Comments, processing instructions and doctype before the root
    pub prolog: Vec<Node>,
    pub root: Element,
    /// Comments and processing instructions after the root
    pub epilog: Vec<Node>,
}

/// Node counts by kind, used for reporting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct NodeCounts {
    pub producers: usize,
    pub scopes: usize,
    pub targets: usize,
    pub leaves: usize,
}

impl Document {
    /// Create an empty document with a bare root element
    pub fn empty() -> Self {
        Self {
            prolog: Vec::new(),
            root: Element::new(ROOT),
            epilog: Vec::new(),
        }
    }

    /// Parse a document from XML text.
    ///
    /// Fails on malformed XML, unbalanced tags, multiple roots or a missing
    /// root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();

        loop {
            match reader.read_event().map_err(SymweaveError::xml)? {
                Event::Start(start) => stack.push(read_start(&start)?),
                Event::Empty(start) => {
                    let element = read_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| SymweaveError::Xml {
                        message: "unexpected closing tag".to_string(),
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape().map_err(SymweaveError::xml)?;
                        if !text.trim().is_empty() {
                            parent.children.push(Node::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let data = String::from_utf8_lossy(&data.into_inner()).into_owned();
                        parent.children.push(Node::CData(data));
                    }
                }
                Event::Comment(comment) => {
                    let comment = String::from_utf8_lossy(&comment).into_owned();
                    let outer = if root.is_some() { &mut epilog } else { &mut prolog };
                    place(&mut stack, outer, Node::Comment(comment));
                }
                Event::PI(pi) => {
                    let pi = String::from_utf8_lossy(&pi).into_owned();
                    let outer = if root.is_some() { &mut epilog } else { &mut prolog };
                    place(&mut stack, outer, Node::Pi(pi));
                }
                Event::DocType(doctype) => {
                    let doctype = String::from_utf8_lossy(&doctype).into_owned();
                    prolog.push(Node::DocType(doctype));
                }
                // Rewritten on save
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(SymweaveError::Xml {
                message: format!("element <{}> is never closed", open.name),
            });
        }

        root.map(|root| Self {
            prolog,
            root,
            epilog,
        })
        .ok_or_else(|| SymweaveError::Xml {
            message: "document has no root element".to_string(),
        })
    }

    /// Read and parse a document, reporting why it could not be used
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SymweaveError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load a document for merging.
    ///
    /// Missing, unreadable or malformed files all mean "nothing to merge
    /// into" and yield `None`.
    pub fn load(path: &Path) -> Option<Self> {
        match Self::read(path) {
            Ok(doc) => Some(doc),
            Err(SymweaveError::FileNotFound { .. }) => {
                tracing::debug!("No symbol file at {}", path.display());
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring symbol file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Serialize the full tree, including the XML declaration
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(SymweaveError::xml)?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner()).map_err(SymweaveError::xml)
    }

    /// Overwrite `path` with the serialized tree
    pub fn save(&self, path: &Path) -> Result<()> {
        let xml = self.to_xml()?;
        fs_utils::replace_file(path, xml.as_bytes())?;
        Ok(())
    }

    /// Count producer, scope, target and leaf nodes
    pub fn counts(&self) -> NodeCounts {
        let mut counts = NodeCounts::default();
        for producer in self.root.elements_named(PRODUCER) {
            counts.producers += 1;
            for scope in producer.elements_named(SCOPE) {
                counts.scopes += 1;
                for target in scope.elements_named(TARGET) {
                    counts.targets += 1;
                    counts.leaves += target.elements_named(LEAF).count();
                }
            }
        }
        counts
    }
}

fn read_start(start: &BytesStart<'_>) -> Result<Element> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref()).map_err(SymweaveError::xml)?;
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(SymweaveError::xml)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(SymweaveError::xml)?;
        let value = attr.unescape_value().map_err(SymweaveError::xml)?;
        element.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

/// Append a non-element node to the open element, or outside the root
fn place(stack: &mut [Element], outer: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => outer.push(node),
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_some() => Err(SymweaveError::Xml {
            message: format!("second root element <{}>", element.name),
        }),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(SymweaveError::xml)?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(SymweaveError::xml)?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(SymweaveError::xml)?;
    Ok(())
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    let event = match node {
        Node::Element(el) => return write_element(writer, el),
        Node::Text(text) => Event::Text(BytesText::new(text)),
        Node::CData(data) => Event::CData(BytesCData::new(data.as_str())),
        Node::Comment(comment) => Event::Comment(BytesText::from_escaped(comment.as_str())),
        Node::Pi(pi) => Event::PI(BytesText::from_escaped(pi.as_str())),
        Node::DocType(doctype) => Event::DocType(BytesText::from_escaped(doctype.as_str())),
    };
    writer.write_event(event).map_err(SymweaveError::xml)?;
    Ok(())
}
