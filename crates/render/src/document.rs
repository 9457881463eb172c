//! Static document tree.
//!
//! Rendered invoices are plain data: elements, classes and text. The tree
//! serialises to deterministic HTML and is what the export pipeline lays out.

use core::fmt::Write as _;

use qikspare_invoicing::DocumentType;
use serde::{Deserialize, Serialize};

/// Class names shared by the templates, the stylesheet and the PDF layout.
pub mod class {
    pub const CONTAINER: &str = "invoice-container";
    pub const HEADER: &str = "invoice-header";
    pub const LOGO: &str = "invoice-logo";
    pub const PARTIES: &str = "invoice-parties";
    pub const PARTY: &str = "invoice-party";
    pub const TABLE: &str = "invoice-table";
    pub const SUMMARY: &str = "invoice-summary";
    pub const TOTAL: &str = "total";
    pub const FOOTER: &str = "invoice-footer";
}

/// Stylesheet embedded in every HTML serialisation.
pub const STYLESHEET: &str = "\
body{margin:0;font-family:Helvetica,Arial,sans-serif;color:#222;}\
.invoice-container{width:794px;padding:32px;box-sizing:border-box;font-size:12px;}\
.invoice-header{display:flex;justify-content:space-between;align-items:flex-start;border-bottom:2px solid #222;padding-bottom:12px;margin-bottom:16px;}\
.invoice-logo{font-size:22px;font-weight:bold;}\
.invoice-header h2{margin:0 0 6px 0;font-size:18px;}\
.invoice-parties{display:flex;gap:24px;margin-bottom:16px;}\
.invoice-party{flex:1;}\
.invoice-party h4{margin:0 0 6px 0;font-size:13px;}\
p{margin:2px 0;}\
.invoice-table{width:100%;border-collapse:collapse;margin-bottom:16px;}\
.invoice-table th,.invoice-table td{border:1px solid #999;padding:4px 6px;text-align:left;}\
.invoice-table th{background:#f0f0f0;}\
.invoice-summary{text-align:right;margin-bottom:24px;}\
.invoice-summary .total{font-size:14px;}\
.invoice-footer{text-align:right;margin-top:32px;}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Div,
    H2,
    H4,
    P,
    Strong,
    Table,
    Thead,
    Tbody,
    Tr,
    Th,
    Td,
}

impl Tag {
    pub fn name(&self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::H2 => "h2",
            Tag::H4 => "h4",
            Tag::P => "p",
            Tag::Strong => "strong",
            Tag::Table => "table",
            Tag::Thead => "thead",
            Tag::Tbody => "tbody",
            Tag::Tr => "tr",
            Tag::Th => "th",
            Tag::Td => "td",
        }
    }

    /// Whether the element flows inline with surrounding text.
    pub fn is_inline(&self) -> bool {
        matches!(self, Tag::Strong)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            class: None,
            colspan: None,
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn colspan(mut self, span: u32) -> Self {
        self.colspan = Some(span);
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class.as_deref() == Some(class)
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First descendant (depth-first, self included) carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.elements().find_map(|e| e.find_class(class))
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let name = self.tag.name();
        out.push('<');
        out.push_str(name);
        if let Some(class) = &self.class {
            out.push_str(" class=\"");
            escape_into(class, out);
            out.push('"');
        }
        if let Some(span) = self.colspan {
            // Writing to a String cannot fail.
            let _ = write!(out, " colspan=\"{span}\"");
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_html(out),
                Node::Text(t) => escape_into(t, out),
            }
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Element(e) => collect_text(e, out),
            Node::Text(t) => out.push_str(t),
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// A rendered invoice: immutable markup with no behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDocument {
    pub document_type: DocumentType,
    pub title: String,
    pub root: Element,
}

impl StaticDocument {
    /// Standalone HTML page. Identical trees always produce identical bytes.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>");
        escape_into(&self.title, &mut out);
        out.push_str("</title><style>");
        out.push_str(STYLESHEET);
        out.push_str("</style></head><body>");
        self.root.write_html(&mut out);
        out.push_str("</body></html>");
        out
    }
}
