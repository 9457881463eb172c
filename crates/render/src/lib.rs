//! Invoice document renderer.
//!
//! Turns an [`InvoiceRecord`] into a [`StaticDocument`] for one of the two
//! document types. Rendering is read-only over its input, reads no clock and
//! always produces the same tree (and HTML bytes) for the same invoice.

pub mod customer;
pub mod document;
pub mod format;
pub mod platform;

use serde::{Deserialize, Serialize};

use qikspare_invoicing::{DocumentType, InvoiceRecord};

pub use document::{Element, Node, STYLESHEET, StaticDocument, Tag};

/// Names printed in the header and the signature block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub brand_name: String,
    /// Entity that signs the invoice ("For <legal entity>").
    pub legal_entity: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            brand_name: "QikSpare".to_string(),
            legal_entity: "Amirag AutoCare LLP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    branding: Branding,
}

impl Renderer {
    pub fn new(branding: Branding) -> Self {
        Self { branding }
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    pub fn render(&self, invoice: &InvoiceRecord, document_type: DocumentType) -> StaticDocument {
        let (title, root) = match document_type {
            DocumentType::Customer => (customer::TITLE, customer::build(invoice, &self.branding)),
            DocumentType::Platform => (platform::TITLE, platform::build(invoice, &self.branding)),
        };

        tracing::debug!(
            document_type = %document_type,
            invoice_number = invoice.invoice_number.as_ref().map(|n| n.as_str()).unwrap_or("-"),
            items = invoice.items.len(),
            "invoice rendered"
        );

        StaticDocument {
            document_type,
            title: title.to_string(),
            root,
        }
    }
}

/// Render with the default branding.
pub fn render(invoice: &InvoiceRecord, document_type: DocumentType) -> StaticDocument {
    Renderer::default().render(invoice, document_type)
}

pub(crate) fn footer(branding: &Branding) -> Element {
    Element::new(Tag::Div)
        .class(document::class::FOOTER)
        .child(
            Element::new(Tag::P)
                .child("For ")
                .child(Element::new(Tag::Strong).child(branding.legal_entity.as_str())),
        )
        .child(Element::new(Tag::P).child("Authorised Signatory"))
}
