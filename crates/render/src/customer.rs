use qikspare_invoicing::{InvoiceRecord, LineItem, PartyInfo, TotalsVariant, line_figures};

use crate::Branding;
use crate::document::{Element, Tag, class};
use crate::format::{self, labeled};

pub const TITLE: &str = "Tax Invoice (On Behalf of Seller)";

const COLUMNS: [&str; 9] = [
    "Part", "Model", "Category", "Qty", "Unit ₹", "Disc ₹", "GST%", "GST ₹", "Total ₹",
];

/// Parts invoice issued on behalf of the seller.
pub(crate) fn build(invoice: &InvoiceRecord, branding: &Branding) -> Element {
    Element::new(Tag::Div)
        .class(class::CONTAINER)
        .child(header(invoice, branding))
        .child(
            Element::new(Tag::Div)
                .class(class::PARTIES)
                .child(party_block("Buyer (Garage)", &invoice.buyer, false))
                .child(party_block("Seller (Vendor)", &invoice.seller, true)),
        )
        .child(items_table(&invoice.items))
        .child(summary(invoice))
        .child(crate::footer(branding))
}

fn header(invoice: &InvoiceRecord, branding: &Branding) -> Element {
    Element::new(Tag::Div)
        .class(class::HEADER)
        .child(Element::new(Tag::Div).class(class::LOGO).child(branding.brand_name.as_str()))
        .child(
            Element::new(Tag::Div)
                .child(Element::new(Tag::H2).child(TITLE))
                .child(labeled("Invoice #", format::optional(invoice.invoice_number.as_ref())))
                .child(labeled("Date", format::date(invoice.invoice_date))),
        )
}

pub(crate) fn party_block(heading: &str, party: &PartyInfo, with_gstin: bool) -> Element {
    let mut block = Element::new(Tag::Div)
        .class(class::PARTY)
        .child(Element::new(Tag::H4).child(heading))
        .child(labeled("Name", format::text_or_placeholder(&party.name)))
        .child(labeled("Phone", format::text_or_placeholder(&party.phone)))
        .child(labeled("Email", format::text_or_placeholder(&party.email)))
        .child(labeled("Address", format::text_or_placeholder(&party.address)));
    if with_gstin {
        block = block.child(labeled("GSTIN", format::optional(party.gstin.as_deref())));
    }
    block
}

fn items_table(items: &[LineItem]) -> Element {
    let head = Element::new(Tag::Thead).child(
        Element::new(Tag::Tr).children(COLUMNS.iter().map(|c| Element::new(Tag::Th).child(*c))),
    );
    let body = Element::new(Tag::Tbody).children(items.iter().map(item_row));
    Element::new(Tag::Table).class(class::TABLE).child(head).child(body)
}

fn item_row(item: &LineItem) -> Element {
    let figures = line_figures(item);
    let cells = [
        format::text_or_placeholder(&item.part_name),
        format::text_or_placeholder(&item.model_no),
        format::text_or_placeholder(&item.category),
        item.quantity.to_string(),
        format::fixed2(item.unit_price),
        format::fixed2(figures.discount),
        format::percent(figures.gst_rate),
        format::fixed2(figures.gst_amount),
        format::fixed2(figures.total),
    ];
    Element::new(Tag::Tr).children(cells.into_iter().map(|c| Element::new(Tag::Td).child(c)))
}

fn summary(invoice: &InvoiceRecord) -> Element {
    let totals = invoice.totals(TotalsVariant::CustomerDocument);
    Element::new(Tag::Div)
        .class(class::SUMMARY)
        .child(labeled("Subtotal", format::rupees(totals.subtotal)))
        .child(labeled("Total GST", format::rupees(totals.total_gst)))
        .child(labeled("Delivery Charge", format::rupees(invoice.delivery_charge)))
        .child(labeled("Grand Total", format::rupees(totals.grand_total)).class(class::TOTAL))
        .child(labeled("Mode of Payment", format::optional(invoice.payment_mode)))
}
