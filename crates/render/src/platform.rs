use qikspare_invoicing::{FeeRow, InvoiceRecord, platform_fee_breakdown};

use crate::Branding;
use crate::customer::party_block;
use crate::document::{Element, Tag, class};
use crate::format::{self, labeled};

pub const TITLE: &str = "Platform Service Fee Invoice";

const COLUMNS: [&str; 6] = ["S.No", "Description", "Amount ₹", "GST%", "GST ₹", "Total ₹"];

/// The platform's own fee invoice: platform fee and logistics fee at a flat rate.
pub(crate) fn build(invoice: &InvoiceRecord, branding: &Branding) -> Element {
    let breakdown = platform_fee_breakdown(invoice.platform_fee, invoice.delivery_charge);

    let head = Element::new(Tag::Thead).child(
        Element::new(Tag::Tr).children(COLUMNS.iter().map(|c| Element::new(Tag::Th).child(*c))),
    );
    let grand_total_row = Element::new(Tag::Tr)
        .child(
            Element::new(Tag::Td)
                .colspan(COLUMNS.len() as u32 - 1)
                .child(Element::new(Tag::Strong).child("Grand Total")),
        )
        .child(
            Element::new(Tag::Td)
                .child(Element::new(Tag::Strong).child(format::fixed2(breakdown.grand_total))),
        );
    let body = Element::new(Tag::Tbody)
        .children(breakdown.rows.iter().enumerate().map(|(idx, row)| fee_row(idx + 1, row)))
        .child(grand_total_row);

    Element::new(Tag::Div)
        .class(class::CONTAINER)
        .child(
            Element::new(Tag::Div)
                .class(class::HEADER)
                .child(Element::new(Tag::Div).class(class::LOGO).child(branding.brand_name.as_str()))
                .child(
                    Element::new(Tag::Div)
                        .child(Element::new(Tag::H2).child(TITLE))
                        .child(labeled("Invoice #", format::optional(invoice.invoice_number.as_ref())))
                        .child(labeled("Date", format::date(invoice.invoice_date)))
                        .child(labeled("Order ID", format::optional(invoice.order_id.as_ref()))),
                ),
        )
        .child(
            Element::new(Tag::Div)
                .class(class::PARTIES)
                .child(party_block("Billed To (Buyer)", &invoice.buyer, true)),
        )
        .child(Element::new(Tag::Table).class(class::TABLE).child(head).child(body))
        .child(
            Element::new(Tag::Div)
                .class(class::SUMMARY)
                .child(labeled("Mode of Payment", format::optional(invoice.payment_mode))),
        )
        .child(crate::footer(branding))
}

fn fee_row(serial: usize, row: &FeeRow) -> Element {
    let cells = [
        serial.to_string(),
        row.kind.label().to_string(),
        format::fixed2(row.amount),
        format::percent(row.gst_rate),
        format::fixed2(row.gst_amount),
        format::fixed2(row.total),
    ];
    Element::new(Tag::Tr).children(cells.into_iter().map(|c| Element::new(Tag::Td).child(c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qikspare_core::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn fee_rows_use_the_flat_rate() {
        let b = platform_fee_breakdown(Money::new(dec!(299)), Money::new(dec!(100)));
        let cells: Vec<String> = fee_row(1, &b.rows[0]).elements().map(Element::text_content).collect();
        assert_eq!(cells, vec!["1", "Platform Fee", "299.00", "18%", "53.82", "352.82"]);
        let cells: Vec<String> = fee_row(2, &b.rows[1]).elements().map(Element::text_content).collect();
        assert_eq!(cells, vec!["2", "Logistics Fee", "100.00", "18%", "18.00", "118.00"]);
    }

    #[test]
    fn table_ends_with_spanning_grand_total() {
        let mut invoice = InvoiceRecord::default();
        invoice.platform_fee = Money::new(dec!(299));
        invoice.delivery_charge = Money::new(dec!(100));
        let root = build(&invoice, &Branding::default());
        let table = root.find_class(class::TABLE).unwrap();
        let body = table.elements().nth(1).unwrap();
        let rows: Vec<&Element> = body.elements().collect();
        assert_eq!(rows.len(), 3);
        let last: Vec<&Element> = rows[2].elements().collect();
        assert_eq!(last[0].colspan, Some(5));
        assert_eq!(last[1].text_content(), "470.82");
    }
}
