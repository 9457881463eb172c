use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceRecord;

/// Client-side filter for the invoice list.
///
/// `search` matches buyer name, seller name or invoice number
/// (case-insensitive substring). Date bounds are inclusive; invoices without
/// a date never match a bounded filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceFilter {
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl InvoiceFilter {
    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.from.is_none() && self.to.is_none()
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, invoice: &InvoiceRecord) -> bool {
        if let Some(needle) = self.needle() {
            let number = invoice
                .invoice_number
                .as_ref()
                .map(|n| n.as_str())
                .unwrap_or_default();
            let hit = [invoice.buyer.name.as_str(), invoice.seller.name.as_str(), number]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = invoice.invoice_date else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Keeps matching invoices, preserving backend order.
    pub fn apply(&self, invoices: Vec<InvoiceRecord>) -> Vec<InvoiceRecord> {
        if self.is_empty() {
            return invoices;
        }
        invoices.into_iter().filter(|inv| self.matches(inv)).collect()
    }
}
