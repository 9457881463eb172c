//! Invoicing domain module.
//!
//! This crate contains the invoice document model, the money/tax calculator,
//! the authoring session (`InvoiceDraft`) and the invoice list filter,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no
//! rendering).

pub mod calculator;
pub mod draft;
pub mod invoice;
pub mod line_item;
pub mod listing;
pub mod party;
mod lenient;

pub use calculator::{
    FeeKind, FeeRow, InvoiceTotals, LineFigures, PLATFORM_GST_RATE, PlatformFeeBreakdown,
    TotalsVariant, invoice_totals, line_figures, platform_fee_breakdown,
};
pub use draft::{DraftCommand, DraftEdit, DraftEdited, DraftEvent, InvoiceDraft, ItemField, TotalsRecomputed};
pub use invoice::{DocumentType, InvoiceRecord, PaymentMode};
pub use line_item::{DEFAULT_GST_RATE, Discount, DiscountSource, LineItem, MAX_AMOUNT, MAX_QUANTITY, MAX_RATE};
pub use listing::InvoiceFilter;
pub use party::{PartyInfo, PartyRole};
