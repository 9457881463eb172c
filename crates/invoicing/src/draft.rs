//! Invoice authoring session.
//!
//! The create and view/edit screens own one `InvoiceDraft`. Every field edit
//! is a command; handling it yields the edit event plus a `TotalsRecomputed`
//! event, so the summary figures are refreshed synchronously on every edit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use qikspare_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Event, InvoiceNumber, Money};

use crate::calculator::{InvoiceTotals, TotalsVariant};
use crate::invoice::{InvoiceRecord, PaymentMode, amount_in_range};
use crate::line_item::{Discount, LineItem, MAX_QUANTITY, MAX_RATE};
use crate::party::PartyInfo;

/// A single editable field of a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ItemField {
    PartName(String),
    ModelNo(String),
    Category(String),
    UnitPrice(Money),
    Quantity(u32),
    DiscountAmount(Money),
    DiscountPercent(Decimal),
    GstRate(Decimal),
}

/// An edit made in the authoring UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DraftEdit {
    SelectBuyer { party: PartyInfo },
    SelectSeller { party: PartyInfo },
    SetPaymentMode { mode: PaymentMode },
    SetDeliveryCharge { amount: Money },
    SetPlatformFee { amount: Money },
    AddItem,
    RemoveItem { index: usize },
    EditItem { index: usize, field: ItemField },
}

/// Command: apply one edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCommand {
    pub edit: DraftEdit,
    pub occurred_at: DateTime<Utc>,
}

impl DraftCommand {
    pub fn new(edit: DraftEdit, occurred_at: DateTime<Utc>) -> Self {
        Self { edit, occurred_at }
    }
}

/// Event: DraftEdited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEdited {
    pub invoice_number: InvoiceNumber,
    pub edit: DraftEdit,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TotalsRecomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRecomputed {
    pub invoice_number: InvoiceNumber,
    pub totals: InvoiceTotals,
    pub payable: InvoiceTotals,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEvent {
    DraftEdited(DraftEdited),
    TotalsRecomputed(TotalsRecomputed),
}

impl Event for DraftEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DraftEvent::DraftEdited(_) => "invoicing.draft.edited",
            DraftEvent::TotalsRecomputed(_) => "invoicing.draft.totals_recomputed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DraftEvent::DraftEdited(e) => e.occurred_at,
            DraftEvent::TotalsRecomputed(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: the in-progress invoice of one authoring session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    number: InvoiceNumber,
    record: InvoiceRecord,
    totals: InvoiceTotals,
    payable: InvoiceTotals,
    version: u64,
}

impl InvoiceDraft {
    /// Start a new, unsaved invoice.
    pub fn start(at: DateTime<Utc>) -> Self {
        Self::from_record(InvoiceRecord::new_draft(at), at)
    }

    /// Resume editing an invoice fetched from the backend.
    ///
    /// Records without an invoice number get one derived from `at`.
    pub fn from_record(mut record: InvoiceRecord, at: DateTime<Utc>) -> Self {
        let number = record
            .invoice_number
            .get_or_insert_with(|| InvoiceNumber::generate(at))
            .clone();
        let totals = record.totals(TotalsVariant::CustomerDocument);
        let payable = record.totals(TotalsVariant::IncludingPlatformFee);
        Self {
            number,
            record,
            totals,
            payable,
            version: 0,
        }
    }

    pub fn record(&self) -> &InvoiceRecord {
        &self.record
    }

    /// Customer-document totals as of the last applied edit.
    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    /// Totals including the platform fee.
    pub fn payable(&self) -> InvoiceTotals {
        self.payable
    }

    /// Validated copy of the invoice, ready to save or export.
    pub fn finalize(&self) -> DomainResult<InvoiceRecord> {
        self.record.validate()?;
        let mut record = self.record.clone();
        record.stored_totals = Some(self.totals);
        Ok(record)
    }

    fn check_index(&self, index: usize) -> DomainResult<()> {
        if index >= self.record.items.len() {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}

impl AggregateRoot for InvoiceDraft {
    type Id = InvoiceNumber;

    fn id(&self) -> &Self::Id {
        &self.number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for InvoiceDraft {
    type Command = DraftCommand;
    type Event = DraftEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DraftEvent::DraftEdited(e) => apply_edit(&mut self.record, &e.edit),
            DraftEvent::TotalsRecomputed(e) => {
                self.totals = e.totals;
                self.payable = e.payable;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        validate_edit(self, &command.edit)?;

        // Totals are derived from the post-edit state without touching `self`.
        let mut next = self.record.clone();
        apply_edit(&mut next, &command.edit);

        tracing::debug!(
            invoice_number = %self.number,
            edit = ?command.edit,
            "draft edit accepted"
        );

        Ok(vec![
            DraftEvent::DraftEdited(DraftEdited {
                invoice_number: self.number.clone(),
                edit: command.edit.clone(),
                occurred_at: command.occurred_at,
            }),
            DraftEvent::TotalsRecomputed(TotalsRecomputed {
                invoice_number: self.number.clone(),
                totals: next.totals(TotalsVariant::CustomerDocument),
                payable: next.totals(TotalsVariant::IncludingPlatformFee),
                occurred_at: command.occurred_at,
            }),
        ])
    }
}

fn validate_edit(draft: &InvoiceDraft, edit: &DraftEdit) -> DomainResult<()> {
    match edit {
        DraftEdit::SelectBuyer { party } | DraftEdit::SelectSeller { party } => {
            if !party.is_selected() {
                return Err(DomainError::validation("party must have an id or a name"));
            }
            Ok(())
        }
        DraftEdit::SetPaymentMode { .. } | DraftEdit::AddItem => Ok(()),
        DraftEdit::SetDeliveryCharge { amount } => amount_in_range(*amount, "delivery charge"),
        DraftEdit::SetPlatformFee { amount } => amount_in_range(*amount, "platform fee"),
        DraftEdit::RemoveItem { index } => draft.check_index(*index),
        DraftEdit::EditItem { index, field } => {
            draft.check_index(*index)?;
            match field {
                ItemField::UnitPrice(v) => amount_in_range(*v, "unit price"),
                ItemField::DiscountAmount(v) => amount_in_range(*v, "discount"),
                ItemField::DiscountPercent(p) => {
                    if (p.is_sign_negative() && !p.is_zero()) || *p > MAX_RATE {
                        return Err(DomainError::validation(
                            "discount percent must be between 0 and 100",
                        ));
                    }
                    Ok(())
                }
                ItemField::GstRate(r) => {
                    if r.is_sign_negative() && !r.is_zero() {
                        return Err(DomainError::validation("GST rate must not be negative"));
                    }
                    if *r > MAX_RATE {
                        return Err(DomainError::validation(format!("GST rate must not exceed {MAX_RATE}")));
                    }
                    Ok(())
                }
                ItemField::Quantity(q) => {
                    if *q > MAX_QUANTITY {
                        return Err(DomainError::validation(format!("quantity must not exceed {MAX_QUANTITY}")));
                    }
                    Ok(())
                }
                ItemField::PartName(_) | ItemField::ModelNo(_) | ItemField::Category(_) => Ok(()),
            }
        }
    }
}

fn apply_edit(record: &mut InvoiceRecord, edit: &DraftEdit) {
    match edit {
        DraftEdit::SelectBuyer { party } => record.buyer = party.clone(),
        DraftEdit::SelectSeller { party } => record.seller = party.clone(),
        DraftEdit::SetPaymentMode { mode } => record.payment_mode = Some(*mode),
        DraftEdit::SetDeliveryCharge { amount } => record.delivery_charge = *amount,
        DraftEdit::SetPlatformFee { amount } => record.platform_fee = *amount,
        DraftEdit::AddItem => record.items.push(LineItem::new_row()),
        DraftEdit::RemoveItem { index } => {
            if *index < record.items.len() {
                record.items.remove(*index);
            }
        }
        DraftEdit::EditItem { index, field } => {
            let Some(item) = record.items.get_mut(*index) else {
                return;
            };
            match field {
                ItemField::PartName(v) => item.part_name = v.clone(),
                ItemField::ModelNo(v) => item.model_no = v.clone(),
                ItemField::Category(v) => item.category = v.clone(),
                ItemField::UnitPrice(v) => item.unit_price = *v,
                ItemField::Quantity(v) => item.quantity = *v,
                ItemField::DiscountAmount(v) => item.discount = Discount::Amount(*v),
                ItemField::DiscountPercent(v) => item.discount = Discount::Percent(*v),
                ItemField::GstRate(v) => item.gst_rate = *v,
            }
        }
    }
}
