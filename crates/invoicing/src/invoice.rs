use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use qikspare_core::{DomainError, DomainResult, InvoiceId, InvoiceNumber, Money, OrderId};

use crate::calculator::{InvoiceTotals, TotalsVariant, invoice_totals, line_figures};
use crate::lenient;
use crate::line_item::{Discount, LineItem, MAX_AMOUNT, MAX_QUANTITY, MAX_RATE};
use crate::party::PartyInfo;

/// How the buyer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "UPI")]
    Upi,
    Cash,
    Card,
    NetBanking,
    Wallet,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 5] = [
        PaymentMode::Upi,
        PaymentMode::Cash,
        PaymentMode::Card,
        PaymentMode::NetBanking,
        PaymentMode::Wallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Upi => "UPI",
            PaymentMode::Cash => "Cash",
            PaymentMode::Card => "Card",
            PaymentMode::NetBanking => "NetBanking",
            PaymentMode::Wallet => "Wallet",
        }
    }
}

impl core::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for PaymentMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown payment mode: {s}")))
    }
}

/// Which invoice document to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Parts invoice issued on behalf of the seller.
    #[default]
    Customer,
    /// The platform's own service and logistics fees.
    Platform,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Customer => "customer",
            DocumentType::Platform => "platform",
        }
    }
}

impl core::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(DocumentType::Customer),
            "platform" => Ok(DocumentType::Platform),
            other => Err(DomainError::validation(format!(
                "document type must be customer or platform, got {other}"
            ))),
        }
    }
}

/// A sales invoice as authored on the dashboard and stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_id"
    )]
    pub id: Option<InvoiceId>,
    /// Backend marker; invoices are always stored as customer invoices.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub invoice_type: DocumentType,
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub invoice_number: Option<InvoiceNumber>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub invoice_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub buyer: PartyInfo,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub seller: PartyInfo,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient::money")]
    pub delivery_charge: Money,
    #[serde(default, deserialize_with = "lenient::money")]
    pub platform_fee: Money,
    #[serde(default, deserialize_with = "lenient::parsed")]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub order_id: Option<OrderId>,
    /// Totals as last stored by the backend. A cache only; never read for
    /// rendering or saving.
    #[serde(rename = "computedTotals", default, skip_serializing)]
    pub stored_totals: Option<InvoiceTotals>,
}

impl InvoiceRecord {
    /// Fresh, unsaved invoice stamped with numbers derived from `at`.
    pub fn new_draft(at: DateTime<Utc>) -> Self {
        Self {
            invoice_number: Some(InvoiceNumber::generate(at)),
            order_id: Some(OrderId::generate(at)),
            invoice_date: Some(at.date_naive()),
            payment_mode: Some(PaymentMode::Upi),
            delivery_charge: Money::new(rust_decimal_macros::dec!(100)),
            platform_fee: Money::new(rust_decimal_macros::dec!(299)),
            ..Self::default()
        }
    }

    /// Totals recomputed from the current items and fees.
    pub fn totals(&self, variant: TotalsVariant) -> InvoiceTotals {
        invoice_totals(&self.items, self.delivery_charge, self.platform_fee, variant)
    }

    /// The figures persisted alongside the invoice (customer-document variant).
    pub fn computed_totals(&self) -> InvoiceTotals {
        self.totals(TotalsVariant::CustomerDocument)
    }

    /// Checks run before an invoice is saved or exported.
    ///
    /// Both parties and at least one line are required. Money inputs must be
    /// non-negative and at most [`MAX_AMOUNT`], quantities at most
    /// [`MAX_QUANTITY`], rates within 0–100, and no line may be discounted
    /// below zero. Ceilings are checked before any line arithmetic.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.buyer.is_selected() {
            return Err(DomainError::validation("buyer (garage) is required"));
        }
        if !self.seller.is_selected() {
            return Err(DomainError::validation("seller (vendor) is required"));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation("invoice needs at least one item"));
        }
        amount_in_range(self.delivery_charge, "delivery charge")?;
        amount_in_range(self.platform_fee, "platform fee")?;
        for (idx, item) in self.items.iter().enumerate() {
            validate_line(idx, item)?;
        }
        Ok(())
    }
}

/// Non-negative and no larger than [`MAX_AMOUNT`].
pub(crate) fn amount_in_range(amount: Money, what: &str) -> DomainResult<()> {
    if amount.is_negative() {
        return Err(DomainError::validation(format!("{what} must not be negative")));
    }
    if amount.amount() > MAX_AMOUNT {
        return Err(DomainError::validation(format!("{what} must not exceed {MAX_AMOUNT}")));
    }
    Ok(())
}

fn validate_line(idx: usize, item: &LineItem) -> DomainResult<()> {
    let row = idx + 1;
    let at_row = |e: DomainError| match e {
        DomainError::Validation(msg) => DomainError::validation(format!("item {row}: {msg}")),
        other => other,
    };
    amount_in_range(item.unit_price, "unit price").map_err(at_row)?;
    if item.quantity > MAX_QUANTITY {
        return Err(DomainError::validation(format!(
            "item {row}: quantity must not exceed {MAX_QUANTITY}"
        )));
    }
    if item.gst_rate.is_sign_negative() && !item.gst_rate.is_zero() {
        return Err(DomainError::validation(format!("item {row}: GST rate must not be negative")));
    }
    if item.gst_rate > MAX_RATE {
        return Err(DomainError::validation(format!("item {row}: GST rate must not exceed {MAX_RATE}")));
    }
    match item.discount {
        Discount::Amount(amount) => amount_in_range(amount, "discount").map_err(at_row)?,
        Discount::Percent(pct) if (pct.is_sign_negative() && !pct.is_zero()) || pct > MAX_RATE => {
            return Err(DomainError::validation(format!(
                "item {row}: discount percent must be between 0 and 100"
            )));
        }
        Discount::Percent(_) => {}
    }
    if item.discount_percent() > MAX_RATE {
        return Err(DomainError::validation(format!(
            "item {row}: discount percent must be between 0 and 100"
        )));
    }
    if line_figures(item).discounted.is_negative() {
        return Err(DomainError::validation(format!(
            "item {row}: discount exceeds the line amount"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use qikspare_core::PartyId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn party(id: &str, name: &str) -> PartyInfo {
        PartyInfo {
            id: Some(PartyId::new(id).unwrap()),
            name: name.into(),
            ..PartyInfo::default()
        }
    }

    fn valid_record() -> InvoiceRecord {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut r = InvoiceRecord::new_draft(at);
        r.buyer = party("g1", "Sai Motors");
        r.seller = party("v1", "Parts Hub");
        r.items.push(LineItem {
            part_name: "Brake pad".into(),
            unit_price: Money::new(dec!(1000)),
            quantity: 2,
            discount: Discount::Amount(Money::new(dec!(200))),
            ..LineItem::new_row()
        });
        r
    }

    #[test]
    fn new_draft_uses_dashboard_defaults() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let r = InvoiceRecord::new_draft(at);
        assert_eq!(r.invoice_number.unwrap().as_str(), "INV-1714557600000");
        assert_eq!(r.order_id.unwrap().as_str(), "ORD-1714557600000");
        assert_eq!(r.invoice_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(r.payment_mode, Some(PaymentMode::Upi));
        assert_eq!(r.delivery_charge.amount(), dec!(100));
        assert_eq!(r.platform_fee.amount(), dec!(299));
    }

    #[test]
    fn validate_requires_parties_and_items() {
        assert!(valid_record().validate().is_ok());

        let mut r = valid_record();
        r.buyer = PartyInfo::default();
        assert_eq!(r.validate(), Err(DomainError::validation("buyer (garage) is required")));

        let mut r = valid_record();
        r.seller = PartyInfo::default();
        assert!(r.validate().is_err());

        let mut r = valid_record();
        r.items.clear();
        assert!(matches!(r.validate(), Err(DomainError::Validation(msg)) if msg.contains("at least one item")));
    }

    #[test]
    fn validate_rejects_discount_beyond_base() {
        let mut r = valid_record();
        r.items[0].discount = Discount::Amount(Money::new(dec!(2500)));
        assert!(matches!(r.validate(), Err(DomainError::Validation(msg)) if msg.contains("item 1")));
    }

    #[test]
    fn validate_rejects_oversized_values_without_overflowing() {
        let mut r = valid_record();
        r.items[0].unit_price = Money::new(Decimal::from_scientific("1e28").unwrap());
        r.items[0].quantity = 100;
        assert!(matches!(r.validate(), Err(DomainError::Validation(msg)) if msg.contains("item 1: unit price")));

        let mut r = valid_record();
        r.items[0].quantity = u32::MAX;
        assert!(matches!(r.validate(), Err(DomainError::Validation(msg)) if msg.contains("quantity")));

        let mut r = valid_record();
        r.items[0].gst_rate = Decimal::from_scientific("1e20").unwrap();
        assert!(r.validate().is_err());

        let mut r = valid_record();
        r.items[0].discount = Discount::Percent(Decimal::from_scientific("1e20").unwrap());
        assert!(r.validate().is_err());

        let mut r = valid_record();
        r.platform_fee = Money::new(MAX_AMOUNT + dec!(1));
        assert!(matches!(r.validate(), Err(DomainError::Validation(msg)) if msg.contains("platform fee")));
    }

    #[test]
    fn oversized_backend_payloads_fail_to_parse() {
        let huge = r#"{"buyer":{"name":"Sai Motors"},"seller":{"name":"Parts Hub"},
                       "items":[{"unitPrice":1e28,"quantity":100,"gst":18}]}"#;
        assert!(serde_json::from_str::<InvoiceRecord>(huge).is_err());

        let huge_fee = r#"{"items":[],"deliveryCharge":1e20}"#;
        assert!(serde_json::from_str::<InvoiceRecord>(huge_fee).is_err());
    }

    #[test]
    fn stored_totals_are_ignored_in_favour_of_recomputation() {
        let mut r: InvoiceRecord = serde_json::from_str(
            r#"{"_id":"665f","invoiceNumber":"INV-1","invoiceDate":"2024-05-01T00:00:00.000Z",
                "buyer":{"name":"Sai Motors"},"seller":null,
                "items":[{"unitPrice":1000,"quantity":2,"discountAmount":200,"gst":18}],
                "deliveryCharge":100,"platformFee":299,"paymentMode":"Cash",
                "computedTotals":{"subtotal":1,"totalGst":1,"grandTotal":1}}"#,
        )
        .unwrap();
        assert_eq!(r.id.as_ref().unwrap().as_str(), "665f");
        assert_eq!(r.invoice_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(r.payment_mode, Some(PaymentMode::Cash));
        assert!(r.stored_totals.is_some());
        assert_eq!(r.computed_totals().grand_total.amount(), dec!(2224));

        r.items[0].quantity = 1;
        assert_eq!(r.computed_totals().grand_total.amount(), dec!(1044));
        assert_eq!(
            r.totals(TotalsVariant::IncludingPlatformFee).grand_total.amount(),
            dec!(1343)
        );
    }

    #[test]
    fn missing_fields_default() {
        let r: InvoiceRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(r.delivery_charge, Money::ZERO);
        assert_eq!(r.payment_mode, None);
        assert!(r.items.is_empty());
        assert_eq!(r.invoice_type, DocumentType::Customer);
    }

    #[test]
    fn parse_enums() {
        assert_eq!("netbanking".parse::<PaymentMode>().unwrap(), PaymentMode::NetBanking);
        assert!("cheque".parse::<PaymentMode>().is_err());
        assert_eq!("PLATFORM".parse::<DocumentType>().unwrap(), DocumentType::Platform);
        assert!("receipt".parse::<DocumentType>().is_err());
    }
}
