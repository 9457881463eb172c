//! Money/tax calculator.
//!
//! Pure functions over line items and fees. Nothing here rounds: figures are
//! exact decimals and only get rounded when displayed. Nothing here clamps
//! either; a discount larger than its line base yields a negative discounted
//! value that flows into the totals unchanged (validation rejects such lines
//! before save/export, see [`crate::InvoiceRecord::validate`]).

use qikspare_core::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::line_item::LineItem;

/// Flat GST rate on platform and logistics fees.
pub const PLATFORM_GST_RATE: Decimal = dec!(18);

/// Per-line figures, as shown in the line-item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFigures {
    pub base: Money,
    pub discount: Money,
    pub discounted: Money,
    pub gst_rate: Decimal,
    pub gst_amount: Money,
    pub total: Money,
}

pub fn line_figures(item: &LineItem) -> LineFigures {
    let base = item.base();
    let discount = item.discount_amount();
    let discounted = base - discount;
    let gst_amount = discounted.percent(item.gst_rate);
    LineFigures {
        base,
        discount,
        discounted,
        gst_rate: item.gst_rate,
        gst_amount,
        total: discounted + gst_amount,
    }
}

/// Which fees the grand total includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotalsVariant {
    /// Items + GST + delivery charge. Printed on the customer document and
    /// persisted with the invoice.
    #[default]
    CustomerDocument,
    /// Additionally includes the platform fee (the payable figure on the
    /// view/edit screen).
    IncludingPlatformFee,
}

/// Aggregate invoice figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub total_gst: Money,
    pub grand_total: Money,
}

pub fn invoice_totals(
    items: &[LineItem],
    delivery_charge: Money,
    platform_fee: Money,
    variant: TotalsVariant,
) -> InvoiceTotals {
    let (subtotal, total_gst) = items
        .iter()
        .map(line_figures)
        .fold((Money::ZERO, Money::ZERO), |(sub, gst), f| {
            (sub + f.discounted, gst + f.gst_amount)
        });

    let mut grand_total = subtotal + total_gst + delivery_charge;
    if variant == TotalsVariant::IncludingPlatformFee {
        grand_total += platform_fee;
    }

    InvoiceTotals {
        subtotal,
        total_gst,
        grand_total,
    }
}

/// Synthetic rows on the platform-fee document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeKind {
    PlatformFee,
    LogisticsFee,
}

impl FeeKind {
    pub fn label(&self) -> &'static str {
        match self {
            FeeKind::PlatformFee => "Platform Fee",
            FeeKind::LogisticsFee => "Logistics Fee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRow {
    pub kind: FeeKind,
    pub amount: Money,
    pub gst_rate: Decimal,
    pub gst_amount: Money,
    pub total: Money,
}

impl FeeRow {
    fn new(kind: FeeKind, amount: Money) -> Self {
        let gst_amount = amount.percent(PLATFORM_GST_RATE);
        Self {
            kind,
            amount,
            gst_rate: PLATFORM_GST_RATE,
            gst_amount,
            total: amount + gst_amount,
        }
    }
}

/// Figures for the platform-fee document. Independent of item GST rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformFeeBreakdown {
    pub rows: [FeeRow; 2],
    pub total_amount: Money,
    pub total_gst: Money,
    pub grand_total: Money,
}

pub fn platform_fee_breakdown(platform_fee: Money, delivery_charge: Money) -> PlatformFeeBreakdown {
    let rows = [
        FeeRow::new(FeeKind::PlatformFee, platform_fee),
        FeeRow::new(FeeKind::LogisticsFee, delivery_charge),
    ];
    let total_amount: Money = rows.iter().map(|r| r.amount).sum();
    let total_gst: Money = rows.iter().map(|r| r.gst_amount).sum();
    PlatformFeeBreakdown {
        rows,
        total_amount,
        total_gst,
        grand_total: total_amount + total_gst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::Discount;
    use proptest::prelude::*;

    fn money(d: Decimal) -> Money {
        Money::new(d)
    }

    fn item(unit_price: Decimal, quantity: u32, discount: Decimal, gst_rate: Decimal) -> LineItem {
        LineItem {
            part_name: "Part".into(),
            unit_price: money(unit_price),
            quantity,
            discount: Discount::Amount(money(discount)),
            gst_rate,
            ..LineItem::new_row()
        }
    }

    #[test]
    fn discounted_line_scenario() {
        let f = line_figures(&item(dec!(1000), 2, dec!(200), dec!(18)));
        assert_eq!(f.base.amount(), dec!(2000));
        assert_eq!(f.discounted.amount(), dec!(1800));
        assert_eq!(f.gst_amount.amount(), dec!(324));
        assert_eq!(f.total.amount(), dec!(2124));
    }

    #[test]
    fn platform_fee_scenario() {
        let b = platform_fee_breakdown(money(dec!(299)), money(dec!(100)));
        assert_eq!(b.rows[0].kind.label(), "Platform Fee");
        assert_eq!(b.rows[0].total.fixed2(), "352.82");
        assert_eq!(b.rows[1].kind.label(), "Logistics Fee");
        assert_eq!(b.rows[1].total.fixed2(), "118.00");
        assert_eq!(b.grand_total.amount(), dec!(470.82));
    }

    #[test]
    fn platform_breakdown_ignores_item_rates() {
        let b = platform_fee_breakdown(money(dec!(10)), Money::ZERO);
        assert!(b.rows.iter().all(|r| r.gst_rate == PLATFORM_GST_RATE));
        assert_eq!(b.total_gst.amount(), dec!(1.8));
    }

    #[test]
    fn customer_total_adds_delivery_only() {
        let items = vec![item(dec!(1000), 2, dec!(200), dec!(18)), item(dec!(50), 3, dec!(0), dec!(5))];
        let t = invoice_totals(&items, money(dec!(100)), money(dec!(299)), TotalsVariant::CustomerDocument);
        assert_eq!(t.subtotal.amount(), dec!(1950));
        assert_eq!(t.total_gst.amount(), dec!(331.5));
        assert_eq!(t.grand_total.amount(), dec!(2381.5));

        let with_fee =
            invoice_totals(&items, money(dec!(100)), money(dec!(299)), TotalsVariant::IncludingPlatformFee);
        assert_eq!(with_fee.grand_total.amount(), dec!(2680.5));
    }

    #[test]
    fn oversized_discount_propagates_negative_values() {
        let f = line_figures(&item(dec!(100), 1, dec!(150), dec!(18)));
        assert_eq!(f.discounted.amount(), dec!(-50));
        assert_eq!(f.gst_amount.amount(), dec!(-9));
        assert!(f.total.is_negative());
    }

    #[test]
    fn zero_quantity_line_contributes_nothing() {
        let f = line_figures(&item(dec!(999), 0, dec!(0), dec!(28)));
        assert_eq!(f.total, Money::ZERO);
    }

    #[test]
    fn empty_invoice_totals_to_delivery_charge() {
        let t = invoice_totals(&[], money(dec!(100)), Money::ZERO, TotalsVariant::CustomerDocument);
        assert_eq!(t.subtotal, Money::ZERO);
        assert_eq!(t.grand_total.amount(), dec!(100));
    }

    #[test]
    fn totals_serialize_camel_case() {
        let t = InvoiceTotals {
            subtotal: money(dec!(1)),
            total_gst: money(dec!(0.18)),
            grand_total: money(dec!(1.18)),
        };
        let json = serde_json::to_value(t).unwrap();
        assert!(json.get("totalGst").is_some());
        assert!(json.get("grandTotal").is_some());
    }

    fn arb_item() -> impl Strategy<Value = LineItem> {
        (1i64..5_000_000i64, 0u32..50u32, 0i64..100_000i64, prop::sample::select(vec![0i64, 5, 12, 18, 28]))
            .prop_map(|(price, qty, disc, rate)| {
                item(Decimal::new(price, 2), qty, Decimal::new(disc, 2), Decimal::from(rate))
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: without a discount, line total = price * qty * (1 + rate/100).
        #[test]
        fn undiscounted_line_total(price in 0i64..10_000_000i64, qty in 0u32..1000u32, rate in 0i64..40i64) {
            let it = item(Decimal::new(price, 2), qty, Decimal::ZERO, Decimal::from(rate));
            let expected = Decimal::new(price, 2) * Decimal::from(qty)
                * (Decimal::ONE + Decimal::from(rate) / Decimal::ONE_HUNDRED);
            prop_assert_eq!(line_figures(&it).total.amount(), expected);
        }

        /// Property: subtotal + total GST equals the sum of line totals, in any order.
        #[test]
        fn totals_match_line_sum_in_any_order(items in prop::collection::vec(arb_item(), 0..20)) {
            let forward = invoice_totals(&items, Money::ZERO, Money::ZERO, TotalsVariant::CustomerDocument);
            let line_sum: Money = items.iter().map(|i| line_figures(i).total).sum();
            prop_assert_eq!(forward.subtotal + forward.total_gst, line_sum);

            let mut reversed = items.clone();
            reversed.reverse();
            let backward = invoice_totals(&reversed, Money::ZERO, Money::ZERO, TotalsVariant::CustomerDocument);
            prop_assert_eq!(forward, backward);
        }

        /// Property: customer grand total = subtotal + GST + delivery; platform = fees * 1.18.
        #[test]
        fn grand_totals(items in prop::collection::vec(arb_item(), 0..10), delivery in 0i64..100_000i64, fee in 0i64..100_000i64) {
            let delivery = money(Decimal::new(delivery, 2));
            let fee = money(Decimal::new(fee, 2));
            let t = invoice_totals(&items, delivery, fee, TotalsVariant::CustomerDocument);
            prop_assert_eq!(t.grand_total, t.subtotal + t.total_gst + delivery);

            let b = platform_fee_breakdown(fee, delivery);
            let expected = fee.amount() * dec!(1.18) + delivery.amount() * dec!(1.18);
            prop_assert_eq!(b.grand_total.amount(), expected);
        }
    }
}
