use qikspare_core::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use qikspare_core::DomainError;
use serde::{Deserialize, Serialize};

use crate::lenient;

/// GST rate applied to freshly added rows.
pub const DEFAULT_GST_RATE: Decimal = dec!(18);

/// Largest rupee amount accepted for a price, discount or fee.
///
/// Together with [`MAX_QUANTITY`] and [`MAX_RATE`] this keeps every line and
/// invoice total far inside the range of `Decimal`.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Largest quantity accepted on a line.
pub const MAX_QUANTITY: u32 = 1_000_000;

/// Largest GST or discount percentage accepted.
pub const MAX_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Which view of the discount the user edited last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountSource {
    #[default]
    Amount,
    Percent,
}

/// A line discount, stored as the view that was edited last.
///
/// The other view is always derived from the current line base, so the
/// amount and percentage can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    /// Flat rupee discount on the whole line.
    Amount(Money),
    /// Percentage of the line base (0–100).
    Percent(Decimal),
}

impl Default for Discount {
    fn default() -> Self {
        Discount::Amount(Money::ZERO)
    }
}

impl Discount {
    pub fn source(&self) -> DiscountSource {
        match self {
            Discount::Amount(_) => DiscountSource::Amount,
            Discount::Percent(_) => DiscountSource::Percent,
        }
    }

    /// Rupee view against `base`. A percentage of a zero base is zero.
    pub fn amount_on(&self, base: Money) -> Money {
        match *self {
            Discount::Amount(amount) => amount,
            Discount::Percent(_) if base == Money::ZERO => Money::ZERO,
            Discount::Percent(pct) => base.percent(pct),
        }
    }

    /// Percentage view against `base`. Any amount over a zero base is 0%.
    pub fn percent_on(&self, base: Money) -> Decimal {
        match *self {
            Discount::Percent(pct) => pct,
            Discount::Amount(_) if base == Money::ZERO => Decimal::ZERO,
            Discount::Amount(amount) => amount
                .amount()
                .checked_div(base.amount())
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or_else(|| saturated(amount.amount(), base.amount())),
        }
    }
}

/// Percentages too large for `Decimal` pin to its bounds, keeping the sign.
fn saturated(amount: Decimal, base: Decimal) -> Decimal {
    if amount.is_sign_negative() == base.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    }
}

/// One priced part or service on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineItemWire", into = "LineItemWire")]
pub struct LineItem {
    pub part_name: String,
    pub model_no: String,
    pub category: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub discount: Discount,
    /// GST percentage for this line.
    pub gst_rate: Decimal,
}

impl Default for LineItem {
    fn default() -> Self {
        Self::new_row()
    }
}

impl LineItem {
    /// Blank row as added from the authoring table: qty 1, 18% GST, no discount.
    pub fn new_row() -> Self {
        Self {
            part_name: String::new(),
            model_no: String::new(),
            category: String::new(),
            unit_price: Money::ZERO,
            quantity: 1,
            discount: Discount::default(),
            gst_rate: DEFAULT_GST_RATE,
        }
    }

    /// `unit_price * quantity`.
    pub fn base(&self) -> Money {
        self.unit_price.times(self.quantity)
    }

    pub fn discount_amount(&self) -> Money {
        self.discount.amount_on(self.base())
    }

    pub fn discount_percent(&self) -> Decimal {
        self.discount.percent_on(self.base())
    }

    pub fn discount_source(&self) -> DiscountSource {
        self.discount.source()
    }
}

/// Backend shape: both discount views are stored, plus the edited one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemWire {
    #[serde(default, deserialize_with = "lenient::text")]
    part_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    model_no: String,
    #[serde(default, deserialize_with = "lenient::text")]
    category: String,
    #[serde(default, deserialize_with = "lenient::money")]
    unit_price: Money,
    #[serde(default, deserialize_with = "lenient::quantity")]
    quantity: u32,
    /// Only trusted when `discount_source` is `amount`; otherwise derived.
    #[serde(default, deserialize_with = "lenient::decimal")]
    discount_amount: Decimal,
    #[serde(default, deserialize_with = "lenient::decimal")]
    discount_percent: Decimal,
    #[serde(rename = "gst", alias = "gstRate", default, deserialize_with = "lenient::rate")]
    gst_rate: Decimal,
    #[serde(default, deserialize_with = "lenient::or_default")]
    discount_source: DiscountSource,
}

impl TryFrom<LineItemWire> for LineItem {
    type Error = DomainError;

    fn try_from(w: LineItemWire) -> Result<Self, Self::Error> {
        let discount = match w.discount_source {
            DiscountSource::Amount if w.discount_amount.abs() > MAX_AMOUNT => {
                return Err(DomainError::validation(format!(
                    "discount amount {} exceeds {MAX_AMOUNT}",
                    w.discount_amount
                )));
            }
            DiscountSource::Percent if w.discount_percent.abs() > MAX_RATE => {
                return Err(DomainError::validation(format!(
                    "discount percent {} exceeds {MAX_RATE}",
                    w.discount_percent
                )));
            }
            DiscountSource::Amount => Discount::Amount(Money::new(w.discount_amount)),
            DiscountSource::Percent => Discount::Percent(w.discount_percent),
        };
        Ok(Self {
            part_name: w.part_name,
            model_no: w.model_no,
            category: w.category,
            unit_price: w.unit_price,
            quantity: w.quantity,
            discount,
            gst_rate: w.gst_rate,
        })
    }
}

impl From<LineItem> for LineItemWire {
    fn from(item: LineItem) -> Self {
        Self {
            discount_amount: item.discount_amount().amount(),
            discount_percent: item.discount_percent(),
            discount_source: item.discount_source(),
            part_name: item.part_name,
            model_no: item.model_no,
            category: item.category,
            unit_price: item.unit_price,
            quantity: item.quantity,
            gst_rate: item.gst_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(unit_price: Decimal, quantity: u32, discount: Discount) -> LineItem {
        LineItem {
            unit_price: Money::new(unit_price),
            quantity,
            discount,
            ..LineItem::new_row()
        }
    }

    #[test]
    fn amount_edit_derives_percent() {
        let it = item(dec!(1000), 2, Discount::Amount(Money::new(dec!(200))));
        assert_eq!(it.discount_percent(), dec!(10));
        assert_eq!(it.discount_source(), DiscountSource::Amount);
    }

    #[test]
    fn percent_edit_derives_amount() {
        let it = item(dec!(250), 4, Discount::Percent(dec!(12.5)));
        assert_eq!(it.discount_amount().amount(), dec!(125));
    }

    #[test]
    fn zero_base_yields_zero_for_the_derived_view() {
        let by_amount = item(dec!(0), 3, Discount::Amount(Money::new(dec!(50))));
        assert_eq!(by_amount.discount_percent(), Decimal::ZERO);
        assert_eq!(by_amount.discount_amount().amount(), dec!(50));

        let by_percent = item(dec!(99), 0, Discount::Percent(dec!(20)));
        assert_eq!(by_percent.discount_amount(), Money::ZERO);
    }

    #[test]
    fn percent_discount_follows_price_changes() {
        let mut it = item(dec!(100), 1, Discount::Percent(dec!(10)));
        assert_eq!(it.discount_amount().amount(), dec!(10));
        it.unit_price = Money::new(dec!(300));
        assert_eq!(it.discount_amount().amount(), dec!(30));
    }

    #[test]
    fn missing_and_null_numbers_deserialize_as_zero() {
        let it: LineItem = serde_json::from_str(
            r#"{"partName":"Brake pad","unitPrice":null,"discountAmount":null}"#,
        )
        .unwrap();
        assert_eq!(it.part_name, "Brake pad");
        assert_eq!(it.unit_price, Money::ZERO);
        assert_eq!(it.quantity, 0);
        assert_eq!(it.gst_rate, Decimal::ZERO);
        assert_eq!(it.discount, Discount::Amount(Money::ZERO));
    }

    #[test]
    fn backend_rows_use_gst_field_and_amount_as_source() {
        let it: LineItem = serde_json::from_str(
            r#"{"partName":"Clutch plate","modelNo":"CP-9","category":"Transmission",
                "unitPrice":1000,"quantity":2,"discountAmount":200,"discountPercent":10,"gst":18}"#,
        )
        .unwrap();
        assert_eq!(it.gst_rate, dec!(18));
        assert_eq!(it.discount, Discount::Amount(Money::new(dec!(200))));
    }

    #[test]
    fn serialization_writes_both_views_and_the_source() {
        let it = item(dec!(200), 1, Discount::Percent(dec!(25)));
        let json = serde_json::to_value(&it).unwrap();
        assert_eq!(json["discountSource"], "percent");
        assert_eq!(json["discountAmount"].as_f64(), Some(50.0));
        assert_eq!(json["discountPercent"].as_f64(), Some(25.0));
        assert_eq!(json["gst"].as_f64(), Some(18.0));

        let back: LineItem = serde_json::from_value(json).unwrap();
        assert_eq!(back.discount, Discount::Percent(dec!(25)));
    }

    #[test]
    fn oversized_numbers_are_rejected_while_parsing() {
        for row in [
            r#"{"unitPrice":1e28,"quantity":100,"gst":18}"#,
            r#"{"unitPrice":100,"quantity":1e7}"#,
            r#"{"unitPrice":100,"discountAmount":-1e13}"#,
            r#"{"unitPrice":100,"gst":1e27}"#,
            r#"{"unitPrice":100,"discountPercent":250,"discountSource":"percent"}"#,
        ] {
            assert!(serde_json::from_str::<LineItem>(row).is_err(), "{row}");
        }

        let at_ceiling: LineItem =
            serde_json::from_str(r#"{"unitPrice":1000000000000,"quantity":1000000,"gst":100}"#).unwrap();
        assert_eq!(at_ceiling.unit_price.amount(), MAX_AMOUNT);
        assert_eq!(at_ceiling.quantity, MAX_QUANTITY);

        // A derived view may be large; only the edited one is bounded.
        let derived: LineItem = serde_json::from_str(
            r#"{"unitPrice":1000000000000,"quantity":1000000,"discountAmount":5e17,
                "discountPercent":50,"discountSource":"percent"}"#,
        )
        .unwrap();
        assert_eq!(derived.discount, Discount::Percent(dec!(50)));
    }

    #[test]
    fn percent_view_on_a_tiny_base_saturates() {
        let tiny = Decimal::new(1, 25);
        let it = item(tiny, 1, Discount::Amount(Money::new(Decimal::MAX)));
        assert_eq!(it.discount_percent(), Decimal::MAX);

        let negative = item(tiny, 1, Discount::Amount(Money::new(Decimal::MIN)));
        assert_eq!(negative.discount_percent(), Decimal::MIN);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: editing one view and reading the other round-trips.
        #[test]
        fn discount_views_round_trip(
            price_paise in 1i64..10_000_000i64,
            quantity in 1u32..500u32,
            discount_paise in 0i64..10_000_000i64,
        ) {
            let price = Decimal::new(price_paise, 2);
            let discount = Decimal::new(discount_paise, 2);

            let by_amount = item(price, quantity, Discount::Amount(Money::new(discount)));
            let pct = by_amount.discount_percent();
            let expected = discount / (price * Decimal::from(quantity)) * Decimal::ONE_HUNDRED;
            prop_assert!((pct - expected).abs() < dec!(0.000001));

            let by_percent = item(price, quantity, Discount::Percent(pct));
            let back = by_percent.discount_amount().amount();
            prop_assert!((back - discount).abs() < dec!(0.0001));
        }
    }
}
