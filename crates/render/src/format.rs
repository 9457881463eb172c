//! Formatting helpers shared by both templates.

use core::fmt::Display;

use chrono::NaiveDate;
use qikspare_core::Money;
use rust_decimal::Decimal;

use crate::document::{Element, Tag};

/// Printed in place of a missing value.
pub const PLACEHOLDER: &str = "-";

/// `1234.50`, for table cells whose header already carries the currency.
pub fn fixed2(amount: Money) -> String {
    amount.fixed2()
}

/// `₹1234.50`.
pub fn rupees(amount: Money) -> String {
    amount.to_string()
}

/// `18%`, `12.5%`.
pub fn percent(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

pub fn text_or_placeholder(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

pub fn optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| text_or_placeholder(&v.to_string()))
}

pub fn date(value: Option<NaiveDate>) -> String {
    optional(value.map(|d| d.format("%Y-%m-%d")))
}

/// `<p><strong>{label}:</strong> {value}</p>`
pub(crate) fn labeled(label: &str, value: impl Into<String>) -> Element {
    Element::new(Tag::P)
        .child(Element::new(Tag::Strong).child(format!("{label}:")))
        .child(format!(" {}", value.into()))
}
