//! Forgiving deserializers for backend payloads.
//!
//! The backend stores whatever the dashboard sent, so numeric fields may be
//! missing or `null` and text fields may be `null`. Those collapse to zero /
//! empty before any arithmetic. Amounts, rates and quantities beyond the
//! line-item ceilings are rejected outright.

use core::str::FromStr;

use chrono::{DateTime, NaiveDate};
use qikspare_core::Money;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::line_item::{MAX_AMOUNT, MAX_QUANTITY, MAX_RATE};

pub(crate) fn decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    Ok(Option::<Decimal>::deserialize(d)?.unwrap_or_default())
}

fn bounded<'de, D: Deserializer<'de>>(d: D, ceiling: Decimal, what: &str) -> Result<Decimal, D::Error> {
    let value = decimal(d)?;
    if value.abs() > ceiling {
        return Err(D::Error::custom(format!("{what} {value} exceeds {ceiling}")));
    }
    Ok(value)
}

/// Rupee amount no larger than [`MAX_AMOUNT`] either side of zero.
pub(crate) fn money<'de, D: Deserializer<'de>>(d: D) -> Result<Money, D::Error> {
    bounded(d, MAX_AMOUNT, "amount").map(Money::new)
}

/// Percentage no larger than [`MAX_RATE`] either side of zero.
pub(crate) fn rate<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal, D::Error> {
    bounded(d, MAX_RATE, "rate")
}

/// Whole, non-negative quantity; fractions are truncated and negatives become 0.
pub(crate) fn quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = decimal(d)?.trunc();
    if value > Decimal::from(MAX_QUANTITY) {
        return Err(D::Error::custom(format!("quantity {value} exceeds {MAX_QUANTITY}")));
    }
    Ok(value.to_u32().unwrap_or(0))
}

pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

pub(crate) fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.filter(|s| !s.trim().is_empty()))
}

/// Blank identifiers are treated as absent.
pub(crate) fn optional_id<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(optional_text(d)?.and_then(|s| T::from_str(&s).ok()))
}

pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Accepts `2024-05-01` or an RFC 3339 timestamp such as `2024-05-01T00:00:00.000Z`.
pub(crate) fn date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let Some(raw) = optional_text(d)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| D::Error::custom(format!("invalid invoice date: {raw}")))
}

pub(crate) fn parsed<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match optional_text(d)? {
        None => Ok(None),
        Some(s) if s.trim() == "-" => Ok(None),
        Some(s) => T::from_str(s.trim()).map(Some).map_err(D::Error::custom),
    }
}
