// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{checked, checked_sum};
use crate::error::EngineError;
use crate::models::{GivenItem, GivenSet};
use crate::utils::{parse_date, parse_numeric_value};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GivenField {
    ProductName,
    PureWeight,
    PurePercent,
    Melting,
    Date,
}

impl GivenField {
    /// Fields that feed the item total.
    pub fn is_weight(&self) -> bool {
        matches!(
            self,
            GivenField::PureWeight | GivenField::PurePercent | GivenField::Melting
        )
    }
}

impl FromStr for GivenField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "productname" | "product" => Ok(GivenField::ProductName),
            "pureweight" => Ok(GivenField::PureWeight),
            "purepercent" => Ok(GivenField::PurePercent),
            "melting" | "touch" => Ok(GivenField::Melting),
            "date" => Ok(GivenField::Date),
            _ => Err(EngineError::UnknownField {
                side: "given",
                field: s.trim().to_string(),
            }),
        }
    }
}

/// Zero melting divides as 1 so a half-typed row never faults.
pub fn melting_divisor(melting: Decimal) -> Decimal {
    if melting.is_zero() {
        Decimal::ONE
    } else {
        melting
    }
}

pub fn item_total(item: &GivenItem) -> Result<Decimal, EngineError> {
    let weighted = checked(
        item.pure_weight.checked_mul(item.pure_percent),
        "given item total",
    )?;
    checked(
        weighted.checked_div(melting_divisor(item.melting)),
        "given item total",
    )
}

/// Pure weight uses 100 as the divisor, never the item's melting.
pub fn item_pure_weight(item: &GivenItem) -> Result<Decimal, EngineError> {
    let weighted = checked(
        item.pure_weight.checked_mul(item.pure_percent),
        "given pure weight",
    )?;
    checked(
        weighted.checked_div(Decimal::ONE_HUNDRED),
        "given pure weight",
    )
}

pub fn recompute_item(item: &GivenItem) -> Result<GivenItem, EngineError> {
    Ok(GivenItem {
        total: item_total(item)?,
        ..item.clone()
    })
}

pub fn set_field(item: &GivenItem, field: GivenField, value: &Value) -> Result<GivenItem, EngineError> {
    let mut next = item.clone();
    match field {
        GivenField::ProductName => next.product_name = text_of(value),
        GivenField::Date => next.date = date_of(value)?,
        GivenField::PureWeight => next.pure_weight = parse_numeric_value(value, Decimal::ZERO),
        GivenField::PurePercent => next.pure_percent = parse_numeric_value(value, Decimal::ZERO),
        GivenField::Melting => next.melting = parse_numeric_value(value, Decimal::ZERO),
    }
    if field.is_weight() {
        next.total = item_total(&next)?;
    }
    Ok(next)
}

/// Rebuild the set totals from its items.
pub fn with_totals(set: GivenSet) -> Result<GivenSet, EngineError> {
    let total = checked_sum(set.items.iter().map(|i| i.total), "given total")?;
    let pure_weights = set
        .items
        .iter()
        .map(item_pure_weight)
        .collect::<Result<Vec<_>, _>>()?;
    let total_pure_weight = checked_sum(pure_weights, "given pure weight")?;
    Ok(GivenSet {
        total,
        total_pure_weight,
        ..set
    })
}

pub fn recompute_set(set: &GivenSet) -> Result<GivenSet, EngineError> {
    let items = set
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if item.has_degenerate_melting() {
                tracing::warn!(
                    index,
                    product = %item.product_name,
                    "given item has zero melting; dividing by 1"
                );
            }
            recompute_item(item)
        })
        .collect::<Result<Vec<_>, _>>()?;
    with_totals(GivenSet {
        items,
        ..set.clone()
    })
}

pub(crate) fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn date_of(value: &Value) -> Result<Option<chrono::NaiveDate>, EngineError> {
    let raw = text_of(value);
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(&raw)
        .map(Some)
        .map_err(|_| EngineError::InvalidDate(raw.trim().to_string()))
}
