// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::given::text_of;
use super::{checked, checked_sum};
use crate::error::EngineError;
use crate::models::{ReceivedItem, ReceivedSet};
use crate::utils::parse_numeric_value;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceivedField {
    ProductName,
    FinalOrnamentsWt,
    StoneWeight,
    MakingChargePercent,
}

impl ReceivedField {
    pub fn is_weight(&self) -> bool {
        !matches!(self, ReceivedField::ProductName)
    }
}

impl FromStr for ReceivedField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "productname" | "product" => Ok(ReceivedField::ProductName),
            "finalornamentswt" | "finalwt" => Ok(ReceivedField::FinalOrnamentsWt),
            "stoneweight" | "stonewt" => Ok(ReceivedField::StoneWeight),
            "makingchargepercent" | "making" => Ok(ReceivedField::MakingChargePercent),
            _ => Err(EngineError::UnknownField {
                side: "received",
                field: s.trim().to_string(),
            }),
        }
    }
}

// Stone heavier than the ornament yields a negative sub-total; it is not clamped.
pub fn item_sub_total(item: &ReceivedItem) -> Result<Decimal, EngineError> {
    checked(
        item.final_ornaments_wt.checked_sub(item.stone_weight),
        "received sub-total",
    )
}

pub fn recompute_item(item: &ReceivedItem) -> Result<ReceivedItem, EngineError> {
    let sub_total = item_sub_total(item)?;
    let rate = checked(
        (item.making_charge_percent / Decimal::ONE_HUNDRED).checked_add(Decimal::ONE),
        "received item total",
    )?;
    let total = checked(sub_total.checked_mul(rate), "received item total")?;
    Ok(ReceivedItem {
        sub_total,
        total,
        ..item.clone()
    })
}

pub fn set_field(
    item: &ReceivedItem,
    field: ReceivedField,
    value: &Value,
) -> Result<ReceivedItem, EngineError> {
    let mut next = item.clone();
    match field {
        ReceivedField::ProductName => next.product_name = text_of(value),
        ReceivedField::FinalOrnamentsWt => {
            next.final_ornaments_wt = parse_numeric_value(value, Decimal::ZERO)
        }
        ReceivedField::StoneWeight => next.stone_weight = parse_numeric_value(value, Decimal::ZERO),
        ReceivedField::MakingChargePercent => {
            next.making_charge_percent = parse_numeric_value(value, Decimal::ZERO)
        }
    }
    if field.is_weight() {
        next = recompute_item(&next)?;
    }
    Ok(next)
}

pub fn with_totals(set: ReceivedSet) -> Result<ReceivedSet, EngineError> {
    let items = &set.items;
    let total = checked_sum(items.iter().map(|i| i.total), "received total")?;
    let total_ornaments_wt = checked_sum(
        items.iter().map(|i| i.final_ornaments_wt),
        "received ornaments weight",
    )?;
    let total_stone_weight =
        checked_sum(items.iter().map(|i| i.stone_weight), "received stone weight")?;
    let total_sub_total = checked_sum(items.iter().map(|i| i.sub_total), "received sub-total")?;
    Ok(ReceivedSet {
        total,
        total_ornaments_wt,
        total_stone_weight,
        total_sub_total,
        ..set
    })
}

pub fn recompute_set(set: &ReceivedSet) -> Result<ReceivedSet, EngineError> {
    let items = set
        .items
        .iter()
        .map(recompute_item)
        .collect::<Result<Vec<_>, _>>()?;
    with_totals(ReceivedSet {
        items,
        ..set.clone()
    })
}
