// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValidationError;
use crate::models::{GivenItem, LedgerRecord, ReceivedItem};
use rust_decimal::Decimal;

pub fn is_valid_given(item: &GivenItem) -> bool {
    !item.product_name.trim().is_empty()
        && item.pure_weight > Decimal::ZERO
        && item.pure_percent > Decimal::ZERO
        && item.melting > Decimal::ZERO
}

pub fn is_valid_received(item: &ReceivedItem) -> bool {
    !item.product_name.trim().is_empty()
        && item.final_ornaments_wt > Decimal::ZERO
        && item.making_charge_percent >= Decimal::ZERO
}

/// Pre-save gate. Given items are checked before received items and the
/// first failing side is reported.
pub fn validate(record: &LedgerRecord) -> Result<(), ValidationError> {
    if !record.given.items.iter().all(is_valid_given) {
        return Err(ValidationError::GivenItems);
    }
    if !record.received.items.iter().all(is_valid_received) {
        return Err(ValidationError::ReceivedItems);
    }
    Ok(())
}
