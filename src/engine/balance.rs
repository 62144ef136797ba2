// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::checked;
use crate::error::EngineError;
use crate::models::{ManualReconciliation, Operation};
use rust_decimal::Decimal;

/// Manual reconciliation shown next to the record. Display only: it never
/// feeds the persisted client balance.
pub fn calculate_balance(
    given_total: Decimal,
    received_total: Decimal,
    operation: &Operation,
) -> Result<Decimal, EngineError> {
    let result = match operation {
        Operation::SubtractGivenReceived => given_total.checked_sub(received_total),
        Operation::SubtractReceivedGiven => received_total.checked_sub(given_total),
        Operation::Add => given_total.checked_add(received_total),
        Operation::Unknown(_) => Some(Decimal::ZERO),
    };
    checked(result, "manual calculation")
}

/// Always plain subtraction, whatever the manual operation says.
pub fn calculate_new_client_balance(
    given_total: Decimal,
    received_total: Decimal,
    previous_balance: Decimal,
) -> Result<Decimal, EngineError> {
    checked(
        given_total
            .checked_sub(received_total)
            .and_then(|net| net.checked_add(previous_balance)),
        "client balance",
    )
}

pub fn reconcile(
    given_total: Decimal,
    received_total: Decimal,
    operation: &Operation,
) -> Result<ManualReconciliation, EngineError> {
    Ok(ManualReconciliation {
        given_total,
        received_total,
        operation: operation.clone(),
        result: calculate_balance(given_total, received_total, operation)?,
    })
}
