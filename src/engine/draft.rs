// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::balance::{calculate_new_client_balance, reconcile};
use super::given::{self, GivenField};
use super::received::{self, ReceivedField};
use crate::error::EngineError;
use crate::models::{GivenItem, LedgerRecord, LedgerSummary, Operation, ReceivedItem};
use rust_decimal::Decimal;
use serde_json::Value;

/// One user edit against a draft record.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    SetGiven {
        index: usize,
        field: GivenField,
        value: Value,
    },
    SetReceived {
        index: usize,
        field: ReceivedField,
        value: Value,
    },
    AddGiven,
    RemoveGiven(usize),
    AddReceived,
    RemoveReceived(usize),
    SetGivenDate(Value),
    SetReceivedDate(Value),
    SetOperation(Operation),
    SetVoucher(Option<String>),
}

fn check_index(side: &'static str, index: usize, len: usize) -> Result<(), EngineError> {
    if index < len {
        Ok(())
    } else {
        Err(EngineError::ItemIndex { side, index, len })
    }
}

/// Produce the next draft from `record` and one edit. Item edits re-derive
/// the edited item and every aggregate of that side.
pub fn apply(record: &LedgerRecord, edit: Edit) -> Result<LedgerRecord, EngineError> {
    tracing::debug!(?edit, "applying draft edit");
    let mut next = record.clone();
    match edit {
        Edit::SetGiven {
            index,
            field,
            value,
        } => {
            check_index("given", index, next.given.items.len())?;
            next.given.items[index] = given::set_field(&next.given.items[index], field, &value)?;
            next.given = given::with_totals(next.given)?;
        }
        Edit::SetReceived {
            index,
            field,
            value,
        } => {
            check_index("received", index, next.received.items.len())?;
            next.received.items[index] =
                received::set_field(&next.received.items[index], field, &value)?;
            next.received = received::with_totals(next.received)?;
        }
        Edit::AddGiven => {
            next.given.items.push(GivenItem::new(next.given.date));
            next.given = given::with_totals(next.given)?;
        }
        Edit::RemoveGiven(index) => {
            check_index("given", index, next.given.items.len())?;
            next.given.items.remove(index);
            next.given = given::with_totals(next.given)?;
        }
        Edit::AddReceived => {
            next.received.items.push(ReceivedItem::default());
            next.received = received::with_totals(next.received)?;
        }
        Edit::RemoveReceived(index) => {
            check_index("received", index, next.received.items.len())?;
            next.received.items.remove(index);
            next.received = received::with_totals(next.received)?;
        }
        Edit::SetGivenDate(value) => next.given.date = given::date_of(&value)?,
        Edit::SetReceivedDate(value) => next.received.date = given::date_of(&value)?,
        Edit::SetOperation(op) => next.manual.operation = op,
        Edit::SetVoucher(voucher) => {
            next.voucher_id = voucher.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
    }
    Ok(next)
}

pub fn apply_all<I>(record: &LedgerRecord, edits: I) -> Result<LedgerRecord, EngineError>
where
    I: IntoIterator<Item = Edit>,
{
    edits
        .into_iter()
        .try_fold(record.clone(), |draft, edit| apply(&draft, edit))
}

/// Re-derive every item and aggregate from the raw inputs.
pub fn recompute(record: &LedgerRecord) -> Result<LedgerRecord, EngineError> {
    Ok(LedgerRecord {
        given: given::recompute_set(&record.given)?,
        received: received::recompute_set(&record.received)?,
        ..record.clone()
    })
}

pub fn evaluate(record: &LedgerRecord, previous_balance: Decimal) -> Result<LedgerSummary, EngineError> {
    let record = recompute(record)?;
    let manual_reconciliation = reconcile(
        record.given.total,
        record.received.total,
        &record.manual.operation,
    )?;
    let new_client_balance =
        calculate_new_client_balance(record.given.total, record.received.total, previous_balance)?;
    Ok(LedgerSummary {
        record,
        manual_reconciliation,
        previous_balance,
        new_client_balance,
    })
}
