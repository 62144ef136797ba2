// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure ledger arithmetic: item derivation, set totals, balances and the
//! pre-save gate. Nothing in here touches the database.

pub mod balance;
pub mod draft;
pub mod given;
pub mod received;
pub mod validation;

pub use balance::{calculate_balance, calculate_new_client_balance, reconcile};
pub use draft::{Edit, apply, apply_all, evaluate, recompute};
pub use given::GivenField;
pub use received::ReceivedField;
pub use validation::validate;

use crate::error::EngineError;
use rust_decimal::Decimal;

pub(crate) fn checked(value: Option<Decimal>, what: &'static str) -> Result<Decimal, EngineError> {
    value.ok_or(EngineError::Overflow(what))
}

pub(crate) fn checked_sum<I>(values: I, what: &'static str) -> Result<Decimal, EngineError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked(acc.checked_add(v), what))
}
