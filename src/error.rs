// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors raised while applying an edit to a draft record.
///
/// Malformed numbers are never reported here; they coerce to zero. Numbers
/// too large for the arithmetic surface as `Overflow` instead of a panic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("No {side} item at index {index} (record has {len})")]
    ItemIndex {
        side: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Unknown {side} item field '{field}'")]
    UnknownField { side: &'static str, field: String },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown record kind '{0}' (use receipt|admin-receipt)")]
    UnknownKind(String),

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

/// Pre-save rule violation. One error per failing side, never a field list.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "Invalid given items: every item needs a product name and a pure weight, pure % and melting above zero"
    )]
    GivenItems,

    #[error(
        "Invalid received items: every item needs a product name, a final ornaments weight above zero and a non-negative making charge"
    )]
    ReceivedItems,
}
