// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::EngineError;
use crate::utils::lenient_decimal;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Decimal,
    pub balance: Decimal, // grams
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    #[default]
    Receipt,
    AdminReceipt,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Receipt => "receipt",
            RecordKind::AdminReceipt => "admin-receipt",
        }
    }
}

impl FromStr for RecordKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(RecordKind::Receipt),
            "admin-receipt" | "admin" => Ok(RecordKind::AdminReceipt),
            other => Err(EngineError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Material issued to a client or worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GivenItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pure_weight: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub pure_percent: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub melting: Decimal,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
}

impl GivenItem {
    pub fn new(date: Option<NaiveDate>) -> Self {
        GivenItem {
            product_name: String::new(),
            pure_weight: Decimal::ZERO,
            pure_percent: Decimal::ZERO,
            melting: Decimal::ONE,
            date,
            total: Decimal::ZERO,
        }
    }

    /// Zero melting is divided as 1 at runtime; the save gate still rejects it.
    pub fn has_degenerate_melting(&self) -> bool {
        self.melting.is_zero()
    }
}

/// Ornaments or material returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub final_ornaments_wt: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub stone_weight: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub making_charge_percent: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sub_total: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GivenSet {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<GivenItem>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_pure_weight: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedSet {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<ReceivedItem>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_ornaments_wt: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_stone_weight: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_sub_total: Decimal,
}

/// Manual reconciliation selector. Values outside the known three are kept
/// verbatim and reconcile to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    #[default]
    SubtractGivenReceived,
    SubtractReceivedGiven,
    Add,
    Unknown(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::SubtractGivenReceived => "subtract-given-received",
            Operation::SubtractReceivedGiven => "subtract-received-given",
            Operation::Add => "add",
            Operation::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operation::Unknown(_))
    }
}

impl From<&str> for Operation {
    fn from(s: &str) -> Self {
        match s {
            "subtract-given-received" => Operation::SubtractGivenReceived,
            "subtract-received-given" => Operation::SubtractReceivedGiven,
            "add" => Operation::Add,
            other => Operation::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Operation {
    fn from(s: String) -> Self {
        Operation::from(s.as_str())
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCalculation {
    #[serde(default)]
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualReconciliation {
    pub given_total: Decimal,
    pub received_total: Decimal,
    pub operation: Operation,
    pub result: Decimal,
}

/// Draft of one receipt or admin receipt. Edits produce a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(default)]
    pub kind: RecordKind,
    #[serde(default)]
    pub voucher_id: Option<String>,
    #[serde(default)]
    pub given: GivenSet,
    #[serde(default)]
    pub received: ReceivedSet,
    #[serde(default, rename = "manualCalculations")]
    pub manual: ManualCalculation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub record: LedgerRecord,
    pub manual_reconciliation: ManualReconciliation,
    pub previous_balance: Decimal,
    pub new_client_balance: Decimal,
}
