// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{evaluate, validate};
use crate::error::EngineError;
use crate::models::{LedgerRecord, LedgerSummary};
use crate::utils::parse_decimal;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcOutput {
    #[serde(flatten)]
    pub summary: LedgerSummary,
    pub validation_error: Option<String>,
}

pub fn calculate(draft: &LedgerRecord, previous_balance: Decimal) -> Result<CalcOutput, EngineError> {
    Ok(CalcOutput {
        summary: evaluate(draft, previous_balance)?,
        validation_error: validate(draft).err().map(|e| e.to_string()),
    })
}

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let path = m.get_one::<String>("file").unwrap().trim();
    let previous = parse_decimal(m.get_one::<String>("balance").unwrap())?;
    let raw = std::fs::read_to_string(path).with_context(|| format!("Read draft {}", path))?;
    let draft: LedgerRecord =
        serde_json::from_str(&raw).with_context(|| format!("Parse draft {}", path))?;
    let out = calculate(&draft, previous).with_context(|| format!("Evaluate draft {}", path))?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
