// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DEFAULT_DECIMALS: u32 = 2;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Coerce form input to a number. Null, blank and unparseable input yield
/// `default`; a string must be a complete decimal literal, so "3.5abc" is
/// rejected rather than read as 3.5. Finite numbers beyond the decimal range
/// saturate at `Decimal::MAX` / `Decimal::MIN`.
pub fn parse_numeric_value(value: &Value, default: Decimal) -> Decimal {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else if let Some(u) = n.as_u64() {
                Decimal::from(u)
            } else {
                n.as_f64().and_then(saturating_decimal).unwrap_or(default)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return default;
            }
            s.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(saturating_decimal))
                .unwrap_or(default)
        }
        _ => default,
    }
}

fn saturating_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    match Decimal::try_from(f) {
        Ok(d) => Some(d),
        Err(_) if f.abs() < 1.0 => Some(Decimal::ZERO),
        Err(_) if f.is_sign_negative() => Some(Decimal::MIN),
        Err(_) => Some(Decimal::MAX),
    }
}

pub fn fmt_decimal(d: Decimal, decimals: u32) -> String {
    let rounded = d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    // -0.001 rounds to a signed zero; print it as plain zero
    let rounded = if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    };
    format!("{:.*}", decimals as usize, rounded)
}

pub fn format_numeric_value(value: &Value, decimals: u32, default: Decimal) -> String {
    fmt_decimal(parse_numeric_value(value, default), decimals)
}

/// Persistence rounding: floor(x * 100 + 0.5) / 100, i.e. halves go toward
/// positive infinity. Never overflows.
pub fn round2(x: Decimal) -> Decimal {
    let strategy = if x.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    x.round_dp_with_strategy(2, strategy).normalize()
}

pub fn lenient_decimal<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    Ok(parse_numeric_value(&v, Decimal::ZERO))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_client(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM clients WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name.trim()], |r| r.get(0))
        .with_context(|| format!("Client '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn display_decimals(conn: &Connection) -> Result<u32> {
    match get_setting(conn, "display_decimals")? {
        Some(s) => s
            .parse::<u32>()
            .with_context(|| format!("Invalid display_decimals setting '{}'", s)),
        None => Ok(DEFAULT_DECIMALS),
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
