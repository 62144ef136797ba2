// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("receipts", sub)) => export_receipts(conn, sub),
        _ => Ok(()),
    }
}

const HEADERS: [&str; 14] = [
    "id",
    "kind",
    "voucher",
    "client",
    "given_date",
    "received_date",
    "given_total",
    "given_pure_weight",
    "received_total",
    "received_sub_total",
    "operation",
    "manual_result",
    "previous_balance",
    "new_balance",
];

fn export_receipts(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let mut stmt = conn.prepare(
        "SELECT r.id, r.kind, r.voucher_id, c.name, r.given_date, r.received_date,
                r.given_total, r.given_pure_weight, r.received_total, r.received_sub_total,
                r.operation, r.manual_result, r.previous_balance, r.new_balance
         FROM receipts r
         JOIN clients c ON c.id=r.client_id
         WHERE r.saved_at IS NOT NULL
         ORDER BY r.id",
    )?;
    let rows = stmt.query_map([], |r| {
        let mut cols: Vec<String> = Vec::with_capacity(HEADERS.len());
        cols.push(r.get::<_, i64>(0)?.to_string());
        for i in 1..HEADERS.len() {
            cols.push(r.get::<_, Option<String>>(i)?.unwrap_or_default());
        }
        Ok(cols)
    })?;

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(HEADERS)?;
        for row in rows {
            wtr.write_record(row?)?;
        }
        wtr.flush()?;
    } else {
        let mut items = Vec::new();
        for row in rows {
            let cols = row?;
            let mut obj = serde_json::Map::new();
            for (k, v) in HEADERS.iter().zip(cols) {
                obj.insert((*k).to_string(), json!(v));
            }
            items.push(serde_json::Value::Object(obj));
        }
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported receipts to {}", out);
    Ok(())
}
