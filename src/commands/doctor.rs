// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{evaluate, given, received};
use crate::models::LedgerRecord;
use crate::store::{self, round_for_storage};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Each finding is (issue, detail).
pub fn findings(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    let mut stmt = conn.prepare("SELECT id FROM receipts WHERE saved_at IS NOT NULL ORDER BY id")?;
    let ids = stmt
        .query_map([], |r| r.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()?;

    let mut contributions: std::collections::HashMap<i64, Decimal> = Default::default();
    for id in ids {
        let stored = store::load_record(conn, id)?;
        *contributions.entry(stored.client_id).or_default() += stored.contribution();

        // 1) Stored aggregates must be the sum of the stored items
        if let Some(detail) = unbalanced_totals(&stored.record)? {
            rows.push(vec![
                "stale_totals".into(),
                format!("record {}: {}", id, detail),
            ]);
        }

        // 2) Stored totals that no longer match their raw inputs
        let expected = match evaluate(&stored.record, stored.previous_balance)
            .and_then(round_for_storage)
        {
            Ok(expected) => expected,
            Err(e) => {
                rows.push(vec!["overflow".into(), format!("record {}: {}", id, e)]);
                continue;
            }
        };
        let fresh = &expected.record;
        let kept = &stored.record;
        if fresh.given.total != kept.given.total
            || fresh.given.total_pure_weight != kept.given.total_pure_weight
            || fresh.received.total != kept.received.total
            || fresh.received.total_sub_total != kept.received.total_sub_total
            || expected.new_client_balance != stored.new_balance
        {
            rows.push(vec![
                "stale_totals".into(),
                format!(
                    "record {}: given {} vs {}, received {} vs {}",
                    id,
                    kept.given.total,
                    fresh.given.total,
                    kept.received.total,
                    fresh.received.total
                ),
            ]);
        }

        // 3) Zero melting that slipped past the save gate
        for (i, item) in kept.given.items.iter().enumerate() {
            if item.has_degenerate_melting() {
                rows.push(vec![
                    "zero_melting".into(),
                    format!("record {} given item {} ({})", id, i, item.product_name),
                ]);
            }
        }
    }

    // 4) Client balance must equal opening balance plus every record's contribution
    for client in store::list_clients(conn, None)? {
        let expected = client.opening_balance
            + contributions
                .get(&client.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
        if expected != client.balance {
            rows.push(vec![
                "balance_drift".into(),
                format!(
                    "{}: stored {} expected {}",
                    client.name, client.balance, expected
                ),
            ]);
        }
    }
    Ok(rows)
}

fn unbalanced_totals(record: &LedgerRecord) -> Result<Option<String>> {
    let given = given::with_totals(record.given.clone())?;
    let received = received::with_totals(record.received.clone())?;
    let pairs = [
        ("given total", record.given.total, given.total),
        ("received total", record.received.total, received.total),
        ("received sub-total", record.received.total_sub_total, received.total_sub_total),
        (
            "ornaments weight",
            record.received.total_ornaments_wt,
            received.total_ornaments_wt,
        ),
        (
            "stone weight",
            record.received.total_stone_weight,
            received.total_stone_weight,
        ),
    ];
    Ok(pairs
        .iter()
        .find(|(_, stored, summed)| stored != summed)
        .map(|(what, stored, summed)| format!("{} {} but items sum to {}", what, stored, summed)))
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = findings(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        tracing::warn!(issues = rows.len(), "doctor found inconsistencies");
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
