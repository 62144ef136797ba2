// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::config::default_operation;
use crate::engine::{Edit, GivenField, ReceivedField, apply_all};
use crate::models::{LedgerRecord, LedgerSummary, ManualReconciliation, Operation, RecordKind};
use crate::store;
use crate::utils::{display_decimals, fmt_decimal, maybe_print_json, parse_date, pretty_table};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("new", sub)) => new(conn, sub)?,
        Some(("given-add", sub)) => given_add(conn, sub)?,
        Some(("received-add", sub)) => received_add(conn, sub)?,
        Some(("given-rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let index = *sub.get_one::<usize>("index").unwrap();
            let summary = edit_and_save(conn, id, |_| vec![Edit::RemoveGiven(index)])?;
            print_summary(conn, id, &summary)?;
        }
        Some(("received-rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let index = *sub.get_one::<usize>("index").unwrap();
            let summary = edit_and_save(conn, id, |_| vec![Edit::RemoveReceived(index)])?;
            print_summary(conn, id, &summary)?;
        }
        Some(("set", sub)) => set(conn, sub)?,
        Some(("operation", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let op = Operation::from(sub.get_one::<String>("op").unwrap().trim());
            if !op.is_known() {
                bail!(
                    "Unknown operation '{}' (use subtract-given-received|subtract-received-given|add)",
                    op
                );
            }
            let summary = edit_and_save(conn, id, |_| vec![Edit::SetOperation(op)])?;
            print_summary(conn, id, &summary)?;
        }
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::delete_record(conn, id)?;
            println!("Deleted record #{}", id);
        }
        Some(("import", sub)) => import(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Load a record, replay edits on it, then validate and save.
pub fn edit_and_save<F>(conn: &mut Connection, id: i64, edits: F) -> Result<LedgerSummary>
where
    F: FnOnce(&LedgerRecord) -> Vec<Edit>,
{
    let stored = store::load_record(conn, id)?;
    let previous = store::previous_balance_for(conn, &stored)?;
    let draft = apply_all(&stored.record, edits(&stored.record))?;
    store::save_record(conn, id, &draft, previous)
}

fn text(v: &str) -> Value {
    Value::String(v.to_string())
}

fn new(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let client = store::client_by_name(conn, sub.get_one::<String>("client").unwrap())?;
    let kind: RecordKind = sub.get_one::<String>("kind").unwrap().parse()?;
    let voucher = sub
        .get_one::<String>("voucher")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let operation = match sub.get_one::<String>("operation") {
        Some(s) => Operation::from(s.trim()),
        None => default_operation(conn)?,
    };
    if !operation.is_known() {
        bail!("Unknown operation '{}'", operation);
    }
    let id = store::create_record(conn, kind, client.id, voucher, Some(date), &operation)?;
    println!("Opened {} #{} for '{}' on {}", kind, id, client.name, date);
    Ok(())
}

fn given_add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let date = match sub.get_one::<String>("date") {
        Some(s) => Some(parse_date(s)?.to_string()),
        None => None,
    };
    let fields = [
        (GivenField::ProductName, "product"),
        (GivenField::PureWeight, "pure_weight"),
        (GivenField::PurePercent, "pure_percent"),
        (GivenField::Melting, "melting"),
    ]
    .map(|(field, arg)| (field, text(sub.get_one::<String>(arg).unwrap())));

    let summary = edit_and_save(conn, id, |rec| {
        let index = rec.given.items.len();
        let mut edits = vec![Edit::AddGiven];
        edits.extend(
            fields
                .into_iter()
                .map(|(field, value)| Edit::SetGiven { index, field, value }),
        );
        if let Some(d) = date {
            edits.push(Edit::SetGiven {
                index,
                field: GivenField::Date,
                value: Value::String(d),
            });
        }
        edits
    })?;
    print_summary(conn, id, &summary)
}

fn received_add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let fields = [
        (ReceivedField::ProductName, "product"),
        (ReceivedField::FinalOrnamentsWt, "final_wt"),
        (ReceivedField::StoneWeight, "stone_wt"),
        (ReceivedField::MakingChargePercent, "making"),
    ]
    .map(|(field, arg)| (field, text(sub.get_one::<String>(arg).unwrap())));

    let summary = edit_and_save(conn, id, |rec| {
        let index = rec.received.items.len();
        let mut edits = vec![Edit::AddReceived];
        edits.extend(
            fields
                .into_iter()
                .map(|(field, value)| Edit::SetReceived { index, field, value }),
        );
        edits
    })?;
    print_summary(conn, id, &summary)
}

fn set(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let index = *sub.get_one::<usize>("index").unwrap();
    let field = sub.get_one::<String>("field").unwrap();
    let value = text(sub.get_one::<String>("value").unwrap());
    let edit = match sub.get_one::<String>("side").unwrap().as_str() {
        "given" => Edit::SetGiven {
            index,
            field: field.parse()?,
            value,
        },
        _ => Edit::SetReceived {
            index,
            field: field.parse()?,
            value,
        },
    };
    let summary = edit_and_save(conn, id, |_| vec![edit])?;
    print_summary(conn, id, &summary)
}

fn import(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let path = sub.get_one::<String>("file").unwrap().trim();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Read draft {}", path))?;
    let mut draft: LedgerRecord =
        serde_json::from_str(&raw).with_context(|| format!("Parse draft {}", path))?;

    let stored = store::load_record(conn, id)?;
    draft.kind = stored.record.kind;
    if draft.voucher_id.is_none() {
        draft.voucher_id = stored.record.voucher_id.clone();
    }
    let previous = store::previous_balance_for(conn, &stored)?;
    let summary = store::save_record(conn, id, &draft, previous)?;
    print_summary(conn, id, &summary)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let stored = store::load_record(conn, id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &stored)? {
        return Ok(());
    }
    let manual = ManualReconciliation {
        given_total: stored.record.given.total,
        received_total: stored.record.received.total,
        operation: stored.record.manual.operation.clone(),
        result: stored.manual_result,
    };
    println!(
        "{} #{} for '{}'{}",
        stored.record.kind,
        stored.id,
        stored.client_name,
        stored
            .record
            .voucher_id
            .as_deref()
            .map(|v| format!(" (voucher {})", v))
            .unwrap_or_default()
    );
    render(
        conn,
        &stored.record,
        &manual,
        stored.previous_balance,
        stored.new_balance,
    )
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind = match sub.get_one::<String>("kind") {
        Some(k) => Some(k.parse::<RecordKind>()?),
        None => None,
    };
    let rows = store::list_records(
        conn,
        sub.get_one::<String>("client").map(|s| s.as_str()),
        kind,
    )?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        let data = rows
            .into_iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.kind,
                    r.voucher,
                    r.client,
                    r.given_date,
                    r.given_total,
                    r.received_total,
                    r.new_balance,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Kind", "Voucher", "Client", "Date", "Given", "Received", "Balance"],
                data,
            )
        );
    }
    Ok(())
}

pub fn print_summary(conn: &Connection, id: i64, summary: &LedgerSummary) -> Result<()> {
    println!("Saved record #{}", id);
    render(
        conn,
        &summary.record,
        &summary.manual_reconciliation,
        summary.previous_balance,
        summary.new_client_balance,
    )
}

fn render(
    conn: &Connection,
    record: &LedgerRecord,
    manual: &ManualReconciliation,
    previous: Decimal,
    new_balance: Decimal,
) -> Result<()> {
    let dp = display_decimals(conn)?;
    let f = |d: Decimal| fmt_decimal(d, dp);

    let given_rows = record
        .given
        .items
        .iter()
        .enumerate()
        .map(|(i, it)| {
            vec![
                i.to_string(),
                it.product_name.clone(),
                it.date.map(|d| d.to_string()).unwrap_or_default(),
                f(it.pure_weight),
                f(it.pure_percent),
                f(it.melting),
                f(it.total),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["#", "Product", "Date", "Pure Wt", "Pure %", "Melting", "Total"],
            given_rows
        )
    );

    let received_rows = record
        .received
        .items
        .iter()
        .enumerate()
        .map(|(i, it)| {
            vec![
                i.to_string(),
                it.product_name.clone(),
                f(it.final_ornaments_wt),
                f(it.stone_weight),
                f(it.sub_total),
                f(it.making_charge_percent),
                f(it.total),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["#", "Product", "Final Wt", "Stone Wt", "Sub Total", "Making %", "Total"],
            received_rows
        )
    );

    println!(
        "{}",
        pretty_table(
            &["Figure", "Value"],
            vec![
                vec!["Given total".into(), f(record.given.total)],
                vec!["Given pure weight".into(), f(record.given.total_pure_weight)],
                vec!["Received ornaments wt".into(), f(record.received.total_ornaments_wt)],
                vec!["Received stone wt".into(), f(record.received.total_stone_weight)],
                vec!["Received sub total".into(), f(record.received.total_sub_total)],
                vec!["Received total".into(), f(record.received.total)],
                vec![format!("Manual ({})", manual.operation), f(manual.result)],
                vec!["Previous balance".into(), f(previous)],
                vec!["New balance".into(), f(new_balance)],
            ],
        )
    );
    Ok(())
}
