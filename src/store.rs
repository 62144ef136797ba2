// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{calculate_new_client_balance, evaluate, given, received, reconcile, validate};
use crate::error::EngineError;
use crate::models::{
    Client, GivenItem, GivenSet, LedgerRecord, LedgerSummary, ManualCalculation, Operation,
    ReceivedItem, ReceivedSet, RecordKind,
};
use crate::utils::{id_for_client, round2};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};
use rust_decimal::Decimal;
use serde::Serialize;

fn stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored {} '{}'", what, s))
}

// ---------------------------------------------------------------------------
// clients

type ClientRow = (i64, String, Option<String>, Option<String>, String, String);

fn client_from_row(r: &Row<'_>) -> rusqlite::Result<ClientRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
    ))
}

fn into_client(raw: ClientRow) -> Result<Client> {
    let (id, name, phone, address, opening, balance) = raw;
    Ok(Client {
        id,
        opening_balance: stored_decimal(&opening, "opening balance")?,
        balance: stored_decimal(&balance, "client balance")?,
        name,
        phone,
        address,
    })
}

const CLIENT_COLUMNS: &str = "id, name, phone, address, opening_balance, balance";

pub fn add_client(
    conn: &Connection,
    name: &str,
    phone: Option<&str>,
    address: Option<&str>,
    opening_balance: Decimal,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Client name must not be empty");
    }
    conn.execute(
        "INSERT INTO clients(name, phone, address, opening_balance, balance) VALUES (?1, ?2, ?3, ?4, ?4)",
        params![name, phone, address, opening_balance.to_string()],
    )
    .with_context(|| format!("Add client '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

pub fn client_by_id(conn: &Connection, id: i64) -> Result<Client> {
    let raw = conn
        .query_row(
            &format!("SELECT {} FROM clients WHERE id=?1", CLIENT_COLUMNS),
            params![id],
            client_from_row,
        )
        .optional()?
        .with_context(|| format!("Client {} not found", id))?;
    into_client(raw)
}

pub fn client_by_name(conn: &Connection, name: &str) -> Result<Client> {
    let id = id_for_client(conn, name)?;
    client_by_id(conn, id)
}

pub fn list_clients(conn: &Connection, filter: Option<&Regex>) -> Result<Vec<Client>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM clients ORDER BY name",
        CLIENT_COLUMNS
    ))?;
    let rows = stmt.query_map([], client_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        let client = into_client(row?)?;
        if filter.is_none_or(|re| re.is_match(&client.name)) {
            out.push(client);
        }
    }
    Ok(out)
}

pub fn remove_client(conn: &Connection, name: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM clients WHERE name=?1", params![name.trim()])?;
    if n == 0 {
        bail!("Client '{}' not found", name.trim());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// records

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub manual_result: Decimal,
    pub saved_at: Option<String>,
    pub created_at: String,
    pub record: LedgerRecord,
}

impl StoredRecord {
    /// What this record has added to its client's balance so far.
    pub fn contribution(&self) -> Decimal {
        self.new_balance - self.previous_balance
    }
}

pub fn create_record(
    conn: &Connection,
    kind: RecordKind,
    client_id: i64,
    voucher_id: Option<&str>,
    date: Option<NaiveDate>,
    operation: &Operation,
) -> Result<i64> {
    let client = client_by_id(conn, client_id)?;
    let balance = client.balance.to_string();
    conn.execute(
        "INSERT INTO receipts(kind, voucher_id, client_id, given_date, received_date, operation, previous_balance, new_balance)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?6)",
        params![
            kind.as_str(),
            voucher_id,
            client_id,
            date,
            operation.as_str(),
            balance
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, kind = %kind, client = %client.name, "created record");
    Ok(id)
}

struct Header {
    id: i64,
    kind: String,
    voucher_id: Option<String>,
    client_id: i64,
    client_name: String,
    given_date: Option<NaiveDate>,
    received_date: Option<NaiveDate>,
    operation: String,
    totals: [String; 6],
    manual_result: String,
    previous_balance: String,
    new_balance: String,
    saved_at: Option<String>,
    created_at: String,
}

pub fn load_record(conn: &Connection, id: i64) -> Result<StoredRecord> {
    let h = conn
        .query_row(
            "SELECT r.id, r.kind, r.voucher_id, r.client_id, c.name, r.given_date, r.received_date, r.operation,
                    r.given_total, r.given_pure_weight, r.received_total, r.received_ornaments_wt,
                    r.received_stone_weight, r.received_sub_total, r.manual_result,
                    r.previous_balance, r.new_balance, r.saved_at, r.created_at
             FROM receipts r JOIN clients c ON c.id=r.client_id WHERE r.id=?1",
            params![id],
            |r| {
                Ok(Header {
                    id: r.get(0)?,
                    kind: r.get(1)?,
                    voucher_id: r.get(2)?,
                    client_id: r.get(3)?,
                    client_name: r.get(4)?,
                    given_date: r.get(5)?,
                    received_date: r.get(6)?,
                    operation: r.get(7)?,
                    totals: [
                        r.get(8)?,
                        r.get(9)?,
                        r.get(10)?,
                        r.get(11)?,
                        r.get(12)?,
                        r.get(13)?,
                    ],
                    manual_result: r.get(14)?,
                    previous_balance: r.get(15)?,
                    new_balance: r.get(16)?,
                    saved_at: r.get(17)?,
                    created_at: r.get(18)?,
                })
            },
        )
        .optional()?
        .with_context(|| format!("Record {} not found", id))?;

    let given_items = load_given_items(conn, id)?;
    let received_items = load_received_items(conn, id)?;
    let [gt, gpw, rt, row, rsw, rst] = &h.totals;

    let record = LedgerRecord {
        kind: h.kind.parse()?,
        voucher_id: h.voucher_id,
        given: GivenSet {
            date: h.given_date,
            items: given_items,
            total: stored_decimal(gt, "given total")?,
            total_pure_weight: stored_decimal(gpw, "given pure weight")?,
        },
        received: ReceivedSet {
            date: h.received_date,
            items: received_items,
            total: stored_decimal(rt, "received total")?,
            total_ornaments_wt: stored_decimal(row, "received ornaments weight")?,
            total_stone_weight: stored_decimal(rsw, "received stone weight")?,
            total_sub_total: stored_decimal(rst, "received sub-total")?,
        },
        manual: ManualCalculation {
            operation: Operation::from(h.operation),
        },
    };
    Ok(StoredRecord {
        id: h.id,
        client_id: h.client_id,
        client_name: h.client_name,
        previous_balance: stored_decimal(&h.previous_balance, "previous balance")?,
        new_balance: stored_decimal(&h.new_balance, "new balance")?,
        manual_result: stored_decimal(&h.manual_result, "manual result")?,
        saved_at: h.saved_at,
        created_at: h.created_at,
        record,
    })
}

fn load_given_items(conn: &Connection, receipt_id: i64) -> Result<Vec<GivenItem>> {
    let mut stmt = conn.prepare(
        "SELECT product_name, pure_weight, pure_percent, melting, date, total
         FROM given_items WHERE receipt_id=?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![receipt_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, Option<NaiveDate>>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut items = Vec::new();
    for row in rows {
        let (product_name, pw, pp, m, date, total) = row?;
        items.push(GivenItem {
            product_name,
            pure_weight: stored_decimal(&pw, "pure weight")?,
            pure_percent: stored_decimal(&pp, "pure percent")?,
            melting: stored_decimal(&m, "melting")?,
            date,
            total: stored_decimal(&total, "given item total")?,
        });
    }
    Ok(items)
}

fn load_received_items(conn: &Connection, receipt_id: i64) -> Result<Vec<ReceivedItem>> {
    let mut stmt = conn.prepare(
        "SELECT product_name, final_ornaments_wt, stone_weight, making_charge_percent, sub_total, total
         FROM received_items WHERE receipt_id=?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![receipt_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut items = Vec::new();
    for row in rows {
        let (product_name, fw, sw, mc, sub, total) = row?;
        items.push(ReceivedItem {
            product_name,
            final_ornaments_wt: stored_decimal(&fw, "final ornaments weight")?,
            stone_weight: stored_decimal(&sw, "stone weight")?,
            making_charge_percent: stored_decimal(&mc, "making charge")?,
            sub_total: stored_decimal(&sub, "received item sub-total")?,
            total: stored_decimal(&total, "received item total")?,
        });
    }
    Ok(items)
}

/// Client balance with this record's earlier contribution taken back out.
/// Saving against this value makes re-saving the same record idempotent.
pub fn previous_balance_for(conn: &Connection, stored: &StoredRecord) -> Result<Decimal> {
    let client = client_by_id(conn, stored.client_id)?;
    Ok(client.balance - stored.contribution())
}

/// Round every derived figure the way it is persisted. Item figures are
/// rounded first and each aggregate is then the exact sum of the stored
/// items, so a saved record always adds up.
pub fn round_for_storage(summary: LedgerSummary) -> Result<LedgerSummary, EngineError> {
    let previous_balance = summary.previous_balance;
    let mut record = summary.record;
    for item in &mut record.given.items {
        item.total = round2(item.total);
    }
    for item in &mut record.received.items {
        item.sub_total = round2(item.sub_total);
        item.total = round2(item.total);
    }
    record.given = given::with_totals(record.given)?;
    // no per-item pure weight is stored, so only the aggregate is rounded
    record.given.total_pure_weight = round2(record.given.total_pure_weight);
    record.received = received::with_totals(record.received)?;

    let mut manual_reconciliation = reconcile(
        record.given.total,
        record.received.total,
        &record.manual.operation,
    )?;
    manual_reconciliation.result = round2(manual_reconciliation.result);
    let new_client_balance = round2(calculate_new_client_balance(
        record.given.total,
        record.received.total,
        previous_balance,
    )?);
    Ok(LedgerSummary {
        record,
        manual_reconciliation,
        previous_balance,
        new_client_balance,
    })
}

/// Validate, recompute, round and persist a draft.
///
/// The record and the client balance are written in one transaction (record
/// first), so a failure in either write leaves both untouched.
pub fn save_record(
    conn: &mut Connection,
    id: i64,
    record: &LedgerRecord,
    previous_balance: Decimal,
) -> Result<LedgerSummary> {
    validate(record)?;
    let summary = round_for_storage(evaluate(record, previous_balance)?)?;

    let tx = conn.transaction()?;
    let client_id: i64 = tx
        .query_row(
            "SELECT client_id FROM receipts WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?
        .with_context(|| format!("Record {} not found", id))?;

    write_record(&tx, id, &summary)
        .with_context(|| format!("Write record {}", id))?;
    let updated = tx
        .execute(
            "UPDATE clients SET balance=?1 WHERE id=?2",
            params![summary.new_client_balance.to_string(), client_id],
        )
        .with_context(|| format!("Update balance for client {}", client_id))?;
    if updated == 0 {
        bail!("Client {} not found", client_id);
    }
    tx.commit().context("Commit record save")?;

    tracing::info!(
        id,
        client_id,
        given_total = %summary.record.given.total,
        received_total = %summary.record.received.total,
        new_balance = %summary.new_client_balance,
        "saved record"
    );
    Ok(summary)
}

fn write_record(tx: &Transaction<'_>, id: i64, summary: &LedgerSummary) -> Result<()> {
    let r = &summary.record;
    tx.execute(
        "UPDATE receipts SET kind=?1, voucher_id=?2, given_date=?3, received_date=?4, operation=?5,
            given_total=?6, given_pure_weight=?7, received_total=?8, received_ornaments_wt=?9,
            received_stone_weight=?10, received_sub_total=?11, manual_result=?12,
            previous_balance=?13, new_balance=?14, saved_at=datetime('now')
         WHERE id=?15",
        params![
            r.kind.as_str(),
            r.voucher_id,
            r.given.date,
            r.received.date,
            r.manual.operation.as_str(),
            r.given.total.to_string(),
            r.given.total_pure_weight.to_string(),
            r.received.total.to_string(),
            r.received.total_ornaments_wt.to_string(),
            r.received.total_stone_weight.to_string(),
            r.received.total_sub_total.to_string(),
            summary.manual_reconciliation.result.to_string(),
            summary.previous_balance.to_string(),
            summary.new_client_balance.to_string(),
            id
        ],
    )?;

    tx.execute("DELETE FROM given_items WHERE receipt_id=?1", params![id])?;
    tx.execute("DELETE FROM received_items WHERE receipt_id=?1", params![id])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO given_items(receipt_id, position, product_name, pure_weight, pure_percent, melting, date, total)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (pos, item) in r.given.items.iter().enumerate() {
            stmt.execute(params![
                id,
                pos as i64,
                item.product_name.trim(),
                item.pure_weight.to_string(),
                item.pure_percent.to_string(),
                item.melting.to_string(),
                item.date,
                item.total.to_string()
            ])?;
        }
    }
    {
        let mut stmt = tx.prepare(
            "INSERT INTO received_items(receipt_id, position, product_name, final_ornaments_wt, stone_weight, making_charge_percent, sub_total, total)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for (pos, item) in r.received.items.iter().enumerate() {
            stmt.execute(params![
                id,
                pos as i64,
                item.product_name.trim(),
                item.final_ornaments_wt.to_string(),
                item.stone_weight.to_string(),
                item.making_charge_percent.to_string(),
                item.sub_total.to_string(),
                item.total.to_string()
            ])?;
        }
    }
    Ok(())
}

/// Delete a record and take its contribution back out of the client balance.
pub fn delete_record(conn: &mut Connection, id: i64) -> Result<()> {
    let stored = load_record(conn, id)?;
    let tx = conn.transaction()?;
    let balance: String = tx.query_row(
        "SELECT balance FROM clients WHERE id=?1",
        params![stored.client_id],
        |r| r.get(0),
    )?;
    let balance = stored_decimal(&balance, "client balance")? - stored.contribution();
    tx.execute("DELETE FROM receipts WHERE id=?1", params![id])?;
    tx.execute(
        "UPDATE clients SET balance=?1 WHERE id=?2",
        params![balance.to_string(), stored.client_id],
    )?;
    tx.commit()?;
    tracing::info!(id, client_id = stored.client_id, %balance, "deleted record");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordRow {
    pub id: i64,
    pub kind: String,
    pub voucher: String,
    pub client: String,
    pub given_date: String,
    pub given_total: String,
    pub received_total: String,
    pub new_balance: String,
    pub saved_at: String,
}

pub fn list_records(
    conn: &Connection,
    client: Option<&str>,
    kind: Option<RecordKind>,
) -> Result<Vec<RecordRow>> {
    let mut sql = String::from(
        "SELECT r.id, r.kind, r.voucher_id, c.name, r.given_date, r.given_total, r.received_total, r.new_balance, r.saved_at
         FROM receipts r JOIN clients c ON c.id=r.client_id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(name) = client {
        sql.push_str(" AND c.name=?");
        params_vec.push(name.trim().to_string());
    }
    if let Some(k) = kind {
        sql.push_str(" AND r.kind=?");
        params_vec.push(k.as_str().to_string());
    }
    sql.push_str(" ORDER BY r.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let given_date: Option<String> = r.get(4)?;
        let voucher: Option<String> = r.get(2)?;
        let saved_at: Option<String> = r.get(8)?;
        data.push(RecordRow {
            id: r.get(0)?,
            kind: r.get(1)?,
            voucher: voucher.unwrap_or_default(),
            client: r.get(3)?,
            given_date: given_date.unwrap_or_default(),
            given_total: r.get(5)?,
            received_total: r.get(6)?,
            new_balance: r.get(7)?,
            saved_at: saved_at.unwrap_or_default(),
        });
    }
    Ok(data)
}
