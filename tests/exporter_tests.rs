// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use goldledger::engine::{Edit, GivenField, apply_all};
use goldledger::models::{LedgerRecord, Operation, RecordKind};
use goldledger::{cli, commands::exporter, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let client = store::add_client(&conn, "Ravi", None, None, Decimal::ZERO).unwrap();
    let id = store::create_record(
        &conn,
        RecordKind::Receipt,
        client,
        Some("V-1"),
        chrono::NaiveDate::from_ymd_opt(2025, 1, 2),
        &Operation::default(),
    )
    .unwrap();
    let draft = apply_all(
        &store::load_record(&conn, id).unwrap().record,
        [
            Edit::AddGiven,
            Edit::SetGiven {
                index: 0,
                field: GivenField::ProductName,
                value: json!("Bar"),
            },
            Edit::SetGiven {
                index: 0,
                field: GivenField::PureWeight,
                value: json!("10"),
            },
            Edit::SetGiven {
                index: 0,
                field: GivenField::PurePercent,
                value: json!("91.6"),
            },
            Edit::SetGiven {
                index: 0,
                field: GivenField::Melting,
                value: json!("100"),
            },
        ],
    )
    .unwrap();
    store::save_record(&mut conn, id, &draft, Decimal::ZERO).unwrap();

    // an unsaved draft is left out of exports
    store::create_record(&conn, RecordKind::AdminReceipt, client, None, None, &Operation::Add)
        .unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "goldledger",
        "export",
        "receipts",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_receipts_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("receipts.json");
    export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": "1",
                "kind": "receipt",
                "voucher": "V-1",
                "client": "Ravi",
                "given_date": "2025-01-02",
                "received_date": "2025-01-02",
                "given_total": "9.16",
                "given_pure_weight": "9.16",
                "received_total": "0",
                "received_sub_total": "0",
                "operation": "subtract-given-received",
                "manual_result": "9.16",
                "previous_balance": "0",
                "new_balance": "9.16"
            }
        ])
    );
}

#[test]
fn export_receipts_csv() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("receipts.csv");
    export(&conn, "CSV", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[13], "new_balance");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][3], "Ravi");
    assert_eq!(&rows[0][6], "9.16");
}

#[test]
fn export_receipts_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("receipts.pdf");
    assert!(export(&conn, "pdf", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}

#[test]
fn saved_draft_is_listed_once() {
    let conn = base_conn();
    let saved: Vec<LedgerRecord> = store::list_records(&conn, None, None)
        .unwrap()
        .into_iter()
        .filter(|r| !r.saved_at.is_empty())
        .map(|r| store::load_record(&conn, r.id).unwrap().record)
        .collect();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].given.total, Decimal::new(916, 2));
}
