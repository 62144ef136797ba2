// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use goldledger::db;
use goldledger::engine::{Edit, GivenField, ReceivedField, apply_all};
use goldledger::error::ValidationError;
use goldledger::models::{LedgerRecord, Operation, RecordKind};
use goldledger::store;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn setup() -> (Connection, i64) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let client = store::add_client(&conn, "Ravi", Some("555-0101"), None, d("10")).unwrap();
    (conn, client)
}

fn open(conn: &Connection, client: i64) -> i64 {
    store::create_record(
        conn,
        RecordKind::Receipt,
        client,
        Some("V-001"),
        NaiveDate::from_ymd_opt(2025, 3, 14),
        &Operation::default(),
    )
    .unwrap()
}

fn draft(base: &LedgerRecord, pure_weight: &str, final_wt: &str) -> LedgerRecord {
    apply_all(
        base,
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
                value: json!(pure_weight),
            },
            Edit::SetGiven {
                index: 0,
                field: GivenField::PurePercent,
                value: json!("99.5"),
            },
            Edit::SetGiven {
                index: 0,
                field: GivenField::Melting,
                value: json!("92.5"),
            },
            Edit::AddReceived,
            Edit::SetReceived {
                index: 0,
                field: ReceivedField::ProductName,
                value: json!("Necklace"),
            },
            Edit::SetReceived {
                index: 0,
                field: ReceivedField::FinalOrnamentsWt,
                value: json!(final_wt),
            },
            Edit::SetReceived {
                index: 0,
                field: ReceivedField::StoneWeight,
                value: json!("5"),
            },
            Edit::SetReceived {
                index: 0,
                field: ReceivedField::MakingChargePercent,
                value: json!("10"),
            },
        ],
    )
    .unwrap()
}

fn save(conn: &mut Connection, id: i64, record: &LedgerRecord) -> anyhow::Result<()> {
    let stored = store::load_record(conn, id)?;
    let previous = store::previous_balance_for(conn, &stored)?;
    store::save_record(conn, id, record, previous)?;
    Ok(())
}

#[test]
fn new_record_starts_at_client_balance() {
    let (conn, client) = setup();
    let id = open(&conn, client);
    let stored = store::load_record(&conn, id).unwrap();
    assert_eq!(stored.previous_balance, d("10"));
    assert_eq!(stored.new_balance, d("10"));
    assert_eq!(stored.contribution(), Decimal::ZERO);
    assert_eq!(stored.client_name, "Ravi");
    assert_eq!(stored.record.voucher_id.as_deref(), Some("V-001"));
    assert!(stored.saved_at.is_none());
}

fn quarter_item_draft(base: &LedgerRecord) -> LedgerRecord {
    let mut edits = Vec::new();
    for index in 0..2 {
        edits.extend([
            Edit::AddGiven,
            Edit::SetGiven {
                index,
                field: GivenField::ProductName,
                value: json!("Scrap"),
            },
            Edit::SetGiven {
                index,
                field: GivenField::PureWeight,
                value: json!(1),
            },
            Edit::SetGiven {
                index,
                field: GivenField::PurePercent,
                value: json!("12.5"),
            },
            Edit::SetGiven {
                index,
                field: GivenField::Melting,
                value: json!(100),
            },
            Edit::AddReceived,
            Edit::SetReceived {
                index,
                field: ReceivedField::ProductName,
                value: json!("Pin"),
            },
            Edit::SetReceived {
                index,
                field: ReceivedField::FinalOrnamentsWt,
                value: json!("1.005"),
            },
        ]);
    }
    apply_all(base, edits).unwrap()
}

#[test]
fn saved_aggregates_are_sums_of_rounded_items() {
    let (mut conn, client) = setup();
    let id = open(&conn, client);
    let stored = store::load_record(&conn, id).unwrap();
    let summary =
        store::save_record(&mut conn, id, &quarter_item_draft(&stored.record), d("10")).unwrap();
    assert_eq!(summary.record.given.items[0].total, d("0.13"));
    assert_eq!(summary.record.given.total, d("0.26"));
    assert_eq!(summary.record.received.total, d("2.02"));
    assert_eq!(summary.new_client_balance, d("8.24"));

    let reloaded = store::load_record(&conn, id).unwrap();
    let given = &reloaded.record.given;
    let received = &reloaded.record.received;
    let given_sum: Decimal = given.items.iter().map(|i| i.total).sum();
    let received_sum: Decimal = received.items.iter().map(|i| i.total).sum();
    let sub_sum: Decimal = received.items.iter().map(|i| i.sub_total).sum();
    let wt_sum: Decimal = received.items.iter().map(|i| i.final_ornaments_wt).sum();
    assert_eq!(given.total, given_sum);
    assert_eq!(received.total, received_sum);
    assert_eq!(received.total_sub_total, sub_sum);
    assert_eq!(received.total_ornaments_wt, wt_sum);
    assert_eq!(reloaded.new_balance, d("8.24"));
}

#[test]
fn summary_carries_the_unrounded_previous_balance() {
    let (mut conn, _) = setup();
    let client = store::add_client(&conn, "Meena", None, None, d("10.005")).unwrap();
    let id = open(&conn, client);
    let stored = store::load_record(&conn, id).unwrap();
    let previous = store::previous_balance_for(&conn, &stored).unwrap();
    let summary =
        store::save_record(&mut conn, id, &draft(&stored.record, "100", "50"), previous).unwrap();
    assert_eq!(summary.previous_balance, d("10.005"));
    assert_eq!(summary.new_client_balance, d("68.08"));
    assert_eq!(store::load_record(&conn, id).unwrap().previous_balance, d("10.005"));
}

#[test]
fn save_rounds_and_updates_balance() {
    let (mut conn, client) = setup();
    let id = open(&conn, client);
    let stored = store::load_record(&conn, id).unwrap();
    let summary =
        store::save_record(&mut conn, id, &draft(&stored.record, "100", "50"), d("10")).unwrap();

    assert_eq!(summary.record.given.total, d("107.57"));
    assert_eq!(summary.record.received.total, d("49.5"));
    assert_eq!(summary.new_client_balance, d("68.07"));
    assert_eq!(summary.manual_reconciliation.result, d("58.07"));

    let reloaded = store::load_record(&conn, id).unwrap();
    assert_eq!(reloaded.record.given.items.len(), 1);
    assert_eq!(reloaded.record.given.items[0].total, d("107.57"));
    assert_eq!(reloaded.record.given.items[0].melting, d("92.5"));
    assert_eq!(reloaded.record.received.total_sub_total, d("45"));
    assert_eq!(reloaded.new_balance, d("68.07"));
    assert_eq!(reloaded.manual_result, d("58.07"));
    assert!(reloaded.saved_at.is_some());
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("68.07"));
}

#[test]
fn resaving_does_not_double_count() {
    let (mut conn, client) = setup();
    let id = open(&conn, client);
    let base = store::load_record(&conn, id).unwrap().record;
    save(&mut conn, id, &draft(&base, "100", "50")).unwrap();
    save(&mut conn, id, &draft(&base, "100", "50")).unwrap();
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("68.07"));

    // editing replaces this record's contribution instead of stacking it
    save(&mut conn, id, &draft(&base, "100", "60")).unwrap();
    // received 55 * 1.1 = 60.5, so 107.57 - 60.5 + 10
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("57.07"));
}

#[test]
fn records_for_one_client_accumulate() {
    let (mut conn, client) = setup();
    let first = open(&conn, client);
    let second = open(&conn, client);
    let base = LedgerRecord::default();

    save(&mut conn, first, &draft(&base, "100", "50")).unwrap();
    save(&mut conn, second, &draft(&base, "100", "50")).unwrap();
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("126.14"));

    // re-editing the older record keeps the newer one's contribution
    save(&mut conn, first, &draft(&base, "100", "60")).unwrap();
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("115.14"));

    store::delete_record(&mut conn, second).unwrap();
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("57.07"));
    assert!(store::load_record(&conn, second).is_err());
}

#[test]
fn validation_failure_writes_nothing() {
    let (mut conn, client) = setup();
    let id = open(&conn, client);
    let mut bad = draft(&LedgerRecord::default(), "100", "50");
    bad.given.items[0].melting = Decimal::ZERO;

    let err = store::save_record(&mut conn, id, &bad, d("10")).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::GivenItems)
    );
    let stored = store::load_record(&conn, id).unwrap();
    assert!(stored.saved_at.is_none());
    assert!(stored.record.given.items.is_empty());
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("10"));
}

#[test]
fn failed_balance_write_rolls_back_record() {
    let (mut conn, client) = setup();
    let id = open(&conn, client);
    conn.execute_batch(
        "CREATE TRIGGER clients_locked BEFORE UPDATE OF balance ON clients
         BEGIN SELECT RAISE(ABORT, 'balance store offline'); END;",
    )
    .unwrap();

    let err = store::save_record(&mut conn, id, &draft(&LedgerRecord::default(), "100", "50"), d("10"))
        .unwrap_err();
    assert!(format!("{:#}", err).contains("balance store offline"));

    let given_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM given_items WHERE receipt_id=?1",
            params![id],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(given_rows, 0);
    let stored = store::load_record(&conn, id).unwrap();
    assert_eq!(stored.record.given.total, Decimal::ZERO);
    assert_eq!(stored.new_balance, d("10"));
    assert!(stored.saved_at.is_none());
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("10"));
}

#[test]
fn unknown_record_is_reported() {
    let (mut conn, client) = setup();
    let err = store::save_record(&mut conn, 99, &LedgerRecord::default(), d("10")).unwrap_err();
    assert!(err.to_string().contains("Record 99 not found"));
    assert_eq!(store::client_by_id(&conn, client).unwrap().balance, d("10"));
}

#[test]
fn list_filters_by_client_and_kind() {
    let (conn, client) = setup();
    let other = store::add_client(&conn, "Meena", None, None, Decimal::ZERO).unwrap();
    open(&conn, client);
    store::create_record(
        &conn,
        RecordKind::AdminReceipt,
        other,
        None,
        None,
        &Operation::Add,
    )
    .unwrap();

    assert_eq!(store::list_records(&conn, None, None).unwrap().len(), 2);
    let ravi = store::list_records(&conn, Some("Ravi"), None).unwrap();
    assert_eq!(ravi.len(), 1);
    assert_eq!(ravi[0].voucher, "V-001");
    let admin = store::list_records(&conn, None, Some(RecordKind::AdminReceipt)).unwrap();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].client, "Meena");
    assert_eq!(admin[0].kind, "admin-receipt");
}

#[test]
fn client_lookup_and_filters() {
    let (conn, _) = setup();
    store::add_client(&conn, "Meena", None, Some("Market Rd"), Decimal::ZERO).unwrap();
    assert!(store::add_client(&conn, "  ", None, None, Decimal::ZERO).is_err());
    assert!(store::add_client(&conn, "Ravi", None, None, Decimal::ZERO).is_err());

    let re = regex::Regex::new("^M").unwrap();
    let found = store::list_clients(&conn, Some(&re)).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].address.as_deref(), Some("Market Rd"));
    assert_eq!(store::list_clients(&conn, None).unwrap().len(), 2);

    assert!(store::client_by_name(&conn, "Nobody").is_err());
    store::remove_client(&conn, "Meena").unwrap();
    assert!(store::remove_client(&conn, "Meena").is_err());
}
