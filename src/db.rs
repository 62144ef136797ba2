// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Goldledger", "goldledger"));

pub const DB_ENV: &str = "GOLDLEDGER_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("goldledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- balance = opening_balance + sum of every saved record's contribution
    CREATE TABLE IF NOT EXISTS clients(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        phone TEXT,
        address TEXT,
        opening_balance TEXT NOT NULL DEFAULT '0',
        balance TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS receipts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL CHECK(kind IN ('receipt','admin-receipt')),
        voucher_id TEXT,
        client_id INTEGER NOT NULL,
        given_date TEXT,
        received_date TEXT,
        operation TEXT NOT NULL DEFAULT 'subtract-given-received',
        given_total TEXT NOT NULL DEFAULT '0',
        given_pure_weight TEXT NOT NULL DEFAULT '0',
        received_total TEXT NOT NULL DEFAULT '0',
        received_ornaments_wt TEXT NOT NULL DEFAULT '0',
        received_stone_weight TEXT NOT NULL DEFAULT '0',
        received_sub_total TEXT NOT NULL DEFAULT '0',
        manual_result TEXT NOT NULL DEFAULT '0',
        previous_balance TEXT NOT NULL DEFAULT '0',
        new_balance TEXT NOT NULL DEFAULT '0',
        saved_at TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(client_id) REFERENCES clients(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_receipts_client ON receipts(client_id);

    CREATE TABLE IF NOT EXISTS given_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        receipt_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        product_name TEXT NOT NULL,
        pure_weight TEXT NOT NULL,
        pure_percent TEXT NOT NULL,
        melting TEXT NOT NULL,
        date TEXT,
        total TEXT NOT NULL,
        UNIQUE(receipt_id, position),
        FOREIGN KEY(receipt_id) REFERENCES receipts(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS received_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        receipt_id INTEGER NOT NULL,
        position INTEGER NOT NULL,
        product_name TEXT NOT NULL,
        final_ornaments_wt TEXT NOT NULL,
        stone_weight TEXT NOT NULL,
        making_charge_percent TEXT NOT NULL,
        sub_total TEXT NOT NULL,
        total TEXT NOT NULL,
        UNIQUE(receipt_id, position),
        FOREIGN KEY(receipt_id) REFERENCES receipts(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}
