// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::utils::{display_decimals, fmt_decimal, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use regex::Regex;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            let phone = non_empty(sub.get_one::<String>("phone"));
            let address = non_empty(sub.get_one::<String>("address"));
            let opening = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
            store::add_client(conn, &name, phone.as_deref(), address.as_deref(), opening)?;
            println!("Added client '{}' (opening balance {})", name, opening);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => {
            let client = store::client_by_name(conn, sub.get_one::<String>("name").unwrap())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &client)? {
                let dp = display_decimals(conn)?;
                println!(
                    "{}",
                    pretty_table(
                        &["Name", "Phone", "Address", "Opening", "Balance (g)"],
                        vec![vec![
                            client.name,
                            client.phone.unwrap_or_default(),
                            client.address.unwrap_or_default(),
                            fmt_decimal(client.opening_balance, dp),
                            fmt_decimal(client.balance, dp),
                        ]],
                    )
                );
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            store::remove_client(conn, name)?;
            println!("Removed client '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}

fn non_empty(v: Option<&String>) -> Option<String> {
    v.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = match sub.get_one::<String>("match").map(|s| s.trim()) {
        Some(p) => Some(
            Regex::new(p).map_err(|err| anyhow!("Invalid regex pattern '{}': {}", p, err))?,
        ),
        None => None,
    };
    let clients = store::list_clients(conn, filter.as_ref())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &clients)? {
        let dp = display_decimals(conn)?;
        let rows = clients
            .into_iter()
            .map(|c| {
                vec![
                    c.name,
                    c.phone.unwrap_or_default(),
                    fmt_decimal(c.balance, dp),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Name", "Phone", "Balance (g)"], rows));
    }
    Ok(())
}
