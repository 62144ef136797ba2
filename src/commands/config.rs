// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Operation;
use crate::utils::{DEFAULT_DECIMALS, display_decimals, get_setting, pretty_table, set_setting};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            match key {
                "display_decimals" => {
                    let n = value
                        .parse::<u32>()
                        .with_context(|| format!("Invalid display_decimals '{}'", value))?;
                    if n > 10 {
                        bail!("display_decimals must be between 0 and 10");
                    }
                }
                "default_operation" => {
                    if !Operation::from(value).is_known() {
                        bail!(
                            "Unknown operation '{}' (use subtract-given-received|subtract-received-given|add)",
                            value
                        );
                    }
                }
                other => bail!(
                    "Unknown setting '{}' (use display_decimals|default_operation)",
                    other
                ),
            }
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        Some(("show", _)) => {
            let rows = vec![
                vec![
                    "display_decimals".to_string(),
                    display_decimals(conn)?.to_string(),
                    DEFAULT_DECIMALS.to_string(),
                ],
                vec![
                    "default_operation".to_string(),
                    default_operation(conn)?.to_string(),
                    Operation::default().to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Key", "Value", "Default"], rows));
        }
        _ => {}
    }
    Ok(())
}

pub fn default_operation(conn: &Connection) -> Result<Operation> {
    Ok(get_setting(conn, "default_operation")?
        .map(Operation::from)
        .unwrap_or_default())
}
