// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn record_id() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help("Record id")
}

fn item_index() -> Arg {
    Arg::new("index")
        .long("index")
        .required(true)
        .value_parser(value_parser!(usize))
        .help("Zero-based item position")
}

fn client_cmd() -> Command {
    Command::new("client")
        .about("Manage clients and their running balance")
        .subcommand(
            Command::new("add")
                .about("Add a client")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("phone").long("phone"))
                .arg(Arg::new("address").long("address"))
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .default_value("0")
                        .allow_hyphen_values(true)
                        .help("Opening balance in grams"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list").about("List clients").arg(
                Arg::new("match")
                    .long("match")
                    .help("Only names matching this regex"),
            ),
        ))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show one client")
                .arg(Arg::new("name").long("name").required(true)),
        ))
        .subcommand(
            Command::new("rm")
                .about("Remove a client and all of their records")
                .arg(Arg::new("name").long("name").required(true)),
        )
}

fn receipt_cmd() -> Command {
    Command::new("receipt")
        .about("Create and edit given/received records")
        .subcommand(
            Command::new("new")
                .about("Open an empty record for a client")
                .arg(Arg::new("client").long("client").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .default_value("receipt")
                        .value_parser(["receipt", "admin-receipt"]),
                )
                .arg(Arg::new("voucher").long("voucher"))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("Given/received date YYYY-MM-DD (default today)"),
                )
                .arg(Arg::new("operation").long("operation").help(
                    "Manual calculation: subtract-given-received|subtract-received-given|add",
                )),
        )
        .subcommand(
            Command::new("given-add")
                .about("Append a given item")
                .arg(record_id())
                .arg(Arg::new("product").long("product").required(true))
                .arg(Arg::new("pure_weight").long("pure-weight").required(true))
                .arg(Arg::new("pure_percent").long("pure-percent").required(true))
                .arg(Arg::new("melting").long("melting").required(true))
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(
            Command::new("received-add")
                .about("Append a received item")
                .arg(record_id())
                .arg(Arg::new("product").long("product").required(true))
                .arg(Arg::new("final_wt").long("final-wt").required(true))
                .arg(Arg::new("stone_wt").long("stone-wt").default_value("0"))
                .arg(Arg::new("making").long("making").default_value("0")),
        )
        .subcommand(
            Command::new("given-rm")
                .about("Remove a given item")
                .arg(record_id())
                .arg(item_index()),
        )
        .subcommand(
            Command::new("received-rm")
                .about("Remove a received item")
                .arg(record_id())
                .arg(item_index()),
        )
        .subcommand(
            Command::new("set")
                .about("Edit one field of one item")
                .arg(record_id())
                .arg(
                    Arg::new("side")
                        .long("side")
                        .required(true)
                        .value_parser(["given", "received"]),
                )
                .arg(item_index())
                .arg(Arg::new("field").long("field").required(true))
                .arg(
                    Arg::new("value")
                        .long("value")
                        .required(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(
            Command::new("operation")
                .about("Change the manual calculation")
                .arg(record_id())
                .arg(Arg::new("op").long("op").required(true)),
        )
        .subcommand(json_flags(
            Command::new("show").about("Show a record").arg(record_id()),
        ))
        .subcommand(json_flags(
            Command::new("list")
                .about("List records")
                .arg(Arg::new("client").long("client"))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_parser(["receipt", "admin-receipt"]),
                ),
        ))
        .subcommand(
            Command::new("rm")
                .about("Delete a record and reverse its balance")
                .arg(record_id()),
        )
        .subcommand(
            Command::new("import")
                .about("Replace a record's contents from a JSON draft and save it")
                .arg(record_id())
                .arg(Arg::new("file").long("file").required(true)),
        )
}

pub fn build_cli() -> Command {
    Command::new("goldledger")
        .about("Given/received ledger and running balances for a goldsmith workshop")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(client_cmd())
        .subcommand(receipt_cmd())
        .subcommand(
            Command::new("calc")
                .about("Evaluate a JSON draft without touching the database")
                .arg(Arg::new("file").long("file").required(true))
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .default_value("0")
                        .allow_hyphen_values(true)
                        .help("Previous client balance"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export saved records")
                .subcommand(
                    Command::new("receipts")
                        .arg(Arg::new("format").long("format").default_value("csv"))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Read and change settings")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                )
                .subcommand(Command::new("show")),
        )
        .subcommand(Command::new("doctor").about("Check stored balances and totals"))
}
