// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tripsplit::report::{self, SettlementReport};
use tripsplit::settlement::{apply_settlement, is_settled_within_residue};
use tripsplit::{Balance, Currency, Transaction, Trip, compute_settlement};

/// Trip Split - Settle shared trip expenses
///
/// Reads a trip (participants and expenses) from a JSON file and prints each
/// participant's balance together with the payments that settle everyone up.
#[derive(Parser, Debug)]
#[command(name = "tripsplit")]
#[command(about = "Computes balances and a settlement plan for a shared trip", long_about = None)]
struct Args {
    /// Path to the trip JSON file, or `-` for stdin
    ///
    /// Expected keys: name, currency, participants (or friends), expenses
    /// Example: cargo run -- trip.json --format csv > settlement.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Display currency, overriding the one stored in the trip (e.g. EUR)
    #[arg(short, long)]
    currency: Option<Currency>,

    /// Fail unless applying the plan settles every balance, allowing the
    /// sub-cent residue left by moves too small to emit
    #[arg(long)]
    verify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

fn main() {
    init_tracing();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    // Stdout carries the report, so logs go to stderr.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tripsplit=warn")),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let mut trip = if args.input.as_os_str() == "-" {
        read_trip(io::stdin().lock()).context("failed to read trip from stdin")?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("failed to open '{}'", args.input.display()))?;
        read_trip(BufReader::new(file))
            .with_context(|| format!("failed to read trip from '{}'", args.input.display()))?
    };
    if let Some(currency) = args.currency {
        trip.currency = currency;
    }
    info!(
        participants = trip.participants().len(),
        expenses = trip.expenses().len(),
        "trip loaded"
    );

    let balances = trip.balances();
    if !balances.is_zero_sum() {
        debug!(
            total = balances.total_net(),
            "balances do not sum to zero, some expenses reference removed participants"
        );
    }
    let plan = compute_settlement(balances.as_slice());
    info!(transactions = plan.len(), "settlement computed");

    if args.verify {
        verify_plan(balances.as_slice(), &plan)?;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.format {
        Format::Csv => report::write_csv(&trip, &balances, &plan, &mut out)?,
        Format::Json => {
            let report = SettlementReport::new(&trip, &balances, &plan);
            report::write_json(&report, &mut out)?;
            writeln!(out)?;
        }
        Format::Table => {
            let report = SettlementReport::new(&trip, &balances, &plan);
            report::write_table(&report, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Parses a trip document.
///
/// # Errors
///
/// Returns a JSON error if the document is malformed or any expense is
/// invalid (non-positive amount, no participants).
fn read_trip<R: Read>(reader: R) -> Result<Trip, serde_json::Error> {
    serde_json::from_reader(reader)
}

fn verify_plan(balances: &[Balance], plan: &[Transaction]) -> anyhow::Result<()> {
    if !is_settled_within_residue(&apply_settlement(balances, plan)) {
        bail!("settlement plan leaves unsettled balances");
    }
    Ok(())
}
