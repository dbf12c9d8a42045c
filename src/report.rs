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

//! Settlement reports.
//!
//! Formats the balances and settlement plan of a [`Trip`] for people: a CSV
//! download, a JSON document and a plain-text table. Participants are shown
//! by name and amounts are rounded with [`rust_decimal`] so float noise never
//! reaches the output.
//!
//! # CSV Format
//!
//! ```csv
//! Participant,Paid,Owes,Net Balance
//! Ana,100.00,50.00,50.00
//! Ben,0.00,50.00,-50.00
//!
//! Settlement Plan
//! From,To,Amount
//! Ben,Ana,50.00
//! ```

use crate::balance::BalanceSheet;
use crate::base::CategoryId;
use crate::currency::{Currency, round_amount};
use crate::error::ReportError;
use crate::settlement::Transaction;
use crate::trip::Trip;
use chrono::NaiveDate;
use csv::Writer;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::io::Write;

const DECIMAL_PRECISION: u32 = 2;

fn rounded(amount: f64) -> Decimal {
    round_amount(amount, DECIMAL_PRECISION)
}

fn fixed(amount: f64) -> String {
    format!("{:.2}", rounded(amount))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub trip_name: String,
    pub total_expenses: Decimal,
    pub currency: Currency,
    pub participant_count: usize,
    pub expense_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRow {
    pub name: String,
    pub paid: Decimal,
    pub owes: Decimal,
    pub net_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRow {
    pub description: String,
    pub amount: Decimal,
    pub paid_by: String,
    pub category: String,
    pub participants: Vec<String>,
    pub date: Option<NaiveDate>,
}

/// Everything a reader needs to settle up, with ids resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub summary: Summary,
    pub balances: Vec<BalanceRow>,
    pub transactions: Vec<TransactionRow>,
    pub expenses: Vec<ExpenseRow>,
}

impl SettlementReport {
    /// Builds a report from a trip and the balances and plan computed for it.
    pub fn new(trip: &Trip, balances: &BalanceSheet, plan: &[Transaction]) -> Self {
        let category_name = |id: &CategoryId| {
            trip.categories()
                .iter()
                .find(|c| &c.id == id)
                .map_or_else(|| id.to_string(), |c| c.name.clone())
        };

        Self {
            summary: Summary {
                trip_name: trip.name.clone(),
                total_expenses: rounded(trip.total_expenses()),
                currency: trip.currency,
                participant_count: trip.participants().len(),
                expense_count: trip.expenses().len(),
            },
            balances: balances
                .iter()
                .map(|b| BalanceRow {
                    name: trip.participant_name(&b.participant_id).to_owned(),
                    paid: rounded(b.paid),
                    owes: rounded(b.owes),
                    net_balance: rounded(b.net_balance),
                })
                .collect(),
            transactions: plan
                .iter()
                .map(|t| TransactionRow {
                    from: trip.participant_name(&t.from).to_owned(),
                    to: trip.participant_name(&t.to).to_owned(),
                    amount: rounded(t.amount),
                })
                .collect(),
            expenses: trip
                .expenses()
                .iter()
                .map(|e| ExpenseRow {
                    description: e.description().to_owned(),
                    amount: rounded(e.amount()),
                    paid_by: e
                        .payer_id()
                        .map_or("Unknown", |id| trip.participant_name(id))
                        .to_owned(),
                    category: category_name(e.category()),
                    participants: e
                        .participant_ids()
                        .iter()
                        .map(|id| trip.participant_name(id).to_owned())
                        .collect(),
                    date: e.date(),
                })
                .collect(),
        }
    }

    /// Builds the report for a trip's current state.
    pub fn from_trip(trip: &Trip) -> Self {
        let balances = trip.balances();
        let plan = crate::compute_settlement(balances.as_slice());
        Self::new(trip, &balances, &plan)
    }
}

#[derive(Debug, Serialize)]
struct CsvBalance<'a> {
    #[serde(rename = "Participant")]
    name: &'a str,
    #[serde(rename = "Paid")]
    paid: String,
    #[serde(rename = "Owes")]
    owes: String,
    #[serde(rename = "Net Balance")]
    net_balance: String,
}

#[derive(Debug, Serialize)]
struct CsvTransaction<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
}

/// Writes the balance table and the settlement plan as two CSV sections.
///
/// # Errors
///
/// Returns a [`ReportError`] if writing fails.
pub fn write_csv<W: Write>(
    trip: &Trip,
    balances: &BalanceSheet,
    plan: &[Transaction],
    mut writer: W,
) -> Result<(), ReportError> {
    let mut wtr = Writer::from_writer(&mut writer);
    for balance in balances {
        wtr.serialize(CsvBalance {
            name: trip.participant_name(&balance.participant_id),
            paid: fixed(balance.paid),
            owes: fixed(balance.owes),
            net_balance: fixed(balance.net_balance),
        })?;
    }
    if balances.is_empty() {
        wtr.write_record(["Participant", "Paid", "Owes", "Net Balance"])?;
    }
    wtr.flush()?;
    drop(wtr);

    writer.write_all(b"\nSettlement Plan\n")?;

    let mut wtr = Writer::from_writer(&mut writer);
    for transaction in plan {
        wtr.serialize(CsvTransaction {
            from: trip.participant_name(&transaction.from),
            to: trip.participant_name(&transaction.to),
            amount: fixed(transaction.amount),
        })?;
    }
    if plan.is_empty() {
        wtr.write_record(["From", "To", "Amount"])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the report as pretty-printed JSON.
pub fn write_json<W: Write>(report: &SettlementReport, writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Writes a plain-text summary using the trip currency's symbol.
pub fn write_table<W: Write>(report: &SettlementReport, mut writer: W) -> Result<(), ReportError> {
    let currency = report.summary.currency;
    let money = |d: Decimal| currency.format(d.to_f64().unwrap_or_default());

    if !report.summary.trip_name.is_empty() {
        writeln!(writer, "{}", report.summary.trip_name)?;
    }
    writeln!(
        writer,
        "Total expenses: {} ({} expenses, {} participants)",
        money(report.summary.total_expenses),
        report.summary.expense_count,
        report.summary.participant_count
    )?;
    writeln!(writer)?;

    let width = report
        .balances
        .iter()
        .map(|b| b.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Participant".len());
    writeln!(
        writer,
        "{:<width$}  {:>12}  {:>12}  {:>12}",
        "Participant", "Paid", "Owes", "Net"
    )?;
    for row in &report.balances {
        writeln!(
            writer,
            "{:<width$}  {:>12}  {:>12}  {:>12}",
            row.name,
            money(row.paid),
            money(row.owes),
            money(row.net_balance)
        )?;
    }
    writeln!(writer)?;

    if report.transactions.is_empty() {
        writeln!(writer, "Everyone is settled up.")?;
    } else {
        writeln!(writer, "Settlement plan:")?;
        for t in &report.transactions {
            writeln!(writer, "  {} -> {}: {}", t.from, t.to, money(t.amount))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Expense, Participant};
    use rust_decimal_macros::dec;

    fn trip() -> Trip {
        let mut trip = Trip::new("Lisbon", Currency::Eur);
        trip.add_participant(Participant::new("a", "Ana")).unwrap();
        trip.add_participant(Participant::new("b", "Ben")).unwrap();
        trip.add_expense(
            Expense::new("e1", 100.0, "a", ["a", "b"])
                .unwrap()
                .with_description("Hotel"),
        )
        .unwrap();
        trip
    }

    fn csv_for(trip: &Trip) -> String {
        let balances = trip.balances();
        let plan = crate::compute_settlement(balances.as_slice());
        let mut output = Vec::new();
        write_csv(trip, &balances, &plan, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn csv_has_balance_and_plan_sections() {
        let output = csv_for(&trip());
        assert_eq!(
            output,
            "Participant,Paid,Owes,Net Balance\n\
             Ana,100.00,50.00,50.00\n\
             Ben,0.00,50.00,-50.00\n\
             \n\
             Settlement Plan\n\
             From,To,Amount\n\
             Ben,Ana,50.00\n"
        );
    }

    #[test]
    fn csv_rounds_thirds() {
        let mut trip = trip();
        trip.add_participant(Participant::new("c", "Cy")).unwrap();
        trip.update_expense(Expense::new("e1", 100.0, "a", ["a", "b", "c"]).unwrap())
            .unwrap();
        let output = csv_for(&trip);
        assert!(output.contains("Ana,100.00,33.33,66.67\n"));
        assert!(output.contains("Cy,0.00,33.33,-33.33\n"));
        assert!(output.contains("Ben,Ana,33.33\n"));
    }

    #[test]
    fn csv_keeps_headers_when_settled() {
        let trip = Trip::new("Empty", Currency::Usd);
        let output = csv_for(&trip);
        assert_eq!(
            output,
            "Participant,Paid,Owes,Net Balance\n\nSettlement Plan\nFrom,To,Amount\n"
        );
    }

    #[test]
    fn report_resolves_names() {
        let report = SettlementReport::from_trip(&trip());
        assert_eq!(report.summary.total_expenses, dec!(100));
        assert_eq!(report.summary.participant_count, 2);
        assert_eq!(report.balances[1].name, "Ben");
        assert_eq!(report.balances[1].net_balance, dec!(-50));
        assert_eq!(report.transactions[0].from, "Ben");
        assert_eq!(report.expenses[0].paid_by, "Ana");
        assert_eq!(report.expenses[0].category, "Shared Expenses");
        assert_eq!(report.expenses[0].participants, ["Ana", "Ben"]);
    }

    #[test]
    fn json_report_uses_camel_case() {
        let report = SettlementReport::from_trip(&trip());
        let mut output = Vec::new();
        write_json(&report, &mut output).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

        let decimal = |value: &serde_json::Value| value.as_str().unwrap().parse::<Decimal>().unwrap();
        assert_eq!(parsed["summary"]["currency"], "EUR");
        assert_eq!(decimal(&parsed["summary"]["totalExpenses"]), dec!(100));
        assert_eq!(decimal(&parsed["balances"][0]["netBalance"]), dec!(50));
        assert_eq!(parsed["transactions"][0]["to"], "Ana");
        assert_eq!(parsed["expenses"][0]["description"], "Hotel");
    }

    #[test]
    fn table_shows_currency_symbols() {
        let report = SettlementReport::from_trip(&trip());
        let mut output = Vec::new();
        write_table(&report, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert!(text.starts_with("Lisbon\n"));
        assert!(text.contains("Total expenses: €100.00"));
        assert!(text.contains("Ben -> Ana: €50.00"));
    }

    #[test]
    fn table_reports_settled_trip() {
        let report = SettlementReport::from_trip(&Trip::new("", Currency::Inr));
        let mut output = Vec::new();
        write_table(&report, &mut output).unwrap();
        assert!(String::from_utf8(output).unwrap().contains("Everyone is settled up."));
    }
}
