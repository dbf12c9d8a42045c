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

//! Settlement planning.
//!
//! Turns a set of net balances into a list of debtor → creditor payments that
//! brings every balance to zero.
//!
//! # Algorithm
//!
//! Greedy largest-magnitude matching over balances sorted ascending:
//!
//! ```text
//!  lo                                   hi
//!  ▼                                    ▼
//! [-70  -20  -5   0   0   +15   +30   +50]
//!  biggest debtor          biggest creditor
//! ```
//!
//! The debtor at `lo` pays the creditor at `hi` `min(|debtor|, creditor)`.
//! Whichever side reaches zero (within [`EPSILON`]) is dropped by moving its
//! index inwards. Each step settles at least one participant, so `n` non-zero
//! balances produce at most `n - 1` transactions.
//!
//! The result is minimal or near-minimal for typical groups but not a global
//! optimum; ties between equal balances pair in stable sort order.

use crate::balance::{Balance, BalanceSheet, compute_balances};
use crate::base::ParticipantId;
use crate::expense::Expense;
use crate::participant::Participant;
use crate::tolerance::{self, EPSILON};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A single payment in a settlement plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Participant paying.
    pub from: ParticipantId,
    /// Participant being paid.
    pub to: ParticipantId,
    /// Always greater than [`EPSILON`].
    pub amount: f64,
}

/// Balances together with the plan that settles them.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub balances: BalanceSheet,
    pub transactions: Vec<Transaction>,
}

impl Settlement {
    /// Runs both stages: aggregation, then planning.
    pub fn compute(participants: &[Participant], expenses: &[Expense]) -> Self {
        let balances = compute_balances(participants, expenses);
        let transactions = compute_settlement(balances.as_slice());
        Self {
            balances,
            transactions,
        }
    }
}

#[derive(Debug)]
struct WorkingBalance<'a> {
    participant_id: &'a ParticipantId,
    net: f64,
}

/// Computes the payments that settle `balances`.
///
/// The input is not modified. Balances are expected to sum to zero, as the
/// output of [`compute_balances`](crate::compute_balances) does; any residue
/// left on the last participant is discarded.
///
/// # Example
///
/// ```
/// use tripsplit::{compute_settlement, Balance};
///
/// let plan = compute_settlement(&[Balance::with_net("a", 50.0), Balance::with_net("b", -50.0)]);
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan[0].from.as_str(), "b");
/// assert_eq!(plan[0].to.as_str(), "a");
/// assert_eq!(plan[0].amount, 50.0);
/// ```
pub fn compute_settlement(balances: &[Balance]) -> Vec<Transaction> {
    let mut working: Vec<WorkingBalance<'_>> = balances
        .iter()
        .map(|b| WorkingBalance {
            participant_id: &b.participant_id,
            net: b.net_balance,
        })
        .collect();
    working.sort_by(|a, b| a.net.total_cmp(&b.net));

    let mut transactions = Vec::new();
    if working.len() < 2 {
        return transactions;
    }

    let (mut lo, mut hi) = (0, working.len() - 1);
    while lo < hi {
        let debt = working[lo].net;
        let credit = working[hi].net;

        if tolerance::is_zero(debt) && credit < EPSILON {
            lo += 1;
            hi -= 1;
            continue;
        }

        let amount = debt.abs().min(credit);
        if amount > EPSILON {
            trace!(from = %working[lo].participant_id, to = %working[hi].participant_id, amount, "settle");
            transactions.push(Transaction {
                from: working[lo].participant_id.clone(),
                to: working[hi].participant_id.clone(),
                amount,
            });
        }

        working[lo].net += amount;
        working[hi].net -= amount;

        let debtor_settled = tolerance::is_zero(working[lo].net);
        let creditor_settled = working[hi].net < EPSILON;
        if debtor_settled {
            lo += 1;
        }
        if creditor_settled {
            // `hi` cannot underflow: `lo < hi` held at the top of the loop.
            hi -= 1;
        }
    }

    transactions
}

/// Applies `plan` to a copy of `balances`: the payer's net balance rises and
/// the payee's falls by each amount. Transactions naming unknown participants
/// are ignored.
pub fn apply_settlement(balances: &[Balance], plan: &[Transaction]) -> Vec<Balance> {
    let mut result = balances.to_vec();
    for transaction in plan {
        for balance in result.iter_mut() {
            if balance.participant_id == transaction.from {
                balance.net_balance += transaction.amount;
            } else if balance.participant_id == transaction.to {
                balance.net_balance -= transaction.amount;
            }
        }
    }
    result
}

/// Returns `true` when every balance is within tolerance of zero.
pub fn is_settled(balances: &[Balance]) -> bool {
    balances.iter().all(Balance::is_settled)
}

/// Largest balance a plan may leave behind in a group of `participants`.
///
/// Moves of at most [`EPSILON`] are applied without being emitted and each
/// one retires a participant, so the leftover on any one person stays below
/// `participants * EPSILON`.
pub fn residue_bound(participants: usize) -> f64 {
    EPSILON * participants as f64
}

/// Returns `true` when every balance is within [`residue_bound`] of zero.
pub fn is_settled_within_residue(balances: &[Balance]) -> bool {
    let bound = residue_bound(balances.len());
    balances.iter().all(|b| b.net_balance.abs() <= bound)
}

/// Sum of every transaction amount.
pub fn total_flow(plan: &[Transaction]) -> f64 {
    plan.iter().map(|t| t.amount).sum()
}
