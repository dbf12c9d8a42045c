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

//! Balance aggregation.
//!
//! Reduces a participant list and an expense list to one [`Balance`] per
//! participant:
//!
//! - **paid**: sum of the amounts of every expense the participant paid for.
//! - **owes**: sum of the participant's even share of every expense they take part in.
//! - **net balance**: `paid - owes`. Positive means the group owes them money.
//!
//! References to participants that are no longer in the list (a payer or a
//! sharer removed after the expense was recorded) are skipped silently. Keeping
//! expenses consistent with the participant list is the caller's job.
//!
//! # Example
//!
//! ```
//! use tripsplit::{compute_balances, Expense, Participant, ParticipantId};
//!
//! let participants = vec![Participant::new("a", "Ana"), Participant::new("b", "Ben")];
//! let expenses = vec![Expense::new("e1", 100.0, "a", ["a", "b"]).unwrap()];
//!
//! let balances = compute_balances(&participants, &expenses);
//! let ana = balances.get(&ParticipantId::from("a")).unwrap();
//! assert_eq!(ana.paid, 100.0);
//! assert_eq!(ana.owes, 50.0);
//! assert_eq!(ana.net_balance, 50.0);
//! ```

use crate::base::ParticipantId;
use crate::expense::Expense;
use crate::participant::Participant;
use crate::tolerance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

/// What one participant paid, owes, and the difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub participant_id: ParticipantId,
    pub paid: f64,
    pub owes: f64,
    pub net_balance: f64,
}

impl Balance {
    /// A balance with nothing paid and nothing owed.
    pub fn zero(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            paid: 0.0,
            owes: 0.0,
            net_balance: 0.0,
        }
    }

    /// A balance carrying only a net figure, as a settlement input.
    pub fn with_net(participant_id: impl Into<ParticipantId>, net_balance: f64) -> Self {
        Self {
            participant_id: participant_id.into(),
            paid: net_balance.max(0.0),
            owes: (-net_balance).max(0.0),
            net_balance,
        }
    }

    pub fn is_settled(&self) -> bool {
        tolerance::is_zero(self.net_balance)
    }
}

/// Balances keyed by participant, in participant order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    balances: Vec<Balance>,
    index: HashMap<ParticipantId, usize>,
}

impl BalanceSheet {
    pub fn get(&self, participant_id: &ParticipantId) -> Option<&Balance> {
        self.index.get(participant_id).map(|&i| &self.balances[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Balance> {
        self.balances.iter()
    }

    pub fn as_slice(&self) -> &[Balance] {
        &self.balances
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of every net balance. Zero, give or take floating-point drift.
    pub fn total_net(&self) -> f64 {
        self.balances.iter().map(|b| b.net_balance).sum()
    }

    /// Returns `true` when the net balances sum to zero within tolerance.
    pub fn is_zero_sum(&self) -> bool {
        tolerance::is_zero(self.total_net())
    }

    pub fn into_vec(self) -> Vec<Balance> {
        self.balances
    }
}

impl<'a> IntoIterator for &'a BalanceSheet {
    type Item = &'a Balance;
    type IntoIter = std::slice::Iter<'a, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.balances.iter()
    }
}

/// Computes every participant's paid, owed and net amounts.
///
/// Pure function of its inputs: expense order does not matter beyond
/// floating-point rounding, and unknown participant ids are ignored.
/// A repeated participant id keeps its first position.
pub fn compute_balances(participants: &[Participant], expenses: &[Expense]) -> BalanceSheet {
    let mut sheet = BalanceSheet {
        balances: Vec::with_capacity(participants.len()),
        index: HashMap::with_capacity(participants.len()),
    };

    for participant in participants {
        match sheet.index.entry(participant.id.clone()) {
            Entry::Occupied(_) => {
                warn!(participant = %participant.id, "duplicate participant id ignored");
            }
            Entry::Vacant(entry) => {
                entry.insert(sheet.balances.len());
                sheet.balances.push(Balance::zero(participant.id.clone()));
            }
        }
    }

    for expense in expenses {
        match expense.payer_id() {
            Some(payer) => match sheet.index.get(payer) {
                Some(&i) => sheet.balances[i].paid += expense.amount(),
                None => debug!(expense = %expense.id(), %payer, "payer not in trip, skipping"),
            },
            None => debug!(expense = %expense.id(), "expense has no payer"),
        }

        let share = expense.share();
        for participant_id in expense.participant_ids() {
            match sheet.index.get(participant_id) {
                Some(&i) => sheet.balances[i].owes += share,
                None => {
                    debug!(expense = %expense.id(), participant = %participant_id, "sharer not in trip, skipping")
                }
            }
        }
    }

    for balance in &mut sheet.balances {
        balance.net_balance = balance.paid - balance.owes;
    }

    // Dangling references and large-amount drift both show up here.
    if !sheet.is_zero_sum() {
        debug!(total = sheet.total_net(), "net balances do not sum to zero");
    }

    sheet
}
