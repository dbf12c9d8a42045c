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

//! Trip aggregate.
//!
//! A [`Trip`] owns the participant, expense and category collections and keeps
//! them referentially consistent while they are edited. Balances and the
//! settlement plan are never stored; they are recomputed from the current
//! collections on every call.
//!
//! # Example
//!
//! ```
//! use tripsplit::{Currency, Expense, Participant, Trip};
//!
//! let mut trip = Trip::new("Goa", Currency::Inr);
//! trip.add_participant(Participant::new("a", "Ana")).unwrap();
//! trip.add_participant(Participant::new("b", "Ben")).unwrap();
//! trip.add_expense(Expense::new("e1", 100.0, "a", ["a", "b"]).unwrap()).unwrap();
//!
//! let plan = trip.settlement();
//! assert_eq!(plan.len(), 1);
//! assert_eq!(plan[0].amount, 50.0);
//! ```

use crate::balance::{BalanceSheet, compute_balances};
use crate::base::{CategoryId, ExpenseId, ParticipantId};
use crate::category::{Category, is_eligible};
use crate::currency::Currency;
use crate::error::TripError;
use crate::expense::Expense;
use crate::participant::Participant;
use crate::settlement::{Transaction, compute_settlement};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, alias = "friends")]
    participants: Vec<Participant>,
    #[serde(default)]
    expenses: Vec<Expense>,
    #[serde(default = "Category::defaults")]
    categories: Vec<Category>,
}

impl Default for Trip {
    fn default() -> Self {
        Self::new("", Currency::default())
    }
}

impl Trip {
    /// Creates an empty trip with the default categories.
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            name: name.into(),
            currency,
            participants: Vec::new(),
            expenses: Vec::new(),
            categories: Category::defaults(),
        }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Display name for `id`, or `"Unknown"` for a participant no longer in the trip.
    pub fn participant_name(&self, id: &ParticipantId) -> &str {
        self.participant(id).map_or("Unknown", |p| p.name.as_str())
    }

    /// Sum of every expense amount.
    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(Expense::amount).sum()
    }

    /// # Errors
    ///
    /// [`TripError::DuplicateParticipant`] if the id is already taken.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), TripError> {
        if self.participant(&participant.id).is_some() {
            return Err(TripError::DuplicateParticipant(participant.id));
        }
        self.participants.push(participant);
        Ok(())
    }

    /// Replaces the participant with the same id.
    pub fn update_participant(&mut self, participant: Participant) -> Result<(), TripError> {
        let slot = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant.id)
            .ok_or_else(|| TripError::ParticipantNotFound(participant.id.clone()))?;
        *slot = participant;
        Ok(())
    }

    /// Removes a participant and every reference to them.
    ///
    /// The participant leaves the sharing set of each expense, and expenses
    /// they paid for lose their payer. An expense left with nobody to share it
    /// is dropped.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> Result<Participant, TripError> {
        let position = self
            .participants
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| TripError::ParticipantNotFound(id.clone()))?;
        let removed = self.participants.remove(position);

        let before = self.expenses.len();
        self.expenses = std::mem::take(&mut self.expenses)
            .into_iter()
            .filter_map(|expense| {
                if expense.involves(id) {
                    expense.without_participant(id)
                } else {
                    Some(expense)
                }
            })
            .collect();
        debug!(
            participant = %id,
            dropped_expenses = before - self.expenses.len(),
            "participant removed"
        );

        Ok(removed)
    }

    /// # Errors
    ///
    /// [`TripError::DuplicateExpense`] if the id is already taken.
    pub fn add_expense(&mut self, expense: Expense) -> Result<(), TripError> {
        if self.expenses.iter().any(|e| e.id() == expense.id()) {
            return Err(TripError::DuplicateExpense(expense.id().clone()));
        }
        self.expenses.push(expense);
        Ok(())
    }

    pub fn update_expense(&mut self, expense: Expense) -> Result<(), TripError> {
        let slot = self
            .expenses
            .iter_mut()
            .find(|e| e.id() == expense.id())
            .ok_or_else(|| TripError::ExpenseNotFound(expense.id().clone()))?;
        *slot = expense;
        Ok(())
    }

    pub fn remove_expense(&mut self, id: &ExpenseId) -> Result<Expense, TripError> {
        let position = self
            .expenses
            .iter()
            .position(|e| e.id() == id)
            .ok_or_else(|| TripError::ExpenseNotFound(id.clone()))?;
        Ok(self.expenses.remove(position))
    }

    pub fn add_category(&mut self, category: Category) -> Result<(), TripError> {
        if self.categories.iter().any(|c| c.id == category.id) {
            return Err(TripError::DuplicateCategory(category.id));
        }
        self.categories.push(category);
        Ok(())
    }

    pub fn update_category(&mut self, category: Category) -> Result<(), TripError> {
        let slot = self
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| TripError::CategoryNotFound(category.id.clone()))?;
        *slot = category;
        Ok(())
    }

    /// Removes a category. Expenses keep their category id.
    pub fn remove_category(&mut self, id: &CategoryId) -> Result<Category, TripError> {
        let position = self
            .categories
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| TripError::CategoryNotFound(id.clone()))?;
        Ok(self.categories.remove(position))
    }

    /// Participants who may share an expense in `category`.
    pub fn eligible_participants(&self, category: &CategoryId) -> Vec<&Participant> {
        self.participants
            .iter()
            .filter(|p| is_eligible(category, p))
            .collect()
    }

    pub fn balances(&self) -> BalanceSheet {
        compute_balances(&self.participants, &self.expenses)
    }

    pub fn settlement(&self) -> Vec<Transaction> {
        compute_settlement(self.balances().as_slice())
    }

    /// Clears participants and expenses, keeping name, currency and categories.
    pub fn clear(&mut self) {
        self.participants.clear();
        self.expenses.clear();
    }
}
