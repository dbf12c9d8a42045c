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

//! Shared expenses.
//!
//! An [`Expense`] can only be built through [`Expense::new`] (or by
//! deserializing, which goes through the same checks), so every value in
//! circulation has a positive finite amount and at least one participant.
//!
//! # Example
//!
//! ```
//! use tripsplit::{Expense, ExpenseError};
//!
//! let expense = Expense::new("e1", 90.0, "alice", ["alice", "bob", "carol"]).unwrap();
//! assert_eq!(expense.share(), 30.0);
//!
//! let empty: [&str; 0] = [];
//! assert_eq!(
//!     Expense::new("e2", 10.0, "alice", empty).unwrap_err(),
//!     ExpenseError::EmptyParticipants,
//! );
//! ```

use crate::base::{CategoryId, ExpenseId, ParticipantId};
use crate::category::SHARED_EXPENSES;
use crate::error::ExpenseError;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;

/// An amount paid by one participant and split evenly across a set of
/// participants.
///
/// The payer does not have to be one of the participants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    id: ExpenseId,
    description: String,
    amount: f64,
    /// `None` once the paying participant has been removed from the trip.
    payer_id: Option<ParticipantId>,
    participant_ids: BTreeSet<ParticipantId>,
    category: CategoryId,
    date: Option<NaiveDate>,
}

impl Expense {
    /// Creates a validated expense in the shared category.
    ///
    /// Duplicate participant ids collapse into a single share.
    ///
    /// # Errors
    ///
    /// - [`ExpenseError::InvalidAmount`] - amount is zero, negative, NaN or infinite.
    /// - [`ExpenseError::EmptyParticipants`] - no participant ids were given.
    pub fn new<P, I>(
        id: impl Into<ExpenseId>,
        amount: f64,
        payer_id: impl Into<ParticipantId>,
        participant_ids: I,
    ) -> Result<Self, ExpenseError>
    where
        I: IntoIterator<Item = P>,
        P: Into<ParticipantId>,
    {
        Self::validated(
            id.into(),
            String::new(),
            amount,
            Some(payer_id.into()),
            participant_ids.into_iter().map(Into::<ParticipantId>::into).collect(),
            CategoryId::from(SHARED_EXPENSES),
            None,
        )
    }

    fn validated(
        id: ExpenseId,
        description: String,
        amount: f64,
        payer_id: Option<ParticipantId>,
        participant_ids: BTreeSet<ParticipantId>,
        category: CategoryId,
        date: Option<NaiveDate>,
    ) -> Result<Self, ExpenseError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ExpenseError::InvalidAmount);
        }
        if participant_ids.is_empty() {
            return Err(ExpenseError::EmptyParticipants);
        }
        Ok(Self {
            id,
            description,
            amount,
            payer_id,
            participant_ids,
            category,
            date,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn id(&self) -> &ExpenseId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn payer_id(&self) -> Option<&ParticipantId> {
        self.payer_id.as_ref()
    }

    pub fn participant_ids(&self) -> &BTreeSet<ParticipantId> {
        &self.participant_ids
    }

    pub fn category(&self) -> &CategoryId {
        &self.category
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Amount owed by each participant.
    pub fn share(&self) -> f64 {
        self.amount / self.participant_ids.len() as f64
    }

    pub fn involves(&self, participant_id: &ParticipantId) -> bool {
        self.payer_id.as_ref() == Some(participant_id)
            || self.participant_ids.contains(participant_id)
    }

    /// Drops every reference to `participant_id`.
    ///
    /// Returns `None` when the participant was the last one sharing the
    /// expense, since an expense without participants cannot exist.
    pub(crate) fn without_participant(mut self, participant_id: &ParticipantId) -> Option<Self> {
        if self.payer_id.as_ref() == Some(participant_id) {
            self.payer_id = None;
        }
        self.participant_ids.remove(participant_id);
        if self.participant_ids.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

/// Wire shape of an expense, matching the host application's storage keys.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExpense {
    id: ExpenseId,
    #[serde(default)]
    description: String,
    amount: f64,
    #[serde(default, deserialize_with = "empty_as_none")]
    paid_by: Option<ParticipantId>,
    #[serde(default = "shared_category")]
    category: CategoryId,
    participants: Vec<ParticipantId>,
    #[serde(default, deserialize_with = "lenient_date")]
    date: Option<NaiveDate>,
}

fn shared_category() -> CategoryId {
    CategoryId::from(SHARED_EXPENSES)
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<ParticipantId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|id| !id.is_empty()).map(ParticipantId))
}

/// Accepts `YYYY-MM-DD` as well as full RFC 3339 timestamps.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| Some(timestamp.date_naive()))
        .map_err(serde::de::Error::custom)
}

impl<'de> Deserialize<'de> for Expense {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawExpense::deserialize(deserializer)?;
        Expense::validated(
            raw.id,
            raw.description,
            raw.amount,
            raw.paid_by,
            raw.participants.into_iter().collect(),
            raw.category,
            raw.date,
        )
        .map_err(serde::de::Error::custom)
    }
}

impl Serialize for Expense {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawExpense {
            id: self.id.clone(),
            description: self.description.clone(),
            amount: self.amount,
            paid_by: self.payer_id.clone(),
            category: self.category.clone(),
            participants: self.participant_ids.iter().cloned().collect(),
            date: self.date,
        }
        .serialize(serializer)
    }
}
