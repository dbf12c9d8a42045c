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

//! Error types for expense validation, trip editing and report export.

use crate::base::{CategoryId, ExpenseId, ParticipantId};
use thiserror::Error;

/// Expense validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpenseError {
    /// Expense has no participants to split it between
    #[error("expense must be shared by at least one participant")]
    EmptyParticipants,

    /// Amount is zero, negative or not a finite number
    #[error("invalid amount (must be positive)")]
    InvalidAmount,
}

/// Errors raised while editing a [`Trip`](crate::Trip).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TripError {
    #[error("participant {0} already exists")]
    DuplicateParticipant(ParticipantId),

    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    #[error("expense {0} already exists")]
    DuplicateExpense(ExpenseId),

    #[error("expense {0} not found")]
    ExpenseNotFound(ExpenseId),

    #[error("category {0} already exists")]
    DuplicateCategory(CategoryId),

    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error(transparent)]
    Expense(#[from] ExpenseError),
}

/// Currency code outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// Errors raised while writing a settlement report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
