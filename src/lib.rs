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

//! # Trip Split
//!
//! This library records shared trip expenses and works out who pays whom to
//! settle up.
//!
//! ## Core Components
//!
//! - [`compute_balances`]: Reduces participants and expenses to one [`Balance`] each
//! - [`compute_settlement`]: Greedy plan of [`Transaction`]s that zeroes every balance
//! - [`Trip`]: Participant, expense and category collections kept consistent while edited
//! - [`SettlementCache`]: Thread-safe memo for hosts that recompute on every change
//! - [`report`]: CSV, JSON and plain-text output
//!
//! ## Example
//!
//! ```
//! use tripsplit::{compute_balances, compute_settlement, Expense, Participant};
//!
//! let participants = vec![
//!     Participant::new("a", "Ana"),
//!     Participant::new("b", "Ben"),
//!     Participant::new("c", "Cy"),
//! ];
//! let expenses = vec![
//!     Expense::new("hotel", 90.0, "a", ["a", "b", "c"]).unwrap(),
//!     Expense::new("taxi", 30.0, "b", ["b", "c"]).unwrap(),
//! ];
//!
//! let balances = compute_balances(&participants, &expenses);
//! assert!(balances.is_zero_sum());
//!
//! let plan = compute_settlement(balances.as_slice());
//! assert_eq!(plan.len(), 2);
//! assert!(plan.iter().all(|t| t.to.as_str() == "a"));
//! ```
//!
//! ## Numeric Tolerance
//!
//! Amounts are `f64`. Anything within [`EPSILON`] (one cent) of zero counts as
//! settled, both when planning and when checking results.

mod balance;
mod base;
pub mod cache;
pub mod category;
pub mod currency;
pub mod error;
mod expense;
mod participant;
pub mod report;
pub mod settlement;
pub mod tolerance;
mod trip;

pub use balance::{Balance, BalanceSheet, compute_balances};
pub use base::{CategoryId, ExpenseId, ParticipantId};
pub use cache::SettlementCache;
pub use category::Category;
pub use currency::Currency;
pub use error::{ExpenseError, ReportError, TripError};
pub use expense::Expense;
pub use participant::Participant;
pub use settlement::{Settlement, Transaction, compute_settlement};
pub use tolerance::EPSILON;
pub use trip::Trip;
