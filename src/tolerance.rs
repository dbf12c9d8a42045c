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

//! Numeric tolerance shared by balance aggregation and settlement.
//!
//! All amounts are `f64` in a single currency unit. Repeated division when
//! splitting expenses leaves residues like `0.0000000001`; anything with a
//! magnitude below [`EPSILON`] is treated as settled.

/// Smallest amount considered worth moving between participants.
pub const EPSILON: f64 = 0.01;

/// Returns `true` when `value` is within [`EPSILON`] of zero.
#[inline]
pub fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Returns `true` when `a` and `b` differ by less than [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    is_zero(a - b)
}
