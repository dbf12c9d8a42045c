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

//! Settlement planning public API integration tests.

use tripsplit::settlement::{apply_settlement, is_settled, total_flow};
use tripsplit::{
    Balance, EPSILON, Expense, Participant, Settlement, compute_balances, compute_settlement,
};

fn make_balance(id: &str, net: f64) -> Balance {
    Balance::with_net(id, net)
}

fn make_participants(ids: &[&str]) -> Vec<Participant> {
    ids.iter().map(|id| Participant::new(*id, *id)).collect()
}

#[test]
fn empty_balances_produce_empty_plan() {
    assert!(compute_settlement(&[]).is_empty());
}

#[test]
fn single_participant_produces_empty_plan() {
    assert!(compute_settlement(&[make_balance("a", 0.0)]).is_empty());
}

#[test]
fn settled_group_produces_empty_plan() {
    let balances = vec![
        make_balance("a", 0.0),
        make_balance("b", 0.0),
        make_balance("c", 0.0),
    ];
    assert!(compute_settlement(&balances).is_empty());
}

#[test]
fn debtor_pays_creditor() {
    let plan = compute_settlement(&[make_balance("a", 50.0), make_balance("b", -50.0)]);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].from.as_str(), "b");
    assert_eq!(plan[0].to.as_str(), "a");
    assert_eq!(plan[0].amount, 50.0);
}

#[test]
fn three_participant_trip_settles() {
    let participants = make_participants(&["a", "b", "c"]);
    let expenses = vec![
        Expense::new("e1", 90.0, "a", ["a", "b", "c"]).unwrap(),
        Expense::new("e2", 30.0, "b", ["b", "c"]).unwrap(),
    ];
    let balances = compute_balances(&participants, &expenses);
    let plan = compute_settlement(balances.as_slice());

    assert!(is_settled(&apply_settlement(balances.as_slice(), &plan)));
    assert!((total_flow(&plan) - 60.0).abs() < EPSILON);
    assert!(plan.len() <= 2);
}

#[test]
fn plan_never_exceeds_n_minus_one_transactions() {
    let balances = vec![
        make_balance("a", -31.5),
        make_balance("b", -12.25),
        make_balance("c", -6.25),
        make_balance("d", 20.0),
        make_balance("e", 25.0),
        make_balance("f", 5.0),
    ];
    let plan = compute_settlement(&balances);
    assert!(plan.len() <= balances.len() - 1);
    assert!(is_settled(&apply_settlement(&balances, &plan)));
}

#[test]
fn every_transaction_moves_more_than_a_cent() {
    let participants = make_participants(&["a", "b", "c", "d", "e", "f", "g"]);
    let expenses = vec![
        Expense::new("e1", 100.0, "a", ["a", "b", "c", "d", "e", "f", "g"]).unwrap(),
        Expense::new("e2", 10.0, "b", ["c", "d", "e"]).unwrap(),
        Expense::new("e3", 33.33, "g", ["a", "g"]).unwrap(),
    ];
    let settlement = Settlement::compute(&participants, &expenses);

    assert!(settlement.transactions.iter().all(|t| t.amount > EPSILON));
    assert!(settlement.transactions.iter().all(|t| t.from != t.to));
    assert!(is_settled(&apply_settlement(
        settlement.balances.as_slice(),
        &settlement.transactions
    )));
}

#[test]
fn settlement_is_deterministic() {
    let balances = vec![
        make_balance("a", 10.0),
        make_balance("b", 10.0),
        make_balance("c", -10.0),
        make_balance("d", -10.0),
    ];
    assert_eq!(compute_settlement(&balances), compute_settlement(&balances));
}

#[test]
fn ties_keep_total_flow() {
    let balances = vec![
        make_balance("a", 10.0),
        make_balance("b", 10.0),
        make_balance("c", -10.0),
        make_balance("d", -10.0),
    ];
    let plan = compute_settlement(&balances);
    assert_eq!(plan.len(), 2);
    assert_eq!(total_flow(&plan), 20.0);
}

#[test]
fn caller_balances_are_not_modified() {
    let balances = vec![make_balance("a", 7.5), make_balance("b", -7.5)];
    let snapshot = balances.clone();
    let _ = compute_settlement(&balances);
    assert_eq!(balances, snapshot);
}
