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

//! Expense categories and participant eligibility.
//!
//! Eligibility narrows the participant list *before* an expense is created;
//! the settlement engine never looks at categories.
//!
//! | Category | Eligible |
//! |----------|----------|
//! | `food-veg` | everyone |
//! | `food-non-veg` | non-vegetarians |
//! | `drinks` | drinkers |
//! | anything else | everyone |

use crate::base::CategoryId;
use crate::participant::Participant;
use serde::{Deserialize, Serialize};

pub const VEG_FOOD: &str = "food-veg";
pub const NON_VEG_FOOD: &str = "food-non-veg";
pub const DRINKS: &str = "drinks";
pub const SHARED_EXPENSES: &str = "shared-expenses";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display color name, only meaningful to a UI.
    #[serde(default)]
    pub color: String,
}

impl Category {
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            color: color.into(),
        }
    }

    /// The four categories every new trip starts with.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new(VEG_FOOD, "Vegetarian Food", "Food suitable for vegetarians", "green"),
            Category::new(NON_VEG_FOOD, "Non-Vegetarian Food", "Food containing meat", "red"),
            Category::new(DRINKS, "Alcoholic Drinks", "Alcoholic beverages", "amber"),
            Category::new(
                SHARED_EXPENSES,
                "Shared Expenses",
                "Expenses that are shared between friends",
                "slate",
            ),
        ]
    }
}

/// Returns whether `participant` may be charged for an expense in `category`.
pub fn is_eligible(category: &CategoryId, participant: &Participant) -> bool {
    match category.as_str() {
        NON_VEG_FOOD => !participant.is_vegetarian,
        DRINKS => participant.is_drinker,
        _ => true,
    }
}

/// Filters `participants` down to those eligible for `category`.
pub fn eligible_participants<'a>(
    category: &'a CategoryId,
    participants: &'a [Participant],
) -> impl Iterator<Item = &'a Participant> + 'a {
    participants
        .iter()
        .filter(move |participant| is_eligible(category, participant))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> Vec<Participant> {
        vec![
            Participant::new("veg", "Veg").vegetarian(true),
            Participant::new("meat", "Meat").drinker(true),
            Participant::new("both", "Both").vegetarian(true).drinker(true),
            Participant::new("none", "None"),
        ]
    }

    fn eligible_ids(category: &str) -> Vec<String> {
        let participants = group();
        let category = CategoryId::from(category);
        eligible_participants(&category, &participants)
            .map(|p| p.id.to_string())
            .collect()
    }

    #[test]
    fn veg_food_is_for_everyone() {
        assert_eq!(eligible_ids(VEG_FOOD), ["veg", "meat", "both", "none"]);
    }

    #[test]
    fn non_veg_food_excludes_vegetarians() {
        assert_eq!(eligible_ids(NON_VEG_FOOD), ["meat", "none"]);
    }

    #[test]
    fn drinks_only_for_drinkers() {
        assert_eq!(eligible_ids(DRINKS), ["meat", "both"]);
    }

    #[test]
    fn custom_categories_are_for_everyone() {
        assert_eq!(eligible_ids("souvenirs"), ["veg", "meat", "both", "none"]);
        assert_eq!(eligible_ids(SHARED_EXPENSES).len(), 4);
    }

    #[test]
    fn defaults_cover_the_eligibility_rules() {
        let ids: Vec<String> = Category::defaults().into_iter().map(|c| c.id.0).collect();
        assert_eq!(ids, [VEG_FOOD, NON_VEG_FOOD, DRINKS, SHARED_EXPENSES]);
    }
}
