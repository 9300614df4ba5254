use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::transaction::SpendCategory;

/// Monthly spending limit per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBudgets {
    amounts: BTreeMap<SpendCategory, u64>,
}

impl CategoryBudgets {
    /// Starting allowances: Food 2000, Entertainment 1000, Shopping 1000,
    /// Transport 500, Others 500.
    #[must_use]
    pub fn starter() -> Self {
        Self::from_amounts([
            (SpendCategory::Food, 2000),
            (SpendCategory::Entertainment, 1000),
            (SpendCategory::Shopping, 1000),
            (SpendCategory::Transport, 500),
            (SpendCategory::Others, 500),
        ])
    }

    /// Categories not listed get a zero budget.
    #[must_use]
    pub fn from_amounts(amounts: impl IntoIterator<Item = (SpendCategory, u64)>) -> Self {
        let mut map: BTreeMap<SpendCategory, u64> =
            SpendCategory::ALL.into_iter().map(|c| (c, 0)).collect();
        map.extend(amounts);
        Self { amounts: map }
    }

    #[must_use]
    pub fn get(&self, category: SpendCategory) -> u64 {
        self.amounts.get(&category).copied().unwrap_or(0)
    }

    /// Sets one category's budget, returning the previous amount.
    pub fn set(&mut self, category: SpendCategory, amount: u64) -> u64 {
        self.amounts.insert(category, amount).unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.amounts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpendCategory, u64)> + '_ {
        self.amounts.iter().map(|(c, a)| (*c, *a))
    }
}

impl Default for CategoryBudgets {
    fn default() -> Self {
        Self::starter()
    }
}
