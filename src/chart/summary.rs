//! RC-010: Ingredient frequency summary.

use crate::core::types::Recipe;
use indexmap::IndexMap;

/// Occurrence count per trimmed ingredient name, in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSummary {
    counts: IndexMap<String, usize>,
}

impl IngredientSummary {
    /// Count every ingredient across the table. Recipes with an empty
    /// ingredient field contribute nothing.
    pub fn from_recipes(recipes: &[Recipe]) -> Self {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for recipe in recipes {
            for name in recipe.ingredient_names() {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    fn get(&self, ingredient: &str) -> Option<usize> {
        self.counts.get(ingredient).copied()
    }

    /// Descending by count; ties keep first-encountered order.
    pub fn ranked(&self) -> Vec<(String, usize)> {
        let mut bars: Vec<(String, usize)> =
            self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        // sort_by is stable
        bars.sort_by(|a, b| b.1.cmp(&a.1));
        bars
    }
}
