use crate::catalog::model::Catalog;
use crate::foundation::core::{Category, CategoryMap};
use crate::foundation::math::Xorshift64;

/// Current per-category choice and visibility state.
///
/// Indices start at 0 and always stay within `[0, len)` for their category's
/// catalog (an empty category pins its index at 0). Equip flags exist for the
/// toggleable categories only; background and body are always drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    index: CategoryMap<usize>,
    equipped: CategoryMap<bool>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            index: CategoryMap::default(),
            equipped: CategoryMap::from_fn(|_| true),
        }
    }
}

impl Selection {
    /// Fresh selection: index 0 everywhere, everything equipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently chosen index for a category.
    pub fn index(&self, category: Category) -> usize {
        self.index[category]
    }

    /// Set the chosen index, clamped into the category's bounds.
    pub fn set_index(&mut self, catalog: &Catalog, category: Category, index: usize) -> usize {
        let len = catalog.len(category);
        let clamped = if len == 0 { 0 } else { index.min(len - 1) };
        self.index[category] = clamped;
        clamped
    }

    /// Move the selection by one step, wrapping past either end.
    ///
    /// `direction` is typically +1 or -1; larger magnitudes step further and
    /// still wrap. Returns the new index.
    pub fn cycle(&mut self, catalog: &Catalog, category: Category, direction: i32) -> usize {
        let len = catalog.len(category);
        if len == 0 {
            self.index[category] = 0;
            return 0;
        }
        let cur = self.index[category].min(len - 1) as i64;
        let next = (cur + i64::from(direction)).rem_euclid(len as i64) as usize;
        self.index[category] = next;
        next
    }

    /// Whether a category's layer is drawn. Non-toggleable categories always
    /// report `true`.
    pub fn is_equipped(&self, category: Category) -> bool {
        if !category.is_toggleable() {
            return true;
        }
        self.equipped[category]
    }

    /// Set a toggleable category's visibility. No-op for background/body.
    pub fn set_equipped(&mut self, category: Category, on: bool) {
        if !category.is_toggleable() {
            tracing::debug!(category = %category, "ignoring equip toggle on fixed layer");
            return;
        }
        self.equipped[category] = on;
    }

    /// Flip a toggleable category's visibility.
    pub fn toggle_equipped(&mut self, category: Category) {
        self.set_equipped(category, !self.is_equipped(category));
    }

    /// Draw an independent uniform-random index for every non-empty category.
    ///
    /// Empty categories keep index 0. Equip flags are untouched.
    pub fn randomize_all(&mut self, catalog: &Catalog, rng: &mut Xorshift64) {
        for category in Category::ALL {
            let len = catalog.len(category);
            self.index[category] = if len == 0 { 0 } else { rng.next_below(len) };
        }
    }

    /// Pull every index back into its category's bounds.
    pub fn clamp_to(&mut self, catalog: &Catalog) {
        for category in Category::ALL {
            let len = catalog.len(category);
            if len == 0 {
                self.index[category] = 0;
            } else if self.index[category] >= len {
                self.index[category] = len - 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/state.rs"]
mod tests;
