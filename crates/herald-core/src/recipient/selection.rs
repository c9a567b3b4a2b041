//! Recipient selection set.

use std::collections::BTreeSet;

/// The set of recipient ids chosen for the next broadcast.
///
/// Ids are stored without their kind, mirroring how the selection is shown
/// to the user. Resolution back to [`Recipient`](super::Recipient) values
/// happens against the catalog lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Adds the id if absent, removes it if present.
    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    pub fn insert(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    /// Select-all as a toggle over one category.
    ///
    /// If every id in `category` is already selected they are all removed,
    /// otherwise the whole category is added. An empty category is a no-op.
    pub fn toggle_all<'a, I>(&mut self, category: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let category: Vec<&str> = category.into_iter().collect();
        if category.is_empty() {
            return;
        }

        if category.iter().all(|id| self.ids.contains(*id)) {
            for id in category {
                self.ids.remove(id);
            }
        } else {
            for id in category {
                self.ids.insert(id.to_string());
            }
        }
    }

    /// Removes every id of the category from the selection.
    pub fn remove_all<'a, I>(&mut self, category: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for id in category {
            self.ids.remove(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = SelectionSet::new();
        selection.toggle("a");
        assert!(selection.contains("a"));
        selection.toggle("a");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_selects_union_when_partially_selected() {
        let mut selection = SelectionSet::new();
        selection.insert("a");
        selection.insert("x");

        selection.toggle_all(["a", "b", "c"]);

        assert_eq!(selection.ids().collect::<Vec<_>>(), vec!["a", "b", "c", "x"]);
    }

    #[test]
    fn test_toggle_all_deselects_when_fully_selected() {
        let mut selection = SelectionSet::new();
        for id in ["a", "b", "x"] {
            selection.insert(id);
        }

        selection.toggle_all(["a", "b"]);

        assert_eq!(selection.ids().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_toggle_all_twice_restores_selection() {
        let category = ["a", "b", "c"];

        // Nothing of the category selected, other ids untouched.
        let mut selection = SelectionSet::new();
        selection.insert("z");
        let original = selection.clone();
        selection.toggle_all(category);
        selection.toggle_all(category);
        assert_eq!(selection, original);

        // Whole category selected.
        let mut selection = SelectionSet::new();
        for id in ["a", "b", "c", "z"] {
            selection.insert(id);
        }
        let original = selection.clone();
        selection.toggle_all(category);
        selection.toggle_all(category);
        assert_eq!(selection, original);
    }

    #[test]
    fn test_toggle_all_on_empty_category_is_noop() {
        let mut selection = SelectionSet::new();
        selection.insert("a");
        selection.toggle_all(std::iter::empty());
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_remove_all_keeps_other_categories() {
        let mut selection = SelectionSet::new();
        for id in ["a", "b", "g1"] {
            selection.insert(id);
        }
        selection.remove_all(["a", "b"]);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec!["g1"]);
    }
}
