//! Session-scoped filter/sort/search selection.

use taskdeck_core::{SortDirection, SortKey, TaskFilter, ViewConfig};

/// Holds the current view configuration and the commands that change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    config: ViewConfig,
}

impl ViewState {
    /// Default view: all tasks, no search, oldest first, no tags selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an explicit configuration.
    #[must_use]
    pub const fn from_config(config: ViewConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Switch the primary filter.
    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.config.filter = filter;
    }

    /// Replace the search text.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.config.search = query.into();
    }

    /// Select a sort key. Selecting the active key again flips the direction;
    /// switching to a different key starts ascending.
    pub fn set_sort_by(&mut self, key: SortKey) {
        if self.config.sort_key == key {
            self.config.sort_direction = self.config.sort_direction.toggled();
        } else {
            self.config.sort_key = key;
            self.config.sort_direction = SortDirection::Ascending;
        }
    }

    /// Force a sort direction.
    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.config.sort_direction = direction;
    }

    /// Add the tag to the selection, or remove it if already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.config.selected_tags.remove(tag) {
            self.config.selected_tags.insert(tag.to_owned());
        }
    }

    /// Replace the tag selection.
    pub fn select_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.selected_tags = tags.into_iter().map(Into::into).collect();
    }

    /// Back to the default view.
    pub fn reset(&mut self) {
        self.config = ViewConfig::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_sort_key_toggles_direction() {
        let mut view = ViewState::new();
        view.set_sort_by(SortKey::Priority);
        assert_eq!(view.config().sort_key, SortKey::Priority);
        assert_eq!(view.config().sort_direction, SortDirection::Ascending);

        view.set_sort_by(SortKey::Priority);
        assert_eq!(view.config().sort_direction, SortDirection::Descending);
        view.set_sort_by(SortKey::Priority);
        assert_eq!(view.config().sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn default_key_toggles_on_first_selection() {
        let mut view = ViewState::new();
        view.set_sort_by(SortKey::CreationDate);
        assert_eq!(view.config().sort_direction, SortDirection::Descending);
    }

    #[test]
    fn new_sort_key_resets_direction() {
        let mut view = ViewState::new();
        view.set_sort_direction(SortDirection::Descending);
        view.set_sort_by(SortKey::DueDate);
        assert_eq!(view.config().sort_key, SortKey::DueDate);
        assert_eq!(view.config().sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn toggle_tag_adds_then_removes() {
        let mut view = ViewState::new();
        view.toggle_tag("work");
        view.toggle_tag("home");
        assert_eq!(view.config().selected_tags.len(), 2);
        view.toggle_tag("work");
        assert!(!view.config().selected_tags.contains("work"));
        assert!(view.config().selected_tags.contains("home"));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut view = ViewState::new();
        view.set_filter(TaskFilter::Overdue);
        view.set_search_query("milk");
        view.set_sort_by(SortKey::Alphabetical);
        view.set_sort_direction(SortDirection::Descending);
        view.select_tags(["a", "b"]);

        view.reset();
        assert_eq!(view, ViewState::new());
        assert_eq!(view.config().filter, TaskFilter::All);
        assert!(view.config().search.is_empty());
        assert_eq!(view.config().sort_key, SortKey::CreationDate);
        assert_eq!(view.config().sort_direction, SortDirection::Ascending);
        assert!(view.config().selected_tags.is_empty());
    }
}
