use crate::Task;

/// Case-insensitive substring matcher over title, description, and tags.
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for empty inputs.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// Determine whether any searchable field on the task contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
            || self.matches_field(&task.description)
            || task.tags.iter().any(|tag| self.matches_field(tag))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::task;

    fn matcher(query: &str) -> TextMatcher {
        TextMatcher::new(query).unwrap_or_else(|| panic!("matcher must exist for queries with content"))
    }

    #[test]
    fn matcher_skips_empty_queries() {
        assert!(TextMatcher::new("").is_none());
    }

    #[test]
    fn matcher_finds_text_across_fields() {
        let mut t = task(1, "Quarterly Report");
        t.description = "Collect numbers from finance".into();
        t.tags = ["Work"].into_iter().collect();

        assert!(matcher("report").matches(&t));
        assert!(matcher("FINANCE").matches(&t));
        assert!(matcher("wor").matches(&t));
        assert!(!matcher("holiday").matches(&t));
    }

    #[test]
    fn matcher_folds_non_ascii_case() {
        let t = task(1, "Ärzte anrufen");
        assert!(matcher("ärzte").matches(&t));
    }

    #[test]
    fn whitespace_is_part_of_the_needle() {
        let t = task(1, "Buy milk");
        assert!(matcher("y m").matches(&t));
        assert!(!matcher(" milk  ").matches(&t));
    }
}
