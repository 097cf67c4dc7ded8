use crate::Task;
use std::collections::BTreeSet;

/// Sorted, deduplicated list of every non-blank tag across `tasks`.
#[must_use]
pub fn compute_tags<'a, I>(tasks: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .flat_map(|task| task.tags.iter())
        .filter(|tag| !tag.trim().is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::task;

    #[test]
    fn tags_are_flattened_deduplicated_and_sorted() {
        let mut a = task(1, "A");
        a.tags = ["work", "urgent"].into_iter().collect();
        let mut b = task(2, "B");
        b.tags = ["home", "work", "  "].into_iter().collect();
        let c = task(3, "C");

        assert_eq!(compute_tags(&[a, b, c]), vec!["home", "urgent", "work"]);
    }

    #[test]
    fn empty_collection_has_no_tags() {
        assert!(compute_tags(&Vec::<Task>::new()).is_empty());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut a = task(1, "A");
        a.tags = ["b", "B", "a", "10", "9"].into_iter().collect();
        assert_eq!(compute_tags([&a]), vec!["10", "9", "B", "a", "b"]);
    }
}
