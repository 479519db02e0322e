//! Published post collection
//!
//! The `posts` collection handed to templates holds every non-draft item,
//! newest first. Items without a date sort as if dated at the Unix epoch.

use std::cmp::Reverse;

/// An item that can take part in a dated collection
pub trait CollectionItem {
    /// Whether the item is excluded from published output
    fn is_draft(&self) -> bool;

    /// Ordering key in milliseconds since the Unix epoch, `0` when undated
    fn sort_key(&self) -> i64;
}

/// Build the published collection: drafts removed, sorted by date descending.
///
/// The sort is stable, so items with equal keys keep their input order.
pub fn published<T: CollectionItem>(items: &[T]) -> Vec<&T> {
    let mut published: Vec<&T> = items.iter().filter(|item| !item.is_draft()).collect();
    published.sort_by_key(|item| Reverse(item.sort_key()));
    published
}

/// Drafts only, in input order
pub fn drafts<T: CollectionItem>(items: &[T]) -> Vec<&T> {
    items.iter().filter(|item| item.is_draft()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        name: &'static str,
        date: Option<i64>,
        draft: bool,
    }

    impl CollectionItem for Item {
        fn is_draft(&self) -> bool {
            self.draft
        }

        fn sort_key(&self) -> i64 {
            self.date.unwrap_or(0)
        }
    }

    fn item(name: &'static str, date: Option<i64>, draft: bool) -> Item {
        Item { name, date, draft }
    }

    fn names(items: &[&Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.name).collect()
    }

    #[test]
    fn test_drafts_are_excluded() {
        let items = vec![
            item("a", Some(3), false),
            item("b", Some(5), true),
            item("c", Some(1), false),
        ];
        let result = published(&items);
        assert_eq!(names(&result), vec!["a", "c"]);
        assert!(result.iter().all(|i| !i.draft));
    }

    #[test]
    fn test_newest_first() {
        let items = vec![
            item("old", Some(100), false),
            item("new", Some(300), false),
            item("mid", Some(200), false),
        ];
        assert_eq!(names(&published(&items)), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_equal_dates_keep_input_order() {
        let items = vec![
            item("first", Some(10), false),
            item("second", Some(10), false),
            item("newer", Some(20), false),
            item("third", Some(10), false),
        ];
        assert_eq!(
            names(&published(&items)),
            vec!["newer", "first", "second", "third"]
        );
    }

    #[test]
    fn test_missing_date_sorts_as_epoch() {
        let items = vec![
            item("undated", None, false),
            item("before-epoch", Some(-1_000), false),
            item("dated", Some(1_000), false),
            item("also-undated", None, false),
        ];
        assert_eq!(
            names(&published(&items)),
            vec!["dated", "undated", "also-undated", "before-epoch"]
        );
    }

    #[test]
    fn test_input_is_untouched() {
        let items = vec![item("a", Some(1), false), item("b", Some(2), false)];
        let _ = published(&items);
        assert_eq!(items[0].name, "a");
        assert_eq!(items[1].name, "b");
    }

    #[test]
    fn test_drafts_listing() {
        let items = vec![
            item("a", Some(1), true),
            item("b", Some(2), false),
            item("c", Some(3), true),
        ];
        assert_eq!(names(&drafts(&items)), vec!["a", "c"]);
    }
}
