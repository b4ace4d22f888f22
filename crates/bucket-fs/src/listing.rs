//! Normalization of raw adapter listings

use crate::{Entry, StorePath};

/// Shapes a raw adapter listing for one query.
///
/// Adapters may over-report (a bucket prefix scan returns siblings, the queried
/// directory itself, nested keys). The formatter keeps only entries in scope
/// and sorts them by path, ignoring ASCII case.
#[derive(Debug, Clone)]
pub struct ListingFormatter<'a> {
    directory: &'a StorePath,
    recursive: bool,
}

impl<'a> ListingFormatter<'a> {
    pub fn new(directory: &'a StorePath, recursive: bool) -> Self {
        Self {
            directory,
            recursive,
        }
    }

    pub fn format(&self, entries: Vec<Entry>) -> Vec<Entry> {
        let mut listing: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| self.in_scope(entry))
            .collect();
        listing.sort_by_cached_key(|entry| entry.path.as_str().to_ascii_lowercase());
        listing
    }

    fn in_scope(&self, entry: &Entry) -> bool {
        if entry.path.is_root() {
            return false;
        }
        if self.recursive {
            entry.path.starts_with_dir(self.directory)
        } else {
            entry.path.parent().as_ref() == Some(self.directory)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn file(raw: &str) -> Entry {
        Entry::file(StorePath::parse(raw).unwrap(), 0)
    }

    fn paths(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn shallow_keeps_direct_children() {
        let dir = StorePath::parse("a").unwrap();
        let raw = vec![file("a/x.txt"), file("a/b/y.txt"), file("other/z.txt"), file("a")];
        let listing = ListingFormatter::new(&dir, false).format(raw);
        assert_eq!(paths(&listing), vec!["a/x.txt"]);
    }

    #[test]
    fn recursive_keeps_descendants() {
        let dir = StorePath::parse("a").unwrap();
        let raw = vec![file("a/x.txt"), file("a/b/y.txt"), file("ab/z.txt")];
        let listing = ListingFormatter::new(&dir, true).format(raw);
        assert_eq!(paths(&listing), vec!["a/b/y.txt", "a/x.txt"]);
    }

    #[test]
    fn root_entry_is_dropped() {
        let root = StorePath::root();
        let raw = vec![Entry::dir(StorePath::root()), file("top.txt")];
        let listing = ListingFormatter::new(&root, false).format(raw);
        assert_eq!(paths(&listing), vec!["top.txt"]);
    }

    #[test]
    fn sorting_ignores_case() {
        let root = StorePath::root();
        let raw = vec![file("b.txt"), file("C.txt"), file("a.txt"), file("B.txt")];
        let listing = ListingFormatter::new(&root, false).format(raw);
        // Equal keys keep adapter order.
        assert_eq!(paths(&listing), vec!["a.txt", "b.txt", "B.txt", "C.txt"]);
    }
}
