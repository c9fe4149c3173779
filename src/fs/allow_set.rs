//! Allow-set construction for prod mode.

use std::collections::HashSet;

/// Set of request paths visible in prod mode.
///
/// Built from the include list: the root `/`, every entry, and for each entry
/// split on `/` into parts `d`, every prefix `d[..i].join("/")` with
/// `2 <= i < d.len()`. Entries are opaque strings; nothing is normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowSet {
    paths: HashSet<String>,
}

impl AllowSet {
    pub fn build<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths = HashSet::new();
        paths.insert("/".to_string());
        for entry in entries {
            let entry = entry.as_ref();
            paths.insert(entry.to_string());
            let parts: Vec<&str> = entry.split('/').collect();
            for i in 2..parts.len() {
                paths.insert(parts[..i].join("/"));
            }
        }
        Self { paths }
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in lexicographic order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.paths.iter().map(String::as_str).collect();
        out.sort_unstable();
        out
    }
}
