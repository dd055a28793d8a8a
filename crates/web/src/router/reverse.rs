//! Reverse lookup: from a route name and argument values back to a URL path.

use std::collections::HashMap;

/// One way of building a URL for a route name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReverseEntry {
    /// The literal prefix, `/` joined, always starting with `/`
    path: String,
    params: Vec<String>,
}

impl ReverseEntry {
    pub(crate) fn new(path: String, params: Vec<String>) -> Self {
        Self { path, params }
    }

    /// Builds the URL for `args`, or `None` when they don't fit this entry.
    ///
    /// Every supplied name must be a parameter of the entry. Parameters may only be left out
    /// at the end: a supplied value after a missing one makes the entry unusable. A value
    /// containing `/` would span several segments, so it is refused.
    fn build(&self, args: &[(&str, &str)]) -> Option<String> {
        if args.iter().any(|(name, _)| !self.params.iter().any(|param| param == name)) {
            return None;
        }

        let mut url = self.path.clone();
        let mut missing = false;
        for param in &self.params {
            match args.iter().find(|(name, _)| name == param) {
                Some((_, value)) => {
                    if missing || value.contains('/') {
                        return None;
                    }
                    if !url.ends_with('/') {
                        url.push('/');
                    }
                    url.push_str(value);
                }
                None => missing = true,
            }
        }
        Some(url)
    }
}

/// Route names mapped to their candidate entries, most parameters first.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReverseIndex {
    entries: HashMap<String, Vec<ReverseEntry>>,
}

impl ReverseIndex {
    pub(crate) fn insert(&mut self, name: &str, entry: ReverseEntry) {
        let candidates = self.entries.entry(name.to_string()).or_default();
        if candidates.contains(&entry) {
            return;
        }
        candidates.push(entry);
        candidates.sort_by(|a, b| b.params.len().cmp(&a.params.len()).then_with(|| a.path.cmp(&b.path)));
    }

    /// Takes over the entries of a router mounted at `prefix`.
    ///
    /// Names are qualified with the mount segments, `/api/v1` + `list` becomes `api:v1:list`,
    /// and every path gets the prefix in front.
    pub(crate) fn merge_mounted(&mut self, prefix: &[String], mounted: ReverseIndex) {
        let qualifier = prefix.join(":");
        let prefix_path = format!("/{}", prefix.join("/"));

        for (name, candidates) in mounted.entries {
            let name = format!("{qualifier}:{name}");
            for entry in candidates {
                let path = if entry.path == "/" { prefix_path.clone() } else { format!("{prefix_path}{}", entry.path) };
                self.insert(&name, ReverseEntry { path, params: entry.params });
            }
        }
    }

    /// Builds a URL with the first candidate of `name` that fits `args`.
    pub(crate) fn reverse(&self, name: &str, args: &[(&str, &str)]) -> Option<String> {
        self.entries.get(name)?.iter().find_map(|entry| entry.build(args))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
