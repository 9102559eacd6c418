//! Subform field name map
//!
//! When a field is rendered inside a repeatable subform the host gives it a
//! synthetic name such as `field42`. The map keeps `rewritten -> declared`
//! in the order the renames were seen.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: IndexMap<String, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rename. An empty declared name is ignored and returns false.
    pub fn record(&mut self, rewritten: &str, declared: &str) -> bool {
        if declared.is_empty() {
            return false;
        }
        self.entries
            .insert(rewritten.to_string(), declared.to_string());
        true
    }

    /// First synthetic name recorded for a declared name
    pub fn rewritten_for(&self, declared: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, d)| d.as_str() == declared)
            .map(|(r, _)| r.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Into<String>, D: Into<String>> FromIterator<(R, D)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (R, D)>>(iter: I) -> Self {
        let mut map = NameMap::new();
        for (rewritten, declared) in iter {
            let (rewritten, declared): (String, String) = (rewritten.into(), declared.into());
            map.record(&rewritten, &declared);
        }
        map
    }
}
