//! Ordered prefix-to-namespace bindings.
//!
//! Each frame keeps the prefixes declared on its object in a [`PrefixMap`].
//! Declaration order is preserved so that reverse lookups are deterministic
//! when two prefixes in one frame bind the same namespace.
//!
//! ```rust
//! use node_stream_diff::PrefixMap;
//!
//! let mut map = PrefixMap::new();
//! map.insert("p", "urn:ui");
//! map.insert("x", "http://schemas.microsoft.com/winfx/2006/xaml");
//!
//! assert_eq!(map.get("p"), Some("urn:ui"));
//! assert_eq!(map.prefixes_for("urn:ui").collect::<Vec<_>>(), vec!["p"]);
//! ```

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap(IndexMap<String, String>);

impl PrefixMap {
    #[must_use]
    pub fn new() -> Self {
        PrefixMap(IndexMap::new())
    }

    /// Binds `prefix` to `uri`, returning the previous binding in this map.
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Option<String> {
        self.0.insert(prefix.into(), uri.into())
    }

    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    /// Prefixes bound to `uri`, in declaration order.
    pub fn prefixes_for<'a>(&'a self, uri: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Moves every binding out, leaving the map empty.
    pub fn take(&mut self) -> PrefixMap {
        std::mem::take(self)
    }
}

impl IntoIterator for PrefixMap {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, String)> for PrefixMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        PrefixMap(IndexMap::from_iter(iter))
    }
}
