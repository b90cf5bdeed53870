use crate::a11y::node::EncodedId;
use indexmap::IndexMap;
use serde::Serialize;

/// Map of encoded ids to locator expressions
/// Uses IndexMap to preserve insertion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocatorMap {
    map: IndexMap<EncodedId, String>,
}

impl LocatorMap {
    /// Create a new empty LocatorMap
    pub fn new() -> Self {
        Self { map: IndexMap::new() }
    }

    /// Register a locator for an encoded id
    ///
    /// Keys are unique per snapshot; re-inserting an id replaces its locator.
    pub fn insert(&mut self, id: EncodedId, locator: impl Into<String>) {
        self.map.insert(id, locator.into());
    }

    /// Get the locator for an encoded id
    pub fn get(&self, id: &EncodedId) -> Option<&str> {
        self.map.get(id).map(String::as_str)
    }

    /// Look up by the textual id form; returns `None` for raw ids
    pub fn get_str(&self, id: &str) -> Option<&str> {
        let id = EncodedId::parse(id)?;
        self.get(&id)
    }

    /// Check if an id is present
    pub fn contains(&self, id: &EncodedId) -> bool {
        self.map.contains_key(id)
    }

    /// Number of registered locators
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Merge another map into this one
    ///
    /// Callers guarantee key disjointness by assigning distinct frame
    /// ordinals before merging.
    pub fn merge(&mut self, other: LocatorMap) {
        for (id, locator) in other.map {
            self.map.insert(id, locator);
        }
    }

    /// Iterate over all (id, locator) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&EncodedId, &str)> {
        self.map.iter().map(|(id, loc)| (id, loc.as_str()))
    }

    /// Export to JSON for debugging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.map)
    }
}
