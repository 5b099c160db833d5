use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Identifier → model document mapping in first-discovery order.
pub struct ResolvedModels {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ResolvedModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `content` under `dtmi` unless the key is already present.
    /// Returns whether the entry was added.
    pub fn insert(&mut self, dtmi: impl Into<String>, content: impl Into<String>) -> bool {
        let dtmi = dtmi.into();
        if self.index.contains_key(&dtmi) {
            return false;
        }
        self.index.insert(dtmi.clone(), self.entries.len());
        self.entries.push((dtmi, content.into()));
        true
    }

    pub fn get(&self, dtmi: &str) -> Option<&str> {
        self.index
            .get(dtmi)
            .map(|position| self.entries[*position].1.as_str())
    }

    pub fn contains_key(&self, dtmi: &str) -> bool {
        self.index.contains_key(dtmi)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(dtmi, _)| dtmi.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(dtmi, content)| (dtmi.as_str(), content.as_str()))
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.entries
    }
}

impl IntoIterator for ResolvedModels {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ResolvedModels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (dtmi, content) in &self.entries {
            map.serialize_entry(dtmi, content)?;
        }
        map.end()
    }
}
