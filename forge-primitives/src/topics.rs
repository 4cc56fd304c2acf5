//! Ordered mapping from topic labels to generated content.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered topic map. Labels are unique; the first insert wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicMap {
    entries: Vec<(String, String)>,
}

impl TopicMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts `content` under `label` unless the label is already present.
    ///
    /// Returns `true` when the entry was inserted.
    pub fn insert_if_absent(
        &mut self,
        label: impl Into<String>,
        content: impl Into<String>,
    ) -> bool {
        let label = label.into();
        if self.contains_key(&label) {
            return false;
        }
        self.entries.push((label, content.into()));
        true
    }

    /// Returns the content stored under `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, content)| content.as_str())
    }

    /// Returns `true` when `label` is present.
    #[must_use]
    pub fn contains_key(&self, label: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == label)
    }

    /// Returns the number of topics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no topics are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(label, content)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, content)| (key.as_str(), content.as_str()))
    }

    /// Iterates over the labels in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for TopicMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (label, content) in iter {
            map.insert_if_absent(label, content);
        }
        map
    }
}

impl Serialize for TopicMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, content) in &self.entries {
            map.serialize_entry(label, content)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TopicMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TopicMapVisitor;

        impl<'de> Visitor<'de> for TopicMapVisitor {
            type Value = TopicMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of topic labels to string content")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = TopicMap::new();
                while let Some((label, content)) = access.next_entry::<String, String>()? {
                    map.insert_if_absent(label, content);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TopicMapVisitor)
    }
}
