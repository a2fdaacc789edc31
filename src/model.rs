use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// A parsed `KEY=VALUE` entry from a `.env` file or input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub source: Option<PathBuf>,
    pub line: u32,
}

/// Entries of one parsed document in file order.
///
/// A key that appears more than once keeps the position of its first
/// occurrence and the value of its last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocument {
    entries: Vec<Entry>,
    by_key: HashMap<String, usize>,
}

impl EnvDocument {
    pub(crate) fn insert(&mut self, entry: Entry) {
        if let Some(existing_idx) = self.by_key.get(&entry.key).copied() {
            self.entries[existing_idx] = entry;
        } else {
            self.by_key.insert(entry.key.clone(), self.entries.len());
            self.entries.push(entry);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|idx| self.entries[*idx].value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(as_pair)
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}

impl IntoIterator for EnvDocument {
    type Item = (String, String);
    type IntoIter = std::iter::Map<std::vec::IntoIter<Entry>, fn(Entry) -> (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(into_pair as fn(Entry) -> (String, String))
    }
}

impl<'a> IntoIterator for &'a EnvDocument {
    type Item = (&'a str, &'a str);
    type IntoIter =
        std::iter::Map<std::slice::Iter<'a, Entry>, fn(&'a Entry) -> (&'a str, &'a str)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .iter()
            .map(as_pair as fn(&'a Entry) -> (&'a str, &'a str))
    }
}

fn into_pair(entry: Entry) -> (String, String) {
    (entry.key, entry.value)
}

fn as_pair(entry: &Entry) -> (&str, &str) {
    (entry.key.as_str(), entry.value.as_str())
}

/// Summary of the load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_existing: usize,
    pub files_read: usize,
}
