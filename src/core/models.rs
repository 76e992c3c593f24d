use std::{
    collections::HashSet,
    sync::Arc,
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// One source/target pair from a vocabulary file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub indonesian: String,
    pub english: String,
}

impl VocabularyWord {
    pub fn new(indonesian: impl Into<String>, english: impl Into<String>) -> Self {
        Self { indonesian: indonesian.into(), english: english.into() }
    }
}

/// One parsed vocabulary file.
///
/// Sets are immutable once built and shared between the catalog and the
/// selection manager as `Arc<VocabularySet>`. Selection is tracked outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularySet {
    pub id: String,              // Path relative to the catalog root, e.g. "week01/greetings.txt"
    pub filename: String,        // "greetings.txt"
    pub items: Vec<VocabularyWord>,
    pub word_count: usize,       // Always items.len()
    pub path: String,            // Path of the owning folder, "" for the root
    pub loaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,   // Set when the file could not be read
}

impl VocabularySet {
    pub fn new(folder_path: &str, filename: &str, items: Vec<VocabularyWord>) -> Self {
        Self {
            id: join_path(folder_path, filename),
            filename: filename.to_string(),
            word_count: items.len(),
            items,
            path: folder_path.to_string(),
            loaded_at: Utc::now(),
            error: None,
        }
    }

    pub fn failed(folder_path: &str, filename: &str, error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::new(folder_path, filename, Vec::new()) }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Filename without the `.txt` extension, for display.
    pub fn display_name(&self) -> &str {
        self.filename.strip_suffix(".txt").unwrap_or(&self.filename)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyFolder {
    pub name: String,
    pub path: String, // Natural key; "" for the root
    pub sets: Vec<Arc<VocabularySet>>,
    pub subfolders: Vec<VocabularyFolder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VocabularyFolder {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            sets: Vec::new(),
            subfolders: Vec::new(),
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, path: impl Into<String>, error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::new(name, path) }
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Sorts sets by filename and subfolders by name, recursively.
    pub fn sort_recursive(&mut self) {
        self.sets.sort_by(|a, b| a.filename.cmp(&b.filename));
        self.subfolders.sort_by(|a, b| a.name.cmp(&b.name));
        for child in &mut self.subfolders {
            child.sort_recursive();
        }
    }

    /// Every set under this folder, pre-order, each id at most once.
    pub fn descendant_sets(&self) -> Vec<Arc<VocabularySet>> {
        let mut seen = HashSet::new();
        let mut sets = Vec::new();
        self.collect_sets(&mut seen, &mut sets);
        sets
    }

    fn collect_sets(&self, seen: &mut HashSet<String>, out: &mut Vec<Arc<VocabularySet>>) {
        for set in &self.sets {
            if seen.insert(set.id.clone()) {
                out.push(set.clone());
            }
        }
        for child in &self.subfolders {
            child.collect_sets(seen, out);
        }
    }

    pub fn count_sets(&self) -> usize {
        self.sets.len() + self.subfolders.iter().map(|f| f.count_sets()).sum::<usize>()
    }

    pub fn count_words(&self) -> usize {
        self.sets.iter().map(|s| s.word_count).sum::<usize>()
            + self.subfolders.iter().map(|f| f.count_words()).sum::<usize>()
    }

    pub fn find_folder(&self, path: &str) -> Option<&VocabularyFolder> {
        if self.path == path {
            return Some(self);
        }
        self.subfolders.iter().find_map(|child| child.find_folder(path))
    }

    pub fn find_set(&self, id: &str) -> Option<&Arc<VocabularySet>> {
        self.sets
            .iter()
            .find(|s| s.id == id)
            .or_else(|| self.subfolders.iter().find_map(|child| child.find_set(id)))
    }

    /// Paths of this folder and every folder below it, pre-order.
    pub fn folder_paths(&self) -> Vec<String> {
        let mut paths = vec![self.path.clone()];
        for child in &self.subfolders {
            paths.extend(child.folder_paths());
        }
        paths
    }
}

/// Joins two slash-separated path fragments, treating "" as the root.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(folder: &str, name: &str, words: usize) -> Arc<VocabularySet> {
        let items = (0..words).map(|i| VocabularyWord::new(format!("id{i}"), format!("en{i}"))).collect();
        Arc::new(VocabularySet::new(folder, name, items))
    }

    #[test]
    fn test_set_identity() {
        let root_set = VocabularySet::new("", "basics.txt", Vec::new());
        assert_eq!(root_set.id, "basics.txt");
        assert_eq!(root_set.display_name(), "basics");

        let nested = VocabularySet::failed("week01/extra", "x.txt", "permission denied");
        assert_eq!(nested.id, "week01/extra/x.txt");
        assert_eq!(nested.path, "week01/extra");
        assert_eq!(nested.word_count, 0);
        assert!(nested.has_error());
    }

    #[test]
    fn test_descendant_sets_dedup_and_order() {
        let shared = set("a", "one.txt", 1);
        let mut root = VocabularyFolder::new("", "");
        let mut a = VocabularyFolder::new("a", "a");
        a.sets.push(shared.clone());
        let mut b = VocabularyFolder::new("b", "a/b");
        b.sets.push(set("a/b", "two.txt", 2));
        // Degenerate tree: the same set listed twice
        b.sets.push(shared.clone());
        a.subfolders.push(b);
        root.subfolders.push(a);

        let ids: Vec<String> = root.descendant_sets().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["a/one.txt", "a/b/two.txt"]);
        assert_eq!(root.count_words(), 4);
        assert_eq!(root.find_folder("a/b").map(|f| f.name.as_str()), Some("b"));
        assert!(root.find_set("a/b/two.txt").is_some());
        assert_eq!(root.folder_paths(), vec!["", "a", "a/b"]);
    }
}
