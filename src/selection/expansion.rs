use std::collections::HashSet;

use crate::core::VocabularyFolder;

/// Which folders are open in a tree view. Kept apart from the catalog so a
/// refresh does not collapse everything.
#[derive(Debug, Default, Clone)]
pub struct ExpandedFolders {
    paths: HashSet<String>,
}

impl ExpandedFolders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the folder is expanded afterwards.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.paths.remove(path) {
            false
        } else {
            self.paths.insert(path.to_string());
            true
        }
    }

    /// Expands `path` and every ancestor, so the folder is actually visible.
    /// The root is always shown and is never recorded.
    pub fn expand(&mut self, path: &str) {
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(segment);
            self.paths.insert(current.clone());
        }
    }

    pub fn collapse(&mut self, path: &str) {
        self.paths.remove(path);
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn collapse_all(&mut self) {
        self.paths.clear();
    }

    /// Drops paths that no longer name a folder in `root`.
    pub fn retain_existing(&mut self, root: &VocabularyFolder) {
        let existing: HashSet<String> = root.folder_paths().into_iter().collect();
        self.paths.retain(|path| existing.contains(path));
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
