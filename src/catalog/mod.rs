pub mod builder;
pub mod index;
pub mod listing;
pub mod parser;
pub mod remote;

use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};

pub use builder::CatalogBuilder;
use chrono::{
    DateTime,
    Utc,
};
pub use index::{
    read_index,
    write_indexes,
    DirectoryIndex,
};
pub use listing::{
    FileListing,
    FolderListing,
};
pub use parser::{
    parse_vocabulary,
    ParsedVocabulary,
};
pub use remote::RemoteCatalog;

use crate::core::{
    KosakataError,
    VocabularyFolder,
    VocabularySet,
};

/// The loaded folder/set tree for one session. Read-only once built; a
/// refresh replaces the whole tree.
#[derive(Debug, Clone)]
pub struct VocabularyCatalog {
    source: PathBuf,
    root: VocabularyFolder,
    loaded_at: DateTime<Utc>,
}

impl VocabularyCatalog {
    pub fn load(source: impl AsRef<Path>) -> Result<Self, KosakataError> {
        let source = source.as_ref().to_path_buf();
        let root = CatalogBuilder::scan(&source)?;
        Ok(Self { source, root, loaded_at: Utc::now() })
    }

    /// Wraps an already built tree, e.g. one fetched by `RemoteCatalog`.
    pub fn from_root(source: impl Into<PathBuf>, root: VocabularyFolder) -> Self {
        Self { source: source.into(), root, loaded_at: Utc::now() }
    }

    /// Full re-walk of the source directory. On failure the previous tree is
    /// kept.
    pub fn rescan(&mut self) -> Result<(), KosakataError> {
        self.root = CatalogBuilder::scan(&self.source)?;
        self.loaded_at = Utc::now();
        Ok(())
    }

    pub fn root(&self) -> &VocabularyFolder {
        &self.root
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn find_folder(&self, path: &str) -> Option<&VocabularyFolder> {
        self.root.find_folder(path)
    }

    pub fn find_set(&self, id: &str) -> Option<&Arc<VocabularySet>> {
        self.root.find_set(id)
    }

    /// Every set in pre-order: a folder's own sets before its subfolders'.
    pub fn all_sets(&self) -> Vec<Arc<VocabularySet>> {
        self.root.descendant_sets()
    }

    pub fn total_sets(&self) -> usize {
        self.root.count_sets()
    }

    pub fn total_words(&self) -> usize {
        self.root.count_words()
    }

    pub fn listing(&self) -> FolderListing {
        FolderListing::from_folder(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_rescan_picks_up_changes() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("week01")).expect("mkdir");
        fs::write(dir.path().join("week01/greetings.txt"), "halo\thello\n").expect("write");

        let mut catalog = VocabularyCatalog::load(dir.path()).expect("load");
        assert_eq!(catalog.total_sets(), 1);
        assert!(catalog.find_set("week01/greetings.txt").is_some());

        fs::write(dir.path().join("week01/numbers.txt"), "satu\tone\ndua\ttwo\n").expect("write");
        catalog.rescan().expect("rescan");

        assert_eq!(catalog.total_sets(), 2);
        assert_eq!(catalog.total_words(), 3);
        let ids: Vec<String> = catalog.all_sets().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["week01/greetings.txt", "week01/numbers.txt"]);
    }

    #[test]
    fn test_rescan_failure_keeps_previous_tree() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("vocab");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("a.txt"), "a\tb\n").expect("write");

        let mut catalog = VocabularyCatalog::load(&root).expect("load");
        fs::remove_dir_all(&root).expect("remove root");

        assert!(matches!(catalog.rescan(), Err(KosakataError::MissingRoot(_))));
        assert_eq!(catalog.total_sets(), 1);
    }
}
