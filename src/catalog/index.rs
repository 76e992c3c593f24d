use std::{
    fs,
    path::Path,
    sync::Arc,
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

use super::builder::{
    is_valid_name,
    is_vocabulary_file,
    root_name,
    CatalogBuilder,
};
use crate::core::{
    join_path,
    KosakataError,
    VocabularyFolder,
};

pub const INDEX_FILE: &str = "index.json";

/// Static listing of one directory, for hosts that cannot list directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryIndex {
    #[serde(default)]
    pub files: Vec<IndexedFile>,
    #[serde(default)]
    pub folders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

pub fn build_index(dir: &Path) -> Result<DirectoryIndex, KosakataError> {
    let mut index = DirectoryIndex::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
            continue;
        };
        if name == INDEX_FILE || name.starts_with('.') || !is_valid_name(&name) {
            continue;
        }

        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            index.folders.push(name);
        } else if file_type.is_file() && is_vocabulary_file(&path) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            index.files.push(IndexedFile { name, size });
        }
    }

    index.files.sort_by(|a, b| a.name.cmp(&b.name));
    index.folders.sort();
    Ok(index)
}

/// Writes an `index.json` into `root` and every directory below it.
/// Returns the number of index files written.
pub fn write_indexes(root: &Path) -> Result<usize, KosakataError> {
    if !root.is_dir() {
        return Err(KosakataError::MissingRoot(root.to_path_buf()));
    }

    let index = build_index(root)?;
    let json = serde_json::to_string_pretty(&index)?;
    fs::write(root.join(INDEX_FILE), json)?;
    debug!(
        dir = %root.display(),
        files = index.files.len(),
        folders = index.folders.len(),
        "index written"
    );

    let mut written = 1;
    for folder in &index.folders {
        written += write_indexes(&root.join(folder))?;
    }

    Ok(written)
}

pub fn read_index(dir: &Path) -> Result<DirectoryIndex, KosakataError> {
    let content = fs::read_to_string(dir.join(INDEX_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

impl CatalogBuilder {
    /// Builds the tree from `index.json` listings instead of listing
    /// directories. A directory whose index is missing or invalid becomes an
    /// errored empty folder.
    pub fn from_indexes(root: &Path) -> Result<VocabularyFolder, KosakataError> {
        if !root.is_dir() {
            return Err(KosakataError::MissingRoot(root.to_path_buf()));
        }
        Ok(Self::indexed_dir(root, "", root_name(root)))
    }

    fn indexed_dir(dir: &Path, folder_path: &str, name: String) -> VocabularyFolder {
        let index = match read_index(dir) {
            Ok(index) => index,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read directory index");
                return VocabularyFolder::failed(name, folder_path, e.to_string());
            }
        };

        let mut folder = VocabularyFolder::new(name, folder_path);
        for file in index.files.iter().filter(|f| is_valid_name(&f.name)) {
            let set = CatalogBuilder::load_set(&dir.join(&file.name), folder_path, &file.name);
            folder.sets.push(Arc::new(set));
        }
        for sub in index.folders.into_iter().filter(|f| is_valid_name(f)) {
            let child_path = join_path(folder_path, &sub);
            folder.subfolders.push(Self::indexed_dir(&dir.join(&sub), &child_path, sub));
        }

        folder.sets.sort_by(|a, b| a.filename.cmp(&b.filename));
        folder.subfolders.sort_by(|a, b| a.name.cmp(&b.name));
        folder
    }
}
