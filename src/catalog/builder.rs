use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::Arc,
};

use rayon::prelude::*;
use tracing::{
    info,
    warn,
};

use super::parser::parse_vocabulary;
use crate::core::{
    join_path,
    KosakataError,
    VocabularyFolder,
    VocabularySet,
};

pub const VOCABULARY_EXTENSION: &str = "txt";

pub struct CatalogBuilder;

impl CatalogBuilder {
    /// Walks `root` depth-first into a folder tree. Only a missing root is
    /// fatal; unreadable files and directories become errored empty nodes.
    pub fn scan(root: &Path) -> Result<VocabularyFolder, KosakataError> {
        if !root.is_dir() {
            return Err(KosakataError::MissingRoot(root.to_path_buf()));
        }

        let tree = Self::scan_dir(root, "", root_name(root));
        info!(
            root = %root.display(),
            sets = tree.count_sets(),
            words = tree.count_words(),
            "vocabulary scan complete"
        );
        Ok(tree)
    }

    fn scan_dir(dir: &Path, folder_path: &str, name: String) -> VocabularyFolder {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read vocabulary directory");
                return VocabularyFolder::failed(name, folder_path, e.to_string());
            }
        };

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        let mut dirs: Vec<(String, PathBuf)> = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            let Some(entry_name) = entry.file_name().to_str().map(ToOwned::to_owned) else {
                warn!(path = %path.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            if entry_name.starts_with('.') {
                continue;
            }
            if !is_valid_name(&entry_name) {
                warn!(path = %path.display(), "skipping entry with unservable name");
                continue;
            }

            // Symlinks are never followed; a link back up the tree would recurse forever
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping entry of unknown type");
                    continue;
                }
            };
            if file_type.is_dir() {
                dirs.push((entry_name, path));
            } else if file_type.is_file() && is_vocabulary_file(&path) {
                files.push((entry_name, path));
            }
        }

        let mut folder = VocabularyFolder::new(name, folder_path);

        folder.sets = files
            .par_iter()
            .map(|(filename, path)| Arc::new(Self::load_set(path, folder_path, filename)))
            .collect();

        folder.subfolders = dirs
            .into_iter()
            .map(|(dir_name, path)| {
                let child_path = join_path(folder_path, &dir_name);
                Self::scan_dir(&path, &child_path, dir_name)
            })
            .collect();

        folder.sets.sort_by(|a, b| a.filename.cmp(&b.filename));
        folder.subfolders.sort_by(|a, b| a.name.cmp(&b.name));
        folder
    }

    /// Reads and parses one file. Never fails: read errors are recorded on
    /// the returned set.
    pub fn load_set(path: &Path, folder_path: &str, filename: &str) -> VocabularySet {
        match fs::read_to_string(path) {
            Ok(content) => {
                let parsed = parse_vocabulary(&content);
                for skipped in &parsed.skipped {
                    warn!(
                        file = %path.display(),
                        line = skipped.line_number,
                        reason = %skipped.reason,
                        "skipping malformed vocabulary line"
                    );
                }
                VocabularySet::new(folder_path, filename, parsed.words)
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "cannot read vocabulary file");
                VocabularySet::failed(folder_path, filename, e.to_string())
            }
        }
    }
}

pub fn is_vocabulary_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(VOCABULARY_EXTENSION)
}

/// A name that can stand as one segment of a slash-separated id.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

pub(crate) fn root_name(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "vocabulary".to_string())
}
