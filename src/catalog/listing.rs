use std::collections::HashSet;

use serde::{
    Deserialize,
    Serialize,
};

use super::builder::is_valid_name;
use crate::core::{
    join_path,
    KosakataError,
    VocabularyFolder,
};

/// JSON shape of `GET /api/vocabulary`: the folder tree without word lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderListing {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub files: Vec<FileListing>,
    #[serde(default)]
    pub subfolders: Vec<FolderListing>,
    #[serde(default)]
    pub total_files: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    pub name: String,
    pub path: String, // Relative to the vocabulary root; also the set id
    #[serde(default)]
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FolderListing {
    pub fn from_folder(folder: &VocabularyFolder) -> Self {
        let files: Vec<FileListing> = folder
            .sets
            .iter()
            .map(|set| FileListing {
                name: set.filename.clone(),
                path: set.id.clone(),
                word_count: set.word_count,
                error: set.error.clone(),
            })
            .collect();
        let subfolders: Vec<FolderListing> =
            folder.subfolders.iter().map(FolderListing::from_folder).collect();
        let total_files = files.len() + subfolders.iter().map(|f| f.total_files).sum::<usize>();

        Self {
            name: folder.name.clone(),
            path: folder.path.clone(),
            files,
            subfolders,
            total_files,
            error: folder.error.clone(),
        }
    }

    /// Checks the listing is a well-formed tree rooted at `""`: every path is
    /// its parent's path joined with its own name, names are plain path
    /// segments, and no folder lists the same name twice.
    pub fn validate(&self) -> Result<(), KosakataError> {
        if !self.path.is_empty() {
            return Err(invalid(format!("root path must be empty, got {:?}", self.path)));
        }
        self.validate_children()
    }

    fn validate_children(&self) -> Result<(), KosakataError> {
        let mut file_names = HashSet::new();
        for file in &self.files {
            check_segment(&file.name)?;
            if !file_names.insert(file.name.as_str()) {
                return Err(invalid(format!("duplicate file {:?} in {:?}", file.name, self.path)));
            }
            let expected = join_path(&self.path, &file.name);
            if file.path != expected {
                return Err(invalid(format!("file path {:?} should be {:?}", file.path, expected)));
            }
        }

        let mut folder_names = HashSet::new();
        for sub in &self.subfolders {
            check_segment(&sub.name)?;
            if !folder_names.insert(sub.name.as_str()) {
                return Err(invalid(format!("duplicate folder {:?} in {:?}", sub.name, self.path)));
            }
            let expected = join_path(&self.path, &sub.name);
            if sub.path != expected {
                return Err(invalid(format!("folder path {:?} should be {:?}", sub.path, expected)));
            }
            sub.validate_children()?;
        }

        Ok(())
    }
}

fn check_segment(name: &str) -> Result<(), KosakataError> {
    if !is_valid_name(name) {
        return Err(invalid(format!("invalid name {:?}", name)));
    }
    Ok(())
}

fn invalid(message: String) -> KosakataError {
    KosakataError::InvalidListing(message)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{
        VocabularySet,
        VocabularyWord,
    };

    fn sample_tree() -> VocabularyFolder {
        let mut root = VocabularyFolder::new("vocabulary", "");
        let mut week01 = VocabularyFolder::new("week01", "week01");
        week01.sets.push(Arc::new(VocabularySet::new(
            "week01",
            "greetings.txt",
            vec![VocabularyWord::new("halo", "hello")],
        )));
        root.subfolders.push(week01);
        root
    }

    #[test]
    fn test_listing_shape() {
        let listing = FolderListing::from_folder(&sample_tree());
        assert_eq!(listing.total_files, 1);
        listing.validate().expect("valid listing");

        let json = serde_json::to_value(&listing).expect("serialize");
        assert_eq!(json["subfolders"][0]["files"][0]["path"], "week01/greetings.txt");
        assert_eq!(json["subfolders"][0]["files"][0]["wordCount"], 1);
        assert_eq!(json["totalFiles"], 1);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_validation_rejects_inconsistent_paths() {
        let mut listing = FolderListing::from_folder(&sample_tree());
        listing.subfolders[0].files[0].path = "elsewhere/greetings.txt".to_string();
        assert!(matches!(listing.validate(), Err(KosakataError::InvalidListing(_))));

        let mut listing = FolderListing::from_folder(&sample_tree());
        listing.subfolders[0].name = "..".to_string();
        assert!(listing.validate().is_err());

        let mut listing = FolderListing::from_folder(&sample_tree());
        let dup = listing.subfolders[0].clone();
        listing.subfolders.push(dup);
        assert!(listing.validate().is_err());
    }

    #[test]
    fn test_missing_required_fields_fail_to_parse() {
        let result = serde_json::from_str::<FolderListing>(r#"{ "files": [] }"#);
        assert!(result.is_err());
    }
}
