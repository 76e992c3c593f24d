use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    info,
    warn,
};

use crate::core::KosakataError;

const APP_NAME: &str = "kosakata";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_data_file_path(filename: &str) -> PathBuf {
    get_app_data_dir().join(filename)
}

pub fn save_json_to<T: Serialize>(data: &T, file_path: &Path) -> Result<(), KosakataError> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(file_path, json)?;
    info!(path = %file_path.display(), "data saved");
    Ok(())
}

/// Reads `file_path` as JSON; a missing file yields `T::default()`.
pub fn load_json_from<T: for<'de> Deserialize<'de> + Default>(
    file_path: &Path,
) -> Result<T, KosakataError> {
    if !file_path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(file_path)?;
    let data: T = serde_json::from_str(&json)?;
    info!(path = %file_path.display(), "data loaded");
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(file_path: &Path) -> T {
    match load_json_from::<T>(file_path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %file_path.display(), error = %e, "failed to load, using defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{
        Deserialize,
        Serialize,
    };
    use tempfile::tempdir;

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_json_round_trip_and_fallbacks() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("sample.json");

        let missing: Sample = load_json_from(&path).expect("missing file is not an error");
        assert_eq!(missing, Sample::default());

        let sample = Sample { name: "kata".to_string(), count: 3 };
        save_json_to(&sample, &path).expect("save");
        assert_eq!(load_json_from::<Sample>(&path).expect("load"), sample);

        fs::write(&path, "{ not json").expect("write garbage");
        assert!(load_json_from::<Sample>(&path).is_err());
        assert_eq!(load_json_or_default::<Sample>(&path), Sample::default());
    }
}
