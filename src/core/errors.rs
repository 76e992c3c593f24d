use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KosakataError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Vocabulary root not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Invalid vocabulary listing: {0}")]
    InvalidListing(String),

    #[error("Generated text is missing the [{0}] section")]
    MissingSection(&'static str),

    #[error("Generated text contains no [[answer]] blanks")]
    NoBlanks,

    #[error("Text generation failed after {attempts} attempt(s): {reason}")]
    GenerationFailed { attempts: usize, reason: String },

    #[error("No API key configured (set KOSAKATA_API_KEY or ANTHROPIC_API_KEY)")]
    MissingApiKey,

    #[error("KosakataError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for KosakataError {
    fn from(error: std::io::Error) -> Self {
        KosakataError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for KosakataError {
    fn from(error: reqwest::Error) -> Self {
        KosakataError::Reqwest(Box::new(error))
    }
}
