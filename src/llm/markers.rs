use std::sync::OnceLock;

use regex::{
    Captures,
    Regex,
};

use super::sections::cached_regex;
use crate::core::KosakataError;

static DOUBLE_RE: OnceLock<Regex> = OnceLock::new();
static SINGLE_RE: OnceLock<Regex> = OnceLock::new();

/// Text with its answer markers replaced by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedText {
    pub text: String,
    pub answers: Vec<String>,
}

impl MarkedText {
    pub fn blank_count(&self) -> usize {
        self.answers.len()
    }
}

/// Replaces every `[[answer]]` with `placeholder`, collecting the trimmed
/// answers in order.
pub fn extract_double(text: &str, placeholder: &str) -> Result<MarkedText, KosakataError> {
    let re = cached_regex(&DOUBLE_RE, r"\[\[([^\]]+)\]\]")?;
    Ok(replace_markers(re, text, placeholder))
}

/// Like `extract_double`, but falls back to single-bracket `[answer]` markers
/// when the text has no double-bracket ones.
pub fn extract_with_fallback(text: &str, placeholder: &str) -> Result<MarkedText, KosakataError> {
    let marked = extract_double(text, placeholder)?;
    if !marked.answers.is_empty() {
        return Ok(marked);
    }

    let re = cached_regex(&SINGLE_RE, r"\[([^\[\]]+)\]")?;
    Ok(replace_markers(re, text, placeholder))
}

fn replace_markers(re: &Regex, text: &str, placeholder: &str) -> MarkedText {
    let mut answers = Vec::new();
    let replaced = re.replace_all(text, |caps: &Captures| {
        answers.push(caps[1].trim().to_string());
        placeholder.to_string()
    });
    MarkedText { text: replaced.into_owned(), answers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_markers() {
        let marked = extract_double("Saya [[ tidak ]] suka [[kopi]].", "___").expect("extract");
        assert_eq!(marked.text, "Saya ___ suka ___.");
        assert_eq!(marked.answers, vec!["tidak", "kopi"]);
    }

    #[test]
    fn test_single_bracket_fallback() {
        let marked = extract_with_fallback("Ibu [pergi] ke [ pasar ].", "[BLANK]").expect("extract");
        assert_eq!(marked.text, "Ibu [BLANK] ke [BLANK].");
        assert_eq!(marked.answers, vec!["pergi", "pasar"]);
        assert_eq!(marked.blank_count(), 2);

        // Double markers win when both styles appear
        let marked = extract_with_fallback("[[makan]] and [note]", "_").expect("extract");
        assert_eq!(marked.answers, vec!["makan"]);
        assert_eq!(marked.text, "_ and [note]");
    }
}
