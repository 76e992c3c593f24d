use std::{
    collections::HashSet,
    sync::OnceLock,
};

use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    KosakataError,
    VocabularyWord,
};

pub const INDONESIAN: &str = "INDONESIAN";
pub const ENGLISH: &str = "ENGLISH";
pub const USED_VOCABULARY: &str = "USED_VOCABULARY";

static SECTION_RE: OnceLock<Regex> = OnceLock::new();
static LIST_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

/// Compiles `pattern` once into `cell`.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Regex>,
    pattern: &str,
) -> Result<&'static Regex, KosakataError> {
    if let Some(re) = cell.get() {
        return Ok(re);
    }
    let re = Regex::new(pattern)?;
    Ok(cell.get_or_init(|| re))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub body: String,
}

/// Named `[SECTION]` blocks of a generated response, in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub preamble: String, // Text before the first marker
    pub sections: Vec<Section>,
}

impl Sections {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.sections.iter().find(|s| s.name == name).map(|s| s.body.as_str())
    }

    /// Like `get`, but treats an empty body as absent.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|body| !body.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Splits `text` on section markers such as `[ENGLISH]` that start a line.
/// Markdown decoration around a marker (`**[ENGLISH]**`, `## [ENGLISH]:`) is
/// tolerated. Spaces in a section name become underscores; when a name
/// repeats, the first block wins.
pub fn parse_sections(text: &str) -> Result<Sections, KosakataError> {
    let re = cached_regex(&SECTION_RE, r"(?m)^[ \t*#]*\[([A-Z][A-Z0-9_ ]*)\][ \t*:]*")?;

    let mut parsed = Sections::default();
    let mut seen = HashSet::new();
    let mut current: Option<(String, usize)> = None;

    for caps in re.captures_iter(text) {
        let (Some(marker), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_end = marker.start();
        match current.take() {
            Some((open, start)) => push_section(&mut parsed, &mut seen, open, &text[start..body_end]),
            None => parsed.preamble = text[..body_end].trim().to_string(),
        }
        current = Some((normalize_name(name.as_str()), marker.end()));
    }

    match current {
        Some((name, start)) => push_section(&mut parsed, &mut seen, name, &text[start..]),
        None => parsed.preamble = text.trim().to_string(),
    }

    Ok(parsed)
}

fn push_section(parsed: &mut Sections, seen: &mut HashSet<String>, name: String, body: &str) {
    if seen.insert(name.clone()) {
        parsed.sections.push(Section { name, body: body.trim().to_string() });
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// A generated bilingual passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStory {
    pub indonesian: String,
    pub english: Option<String>,
    pub used_vocabulary: Vec<String>,
}

impl GeneratedStory {
    /// Only the Indonesian text is required. A response without any markers
    /// is taken as Indonesian text; a missing vocabulary list is rebuilt from
    /// the request words that occur in the Indonesian text.
    pub fn parse(text: &str, vocabulary: &[VocabularyWord]) -> Result<Self, KosakataError> {
        let sections = parse_sections(text)?;

        let indonesian = if sections.is_empty() {
            Some(sections.preamble.as_str()).filter(|t| !t.is_empty())
        } else {
            sections.non_empty(INDONESIAN)
        };
        let indonesian = indonesian.ok_or(KosakataError::MissingSection(INDONESIAN))?.to_string();

        let english = sections.non_empty(ENGLISH).map(ToOwned::to_owned);

        let listed = match sections.non_empty(USED_VOCABULARY) {
            Some(body) => split_list(body)?,
            None => Vec::new(),
        };
        let used_vocabulary =
            if listed.is_empty() { words_in_text(&indonesian, vocabulary) } else { listed };

        Ok(Self { indonesian, english, used_vocabulary })
    }
}

/// Items of a free-form list: one per line or comma, bullets and numbering
/// removed, glosses such as `makan - eat` or `makan (eat)` cut off.
pub fn split_list(body: &str) -> Result<Vec<String>, KosakataError> {
    let prefix = cached_regex(&LIST_PREFIX_RE, r"^\s*(?:[-*•]+|\d+[.)])\s*")?;

    let mut seen = HashSet::new();
    let mut items = Vec::new();
    for line in body.lines() {
        let line = prefix.replace(line, "");
        for raw in line.split(',') {
            let item = raw
                .split(" - ")
                .next()
                .and_then(|s| s.split(" – ").next())
                .and_then(|s| s.split(['(', ':', '=']).next())
                .unwrap_or_default()
                .trim();
            if !item.is_empty() && seen.insert(item.to_lowercase()) {
                items.push(item.to_string());
            }
        }
    }
    Ok(items)
}

/// Request words whose Indonesian side occurs in `text` as whole words,
/// ignoring case. Multi-word entries must occur as a phrase.
pub fn words_in_text(text: &str, vocabulary: &[VocabularyWord]) -> Vec<String> {
    let haystack = format!(" {} ", normalize_words(text));

    let mut seen = HashSet::new();
    vocabulary
        .iter()
        .filter(|word| {
            let needle = normalize_words(&word.indonesian);
            !needle.is_empty() && haystack.contains(&format!(" {} ", needle))
        })
        .filter(|word| seen.insert(word.indonesian.to_lowercase()))
        .map(|word| word.indonesian.clone())
        .collect()
}

// Lowercase words separated by single spaces; hyphens are kept so
// reduplicated forms like "anak-anak" stay one word.
fn normalize_words(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<VocabularyWord> {
        vec![
            VocabularyWord::new("makan", "eat"),
            VocabularyWord::new("pantai", "beach"),
            VocabularyWord::new("terima kasih", "thank you"),
            VocabularyWord::new("sekolah", "school"),
        ]
    }

    #[test]
    fn test_parse_sections_in_order() {
        let text = "Sure! Here it is.\n\n[INDONESIAN]\nAni: Halo!\nBudi: Hai.\n\n**[ENGLISH]**\nAni: Hello!\n\n## [USED VOCABULARY]:\n- halo\n[ENGLISH]\nignored";
        let sections = parse_sections(text).expect("parse");

        assert_eq!(sections.preamble, "Sure! Here it is.");
        assert_eq!(sections.names(), vec!["INDONESIAN", "ENGLISH", "USED_VOCABULARY"]);
        assert_eq!(sections.get(INDONESIAN), Some("Ani: Halo!\nBudi: Hai."));
        assert_eq!(sections.get(ENGLISH), Some("Ani: Hello!"));
        assert_eq!(sections.get(USED_VOCABULARY), Some("- halo"));
    }

    #[test]
    fn test_inline_double_brackets_are_not_sections() {
        let sections = parse_sections("[[makan]] nasi\n[STORY] Saya [[makan]].").expect("parse");
        assert_eq!(sections.preamble, "[[makan]] nasi");
        assert_eq!(sections.get("STORY"), Some("Saya [[makan]]."));
    }

    #[test]
    fn test_generated_story_full() {
        let text = "[INDONESIAN]\nSaya makan di pantai.\n\n[ENGLISH]\nI eat at the beach.\n\n[USED_VOCABULARY]\n1. makan - eat\n2. pantai (beach)\n";
        let story = GeneratedStory::parse(text, &vocab()).expect("story");

        assert_eq!(story.indonesian, "Saya makan di pantai.");
        assert_eq!(story.english.as_deref(), Some("I eat at the beach."));
        assert_eq!(story.used_vocabulary, vec!["makan", "pantai"]);
    }

    #[test]
    fn test_generated_story_degrades() {
        // No vocabulary list: rebuilt from the request words
        let text = "[INDONESIAN]\nTerima kasih! Kami makan di Pantai Kuta.\n[ENGLISH]\n";
        let story = GeneratedStory::parse(text, &vocab()).expect("story");
        assert_eq!(story.english, None);
        assert_eq!(story.used_vocabulary, vec!["makan", "pantai", "terima kasih"]);

        // No markers at all: the whole reply is the Indonesian text
        let story = GeneratedStory::parse("  Saya pergi ke sekolah.  ", &vocab()).expect("story");
        assert_eq!(story.indonesian, "Saya pergi ke sekolah.");
        assert_eq!(story.used_vocabulary, vec!["sekolah"]);
    }

    #[test]
    fn test_generated_story_requires_indonesian() {
        let result = GeneratedStory::parse("[ENGLISH]\nOnly English here.", &vocab());
        assert!(matches!(result, Err(KosakataError::MissingSection(INDONESIAN))));

        assert!(GeneratedStory::parse("   \n", &vocab()).is_err());
    }

    #[test]
    fn test_split_list_variants() {
        let items = split_list("* makan, minum\n• Pantai: beach\n3) makan\n\n").expect("split");
        assert_eq!(items, vec!["makan", "minum", "Pantai"]);
    }
}
