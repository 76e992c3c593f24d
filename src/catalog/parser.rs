use crate::core::VocabularyWord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingTab,
    EmptyIndonesian,
    EmptyEnglish,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingTab => write!(f, "no tab separator"),
            SkipReason::EmptyIndonesian => write!(f, "empty Indonesian field"),
            SkipReason::EmptyEnglish => write!(f, "empty English field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize, // 1-based
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedVocabulary {
    pub words: Vec<VocabularyWord>,
    pub skipped: Vec<SkippedLine>,
}

/// Parses `source<TAB>target` lines. Blank lines are ignored and malformed
/// lines are reported in `skipped`; neither ever fails the whole text.
pub fn parse_vocabulary(content: &str) -> ParsedVocabulary {
    let mut parsed = ParsedVocabulary::default();
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(word) => parsed.words.push(word),
            Err(reason) => parsed.skipped.push(SkippedLine { line_number: index + 1, reason }),
        }
    }

    parsed
}

/// Splits on the first tab only, so a stray tab in the translation stays part
/// of it.
pub fn parse_line(line: &str) -> Result<VocabularyWord, SkipReason> {
    let (indonesian, english) = line.split_once('\t').ok_or(SkipReason::MissingTab)?;
    let indonesian = indonesian.trim();
    let english = english.trim();

    if indonesian.is_empty() {
        return Err(SkipReason::EmptyIndonesian);
    }
    if english.is_empty() {
        return Err(SkipReason::EmptyEnglish);
    }

    Ok(VocabularyWord::new(indonesian, english))
}

/// Inverse of `parse_vocabulary` for well-formed words.
pub fn format_vocabulary(words: &[VocabularyWord]) -> String {
    let mut out = String::new();
    for word in words {
        out.push_str(&word.indonesian);
        out.push('\t');
        out.push_str(&word.english);
        out.push('\n');
    }
    out
}
