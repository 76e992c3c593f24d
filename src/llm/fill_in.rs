use serde::{
    Deserialize,
    Serialize,
};

use super::{
    markers::extract_with_fallback,
    sections::parse_sections,
};
use crate::core::KosakataError;

pub const BLANK_PLACEHOLDER: &str = "[BLANK]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryTitle {
    pub indonesian: String,
    pub english: Option<String>,
}

/// A generated story with its answer words cut out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillInStory {
    pub title: Option<StoryTitle>,
    pub story: String, // Blanks appear as BLANK_PLACEHOLDER
    pub answers: Vec<String>,
}

impl FillInStory {
    pub fn parse(text: &str) -> Result<Self, KosakataError> {
        let sections = parse_sections(text)?;

        let body = sections
            .non_empty("STORY")
            .or_else(|| Some(sections.preamble.as_str()).filter(|p| !p.is_empty()))
            .ok_or(KosakataError::MissingSection("STORY"))?;

        let marked = extract_with_fallback(body, BLANK_PLACEHOLDER)?;
        if marked.answers.is_empty() {
            return Err(KosakataError::NoBlanks);
        }

        let title = sections.non_empty("TITLE").and_then(parse_title);
        Ok(Self { title, story: marked.text, answers: marked.answers })
    }

    /// Story text split around the blanks; always one more part than answers.
    pub fn parts(&self) -> Vec<&str> {
        self.story.split(BLANK_PLACEHOLDER).collect()
    }

    pub fn blank_count(&self) -> usize {
        self.answers.len()
    }

    /// Story with every blank filled by its answer.
    pub fn solution(&self) -> String {
        let mut out = String::with_capacity(self.story.len());
        let parts = self.parts();
        for (i, part) in parts.iter().enumerate() {
            out.push_str(part);
            if let Some(answer) = self.answers.get(i).filter(|_| i + 1 < parts.len()) {
                out.push_str(answer);
            }
        }
        out
    }
}

// "Di Pantai\nAt the Beach" or "Di Pantai / At the Beach"
fn parse_title(body: &str) -> Option<StoryTitle> {
    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;

    let (indonesian, english) = match lines.next() {
        Some(second) => (first, Some(second)),
        None => match first.split_once(" / ") {
            Some((id, en)) => (id.trim(), Some(en.trim())),
            None => (first, None),
        },
    };

    Some(StoryTitle {
        indonesian: indonesian.to_string(),
        english: english.filter(|e| !e.is_empty()).map(ToOwned::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_title() {
        let text = "[TITLE]\nDi Pantai\nAt the Beach\n\n[STORY]\nKami [[pergi]] ke [[pantai]] pada hari Minggu.";
        let story = FillInStory::parse(text).expect("story");

        let title = story.title.clone().expect("title");
        assert_eq!(title.indonesian, "Di Pantai");
        assert_eq!(title.english.as_deref(), Some("At the Beach"));
        assert_eq!(story.story, "Kami [BLANK] ke [BLANK] pada hari Minggu.");
        assert_eq!(story.answers, vec!["pergi", "pantai"]);
        assert_eq!(story.parts().len(), story.blank_count() + 1);
        assert_eq!(story.solution(), "Kami pergi ke pantai pada hari Minggu.");
    }

    #[test]
    fn test_parse_without_sections() {
        let story = FillInStory::parse("Saya [makan] nasi.").expect("story");
        assert!(story.title.is_none());
        assert_eq!(story.answers, vec!["makan"]);

        let title = parse_title("Pasar / The Market").expect("title");
        assert_eq!(title.english.as_deref(), Some("The Market"));
    }

    #[test]
    fn test_story_without_blanks_fails() {
        assert!(matches!(FillInStory::parse("[STORY]\nTidak ada."), Err(KosakataError::NoBlanks)));
        assert!(matches!(
            FillInStory::parse("[TITLE]\nJudul"),
            Err(KosakataError::MissingSection("STORY"))
        ));
    }
}
