use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::VocabularyWord;

pub const SYSTEM_PROMPT: &str =
    "Generate educational Indonesian language content with English translations.";

const BASE_TOKENS: u32 = 300;
const TOKENS_PER_UNIT: u32 = 200;
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn level(&self) -> &'static str {
        match self {
            Difficulty::Easy => "beginner",
            Difficulty::Medium => "intermediate",
            Difficulty::Hard => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.level())
    }
}

/// One request to the text generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: String, max_tokens: u32) -> Self {
        Self { system: SYSTEM_PROMPT.to_string(), prompt, max_tokens }
    }
}

/// Token budget: a fixed overhead plus a share per paragraph or sentence.
pub fn max_tokens_for(units: usize) -> u32 {
    let units = u32::try_from(units).unwrap_or(u32::MAX);
    BASE_TOKENS.saturating_add(TOKENS_PER_UNIT.saturating_mul(units)).min(MAX_TOKENS)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryConfig {
    pub paragraphs: usize,
    pub difficulty: Difficulty,
    pub custom_prompt: Option<String>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self { paragraphs: 2, difficulty: Difficulty::Medium, custom_prompt: None }
    }
}

impl StoryConfig {
    pub fn request(&self, vocabulary: &[VocabularyWord]) -> CompletionRequest {
        let mut prompt =
            format!("Create a conversation using these Indonesian words: {}\n\n", word_list(vocabulary));
        push_context(&mut prompt, self.custom_prompt.as_deref());
        prompt.push_str(&format!(
            "Guidelines:
- Write {} exchanges between speakers
- Level: {}
- Format the response in exactly this structure:
[INDONESIAN]
(Full Indonesian conversation here)

[ENGLISH]
(Full English translation here)

[USED_VOCABULARY]
(List of used words)

Do not include any section markers or vocabulary lists within the conversation text itself.",
            self.paragraphs.max(1),
            self.difficulty.level()
        ));

        CompletionRequest::new(prompt, max_tokens_for(self.paragraphs.max(1)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillInStoryConfig {
    pub sentences: usize,
    pub blanks: usize,
    pub difficulty: Difficulty,
    pub custom_prompt: Option<String>,
}

impl Default for FillInStoryConfig {
    fn default() -> Self {
        Self { sentences: 1, blanks: 10, difficulty: Difficulty::Medium, custom_prompt: None }
    }
}

impl FillInStoryConfig {
    /// Blanks actually requested: never more than the words on offer.
    pub fn effective_blanks(&self, vocabulary: &[VocabularyWord]) -> usize {
        self.blanks.min(vocabulary.len())
    }

    pub fn request(&self, vocabulary: &[VocabularyWord]) -> CompletionRequest {
        let blanks = self.effective_blanks(vocabulary);
        let mut prompt = format!(
            "Write a short Indonesian story that uses {} of these words: {}\n\n",
            blanks,
            word_list(vocabulary)
        );
        push_context(&mut prompt, self.custom_prompt.as_deref());
        prompt.push_str(&format!(
            "Guidelines:
- Write {} paragraph(s)
- Level: {}
- Wrap each of the {} chosen words in double brackets where it appears, like [[makan]]
- Format the response in exactly this structure:
[TITLE]
(Indonesian title)
(English title)

[STORY]
(The story with the bracketed words)",
            self.sentences.max(1),
            self.difficulty.level(),
            blanks
        ));

        CompletionRequest::new(prompt, max_tokens_for(self.sentences.max(1)))
    }
}

fn word_list(vocabulary: &[VocabularyWord]) -> String {
    vocabulary.iter().map(|w| w.indonesian.as_str()).collect::<Vec<_>>().join(", ")
}

fn push_context(prompt: &mut String, custom: Option<&str>) {
    if let Some(custom) = custom.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("Context: {}\n\n", custom));
    }
}
