use std::sync::OnceLock;

use regex::Regex;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::KosakataError,
    llm::{
        markers::extract_double,
        sections::cached_regex,
    },
};

pub const BLANK_MARKER: &str = "___BLANK___";

static NUMBERED_RE: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankQuestion {
    pub id: usize,             // 1-based position among the input's non-blank lines
    pub original_text: String,
    pub display_text: String,  // Blanks replaced by BLANK_MARKER
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Fill-in-the-blank questions pasted in from elsewhere, one numbered line
/// each: `1. Saya [[tidak]] suka kopi.`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillBlanksExercise {
    pub questions: Vec<BlankQuestion>,
}

impl FillBlanksExercise {
    /// Lines that are not numbered are ignored.
    pub fn parse(content: &str) -> Result<Self, KosakataError> {
        let numbered = cached_regex(&NUMBERED_RE, r"^\d+\.\s+(.+)$")?;

        let mut questions = Vec::new();
        for (index, line) in content.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let Some(text) = numbered.captures(line).and_then(|c| c.get(1)) else {
                continue;
            };
            let marked = extract_double(text.as_str(), BLANK_MARKER)?;
            questions.push(BlankQuestion {
                id: index + 1,
                original_text: line.to_string(),
                display_text: marked.text,
                answers: marked.answers,
            });
        }

        Ok(Self { questions })
    }

    pub fn total_blanks(&self) -> usize {
        self.questions.iter().map(|q| q.answers.len()).sum()
    }

    /// Scores `responses`, one list per question in order. Answers match when
    /// equal after trimming, ignoring case; a missing response is wrong.
    pub fn score(&self, responses: &[Vec<String>]) -> Score {
        let mut correct = 0;
        let mut total = 0;

        for (i, question) in self.questions.iter().enumerate() {
            for (j, answer) in question.answers.iter().enumerate() {
                total += 1;
                let given = responses.get(i).and_then(|r| r.get(j));
                if given.is_some_and(|g| answers_match(g, answer)) {
                    correct += 1;
                }
            }
        }

        let percentage =
            if total == 0 { 0 } else { ((correct as f64 / total as f64) * 100.0).round() as u32 };
        Score { correct, total, percentage }
    }
}

pub fn answers_match(given: &str, expected: &str) -> bool {
    given.trim().to_lowercase() == expected.trim().to_lowercase()
}
