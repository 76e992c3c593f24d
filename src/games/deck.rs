use std::{
    collections::HashSet,
    sync::Arc,
};

use rand::{
    seq::SliceRandom,
    Rng,
};

use crate::core::{
    VocabularySet,
    VocabularyWord,
};

/// The words a game session plays with, drawn from the selected sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeDeck {
    words: Vec<VocabularyWord>,
}

impl PracticeDeck {
    /// Flattens `sets` in order. A pair that appears in more than one set is
    /// kept once; comparison ignores case.
    pub fn from_selection(sets: &[Arc<VocabularySet>]) -> Self {
        let mut seen = HashSet::new();
        let words = sets
            .iter()
            .flat_map(|set| set.items.iter())
            .filter(|w| seen.insert((w.indonesian.to_lowercase(), w.english.to_lowercase())))
            .cloned()
            .collect();
        Self { words }
    }

    pub fn shuffle<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.words.shuffle(rng);
        self
    }

    pub fn take(mut self, count: usize) -> Self {
        self.words.truncate(count);
        self
    }

    pub fn words(&self) -> &[VocabularyWord] {
        &self.words
    }

    pub fn into_words(self) -> Vec<VocabularyWord> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
