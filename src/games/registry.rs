use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameCategory {
    Static,
    AiGenerated,
    Hybrid,
    Development,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: GameCategory,
    pub requires_ai: bool,
    pub requires_vocabulary: bool,
    pub min_words: Option<usize>,
    pub max_words: Option<usize>,
}

impl GameInfo {
    pub fn new(id: &str, name: &str, description: &str, category: GameCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            requires_ai: false,
            requires_vocabulary: true,
            min_words: None,
            max_words: None,
        }
    }

    pub fn words(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_words = min;
        self.max_words = max;
        self
    }

    pub fn with_ai(mut self) -> Self {
        self.requires_ai = true;
        self
    }

    pub fn without_vocabulary(mut self) -> Self {
        self.requires_vocabulary = false;
        self
    }

    /// A bound of zero counts as no bound.
    pub fn accepts(&self, word_count: usize) -> bool {
        let meets_min = self.min_words.filter(|&min| min > 0).map_or(true, |min| word_count >= min);
        let meets_max = self.max_words.filter(|&max| max > 0).map_or(true, |max| word_count <= max);
        meets_min && meets_max
    }
}

/// The games on offer, in registration order.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: Vec<GameInfo>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_games() -> Self {
        let mut registry = Self::new();
        registry.register(
            GameInfo::new("flashcards", "Flashcards", "Practice vocabulary with flip cards", GameCategory::Static)
                .words(Some(1), None),
        );
        registry.register(
            GameInfo::new(
                "matching",
                "Matching Game",
                "Match Indonesian words with their English translations",
                GameCategory::Static,
            )
            .words(Some(4), Some(500)),
        );
        registry.register(
            GameInfo::new(
                "fill-in-story",
                "Fill in the Story",
                "Complete Indonesian stories by filling in vocabulary blanks",
                GameCategory::AiGenerated,
            )
            .with_ai()
            .words(Some(3), Some(50)),
        );
        registry.register(
            GameInfo::new(
                "external-fill-blanks",
                "Fill in the Blanks",
                "Practice with custom fill-in-the-blank exercises",
                GameCategory::External,
            )
            .without_vocabulary()
            .words(Some(0), None),
        );
        registry.register(
            GameInfo::new(
                "retrieval-rush",
                "Retrieval Rush",
                "Practice Indonesian speaking with AI-generated prompts and feedback",
                GameCategory::AiGenerated,
            )
            .with_ai()
            .without_vocabulary()
            .words(Some(0), None),
        );
        registry
    }

    /// Adds a game, replacing any game with the same id in place.
    pub fn register(&mut self, game: GameInfo) {
        match self.games.iter_mut().find(|g| g.id == game.id) {
            Some(existing) => *existing = game,
            None => self.games.push(game),
        }
    }

    pub fn get(&self, id: &str) -> Option<&GameInfo> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn all(&self) -> &[GameInfo] {
        &self.games
    }

    pub fn available_games(&self, word_count: usize) -> Vec<&GameInfo> {
        self.games.iter().filter(|g| g.accepts(word_count)).collect()
    }
}
