//! Prompts for, and parsing of, replies from a text-generation service.
//!
//! Replies are free text with `[SECTION]` markers and `[[word]]` blanks. The
//! format is not under our control, so parsing degrades rather than rejects
//! wherever a usable result can still be recovered.

pub mod client;
pub mod fill_in;
pub mod markers;
pub mod prompt;
pub mod sections;
pub mod service;

pub use client::{
    MessagesClient,
    TextGenerator,
};
pub use fill_in::{
    FillInStory,
    StoryTitle,
    BLANK_PLACEHOLDER,
};
pub use markers::MarkedText;
pub use prompt::{
    CompletionRequest,
    Difficulty,
    FillInStoryConfig,
    StoryConfig,
};
pub use sections::{
    parse_sections,
    GeneratedStory,
    Sections,
};
pub use service::StoryService;
