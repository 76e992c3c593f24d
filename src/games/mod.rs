pub mod deck;
pub mod fill_blanks;
pub mod registry;

pub use deck::PracticeDeck;
pub use fill_blanks::{
    FillBlanksExercise,
    Score,
};
pub use registry::{
    GameCategory,
    GameInfo,
    GameRegistry,
};
