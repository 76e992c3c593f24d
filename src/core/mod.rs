pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod tickets;

pub use config::AppConfig;
pub use errors::KosakataError;
pub use models::{
    join_path,
    VocabularyFolder,
    VocabularySet,
    VocabularyWord,
};
pub use tickets::{
    RequestTicket,
    RequestTracker,
};
