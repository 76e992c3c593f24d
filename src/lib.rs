pub mod catalog;
pub mod core;
pub mod games;
pub mod llm;
pub mod persistence;
pub mod selection;
pub mod server;

pub use catalog::{
    CatalogBuilder,
    RemoteCatalog,
    VocabularyCatalog,
};
pub use crate::core::{
    AppConfig,
    KosakataError,
    VocabularyFolder,
    VocabularySet,
    VocabularyWord,
};
pub use selection::{
    ExpandedFolders,
    SelectionManager,
    SelectionState,
};
