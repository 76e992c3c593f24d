pub mod expansion;
pub mod manager;

pub use expansion::ExpandedFolders;
pub use manager::{
    SelectionManager,
    SelectionState,
};
