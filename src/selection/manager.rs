use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::Arc,
};

use tracing::debug;

use crate::{
    catalog::VocabularyCatalog,
    core::{
        VocabularyFolder,
        VocabularySet,
    },
};

/// Aggregate status of a folder, derived from its descendant sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    Partial,
    Selected,
}

/// Tracks which vocabulary sets are selected.
///
/// The only stored state is the set of selected ids; every folder-level answer
/// is recomputed from it and from the folder passed in. Ids are only ever
/// added for sets the manager knows about, so a stale catalog cannot leave
/// dangling ids behind.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    selected: HashSet<String>,
    known: Vec<Arc<VocabularySet>>, // Catalog pre-order
    known_index: HashMap<String, usize>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_catalog(catalog: &VocabularyCatalog) -> Self {
        let mut manager = Self::new();
        manager.update_catalog(catalog);
        manager
    }

    pub fn update_catalog(&mut self, catalog: &VocabularyCatalog) {
        self.update_vocab_sets(catalog.all_sets());
    }

    /// Replaces the known sets. Selected ids that no longer name a known set
    /// are dropped.
    pub fn update_vocab_sets(&mut self, sets: impl IntoIterator<Item = Arc<VocabularySet>>) {
        self.known.clear();
        self.known_index.clear();
        for set in sets {
            if self.known_index.contains_key(&set.id) {
                continue;
            }
            self.known_index.insert(set.id.clone(), self.known.len());
            self.known.push(set);
        }

        let before = self.selected.len();
        let known_index = &self.known_index;
        self.selected.retain(|id| known_index.contains_key(id));
        let pruned = before - self.selected.len();
        if pruned > 0 {
            debug!(pruned, "dropped selections for sets no longer in the catalog");
        }
    }

    /// Selected sets in catalog order.
    pub fn selected_sets(&self) -> Vec<Arc<VocabularySet>> {
        self.known.iter().filter(|set| self.selected.contains(&set.id)).cloned().collect()
    }

    pub fn selected_ids(&self) -> HashSet<String> {
        self.selected.clone()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_word_count(&self) -> usize {
        self.known
            .iter()
            .filter(|set| self.selected.contains(&set.id))
            .map(|set| set.word_count)
            .sum()
    }

    pub fn toggle_set(&mut self, set: &VocabularySet) -> Vec<Arc<VocabularySet>> {
        if !self.known_index.contains_key(&set.id) {
            debug!(id = %set.id, "ignoring toggle for unknown set");
            return self.selected_sets();
        }

        if !self.selected.remove(&set.id) {
            self.selected.insert(set.id.clone());
        }
        self.selected_sets()
    }

    /// Selects every known set under `folder`, or deselects them all when they
    /// are already all selected. A folder without known sets is left alone.
    pub fn toggle_folder(&mut self, folder: &VocabularyFolder) -> Vec<Arc<VocabularySet>> {
        let ids: Vec<String> = folder
            .descendant_sets()
            .into_iter()
            .filter(|set| self.known_index.contains_key(&set.id))
            .map(|set| set.id.clone())
            .collect();

        if ids.is_empty() {
            return self.selected_sets();
        }

        if ids.iter().all(|id| self.selected.contains(id)) {
            for id in &ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(ids);
        }
        self.selected_sets()
    }

    pub fn is_selected(&self, set_id: &str) -> bool {
        self.selected.contains(set_id)
    }

    pub fn folder_state(&self, folder: &VocabularyFolder) -> SelectionState {
        let sets = folder.descendant_sets();
        let selected = sets.iter().filter(|set| self.selected.contains(&set.id)).count();

        match selected {
            0 => SelectionState::Unselected,
            n if n == sets.len() => SelectionState::Selected,
            _ => SelectionState::Partial,
        }
    }

    pub fn is_folder_selected(&self, folder: &VocabularyFolder) -> bool {
        self.folder_state(folder) == SelectionState::Selected
    }

    pub fn is_folder_partially_selected(&self, folder: &VocabularyFolder) -> bool {
        self.folder_state(folder) == SelectionState::Partial
    }

    pub fn clear_selection(&mut self) -> Vec<Arc<VocabularySet>> {
        self.selected.clear();
        Vec::new()
    }
}
