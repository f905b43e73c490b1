use std::collections::HashMap;

use crate::grid_config::{GridConfig, Variable};
use crate::types::{GlobalWordId, VariableId};

/// A (possibly partial) mapping from variables to words. The search threads a single `Assignment`
/// through its recursion, assigning a variable before descending and unassigning it before
/// returning on the failure path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// The word chosen for each variable, indexed by `VariableId`.
    words: Vec<Option<GlobalWordId>>,

    /// How many variables currently hold each word, so that duplicates can be found without
    /// scanning the whole assignment.
    word_counts: HashMap<GlobalWordId, usize>,

    assigned_count: usize,
}

impl Assignment {
    /// Create an empty assignment for a puzzle with the given number of variables.
    #[must_use]
    pub fn new(variable_count: usize) -> Assignment {
        Assignment {
            words: vec![None; variable_count],
            word_counts: HashMap::new(),
            assigned_count: 0,
        }
    }

    /// Set the word for a variable, replacing any previous word.
    pub fn assign(&mut self, variable_id: VariableId, global_word_id: GlobalWordId) {
        self.unassign(variable_id);
        self.words[variable_id] = Some(global_word_id);
        *self.word_counts.entry(global_word_id).or_insert(0) += 1;
        self.assigned_count += 1;
    }

    /// Clear the word for a variable, returning it if there was one.
    pub fn unassign(&mut self, variable_id: VariableId) -> Option<GlobalWordId> {
        let global_word_id = self.words[variable_id].take()?;

        if let Some(count) = self.word_counts.get_mut(&global_word_id) {
            *count -= 1;
            if *count == 0 {
                self.word_counts.remove(&global_word_id);
            }
        }
        self.assigned_count -= 1;

        Some(global_word_id)
    }

    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> Option<GlobalWordId> {
        self.words[variable_id]
    }

    #[must_use]
    pub fn is_assigned(&self, variable_id: VariableId) -> bool {
        self.words[variable_id].is_some()
    }

    /// Does every variable have a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.words.len()
    }

    /// The number of assigned variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// How many variables currently hold the given word?
    #[must_use]
    pub fn word_count(&self, global_word_id: GlobalWordId) -> usize {
        self.word_counts.get(&global_word_id).copied().unwrap_or(0)
    }

    /// Iterate over the assigned variables and their words, in `VariableId` order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, GlobalWordId)> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(variable_id, word)| word.map(|word| (variable_id, word)))
    }

    /// The word assigned to a variable, as a string.
    #[must_use]
    pub fn word<'a>(&self, config: &GridConfig<'a>, variable_id: VariableId) -> Option<&'a str> {
        self.get(variable_id).map(|global_word_id| {
            config
                .word_list
                .get_word(global_word_id)
                .normalized_string
                .as_str()
        })
    }

    /// The assigned variables and their words, as would be needed to display the fill.
    #[must_use]
    pub fn entries<'a>(&self, config: &GridConfig<'a>) -> Vec<(Variable, &'a str)> {
        self.iter()
            .map(|(variable_id, global_word_id)| {
                (
                    config.variable_configs[variable_id].variable,
                    config
                        .word_list
                        .get_word(global_word_id)
                        .normalized_string
                        .as_str(),
                )
            })
            .collect()
    }
}
