//! The domain store: the candidate words that are still available for each variable. Domains are
//! created by enforcing node consistency (every candidate has the variable's length) and after
//! that they only ever shrink.

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::ops::Index;

use crate::grid_config::GridConfig;
use crate::types::{GlyphId, VariableId, WordId};
use crate::util::{build_glyph_counts_by_cell, GlyphCountsByCell};
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// The remaining candidates for a single variable.
#[derive(Clone)]
pub struct Domain {
    /// The length of every word in this domain, and of the variable it belongs to.
    pub length: usize,

    /// Remaining candidates, as ids into the word list's bucket for `length`, in word list order.
    pub options: Vec<WordId>,

    /// To let us check for supporting values in constant time, we maintain a count of the number
    /// of instances of each glyph in each cell in our remaining options.
    pub glyph_counts_by_cell: GlyphCountsByCell,
}

impl Debug for Domain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("length", &self.length)
            .field("options", &format!("({} options)", self.options.len()))
            .finish()
    }
}

impl Domain {
    #[must_use]
    pub fn new(word_list: &WordList, length: usize, options: Vec<WordId>) -> Domain {
        let glyph_counts_by_cell = build_glyph_counts_by_cell(word_list, length, &options);
        Domain {
            length,
            options,
            glyph_counts_by_cell,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// How many remaining options have the given glyph at the given cell?
    #[must_use]
    pub fn glyph_count(&self, cell_idx: usize, glyph: GlyphId) -> usize {
        self.glyph_counts_by_cell[cell_idx]
            .get(glyph)
            .map_or(0, |&count| count as usize)
    }

    /// Does any remaining option have the given glyph at the given cell?
    #[must_use]
    pub fn supports(&self, cell_idx: usize, glyph: GlyphId) -> bool {
        self.glyph_count(cell_idx, glyph) > 0
    }

    /// Remove every option for which `keep` returns false, keeping the glyph counts up to date.
    /// Returns the number of options removed.
    pub fn retain(&mut self, word_list: &WordList, mut keep: impl FnMut(WordId) -> bool) -> usize {
        let words = &word_list.words[self.length];
        let glyph_counts_by_cell = &mut self.glyph_counts_by_cell;
        let before = self.options.len();

        self.options.retain(|&word_id| {
            if keep(word_id) {
                return true;
            }
            for (cell_idx, &glyph) in words[word_id].glyphs.iter().enumerate() {
                glyph_counts_by_cell[cell_idx][glyph] -= 1;
            }
            false
        });

        if CHECK_INVARIANTS {
            let expected = build_glyph_counts_by_cell(word_list, self.length, &self.options);
            assert!(
                expected == self.glyph_counts_by_cell,
                "Glyph counts out of sync with options"
            );
        }

        before - self.options.len()
    }

    /// Reduce this domain to the single given word.
    pub fn restrict_to(&mut self, word_list: &WordList, word_id: WordId) {
        self.retain(word_list, |option| option == word_id);
    }

    /// The remaining options as strings, mostly useful for tests and logging.
    #[must_use]
    pub fn words<'a>(&self, word_list: &'a WordList) -> Vec<&'a str> {
        self.options
            .iter()
            .map(|&word_id| word_list.words[self.length][word_id].normalized_string.as_str())
            .collect()
    }
}

/// One domain per variable, indexed by `VariableId`.
#[derive(Debug, Clone)]
pub struct DomainStore {
    pub domains: Vec<Domain>,
}

impl DomainStore {
    #[must_use]
    pub fn get(&self, variable_id: VariableId) -> &Domain {
        &self.domains[variable_id]
    }

    pub fn get_mut(&mut self, variable_id: VariableId) -> &mut Domain {
        &mut self.domains[variable_id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// The first variable whose domain has been wiped out, if any.
    #[must_use]
    pub fn first_empty(&self) -> Option<VariableId> {
        self.domains.iter().position(Domain::is_empty)
    }

    /// The total number of options across all domains.
    #[must_use]
    pub fn total_options(&self) -> usize {
        self.domains.iter().map(Domain::len).sum()
    }
}

impl Index<VariableId> for DomainStore {
    type Output = Domain;

    fn index(&self, variable_id: VariableId) -> &Domain {
        &self.domains[variable_id]
    }
}

/// Build the initial domain for every variable: the words in the list whose length matches the
/// variable's length. The word list is already bucketed by length, so this is the bucket for
/// each variable (or nothing, if the list has no words that long). An empty domain isn't an error
/// here; it just means the puzzle is unsatisfiable.
#[must_use]
pub fn enforce_node_consistency(config: &GridConfig) -> DomainStore {
    let domains: Vec<Domain> = config
        .variable_configs
        .iter()
        .map(|variable_config| {
            let length = variable_config.length();
            let options: Vec<WordId> = config
                .word_list
                .words_of_length(length)
                .iter()
                .enumerate()
                .filter(|(_, word)| word.glyphs.len() == length)
                .map(|(word_id, _)| word_id)
                .collect();

            Domain::new(config.word_list, length, options)
        })
        .collect();

    let domains = DomainStore { domains };
    log::debug!(
        "Node consistency left {} options across {} variables",
        domains.total_options(),
        domains.len()
    );

    domains
}

#[cfg(test)]
mod tests {
    use crate::crossword::generate_grid_config_from_template_string;
    use crate::domains::{enforce_node_consistency, Domain};
    use crate::word_list::tests::{memory_word_list, resource_path};
    use crate::word_list::WordList;
    use std::fs;

    #[test]
    fn test_node_consistency_filters_by_length() {
        let template = fs::read_to_string(resource_path("structure0.txt")).unwrap();
        let word_list = WordList::from_file(&resource_path("words0.txt"), None).unwrap();
        let grid_config = generate_grid_config_from_template_string(word_list, &template).unwrap();
        let config = grid_config.to_config_ref();

        let domains = enforce_node_consistency(&config);

        assert_eq!(domains.len(), 4);
        for (variable_config, domain) in config.variable_configs.iter().zip(&domains.domains) {
            assert_eq!(domain.length, variable_config.length());
            for word in domain.words(config.word_list) {
                assert_eq!(word.chars().count(), variable_config.length());
            }
        }

        assert_eq!(
            domains[0].words(config.word_list),
            vec!["one", "two", "six", "ten"]
        );
        assert_eq!(
            domains[1].words(config.word_list),
            vec!["three", "seven", "eight"]
        );
        assert_eq!(domains.total_options(), 4 + 3 + 3 + 3);
        assert_eq!(domains.first_empty(), None);
    }

    #[test]
    fn test_missing_length_yields_empty_domain() {
        let grid_config = generate_grid_config_from_template_string(
            memory_word_list(&["cat", "dog"]),
            "____",
        )
        .unwrap();

        let domains = enforce_node_consistency(&grid_config.to_config_ref());

        assert!(domains[0].is_empty());
        assert_eq!(domains.first_empty(), Some(0));
    }

    #[test]
    fn test_retain_keeps_glyph_counts_in_sync() {
        let word_list = memory_word_list(&["cat", "car", "dog"]);
        let mut domain = Domain::new(&word_list, 3, vec![0, 1, 2]);
        let c = word_list.glyph_id_by_char[&'c'];
        let o = word_list.glyph_id_by_char[&'o'];

        assert_eq!(domain.glyph_count(0, c), 2);
        assert!(domain.supports(1, o));

        let removed = domain.retain(&word_list, |word_id| word_id != 2);

        assert_eq!(removed, 1);
        assert_eq!(domain.words(&word_list), vec!["cat", "car"]);
        assert!(!domain.supports(1, o));

        domain.restrict_to(&word_list, 1);
        assert_eq!(domain.words(&word_list), vec!["car"]);
        assert_eq!(domain.glyph_count(0, c), 1);
        assert_eq!(domain.options, vec![1]);
    }
}
