//! Heuristics for deciding which variable to fill next and which words to try first.

use std::cmp::Reverse;

use crate::assignment::Assignment;
use crate::domains::DomainStore;
use crate::grid_config::GridConfig;
use crate::types::{VariableId, WordId};

/// Choose the next variable to fill: the unassigned variable with the fewest remaining options
/// (MRV), breaking ties by the number of neighbors (most first) and then by grid position. Returns
/// `None` once every variable has a word.
#[must_use]
pub fn select_unassigned_variable(
    config: &GridConfig,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<VariableId> {
    config
        .variable_configs
        .iter()
        .filter(|variable_config| !assignment.is_assigned(variable_config.id))
        .min_by_key(|variable_config| {
            (
                domains[variable_config.id].len(),
                Reverse(variable_config.crossings.len()),
                variable_config.variable,
            )
        })
        .map(|variable_config| variable_config.id)
}

/// Order the options for a variable so that the ones that rule out the fewest options in
/// unassigned neighbors come first (LCV). A word rules out every option in a neighbor's domain
/// that has a different letter in the shared cell. The sort is stable, so options with equal
/// scores stay in word list order.
#[must_use]
pub fn order_domain_values(
    config: &GridConfig,
    domains: &DomainStore,
    variable_id: VariableId,
    assignment: &Assignment,
) -> Vec<WordId> {
    let variable_config = &config.variable_configs[variable_id];
    let domain = &domains[variable_id];
    let words = config.word_list.words_of_length(domain.length);

    let mut options = domain.options.clone();
    options.sort_by_cached_key(|&word_id| {
        let word = &words[word_id];
        variable_config
            .crossings
            .iter()
            .filter(|crossing| !assignment.is_assigned(crossing.other_variable_id))
            .map(|crossing| {
                let other_domain = &domains[crossing.other_variable_id];
                other_domain.len()
                    - other_domain.glyph_count(crossing.other_cell, word.glyphs[crossing.cell])
            })
            .sum::<usize>()
    });

    options
}
