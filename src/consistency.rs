//! Checks that an assignment satisfies every constraint among the variables it assigns: words
//! have the right length, no word is used twice, and crossing words agree on the shared letter.
//! Unassigned variables don't constrain anything yet.

use crate::assignment::Assignment;
use crate::grid_config::GridConfig;
use crate::types::VariableId;

/// Check the constraints that involve one variable, assuming the rest of the assignment was
/// already consistent. This only looks at the variable's assigned neighbors, so it's what the
/// search calls after each tentative choice.
#[must_use]
pub fn is_consistent_with(
    config: &GridConfig,
    assignment: &Assignment,
    variable_id: VariableId,
) -> bool {
    let Some(global_word_id) = assignment.get(variable_id) else {
        return true;
    };
    let variable_config = &config.variable_configs[variable_id];

    if global_word_id.0 != variable_config.length() {
        return false;
    }

    if assignment.word_count(global_word_id) > 1 {
        return false;
    }

    let word = config.word_list.get_word(global_word_id);

    variable_config.crossings.iter().all(|crossing| {
        assignment
            .get(crossing.other_variable_id)
            .map_or(true, |other_global_word_id| {
                let other_word = config.word_list.get_word(other_global_word_id);
                // The neighbor's word may be the wrong length; that's its own inconsistency.
                other_word.glyphs.get(crossing.other_cell) == Some(&word.glyphs[crossing.cell])
            })
    })
}

/// Check every constraint in the assignment.
#[must_use]
pub fn is_consistent(config: &GridConfig, assignment: &Assignment) -> bool {
    assignment
        .iter()
        .all(|(variable_id, _)| is_consistent_with(config, assignment, variable_id))
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::consistency::{is_consistent, is_consistent_with};
    use crate::crossword::generate_grid_config_from_template_string;
    use crate::grid_config::OwnedGridConfig;
    use crate::word_list::tests::memory_word_list;

    /// Two crossing 3-letter variables (0 across, 1 down, sharing across[1] / down[0]) and an
    /// unconstrained 3-letter variable (2 across).
    fn generate_config() -> OwnedGridConfig {
        generate_grid_config_from_template_string(
            memory_word_list(&["cat", "car", "ace", "dog", "toad"]),
            "___\n#_#\n#_#\n###\n___",
        )
        .unwrap()
    }

    #[test]
    fn test_empty_assignment_is_consistent() {
        let grid_config = generate_config();
        let config = grid_config.to_config_ref();

        assert!(is_consistent(&config, &Assignment::new(3)));
    }

    #[test]
    fn test_crossing_letters_must_agree() {
        let grid_config = generate_config();
        let config = grid_config.to_config_ref();
        let id = |word: &str| config.word_list.get_word_id(word).unwrap();

        let mut assignment = Assignment::new(3);
        assignment.assign(0, id("cat"));
        assert!(is_consistent_with(&config, &assignment, 0));

        assignment.assign(1, id("car"));
        assert!(!is_consistent_with(&config, &assignment, 1));
        assert!(!is_consistent(&config, &assignment));

        assignment.assign(1, id("ace"));
        assert!(is_consistent_with(&config, &assignment, 1));
        assert!(is_consistent(&config, &assignment));
    }

    #[test]
    fn test_words_must_be_unique() {
        let grid_config = generate_config();
        let config = grid_config.to_config_ref();
        let id = |word: &str| config.word_list.get_word_id(word).unwrap();

        let mut assignment = Assignment::new(3);
        assignment.assign(0, id("cat"));
        assignment.assign(2, id("cat"));

        assert!(!is_consistent_with(&config, &assignment, 2));
        assert!(!is_consistent(&config, &assignment));

        assignment.assign(2, id("dog"));
        assert!(is_consistent(&config, &assignment));
    }

    #[test]
    fn test_lengths_must_match() {
        let grid_config = generate_config();
        let config = grid_config.to_config_ref();

        let mut assignment = Assignment::new(3);
        assignment.assign(2, config.word_list.get_word_id("toad").unwrap());

        assert!(!is_consistent_with(&config, &assignment, 2));
        assert!(!is_consistent(&config, &assignment));
    }
}
