//! This module contains a crossword-specific implementation of the AC-3 algorithm. For our
//! purposes, a grid is arc-consistent when every word remaining in a variable's domain has, for
//! each crossing variable, at least one word in that variable's domain with the same letter in the
//! shared cell.
//!
//! Checking for a supporting word doesn't require scanning the other domain: each domain keeps a
//! count of how many of its words have each glyph in each cell, so a word is supported exactly when
//! the crossing domain's count for its letter is non-zero.

use smallvec::SmallVec;
use std::collections::{HashSet, VecDeque};

use crate::domains::DomainStore;
use crate::grid_config::GridConfig;
use crate::types::VariableId;
use crate::{LOG_FILL_PROCESS, MAX_GLYPH_COUNT};

/// An ordered pair `(x, y)` of crossing variables; making it consistent means pruning `x` against
/// `y`.
pub type DirectedArc = (VariableId, VariableId);

/// Result from a successful call to `establish_arc_consistency`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were taken off the worklist and revised.
    pub arcs_processed: usize,

    /// How many words were removed across all domains.
    pub eliminations: usize,
}

/// Result from a failed call to `establish_arc_consistency`, identifying the variable whose domain
/// was wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub variable_id: VariableId,
    pub arcs_processed: usize,
    pub eliminations: usize,
}

/// Result from a call to `establish_arc_consistency`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove words from `x`'s domain that have no match in `y`'s domain, returning how many were
/// removed. Variables that don't cross are trivially consistent.
fn revise_domain(
    config: &GridConfig,
    domains: &mut DomainStore,
    x: VariableId,
    y: VariableId,
) -> usize {
    let Some(crossing) = config.variable_configs[x].crossing_with(y) else {
        return 0;
    };
    let cell = crossing.cell;

    let supported: SmallVec<[bool; MAX_GLYPH_COUNT]> = domains[y].glyph_counts_by_cell
        [crossing.other_cell]
        .iter()
        .map(|&count| count > 0)
        .collect();

    let words = config.word_list.words_of_length(domains[x].length);

    domains
        .get_mut(x)
        .retain(config.word_list, |word_id| supported[words[word_id].glyphs[cell]])
}

/// Make `x` arc-consistent with `y`. Returns true if any words were removed from `x`'s domain.
pub fn revise(config: &GridConfig, domains: &mut DomainStore, x: VariableId, y: VariableId) -> bool {
    revise_domain(config, domains, x, y) > 0
}

/// Every arc in the grid: `(x, y)` for each variable `x` and each of its neighbors `y`.
#[must_use]
pub fn all_arcs(config: &GridConfig) -> Vec<DirectedArc> {
    config
        .variable_configs
        .iter()
        .flat_map(|variable_config| {
            variable_config
                .neighbor_ids()
                .map(move |neighbor_id| (variable_config.id, neighbor_id))
        })
        .collect()
}

/// Prune `domains` until every arc is consistent, starting from the given arcs (or every arc in
/// the grid if `arcs` is `None`). Arcs are processed first-in, first-out; whenever a domain
/// shrinks, the arcs pointing into it from its other neighbors are queued again. Fails as soon as
/// any domain becomes empty, in which case the grid can't be filled from these domains.
pub fn establish_arc_consistency(
    config: &GridConfig,
    domains: &mut DomainStore,
    arcs: Option<Vec<DirectedArc>>,
) -> ArcConsistencyResult {
    let mut queued: HashSet<DirectedArc> = HashSet::new();
    let mut queue: VecDeque<DirectedArc> = arcs
        .unwrap_or_else(|| all_arcs(config))
        .into_iter()
        .filter(|&arc| queued.insert(arc))
        .collect();

    let mut arcs_processed = 0;
    let mut eliminations = 0;

    while let Some((x, y)) = queue.pop_front() {
        queued.remove(&(x, y));
        arcs_processed += 1;

        let removed = revise_domain(config, domains, x, y);
        if removed == 0 {
            continue;
        }
        eliminations += removed;

        if LOG_FILL_PROCESS {
            log::trace!(
                "Revising {} against {} removed {removed} options ({} left)",
                config.variable_configs[x].variable,
                config.variable_configs[y].variable,
                domains[x].len(),
            );
        }

        if domains[x].is_empty() {
            return Err(ArcConsistencyFailure {
                variable_id: x,
                arcs_processed,
                eliminations,
            });
        }

        // Narrowing `x` may have removed the only support for words in its other neighbors.
        for z in config.variable_configs[x].neighbor_ids() {
            if z != y && queued.insert((z, x)) {
                queue.push_back((z, x));
            }
        }
    }

    Ok(ArcConsistencySuccess {
        arcs_processed,
        eliminations,
    })
}
