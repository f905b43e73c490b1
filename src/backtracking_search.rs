//! This module implements grid-filling using a plain recursive backtracking search. Before
//! searching, we enforce node consistency (every option has the right length) and establish arc
//! consistency across the whole grid, bailing out early if either step leaves a variable with no
//! options. The search then picks variables by MRV with a degree tie-break, tries their options in
//! least-constraining-value order, and undoes each tentative choice before trying the next.
//!
//! Optionally, the search can also maintain arc consistency: after each tentative choice it prunes
//! a copy of the domains with AC-3, starting from the arcs that point at the chosen variable, and
//! rejects the choice if any domain is wiped out.

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::arc_consistency::{establish_arc_consistency, DirectedArc};
use crate::assignment::Assignment;
use crate::consistency::{is_consistent, is_consistent_with};
use crate::domains::{enforce_node_consistency, DomainStore};
use crate::grid_config::GridConfig;
use crate::ordering::{order_domain_values, select_unassigned_variable};
use crate::types::{VariableId, WordId};
use crate::{CHECK_INVARIANTS, LOG_FILL_PROCESS};

/// How many states should we visit between checks of the deadline and the abort flag?
pub const INTERRUPT_FREQUENCY: usize = 10;

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// How many tentative choices were made.
    pub states: usize,

    /// How many times every option for a variable was rejected, forcing an earlier choice to be
    /// undone.
    pub backtracks: usize,

    /// How many options were removed by arc consistency, both before and during the search.
    pub eliminations: usize,

    pub total_time: Duration,
    pub node_consistency_time: Duration,
    pub initial_arc_consistency_time: Duration,
    pub choice_arc_consistency_time: Duration,
    pub search_time: Duration,
}

/// Knobs for a single fill operation.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Give up with `FillFailure::Timeout` if the fill takes longer than this.
    pub timeout: Option<Duration>,

    /// Re-establish arc consistency after every tentative choice.
    pub maintain_arc_consistency: bool,
}

/// A struct representing the results of a successful fill operation.
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

impl Debug for FillSuccess {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillSuccess")
            .field("statistics", &self.statistics)
            .field("assigned", &self.assignment.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// The grid has no valid fill with this word list.
    HardFailure,
    Timeout,
    Abort,
}

/// How a completed (uninterrupted) search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchOutcome {
    Solved,
    Exhausted,
}

/// The state shared by every level of the recursive search.
struct Search<'a, 'b> {
    config: &'b GridConfig<'a>,
    deadline: Option<Instant>,
    maintain_arc_consistency: bool,
    statistics: Statistics,
}

impl Search<'_, '_> {
    /// Bail out if we've passed the deadline or someone has set the abort flag.
    fn check_interrupt(&self) -> Result<(), FillFailure> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::Timeout);
            }
        }
        if let Some(abort) = self.config.abort {
            if abort.load(Ordering::Relaxed) {
                return Err(FillFailure::Abort);
            }
        }
        Ok(())
    }

    /// Prune a copy of `domains` to reflect choosing `word_id` for `variable_id`. Returns `None` if
    /// that leaves some other variable with no options.
    fn propagate_choice(
        &mut self,
        domains: &DomainStore,
        variable_id: VariableId,
        word_id: WordId,
    ) -> Option<DomainStore> {
        let start = Instant::now();

        let mut pruned = domains.clone();
        pruned
            .get_mut(variable_id)
            .restrict_to(self.config.word_list, word_id);

        let arcs: Vec<DirectedArc> = self.config.variable_configs[variable_id]
            .neighbor_ids()
            .map(|neighbor_id| (neighbor_id, variable_id))
            .collect();
        let result = establish_arc_consistency(self.config, &mut pruned, Some(arcs));

        self.statistics.choice_arc_consistency_time += start.elapsed();

        match result {
            Ok(success) => {
                self.statistics.eliminations += success.eliminations;
                Some(pruned)
            }
            Err(failure) => {
                if LOG_FILL_PROCESS {
                    log::trace!(
                        "Choice wiped out {}",
                        self.config.variable_configs[failure.variable_id].variable
                    );
                }
                None
            }
        }
    }

    /// Extend `assignment` until it's complete, or until every option for some variable has been
    /// rejected. On the `Exhausted` path, `assignment` is left exactly as it was passed in.
    fn backtrack(
        &mut self,
        assignment: &mut Assignment,
        domains: &DomainStore,
    ) -> Result<SearchOutcome, FillFailure> {
        let config = self.config;
        let Some(variable_id) = select_unassigned_variable(config, domains, assignment) else {
            return Ok(SearchOutcome::Solved);
        };
        let variable_config = &config.variable_configs[variable_id];

        for word_id in order_domain_values(config, domains, variable_id, assignment) {
            if self.statistics.states % INTERRUPT_FREQUENCY == 0 {
                self.check_interrupt()?;
            }
            self.statistics.states += 1;

            assignment.assign(variable_id, (variable_config.length(), word_id));

            if LOG_FILL_PROCESS {
                log::trace!(
                    "Trying {:?} for {} ({} of {} assigned)",
                    assignment.word(config, variable_id),
                    variable_config.variable,
                    assignment.len(),
                    config.variable_configs.len(),
                );
            }

            if is_consistent_with(config, assignment, variable_id) {
                let outcome = if self.maintain_arc_consistency {
                    match self.propagate_choice(domains, variable_id, word_id) {
                        Some(pruned) => self.backtrack(assignment, &pruned)?,
                        None => SearchOutcome::Exhausted,
                    }
                } else {
                    self.backtrack(assignment, domains)?
                };

                if outcome == SearchOutcome::Solved {
                    return Ok(SearchOutcome::Solved);
                }
            }

            assignment.unassign(variable_id);
        }

        self.statistics.backtracks += 1;
        if LOG_FILL_PROCESS {
            log::trace!("Out of options for {}", variable_config.variable);
        }

        Ok(SearchOutcome::Exhausted)
    }
}

/// Search for a valid fill for the given grid, giving up if we pass the deadline in `options` or
/// the config's abort flag is set.
pub fn find_fill(config: &GridConfig, options: &FillOptions) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let deadline = options.timeout.map(|timeout| start + timeout);
    let mut statistics = Statistics::default();

    let mut domains = enforce_node_consistency(config);
    statistics.node_consistency_time = start.elapsed();

    // A variable with no words of the right length can never be filled. AC-3 would only notice
    // this if the variable had neighbors, so we check for it directly.
    if let Some(variable_id) = domains.first_empty() {
        log::debug!(
            "No words of length {} for {}",
            config.variable_configs[variable_id].length(),
            config.variable_configs[variable_id].variable
        );
        return Err(FillFailure::HardFailure);
    }

    // Establish initial arc consistency. If we can't even do that, we're obviously not going to be
    // able to find a fill.
    let arc_consistency_start = Instant::now();
    let result = establish_arc_consistency(config, &mut domains, None);
    statistics.initial_arc_consistency_time = arc_consistency_start.elapsed();
    match result {
        Ok(success) => {
            log::debug!(
                "Initial arc consistency processed {} arcs and removed {} options",
                success.arcs_processed,
                success.eliminations
            );
            statistics.eliminations = success.eliminations;
        }
        Err(failure) => {
            log::debug!(
                "Initial arc consistency wiped out {}",
                config.variable_configs[failure.variable_id].variable
            );
            return Err(FillFailure::HardFailure);
        }
    }

    let mut search = Search {
        config,
        deadline,
        maintain_arc_consistency: options.maintain_arc_consistency,
        statistics,
    };
    let mut assignment = Assignment::new(config.variable_configs.len());

    let search_start = Instant::now();
    let outcome = search.backtrack(&mut assignment, &domains);

    let mut statistics = search.statistics;
    statistics.search_time = search_start.elapsed();
    statistics.total_time = start.elapsed();

    match outcome {
        Ok(SearchOutcome::Solved) => {
            if CHECK_INVARIANTS {
                assert!(
                    assignment.is_complete() && is_consistent(config, &assignment),
                    "Search produced an invalid fill"
                );
            }
            log::debug!("Found a fill: {statistics:?}");
            Ok(FillSuccess {
                statistics,
                assignment,
            })
        }
        Ok(SearchOutcome::Exhausted) => {
            log::debug!("No fill exists: {statistics:?}");
            Err(FillFailure::HardFailure)
        }
        Err(failure) => {
            log::debug!("Fill interrupted ({failure:?}): {statistics:?}");
            Err(failure)
        }
    }
}

/// Fill the grid with default options, returning `None` if it can't be filled.
#[must_use]
pub fn solve(config: &GridConfig) -> Option<Assignment> {
    find_fill(config, &FillOptions::default())
        .ok()
        .map(|success| success.assignment)
}
