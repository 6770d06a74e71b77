//! Fill a crossword grid from a dictionary by treating it as a constraint satisfaction problem:
//! each slot is a variable whose domain is the set of words that could go there, and crossing
//! slots must agree on their shared letter. Solving runs node consistency, then AC-3, then
//! backtracking search.

use instant::{Duration, Instant};
use log::{debug, info};

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod render;
pub mod template;

pub use backtracking_search::{Assignment, Choice};
pub use error::{CrosswordError, CrosswordResult};
pub use grid_config::{generate_grid_config, Direction, GridConfig, Slot, SlotId, WordId};
pub use render::{render_fill, render_grid};
pub use template::{generate_grid_config_from_template_string, parse_structure, parse_word_list};

use crate::arc_consistency::{enforce_node_consistency, establish_arc_consistency};
use crate::domains::Domains;

/// The expected maximum number of distinct characters appearing in a dictionary.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Knobs for the filling process.
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// After each tentative assignment, shrink the chosen slot's domain to the chosen word and
    /// re-establish arc consistency with its unassigned crossings before searching deeper.
    pub inference: bool,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub node_consistency_removals: usize,
    pub arc_consistency_removals: usize,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation. `assignment` is `None` when the grid
/// can't be filled from the dictionary.
#[derive(Debug)]
pub struct FillResult {
    pub statistics: Statistics,
    pub assignment: Option<Assignment>,
}

/// Search for a valid fill for the given grid.
pub fn find_fill(config: &GridConfig, options: &SolverOptions) -> FillResult {
    let start = Instant::now();
    let mut statistics = Statistics::default();
    let mut domains = Domains::new(config);

    statistics.node_consistency_removals = enforce_node_consistency(config, &mut domains);

    debug_assert!(config.slot_configs.iter().all(|slot_config| {
        domains
            .options(slot_config.id)
            .all(|word_id| config.words[word_id].len() == slot_config.length())
    }));

    let empty_slot = (0..config.slot_count()).find(|&slot_id| domains.is_empty(slot_id));

    let assignment = if let Some(slot_id) = empty_slot {
        debug!("No word in the dictionary fits slot {:?}", config.slot(slot_id));
        None
    } else {
        match establish_arc_consistency(config, &mut domains, None) {
            Ok(success) => {
                statistics.arc_consistency_removals = success.eliminations;
                domains.commit();

                backtracking_search::backtrack(
                    config,
                    &mut domains,
                    options,
                    &mut statistics,
                    Assignment::new(config.slot_count()),
                )
            }
            Err(failure) => {
                debug!(
                    "Arc consistency left no options for slot {:?}",
                    config.slot(failure.empty_slot_id),
                );
                None
            }
        }
    };

    statistics.duration = start.elapsed();

    info!(
        "{} after {} states and {} backtracks in {:?}",
        if assignment.is_some() { "Found a fill" } else { "No fill exists" },
        statistics.states,
        statistics.backtracks,
        statistics.duration,
    );

    FillResult { statistics, assignment }
}

/// Fill the grid with default options, returning `None` if that can't be done.
pub fn solve(config: &GridConfig) -> Option<Assignment> {
    find_fill(config, &SolverOptions::default()).assignment
}
