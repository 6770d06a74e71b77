//! Recursive backtracking over partial assignments.
//!
//! At each node we pick the unassigned slot with the fewest remaining words (ties going to the
//! slot with the most crossings), try its words in least-constraining-first order, and recurse on
//! every tentative assignment that passes a full pairwise consistency check. More than one fill
//! can be valid for a grid; which one comes back depends only on dictionary order and the
//! tie-breaks above.

use std::cmp::Reverse;

use log::trace;

use crate::arc_consistency::{establish_arc_consistency, Arc};
use crate::domains::{Domains, GlyphCounts};
use crate::grid_config::{GridConfig, SlotId, WordId};
use crate::{SolverOptions, Statistics};

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial or complete mapping from slots to words. Choices are kept in the order they were
/// made, so the most recent one is always the one to undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: Vec<Choice>,
    word_ids_by_slot: Vec<Option<WordId>>,
}

impl Assignment {
    /// An assignment with nothing filled in yet.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            choices: Vec::with_capacity(slot_count),
            word_ids_by_slot: vec![None; slot_count],
        }
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids_by_slot.get(slot_id).copied().flatten()
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.get(slot_id).is_some()
    }

    /// The word chosen for a slot, if any.
    pub fn word<'a>(&self, config: &'a GridConfig, slot_id: SlotId) -> Option<&'a str> {
        self.get(slot_id).map(|word_id| config.words[word_id].string.as_str())
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Does every slot have a word?
    pub fn is_complete(&self) -> bool {
        self.word_ids_by_slot.iter().all(Option::is_some)
    }

    pub fn push(&mut self, choice: Choice) {
        debug_assert!(!self.is_assigned(choice.slot_id), "slot {} assigned twice", choice.slot_id);
        self.word_ids_by_slot[choice.slot_id] = Some(choice.word_id);
        self.choices.push(choice);
    }

    pub fn pop(&mut self) -> Option<Choice> {
        let choice = self.choices.pop()?;
        self.word_ids_by_slot[choice.slot_id] = None;
        Some(choice)
    }
}

/// Check an assignment in full: every word is used at most once, every word fits its slot, and
/// every pair of crossing slots agrees on the letter they share.
pub fn is_consistent(config: &GridConfig, assignment: &Assignment) -> bool {
    let choices = assignment.choices();

    for (idx, choice) in choices.iter().enumerate() {
        let word = &config.words[choice.word_id];

        if word.len() != config.slot_configs[choice.slot_id].length() {
            return false;
        }

        for other_choice in &choices[idx + 1..] {
            // Words are deduplicated when the config is built, so equal ids mean equal strings.
            if other_choice.word_id == choice.word_id {
                return false;
            }

            let overlap = config.overlap(choice.slot_id, other_choice.slot_id);
            if let Some((cell_idx, other_cell_idx)) = overlap {
                let other_word = &config.words[other_choice.word_id];

                if word.glyphs.get(cell_idx) != other_word.glyphs.get(other_cell_idx) {
                    return false;
                }
            }
        }
    }

    true
}

/// Choose the unassigned slot with the fewest remaining options, breaking ties by the number of
/// crossing slots (more is better), and then by slot id.
pub fn select_unassigned_slot(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..config.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(config.degree(slot_id))))
}

/// Return the words in a slot's domain ordered by how many words they would rule out for the
/// unassigned slots crossing it, fewest first. Words that rule out the same number keep their
/// dictionary order.
pub fn order_domain_values(
    config: &GridConfig,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    // For each crossing into an unassigned slot: our cell, that slot's domain size, and how many
    // of its words put each glyph in the shared cell.
    let crossing_counts: Vec<(usize, u32, GlyphCounts)> = config.slot_configs[slot_id]
        .crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.as_ref()?;
            if assignment.is_assigned(crossing.other_slot_id) {
                return None;
            }

            let glyph_counts = domains.glyph_counts_at_cell(
                config,
                crossing.other_slot_id,
                crossing.other_slot_cell,
            );

            Some((cell_idx, domains.len(crossing.other_slot_id) as u32, glyph_counts))
        })
        .collect();

    let mut options: Vec<WordId> = domains.options(slot_id).collect();

    options.sort_by_cached_key(|&word_id| {
        let word = &config.words[word_id];

        crossing_counts.iter().map(|(cell_idx, option_count, glyph_counts)| {
            let compatible = word.glyphs.get(*cell_idx).map_or(0, |&glyph| glyph_counts[glyph]);
            option_count - compatible
        }).sum::<u32>()
    });

    options
}

/// The state threaded through the recursive search.
struct Search<'a> {
    config: &'a GridConfig,
    domains: &'a mut Domains,
    inference: bool,
    statistics: &'a mut Statistics,
}

impl Search<'_> {
    /// Extend `assignment` to a complete consistent assignment, returning whether we managed to.
    /// On failure the assignment is left exactly as it was passed in.
    fn backtrack(&mut self, assignment: &mut Assignment) -> bool {
        self.statistics.states += 1;

        if assignment.is_complete() {
            return true;
        }

        let Some(slot_id) = select_unassigned_slot(self.config, self.domains, assignment) else {
            return false;
        };

        for word_id in order_domain_values(self.config, self.domains, assignment, slot_id) {
            if self.try_choice(assignment, Choice { slot_id, word_id }) {
                return true;
            }
        }

        false
    }

    /// Tentatively make `choice` and search below it. The choice (and any domain pruning done on
    /// its behalf) is only kept if that search succeeds.
    fn try_choice(&mut self, assignment: &mut Assignment, choice: Choice) -> bool {
        let checkpoint = self.domains.checkpoint();
        assignment.push(choice);

        trace!(
            "Trying {:?} for slot {} at depth {}",
            self.config.words[choice.word_id].string,
            choice.slot_id,
            assignment.len(),
        );

        let found = is_consistent(self.config, assignment)
            && self.propagate_choice(assignment, choice)
            && self.backtrack(assignment);

        if !found {
            assignment.pop();
            self.domains.restore(checkpoint);
            self.statistics.backtracks += 1;
        }

        found
    }

    /// When inference is enabled, shrink the chosen slot's domain to the chosen word and restore
    /// arc consistency for the unassigned slots crossing it. Returns false if that empties a
    /// domain.
    fn propagate_choice(&mut self, assignment: &Assignment, choice: Choice) -> bool {
        if !self.inference {
            return true;
        }

        self.domains.restrict_to(choice.slot_id, choice.word_id);

        let arcs: Vec<Arc> = self.config
            .neighbors(choice.slot_id)
            .iter()
            .filter(|&other_slot_id| !assignment.is_assigned(other_slot_id))
            .map(|other_slot_id| Arc { x: other_slot_id, y: choice.slot_id })
            .collect();

        establish_arc_consistency(self.config, self.domains, Some(arcs)).is_ok()
    }
}

/// Search for a complete, consistent extension of `assignment`, returning `None` if there isn't
/// one. Domains are left as they were on entry unless a fill is found with inference enabled.
pub fn backtrack(
    config: &GridConfig,
    domains: &mut Domains,
    options: &SolverOptions,
    statistics: &mut Statistics,
    mut assignment: Assignment,
) -> Option<Assignment> {
    let mut search = Search { config, domains, inference: options.inference, statistics };

    if search.backtrack(&mut assignment) {
        Some(assignment)
    } else {
        None
    }
}
