//! Unary (length) and binary (crossing) constraint propagation.
//!
//! A puzzle is arc-consistent when every word left in a slot's domain has, for each crossing
//! slot, at least one word left in that slot's domain with the same letter in the shared cell.
//! `establish_arc_consistency` is AC-3: a queue of `(x, y)` arcs, each revised in turn, with the
//! arcs pointing at `x` re-enqueued whenever `x` loses a word.

use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use log::trace;

use crate::domains::Domains;
use crate::grid_config::{GridConfig, SlotId, WordId};

/// Remove every word whose length differs from its slot's length. Returns the number of words
/// removed across all slots.
pub fn enforce_node_consistency(config: &GridConfig, domains: &mut Domains) -> usize {
    let mut removed = 0;

    for slot_config in &config.slot_configs {
        let wrong_length: Vec<WordId> = domains
            .options(slot_config.id)
            .filter(|&word_id| config.words[word_id].len() != slot_config.length())
            .collect();

        for word_id in wrong_length {
            domains.remove(slot_config.id, word_id);
            removed += 1;
        }
    }

    removed
}

/// A directed constraint: `x` needs support from `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arc {
    pub x: SlotId,
    pub y: SlotId,
}

/// Every arc in the puzzle, in both directions for each pair of crossing slots.
pub fn all_arcs(config: &GridConfig) -> Vec<Arc> {
    config.slot_configs.iter().flat_map(|slot_config| {
        slot_config.neighbors.iter().map(move |y| Arc { x: slot_config.id, y })
    }).collect()
}

/// The set of glyphs appearing in the given cell of any word left in a slot's domain.
fn glyphs_in_cell(
    config: &GridConfig,
    domains: &Domains,
    slot_id: SlotId,
    cell_idx: usize,
) -> BitSet {
    let mut result = BitSet::with_capacity(config.glyphs.len());

    for word_id in domains.options(slot_id) {
        if let Some(&glyph) = config.words[word_id].glyphs.get(cell_idx) {
            result.insert(glyph);
        }
    }

    result
}

/// Make `x` arc-consistent with `y` by removing every word from `x`'s domain that no word in
/// `y`'s domain agrees with at their shared cell. Returns whether anything was removed. Slots that
/// don't cross are trivially consistent.
pub fn revise(config: &GridConfig, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    let supported_glyphs = glyphs_in_cell(config, domains, y, y_cell);

    let unsupported: Vec<WordId> = domains
        .options(x)
        .filter(|&word_id| {
            config.words[word_id]
                .glyphs
                .get(x_cell)
                .map_or(true, |&glyph| !supported_glyphs.contains(glyph))
        })
        .collect();

    for &word_id in &unsupported {
        domains.remove(x, word_id);
    }

    !unsupported.is_empty()
}

/// Data structure used in `establish_arc_consistency` to track which arcs we still need to revise.
/// An arc that's already waiting isn't added a second time.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<Arc>,
    queued: HashSet<Arc>,
}

impl ArcQueue {
    fn with_initial_queue<Items>(items: Items) -> ArcQueue
        where
            Items: IntoIterator<Item = Arc>
    {
        let mut queue = ArcQueue { queue: VecDeque::new(), queued: HashSet::new() };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<Arc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: Arc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Results from a call to `establish_arc_consistency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many words were removed, across all slots.
    pub eliminations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    /// The slot whose domain was emptied.
    pub empty_slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Run AC-3 until no arc can remove anything else, starting from `arcs` or, if that's `None`,
/// from every arc in the puzzle. Fails as soon as any slot's domain becomes empty; words removed
/// before that point stay removed; callers that want to back out should restore a checkpoint.
pub fn establish_arc_consistency(
    config: &GridConfig,
    domains: &mut Domains,
    arcs: Option<Vec<Arc>>,
) -> ArcConsistencyResult {
    let mut queue = ArcQueue::with_initial_queue(arcs.unwrap_or_else(|| all_arcs(config)));
    let mut eliminations = 0;

    while let Some(Arc { x, y }) = queue.pop_front() {
        let before = domains.len(x);
        if !revise(config, domains, x, y) {
            continue;
        }
        eliminations += before - domains.len(x);

        if domains.is_empty(x) {
            trace!("Arc consistency emptied slot {} while revising against {}", x, y);
            return Err(ArcConsistencyFailure { empty_slot_id: x });
        }

        // `x` lost words, so anything that was relying on it for support needs another look.
        for z in config.neighbors(x).iter().filter(|&z| z != y) {
            queue.enqueue(Arc { x: z, y: x });
        }
    }

    Ok(ArcConsistencySuccess { eliminations })
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{
        all_arcs, enforce_node_consistency, establish_arc_consistency, revise, Arc,
    };
    use crate::domains::Domains;
    use crate::grid_config::GridConfig;
    use crate::template::generate_grid_config_from_template_string;

    fn config(word_list: &[&str], template: &str) -> GridConfig {
        let words: Vec<String> = word_list.iter().map(|w| w.to_string()).collect();
        generate_grid_config_from_template_string(&words, template).unwrap()
    }

    fn assert_fixpoint(config: &GridConfig, domains: &Domains) {
        for arc in all_arcs(config) {
            let mut copy = domains.clone();
            assert!(!revise(config, &mut copy, arc.x, arc.y), "{:?} still revises", arc);
        }
    }

    /// ___
    /// #_#
    /// #_#
    const CORNER: &str = "
        ___
        #_#
        #_#
    ";

    /// #___#
    /// #_##_
    /// #_##_
    /// #_##_
    /// #____
    const HOOK: &str = "
        #___#
        #_##_
        #_##_
        #_##_
        #____
    ";

    #[test]
    fn test_node_consistency_keeps_only_matching_lengths() {
        let config = config(&["AT", "CAT", "DOGS", "ATE", "HORSE"], HOOK);
        let mut domains = Domains::new(&config);

        let removed = enforce_node_consistency(&config, &mut domains);

        for slot_config in &config.slot_configs {
            for word in domains.words(&config, slot_config.id) {
                assert_eq!(word.chars().count(), slot_config.length());
            }
        }
        assert_eq!(domains.words(&config, 0), vec!["CAT", "ATE"]);
        assert_eq!(domains.words(&config, 1), vec!["DOGS"]);
        assert_eq!(domains.words(&config, 2), vec!["HORSE"]);
        assert_eq!(removed, 3 + 4 + 4 + 4);
    }

    #[test]
    fn test_node_consistency_is_idempotent() {
        let config = config(&["AT", "CAT", "DOGS", "ATE", "HORSE"], HOOK);
        let mut domains = Domains::new(&config);

        enforce_node_consistency(&config, &mut domains);
        let once: Vec<Vec<&str>> =
            (0..config.slot_count()).map(|slot_id| domains.words(&config, slot_id)).collect();

        assert_eq!(enforce_node_consistency(&config, &mut domains), 0);
        let twice: Vec<Vec<&str>> =
            (0..config.slot_count()).map(|slot_id| domains.words(&config, slot_id)).collect();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_node_consistency_can_empty_a_domain() {
        let config = config(&["CAT", "DOG"], HOOK);
        let mut domains = Domains::new(&config);

        enforce_node_consistency(&config, &mut domains);

        assert!(domains.is_empty(1));
        assert!(domains.is_empty(2));
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let config = config(&["CAT", "DOG", "ATE", "TEA"], CORNER);
        let mut domains = Domains::new(&config);
        enforce_node_consistency(&config, &mut domains);

        // The across entry's middle letter has to start the down entry.
        assert!(revise(&config, &mut domains, 0, 1));
        assert_eq!(domains.words(&config, 0), vec!["CAT", "ATE"]);
        assert!(!revise(&config, &mut domains, 0, 1));

        assert!(revise(&config, &mut domains, 1, 0));
        assert_eq!(domains.words(&config, 1), vec!["ATE", "TEA"]);
    }

    #[test]
    fn test_revise_without_overlap_is_a_no_op() {
        let config = config(&["CAT", "DOG", "HORSE", "DOGS"], HOOK);
        let mut domains = Domains::new(&config);
        enforce_node_consistency(&config, &mut domains);

        assert!(!revise(&config, &mut domains, 0, 3));
        assert!(!revise(&config, &mut domains, 0, 0));
        assert_eq!(domains.len(0), 2);
    }

    #[test]
    fn test_arc_consistency_reaches_a_fixpoint() {
        let config = config(
            &[
                "CAT", "DOG", "ATE", "TEA", "EAT", "OAT", "TOTE", "GATE", "ODES", "GOATS", "COAST",
                "OCEAN",
            ],
            HOOK,
        );
        let mut domains = Domains::new(&config);
        enforce_node_consistency(&config, &mut domains);

        let result = establish_arc_consistency(&config, &mut domains, None);

        assert!(result.is_ok(), "{:?}", result);
        assert_fixpoint(&config, &domains);
        for slot_id in 0..config.slot_count() {
            assert!(!domains.is_empty(slot_id));
        }
    }

    #[test]
    fn test_arc_consistency_counts_eliminations() {
        let config = config(&["CAT", "DOG", "ATE", "TEA"], CORNER);
        let mut domains = Domains::new(&config);
        enforce_node_consistency(&config, &mut domains);

        let success = establish_arc_consistency(&config, &mut domains, None).unwrap();

        // Across keeps CAT and ATE (middles A and T), down keeps ATE and TEA (starts A and T).
        assert_eq!(success.eliminations, 4);
        assert_eq!(domains.words(&config, 0), vec!["CAT", "ATE"]);
        assert_eq!(domains.words(&config, 1), vec!["ATE", "TEA"]);
        assert_fixpoint(&config, &domains);
    }

    #[test]
    fn test_arc_consistency_detects_wipeout() {
        let config = config(&["CAT", "DOG"], CORNER);
        let mut domains = Domains::new(&config);
        enforce_node_consistency(&config, &mut domains);

        let failure = establish_arc_consistency(&config, &mut domains, None).unwrap_err();

        assert!(failure.empty_slot_id < config.slot_count());
        assert!(domains.is_empty(failure.empty_slot_id));
    }

    #[test]
    fn test_arc_consistency_from_caller_supplied_arcs() {
        let config = config(&["CAT", "DOG", "ATE", "TEA"], CORNER);
        let mut domains = Domains::new(&config);
        enforce_node_consistency(&config, &mut domains);
        domains.restrict_to(0, 0);

        let arcs = vec![Arc { x: 1, y: 0 }];
        let result = establish_arc_consistency(&config, &mut domains, Some(arcs));

        assert!(result.is_ok());
        assert_eq!(domains.words(&config, 1), vec!["ATE"]);
    }

    #[test]
    fn test_all_arcs_go_both_ways() {
        let config = config(&["CAT"], HOOK);
        let arcs = all_arcs(&config);

        assert_eq!(arcs.len(), 6);
        for arc in &arcs {
            assert!(arcs.contains(&Arc { x: arc.y, y: arc.x }));
        }
    }
}
