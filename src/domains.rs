//! The live candidate sets for every slot.
//!
//! Each slot's domain is a `BitSet` over `WordId`s, so iterating a domain always visits words in
//! dictionary order. Every removal is pushed onto a trail; taking a `Checkpoint` before a
//! tentative change and calling `restore` afterwards puts back exactly the words removed in
//! between, without ever copying the whole store.

use bit_set::BitSet;
use smallvec::{smallvec, SmallVec};

use crate::grid_config::{GridConfig, SlotId, WordId};
use crate::MAX_GLYPH_COUNT;

/// For one cell of a slot, how many of the words in its domain place each glyph there, indexed
/// by `GlyphId`.
pub type GlyphCounts = SmallVec<[u32; MAX_GLYPH_COUNT]>;

/// A position in the removal trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug, Clone)]
pub struct Domains {
    options: Vec<BitSet>,

    /// `BitSet::len` walks the whole set, so we keep the counts alongside.
    option_counts: Vec<usize>,

    trail: Vec<(SlotId, WordId)>,
}

impl Domains {
    /// Give every slot a copy of the full dictionary.
    pub fn new(config: &GridConfig) -> Domains {
        let word_count = config.words.len();
        let all_words: BitSet = (0..word_count).collect();

        Domains {
            options: config.slot_configs.iter().map(|_| all_words.clone()).collect(),
            option_counts: vec![word_count; config.slot_count()],
            trail: vec![],
        }
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.option_counts[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.option_counts[slot_id] == 0
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].contains(word_id)
    }

    /// Iterate over the words still available for a slot, in dictionary order.
    pub fn options(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.options[slot_id].iter()
    }

    /// The strings still available for a slot, in dictionary order.
    pub fn words<'a>(&self, config: &'a GridConfig, slot_id: SlotId) -> Vec<&'a str> {
        self.options(slot_id).map(|word_id| config.words[word_id].string.as_str()).collect()
    }

    /// Remove a word from a slot's domain, returning whether it was there.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.options[slot_id].remove(word_id) {
            return false;
        }

        self.option_counts[slot_id] -= 1;
        self.trail.push((slot_id, word_id));
        true
    }

    /// Remove every word except `word_id` from a slot's domain, returning how many were removed.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) -> usize {
        let others: Vec<WordId> = self.options(slot_id).filter(|&other| other != word_id).collect();

        for &other in &others {
            self.remove(slot_id, other);
        }

        others.len()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.trail.len())
    }

    /// Put back every word removed since `checkpoint` was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        while self.trail.len() > checkpoint.0 {
            if let Some((slot_id, word_id)) = self.trail.pop() {
                self.options[slot_id].insert(word_id);
                self.option_counts[slot_id] += 1;
            }
        }
    }

    /// Forget the trail, making every removal so far permanent. Any outstanding checkpoints are
    /// invalidated.
    pub fn commit(&mut self) {
        self.trail.clear();
    }

    /// How many of the words in a slot's domain place each glyph in the given cell of the slot.
    pub fn glyph_counts_at_cell(
        &self,
        config: &GridConfig,
        slot_id: SlotId,
        cell_idx: usize,
    ) -> GlyphCounts {
        let mut counts: GlyphCounts = smallvec![0; config.glyphs.len()];

        for word_id in self.options(slot_id) {
            if let Some(&glyph) = config.words[word_id].glyphs.get(cell_idx) {
                counts[glyph] += 1;
            }
        }

        counts
    }
}
