//! The static description of a puzzle: which cells are open, which slots they form, which words
//! the dictionary offers, and where slots cross each other. Nothing in here changes once
//! `generate_grid_config` has returned.

use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Formatter};

use bit_set::BitSet;
use log::info;
use smallvec::SmallVec;

use crate::error::{CrosswordError, CrosswordResult};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter or whatever, based on its index in the GridConfig's `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given slot, based on its index in the GridConfig's `slot_configs` field.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the GridConfig's `words` field.
pub type WordId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row. In other words
/// the first coordinate is the column and the second is the row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A maximal run of open cells that needs one word. Two slots are the same slot iff they start in
/// the same cell, face the same way and have the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length).map(|cell_idx| {
            match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            }
        }).collect()
    }
}

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
pub struct SlotConfig {
    pub id: SlotId,
    pub slot: Slot,

    /// One entry per cell of the slot, `Some` where another slot passes through that cell.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,

    /// Every slot sharing at least one cell with this one.
    pub neighbors: BitSet,
}

impl SlotConfig {
    pub fn length(&self) -> usize {
        self.slot.length
    }
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.slot.start_cell)
            .field("direction", &self.slot.direction)
            .field("length", &self.slot.length)
            .field("crossings", &self.crossings)
            .finish()
    }
}

/// A struct representing the aspects of a puzzle that are static during filling.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// Row-major flags, `true` for cells that take a letter.
    pub open_cells: Vec<Vec<bool>>,

    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
    pub slot_configs: Vec<SlotConfig>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("glyphs", &self.glyphs)
            .field("slot_configs", &self.slot_configs)
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

impl GridConfig {
    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slot_configs[slot_id].slot
    }

    /// Iterate over every slot in id order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slot_configs.iter().map(|slot_config| &slot_config.slot)
    }

    pub fn find_slot(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_configs.iter().position(|slot_config| slot_config.slot == *slot)
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn is_open(&self, loc: GridCoord) -> bool {
        self.open_cells.get(loc.1).and_then(|row| row.get(loc.0)).copied().unwrap_or(false)
    }

    /// If `slot_a` and `slot_b` share a cell, return the index of that cell within each of them.
    pub fn overlap(&self, slot_a: SlotId, slot_b: SlotId) -> Option<(usize, usize)> {
        if slot_a == slot_b {
            return None;
        }

        self.slot_configs[slot_a].crossings.iter().enumerate().find_map(|(cell_idx, crossing)| {
            match crossing {
                Some(crossing) if crossing.other_slot_id == slot_b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            }
        })
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &BitSet {
        &self.slot_configs[slot_id].neighbors
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.slot_configs[slot_id].neighbors.len()
    }
}

/// Find every maximal run of at least two open cells in a line of the grid, returning the index
/// of its first cell and its length.
fn find_runs<I: IntoIterator<Item = bool>>(cells: I) -> Vec<(usize, usize)> {
    let mut result = vec![];
    let mut run_start: Option<usize> = None;
    let mut line_length = 0;

    for (idx, open) in cells.into_iter().enumerate() {
        match (open, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                if idx - start > 1 {
                    result.push((start, idx - start));
                }
                run_start = None;
            }
            _ => {}
        }
        line_length = idx + 1;
    }

    if let Some(start) = run_start {
        if line_length - start > 1 {
            result.push((start, line_length - start));
        }
    }

    result
}

/// Generate a GridConfig from a rectangular grid of open (`true`) and blocked (`false`) cells and
/// a dictionary of candidate words. Fails only if there are no rows or the rows don't all have
/// the same length.
pub fn generate_grid_config(
    word_list: &[String],
    open_cells: &[Vec<bool>],
) -> CrosswordResult<GridConfig> {
    let height = open_cells.len();
    let width = open_cells.first().map(|row| row.len()).ok_or(CrosswordError::EmptyGrid)?;

    let ragged = open_cells.iter().enumerate().find(|(_, cells)| cells.len() != width);
    if let Some((row, cells)) = ragged {
        return Err(CrosswordError::RaggedRow { row, expected: width, found: cells.len() });
    }

    // Record every distinct character in the order we first see it, and each distinct word once.
    let mut glyphs: SmallVec<[char; MAX_GLYPH_COUNT]> = SmallVec::new();
    let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();
    let mut seen_words: HashSet<&str> = HashSet::with_capacity(word_list.len());
    let mut words: Vec<Word> = Vec::with_capacity(word_list.len());

    for word in word_list {
        if word.is_empty() || !seen_words.insert(word.as_str()) {
            continue;
        }

        let word_glyphs = word.chars().map(|c| {
            *glyph_ids_by_char.entry(c).or_insert_with(|| {
                glyphs.push(c);
                glyphs.len() - 1
            })
        }).collect();

        words.push(Word { string: word.clone(), glyphs: word_glyphs });
    }

    // Across slots come from scanning each row, down slots from scanning each column.
    let mut slots: Vec<Slot> = vec![];
    for (y, row) in open_cells.iter().enumerate() {
        for (x, length) in find_runs(row.iter().copied()) {
            slots.push(Slot { start_cell: (x, y), direction: Direction::Across, length });
        }
    }
    for x in 0..width {
        for (y, length) in find_runs(open_cells.iter().map(|row| row[x])) {
            slots.push(Slot { start_cell: (x, y), direction: Direction::Down, length });
        }
    }

    // Build a map from cell location to the slots passing through it, which we can then use to
    // calculate crossings.
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
    for (slot_id, slot) in slots.iter().enumerate() {
        for (cell_idx, loc) in slot.cell_coords().into_iter().enumerate() {
            entries_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
        }
    }

    let slot_count = slots.len();
    let slot_configs: Vec<SlotConfig> = slots.into_iter().enumerate().map(|(slot_id, slot)| {
        let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> =
            slot.cell_coords().iter().map(|loc| {
                entries_by_loc[loc]
                    .iter()
                    .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                    .map(|&(other_slot_id, other_slot_cell)| Crossing {
                        other_slot_id,
                        other_slot_cell,
                    })
            }).collect();

        let mut neighbors = BitSet::with_capacity(slot_count);
        for crossing in crossings.iter().flatten() {
            neighbors.insert(crossing.other_slot_id);
        }

        SlotConfig { id: slot_id, slot, crossings, neighbors }
    }).collect();

    info!(
        "Built a {}x{} grid with {} slots and {} distinct words",
        width,
        height,
        slot_configs.len(),
        words.len(),
    );

    Ok(GridConfig {
        width,
        height,
        open_cells: open_cells.to_vec(),
        glyphs,
        words,
        slot_configs,
    })
}

#[cfg(test)]
mod tests {
    use crate::error::CrosswordError;
    use crate::grid_config::{generate_grid_config, Direction, Slot};
    use crate::template::parse_structure;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|word| word.to_string()).collect()
    }

    /// #___#
    /// #_##_
    /// #_##_
    /// #_##_
    /// #____
    fn structure() -> Vec<Vec<bool>> {
        parse_structure(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        ).unwrap()
    }

    #[test]
    fn test_slots_are_maximal_runs_of_two_or_more() {
        let config = generate_grid_config(&words(&["CAT"]), &structure()).unwrap();

        let slots: Vec<Slot> = config.slots().copied().collect();
        assert_eq!(slots, vec![
            Slot { start_cell: (1, 0), direction: Direction::Across, length: 3 },
            Slot { start_cell: (1, 4), direction: Direction::Across, length: 4 },
            Slot { start_cell: (1, 0), direction: Direction::Down, length: 5 },
            Slot { start_cell: (4, 1), direction: Direction::Down, length: 4 },
        ]);
    }

    #[test]
    fn test_overlaps_are_symmetric_and_local() {
        let config = generate_grid_config(&words(&["CAT"]), &structure()).unwrap();

        assert_eq!(config.overlap(0, 2), Some((0, 0)));
        assert_eq!(config.overlap(2, 0), Some((0, 0)));
        assert_eq!(config.overlap(1, 2), Some((0, 4)));
        assert_eq!(config.overlap(2, 1), Some((4, 0)));
        assert_eq!(config.overlap(1, 3), Some((3, 3)));
        assert_eq!(config.overlap(0, 1), None);
        assert_eq!(config.overlap(0, 3), None);
        assert_eq!(config.overlap(2, 2), None);
    }

    #[test]
    fn test_neighbors_and_degree() {
        let config = generate_grid_config(&words(&["CAT"]), &structure()).unwrap();

        assert_eq!(config.neighbors(2).iter().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(config.neighbors(1).iter().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(config.degree(0), 1);
        assert_eq!(config.degree(3), 1);
    }

    #[test]
    fn test_find_slot() {
        let config = generate_grid_config(&words(&["CAT"]), &structure()).unwrap();

        let down = Slot { start_cell: (4, 1), direction: Direction::Down, length: 4 };
        assert_eq!(config.find_slot(&down), Some(3));

        let missing = Slot { start_cell: (4, 1), direction: Direction::Across, length: 4 };
        assert_eq!(config.find_slot(&missing), None);
    }

    #[test]
    fn test_dictionary_is_deduplicated() {
        let config =
            generate_grid_config(&words(&["CAT", "DOG", "CAT", ""]), &structure()).unwrap();

        assert_eq!(config.words.len(), 2);
        assert_eq!(config.words[1].string, "DOG");
        assert_eq!(config.words[0].glyphs.as_slice(), &[0, 1, 2]);
        assert_eq!(config.glyphs.as_slice(), &['C', 'A', 'T', 'D', 'O', 'G']);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let result = generate_grid_config(
            &words(&["CAT"]),
            &[vec![true, true, true], vec![true, true]],
        );

        match result {
            Err(CrosswordError::RaggedRow { row, expected, found }) => {
                assert_eq!((row, expected, found), (1, 3, 2));
            }
            other => panic!("Expected a ragged row error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        assert!(matches!(
            generate_grid_config(&words(&["CAT"]), &[]),
            Err(CrosswordError::EmptyGrid)
        ));
    }

    #[test]
    fn test_single_open_cells_form_no_slots() {
        let config = generate_grid_config(
            &words(&["CAT"]),
            &[vec![true, false, true], vec![false, false, false]],
        ).unwrap();

        assert_eq!(config.slot_count(), 0);
    }
}
