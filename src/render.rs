use crate::backtracking_search::Assignment;
use crate::grid_config::GridConfig;

/// Character drawn for blocked cells.
pub const BLOCK: char = '█';

/// Lay the assigned words onto a height x width matrix of letters. Cells that no assigned word
/// covers are `None`.
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for choice in assignment.choices() {
        let slot = config.slot(choice.slot_id);
        let word = config.word(choice.word_id);

        for ((x, y), &glyph) in slot.cell_coords().into_iter().zip(&word.glyphs) {
            letters[y][x] = Some(config.glyphs[glyph]);
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, with blocked cells drawn as
/// `BLOCK` and open cells that haven't been filled left blank.
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    let letters = letter_grid(config, assignment);

    letters.iter().enumerate().map(|(y, row)| {
        row.iter().enumerate().map(|(x, letter)| {
            if config.is_open((x, y)) {
                letter.unwrap_or(' ')
            } else {
                BLOCK
            }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}

/// Render a fill if there is one, or say that there isn't.
pub fn render_fill(config: &GridConfig, assignment: Option<&Assignment>) -> String {
    match assignment {
        Some(assignment) => render_grid(config, assignment),
        None => "No solution.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::{Assignment, Choice};
    use crate::render::{letter_grid, render_fill, render_grid};
    use crate::template::generate_grid_config_from_template_string;

    #[test]
    fn test_render_grid() {
        let words: Vec<String> = ["CAT", "ATE"].iter().map(|w| w.to_string()).collect();
        let config = generate_grid_config_from_template_string(
            &words,
            "
            ___
            #_#
            #_#
            ",
        ).unwrap();

        let mut assignment = Assignment::new(config.slot_count());
        assignment.push(Choice { slot_id: 0, word_id: 0 });
        assert_eq!(render_grid(&config, &assignment), "CAT\n█ █\n█ █");

        assignment.push(Choice { slot_id: 1, word_id: 1 });
        assert_eq!(render_grid(&config, &assignment), "CAT\n█T█\n█E█");
        assert_eq!(letter_grid(&config, &assignment)[2], vec![None, Some('E'), None]);
    }

    #[test]
    fn test_render_fill_without_assignment() {
        let words: Vec<String> = vec!["CAT".to_string()];
        let config = generate_grid_config_from_template_string(&words, "___").unwrap();

        assert_eq!(render_fill(&config, None), "No solution.");
    }
}
