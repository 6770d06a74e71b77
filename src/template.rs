//! Turning stored text into the inputs of `generate_grid_config`.

use crate::error::{CrosswordError, CrosswordResult};
use crate::grid_config::{generate_grid_config, GridConfig};

/// Parse a structure template, with `_` or `.` representing open cells and `#` or `█`
/// representing blocks. Surrounding whitespace is trimmed from each line and blank lines before
/// the first row or after the last are skipped, so templates can be written as indented string
/// literals. A blank line between rows is kept as an empty row, which `generate_grid_config`
/// rejects as ragged.
pub fn parse_structure(template: &str) -> CrosswordResult<Vec<Vec<bool>>> {
    let lines: Vec<&str> = template.lines().map(str::trim).collect();

    let (Some(first), Some(last)) = (
        lines.iter().position(|line| !line.is_empty()),
        lines.iter().rposition(|line| !line.is_empty()),
    ) else {
        return Err(CrosswordError::EmptyGrid);
    };

    lines[first..=last]
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.chars().enumerate().map(|(col, cell)| match cell {
                '_' | '.' => Ok(true),
                '#' | '█' => Ok(false),
                _ => Err(CrosswordError::InvalidCell { row, col, cell }),
            }).collect::<CrosswordResult<Vec<bool>>>()
        })
        .collect()
}

/// Parse a word list with one word per line. Anything after a `,` or `;` (such as a score column)
/// is ignored, and words are upper-cased so that they match however the list was written.
pub fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let word = line.split([',', ';']).next().unwrap_or("").trim();
            if word.is_empty() {
                None
            } else {
                Some(word.to_uppercase())
            }
        })
        .collect()
}

/// Generate a grid config from a structure template (see `parse_structure`).
pub fn generate_grid_config_from_template_string(
    word_list: &[String],
    template: &str,
) -> CrosswordResult<GridConfig> {
    generate_grid_config(word_list, &parse_structure(template)?)
}
