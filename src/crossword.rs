//! A puzzle model read from a plain-text grid structure, where `_` or `.` is an open cell and `#`,
//! `█` or a space is a block. Every horizontal or vertical run of two or more open cells is a
//! variable.

use std::collections::HashMap;

use crate::grid_config::{
    generate_grid_config, Direction, GridCoord, OwnedGridConfig, PuzzleError, PuzzleModel,
    Variable,
};
use crate::word_list::WordList;

/// The structure of a crossword grid, along with the variables and overlaps derived from it.
#[derive(Debug, Clone)]
pub struct Crossword {
    pub width: usize,
    pub height: usize,

    /// `structure[row][col]` is true for open cells.
    pub structure: Vec<Vec<bool>>,

    /// Variables in grid-position order (row-major, across before down).
    pub variables: Vec<Variable>,

    /// The shared cell offsets for every ordered pair of crossing variables.
    pub overlaps: HashMap<(Variable, Variable), (usize, usize)>,
}

impl Crossword {
    /// Parse a structure string. Every character stays in its own column; trailing whitespace is
    /// dropped and rows shorter than the widest row are padded with blocks. Blank lines before and
    /// after the grid are ignored, but a blank line inside it is a row of blocks.
    pub fn from_template(template: &str) -> Result<Crossword, PuzzleError> {
        let mut lines: Vec<Vec<char>> = template
            .lines()
            .map(|line| line.trim_end().chars().collect())
            .collect();

        while lines.last().is_some_and(Vec::is_empty) {
            lines.pop();
        }
        let first_row = lines
            .iter()
            .position(|line| !line.is_empty())
            .unwrap_or(lines.len());
        lines.drain(..first_row);

        if lines.is_empty() {
            return Err(PuzzleError::EmptyGrid);
        }

        let height = lines.len();
        let width = lines.iter().map(Vec::len).max().unwrap_or(0);

        let structure = lines
            .iter()
            .enumerate()
            .map(|(row, line)| {
                (0..width)
                    .map(|col| match line.get(col) {
                        Some('_' | '.') => Ok(true),
                        Some('#' | '█' | ' ') | None => Ok(false),
                        Some(&ch) => Err(PuzzleError::InvalidCell { ch, row, col }),
                    })
                    .collect::<Result<Vec<bool>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let is_open = |row: usize, col: usize| -> bool {
            row < height && col < width && structure[row][col]
        };

        let mut variables: Vec<Variable> = vec![];
        for row in 0..height {
            for col in 0..width {
                if !structure[row][col] {
                    continue;
                }

                if col == 0 || !structure[row][col - 1] {
                    let length = (col..width).take_while(|&c| is_open(row, c)).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Across, length));
                    }
                }

                if row == 0 || !structure[row - 1][col] {
                    let length = (row..height).take_while(|&r| is_open(r, col)).count();
                    if length > 1 {
                        variables.push(Variable::new(row, col, Direction::Down, length));
                    }
                }
            }
        }

        // Build a map from cell location to the variables covering it, which we can then use to
        // calculate overlaps. In a 2D grid a cell is covered by at most one across and one down
        // variable.
        let mut entries_by_cell: HashMap<GridCoord, Vec<(Variable, usize)>> = HashMap::new();
        for &variable in &variables {
            for (cell_idx, loc) in variable.cell_coords().into_iter().enumerate() {
                entries_by_cell
                    .entry(loc)
                    .or_default()
                    .push((variable, cell_idx));
            }
        }

        let mut overlaps = HashMap::new();
        for entries in entries_by_cell.values() {
            if let [(a, a_cell), (b, b_cell)] = entries.as_slice() {
                overlaps.insert((*a, *b), (*a_cell, *b_cell));
                overlaps.insert((*b, *a), (*b_cell, *a_cell));
            }
        }

        Ok(Crossword {
            width,
            height,
            structure,
            variables,
            overlaps,
        })
    }
}

impl PuzzleModel for Crossword {
    fn variables(&self) -> Vec<Variable> {
        self.variables.clone()
    }

    fn overlap(&self, a: &Variable, b: &Variable) -> Option<(usize, usize)> {
        self.overlaps.get(&(*a, *b)).copied()
    }

    fn is_open_cell(&self, (row, col): GridCoord) -> bool {
        self.structure
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

/// Generate an `OwnedGridConfig` from a structure string; see `Crossword::from_template`.
pub fn generate_grid_config_from_template_string(
    word_list: WordList,
    template: &str,
) -> Result<OwnedGridConfig, PuzzleError> {
    generate_grid_config(word_list, &Crossword::from_template(template)?)
}
