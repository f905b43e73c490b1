//! This module implements code for configuring a crossword-filling operation, independent of the
//! specific fill algorithm: the variables of the puzzle, the crossings between them, and the word
//! list they're filled from.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::assignment::Assignment;
use crate::types::VariableId;
use crate::word_list::WordList;

/// Zero-indexed row and column coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// The direction that a variable is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// A contiguous run of cells in one direction that needs a word. Two variables are the same only
/// if they start in the same cell, face the same way, and have the same length. The derived
/// ordering (by start cell, then direction, then length) is the grid-position order we use to
/// break ties deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Variable {
    #[must_use]
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Variable {
        Variable {
            start_cell: (row, col),
            direction,
            length,
        }
    }

    /// Parse a string like "1,2,down,5" into a `Variable`.
    pub fn from_key(key: &str) -> Result<Variable, String> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(format!("invalid variable key: {key}"));
        }

        let row: Result<usize, _> = key_parts[0].parse();
        let col: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(row), Ok(col), Some(direction), Ok(length)) = (row, col, direction, length) {
            Ok(Variable::new(row, col, direction, length))
        } else {
            Err(format!("invalid variable key: {key:?}"))
        }
    }

    /// Represent this variable as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!(
            "{},{},{},{}",
            self.start_cell.0, self.start_cell.1, direction, self.length,
        )
    }

    /// Generate the coords for each cell of this variable.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0, self.start_cell.1 + cell_idx),
                Direction::Down => (self.start_cell.0 + cell_idx, self.start_cell.1),
            })
            .collect()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

/// Serialize a `Variable` into a string key.
#[cfg(feature = "serde")]
impl Serialize for Variable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `Variable` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        Variable::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

/// The source of a puzzle's structure: its variables and the overlaps between them. Overlaps must
/// be symmetric, so if `overlap(a, b)` is `Some((i, j))` then `overlap(b, a)` is `Some((j, i))`.
pub trait PuzzleModel {
    /// All of the variables in the puzzle.
    fn variables(&self) -> Vec<Variable>;

    /// If `a` and `b` share a cell, the index of that cell within `a` and within `b`.
    fn overlap(&self, a: &Variable, b: &Variable) -> Option<(usize, usize)>;

    /// The variables that share a cell with `variable`.
    fn neighbors(&self, variable: &Variable) -> Vec<Variable> {
        self.variables()
            .into_iter()
            .filter(|other| other != variable && self.overlap(variable, other).is_some())
            .collect()
    }

    /// Is the given cell open (as opposed to a block)? By default a cell is open exactly when some
    /// variable covers it.
    fn is_open_cell(&self, cell: GridCoord) -> bool {
        self.variables()
            .iter()
            .any(|variable| variable.cell_coords().contains(&cell))
    }

    /// The height and width of the grid. By default this is just big enough to hold every
    /// variable.
    fn dimensions(&self) -> (usize, usize) {
        self.variables()
            .iter()
            .flat_map(Variable::cell_coords)
            .fold((0, 0), |(height, width), (row, col)| {
                (height.max(row + 1), width.max(col + 1))
            })
    }
}

/// A violated precondition in the structure of a puzzle. These are reported when the grid config
/// is generated, so that the fill process can assume every overlap is in bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("grid must have at least one row")]
    EmptyGrid,

    #[error("invalid character {ch:?} at row {row}, column {col}")]
    InvalidCell { ch: char, row: usize, col: usize },

    #[error("variable {0} extends past the edge of the grid")]
    VariableOutsideGrid(Variable),

    #[error("variable {0} has zero length")]
    ZeroLengthVariable(Variable),

    #[error("variable {0} appears more than once")]
    DuplicateVariable(Variable),

    #[error("variable {variable} has unknown neighbor {neighbor}")]
    UnknownNeighbor { variable: Variable, neighbor: Variable },

    #[error("variable {0} overlaps itself")]
    SelfOverlap(Variable),

    #[error("variable {variable} lists {neighbor} as a neighbor without an overlap")]
    MissingOverlap { variable: Variable, neighbor: Variable },

    #[error("overlap ({offset}, {other_offset}) between {variable} and {neighbor} is out of bounds")]
    OverlapOutOfBounds {
        variable: Variable,
        neighbor: Variable,
        offset: usize,
        other_offset: usize,
    },

    #[error("overlap between {variable} and {neighbor} is not symmetric")]
    AsymmetricOverlap { variable: Variable, neighbor: Variable },
}

/// A struct representing one side of an overlap, referencing the other variable's id and the
/// location of the shared cell within both variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub other_variable_id: VariableId,

    /// Index of the shared cell in this variable's word.
    pub cell: usize,

    /// Index of the shared cell in the other variable's word.
    pub other_cell: usize,
}

/// A struct representing the aspects of a variable that are static during filling.
#[derive(Debug, Clone)]
pub struct VariableConfig {
    pub id: VariableId,
    pub variable: Variable,

    /// One entry per neighbor, in the order the puzzle model reported them.
    pub crossings: Vec<Crossing>,
}

impl VariableConfig {
    #[must_use]
    pub fn length(&self) -> usize {
        self.variable.length
    }

    /// Find the crossing with the given variable, if they overlap.
    #[must_use]
    pub fn crossing_with(&self, other_variable_id: VariableId) -> Option<&Crossing> {
        self.crossings
            .iter()
            .find(|crossing| crossing.other_variable_id == other_variable_id)
    }

    /// The ids of all of the variables that overlap this one.
    pub fn neighbor_ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.crossings
            .iter()
            .map(|crossing| crossing.other_variable_id)
    }
}

/// A struct holding references to all of the information needed as input to a crossword filling
/// operation.
#[derive(Clone)]
pub struct GridConfig<'a> {
    /// The word list used to fill the grid; see `word_list.rs`.
    pub word_list: &'a WordList,

    /// Config representing all of the variables in the grid and their crossings.
    pub variable_configs: &'a [VariableConfig],

    /// The width and height of the grid.
    pub width: usize,
    pub height: usize,

    /// Whether each cell is open, in row-major order.
    pub open_cells: &'a [bool],

    /// An optional atomic flag that can be set to signal that the fill operation should be canceled.
    pub abort: Option<&'a AtomicBool>,
}

impl Debug for GridConfig<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridConfig")
            .field("variable_configs", &self.variable_configs)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// A struct that owns a copy of each piece of information needed by `GridConfig`.
#[derive(Debug)]
pub struct OwnedGridConfig {
    pub word_list: WordList,
    pub variable_configs: Vec<VariableConfig>,
    pub width: usize,
    pub height: usize,
    pub open_cells: Vec<bool>,
    pub abort: Option<Arc<AtomicBool>>,
}

impl OwnedGridConfig {
    #[must_use]
    pub fn to_config_ref(&self) -> GridConfig<'_> {
        GridConfig {
            word_list: &self.word_list,
            variable_configs: &self.variable_configs,
            width: self.width,
            height: self.height,
            open_cells: &self.open_cells,
            abort: self.abort.as_deref(),
        }
    }
}

/// Given a puzzle model, generate `VariableConfig`s containing derived information about
/// crossings, checking every overlap the model reports along the way.
pub fn generate_variable_configs(
    model: &impl PuzzleModel,
) -> Result<Vec<VariableConfig>, PuzzleError> {
    let variables = model.variables();

    let mut id_by_variable: HashMap<Variable, VariableId> = HashMap::new();
    for (variable_id, &variable) in variables.iter().enumerate() {
        if variable.length == 0 {
            return Err(PuzzleError::ZeroLengthVariable(variable));
        }
        if id_by_variable.insert(variable, variable_id).is_some() {
            return Err(PuzzleError::DuplicateVariable(variable));
        }
    }

    variables
        .iter()
        .enumerate()
        .map(|(variable_id, &variable)| {
            let crossings = model
                .neighbors(&variable)
                .into_iter()
                .map(|neighbor| {
                    let Some(&other_variable_id) = id_by_variable.get(&neighbor) else {
                        return Err(PuzzleError::UnknownNeighbor { variable, neighbor });
                    };
                    if other_variable_id == variable_id {
                        return Err(PuzzleError::SelfOverlap(variable));
                    }

                    let Some((cell, other_cell)) = model.overlap(&variable, &neighbor) else {
                        return Err(PuzzleError::MissingOverlap { variable, neighbor });
                    };
                    if cell >= variable.length || other_cell >= neighbor.length {
                        return Err(PuzzleError::OverlapOutOfBounds {
                            variable,
                            neighbor,
                            offset: cell,
                            other_offset: other_cell,
                        });
                    }
                    if model.overlap(&neighbor, &variable) != Some((other_cell, cell)) {
                        return Err(PuzzleError::AsymmetricOverlap { variable, neighbor });
                    }

                    Ok(Crossing {
                        other_variable_id,
                        cell,
                        other_cell,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(VariableConfig {
                id: variable_id,
                variable,
                crossings,
            })
        })
        .collect()
}

/// Generate an `OwnedGridConfig` for the given puzzle model and word list.
pub fn generate_grid_config(
    word_list: WordList,
    model: &impl PuzzleModel,
) -> Result<OwnedGridConfig, PuzzleError> {
    let variable_configs = generate_variable_configs(model)?;
    let (height, width) = model.dimensions();

    if let Some(variable_config) = variable_configs.iter().find(|variable_config| {
        variable_config
            .variable
            .cell_coords()
            .iter()
            .any(|&(row, col)| row >= height || col >= width)
    }) {
        return Err(PuzzleError::VariableOutsideGrid(variable_config.variable));
    }

    log::debug!(
        "Generated grid config with {} variables and {} crossings ({width}x{height})",
        variable_configs.len(),
        variable_configs
            .iter()
            .map(|variable_config| variable_config.crossings.len())
            .sum::<usize>()
            / 2,
    );

    let open_cells = (0..height)
        .flat_map(|row| (0..width).map(move |col| (row, col)))
        .map(|cell| model.is_open_cell(cell))
        .collect();

    Ok(OwnedGridConfig {
        word_list,
        variable_configs,
        width,
        height,
        open_cells,
        abort: None,
    })
}

/// The contents of a single cell once an assignment has been placed in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    Block,
    Empty,
    Letter(char),
}

/// Lay out the words of `assignment` in the grid, row by row.
#[must_use]
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<GridCell>> {
    let mut grid: Vec<Vec<GridCell>> = config
        .open_cells
        .chunks(config.width.max(1))
        .map(|row| {
            row.iter()
                .map(|&open| if open { GridCell::Empty } else { GridCell::Block })
                .collect()
        })
        .collect();

    for (variable_id, global_word_id) in assignment.iter() {
        let variable = &config.variable_configs[variable_id].variable;
        let word = config.word_list.get_word(global_word_id);

        for ((row, col), &glyph) in variable.cell_coords().into_iter().zip(&word.glyphs) {
            grid[row][col] = GridCell::Letter(config.word_list.glyphs[glyph]);
        }
    }

    grid
}

/// Render the grid as text, using `block` for blocks and `empty` for open cells that don't have a
/// letter yet.
#[must_use]
pub fn render_grid_with(
    config: &GridConfig,
    assignment: &Assignment,
    block: char,
    empty: char,
) -> String {
    letter_grid(config, assignment)
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match *cell {
                    GridCell::Block => block,
                    GridCell::Empty => empty,
                    GridCell::Letter(ch) => ch,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn the given grid config and assignment into a rendered string, with blocks as `#` and
/// unfilled cells as `.`.
#[must_use]
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    render_grid_with(config, assignment, '#', '.')
}

#[cfg(test)]
pub mod tests {
    use crate::assignment::Assignment;
    use crate::grid_config::{
        generate_grid_config, generate_variable_configs, letter_grid, render_grid,
        render_grid_with, Crossing, Direction, GridCell,
        PuzzleError, PuzzleModel, Variable,
    };
    use crate::word_list::tests::memory_word_list;
    use std::collections::HashMap;

    /// A puzzle model with hand-written overlaps, for testing configs that a grid couldn't produce.
    #[derive(Debug, Default)]
    pub struct ExplicitModel {
        pub variables: Vec<Variable>,
        pub overlaps: HashMap<(Variable, Variable), (usize, usize)>,
    }

    impl ExplicitModel {
        #[must_use]
        pub fn new(variables: &[Variable]) -> ExplicitModel {
            ExplicitModel {
                variables: variables.to_vec(),
                overlaps: HashMap::new(),
            }
        }

        /// Record a symmetric overlap between two variables.
        #[must_use]
        pub fn with_overlap(mut self, a: Variable, b: Variable, offsets: (usize, usize)) -> Self {
            self.overlaps.insert((a, b), offsets);
            self.overlaps.insert((b, a), (offsets.1, offsets.0));
            self
        }
    }

    impl PuzzleModel for ExplicitModel {
        fn variables(&self) -> Vec<Variable> {
            self.variables.clone()
        }

        fn overlap(&self, a: &Variable, b: &Variable) -> Option<(usize, usize)> {
            self.overlaps.get(&(*a, *b)).copied()
        }

        // Unlike the default, this reports whatever overlaps were recorded, including bad ones.
        fn neighbors(&self, variable: &Variable) -> Vec<Variable> {
            let mut neighbors: Vec<Variable> = self
                .overlaps
                .keys()
                .filter(|(a, _)| a == variable)
                .map(|&(_, b)| b)
                .collect();
            neighbors.sort();
            neighbors
        }
    }

    #[test]
    fn test_variable_keys() {
        let variable = Variable::new(1, 2, Direction::Down, 5);

        assert_eq!(variable.to_key(), "1,2,down,5");
        assert_eq!(variable.to_string(), "1,2,down,5");
        assert_eq!(Variable::from_key("1,2,down,5"), Ok(variable));
        assert!(Variable::from_key("1,2,sideways,5").is_err());
        assert!(Variable::from_key("1,2,down").is_err());
    }

    #[test]
    fn test_cell_coords() {
        assert_eq!(
            Variable::new(1, 2, Direction::Across, 3).cell_coords(),
            vec![(1, 2), (1, 3), (1, 4)]
        );
        assert_eq!(
            Variable::new(1, 2, Direction::Down, 3).cell_coords(),
            vec![(1, 2), (2, 2), (3, 2)]
        );
    }

    #[test]
    fn test_variable_order_is_grid_position() {
        let mut variables = vec![
            Variable::new(2, 0, Direction::Across, 3),
            Variable::new(0, 1, Direction::Down, 3),
            Variable::new(0, 1, Direction::Across, 4),
            Variable::new(0, 0, Direction::Down, 5),
        ];
        variables.sort();

        assert_eq!(
            variables,
            vec![
                Variable::new(0, 0, Direction::Down, 5),
                Variable::new(0, 1, Direction::Across, 4),
                Variable::new(0, 1, Direction::Down, 3),
                Variable::new(2, 0, Direction::Across, 3),
            ]
        );
    }

    #[test]
    fn test_generate_variable_configs() {
        let across = Variable::new(0, 0, Direction::Across, 3);
        let down = Variable::new(0, 1, Direction::Down, 3);
        let lonely = Variable::new(4, 0, Direction::Across, 2);
        let model = ExplicitModel::new(&[across, down, lonely]).with_overlap(across, down, (1, 0));

        let configs = generate_variable_configs(&model).unwrap();

        assert_eq!(configs.len(), 3);
        assert_eq!(
            configs[0].crossings,
            vec![Crossing {
                other_variable_id: 1,
                cell: 1,
                other_cell: 0
            }]
        );
        assert_eq!(configs[1].crossing_with(0).map(|c| c.cell), Some(0));
        assert!(configs[2].crossings.is_empty());
        assert_eq!(configs[0].neighbor_ids().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_rejects_out_of_bounds_overlap() {
        let across = Variable::new(0, 0, Direction::Across, 3);
        let down = Variable::new(0, 1, Direction::Down, 3);
        let model = ExplicitModel::new(&[across, down]).with_overlap(across, down, (1, 3));

        assert_eq!(
            generate_variable_configs(&model).unwrap_err(),
            PuzzleError::OverlapOutOfBounds {
                variable: across,
                neighbor: down,
                offset: 1,
                other_offset: 3,
            }
        );
    }

    #[test]
    fn test_rejects_asymmetric_overlap() {
        let across = Variable::new(0, 0, Direction::Across, 3);
        let down = Variable::new(0, 1, Direction::Down, 3);
        let mut model = ExplicitModel::new(&[across, down]).with_overlap(across, down, (1, 0));
        model.overlaps.insert((down, across), (0, 2));

        assert!(matches!(
            generate_variable_configs(&model),
            Err(PuzzleError::AsymmetricOverlap { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_variables() {
        let variable = Variable::new(0, 0, Direction::Across, 3);
        let model = ExplicitModel::new(&[variable, variable]);
        assert_eq!(
            generate_variable_configs(&model).unwrap_err(),
            PuzzleError::DuplicateVariable(variable)
        );

        let empty = Variable::new(0, 0, Direction::Down, 0);
        let model = ExplicitModel::new(&[empty]);
        assert_eq!(
            generate_variable_configs(&model).unwrap_err(),
            PuzzleError::ZeroLengthVariable(empty)
        );

        let mut model = ExplicitModel::new(&[variable]);
        model.overlaps.insert((variable, variable), (0, 0));
        assert_eq!(
            generate_variable_configs(&model).unwrap_err(),
            PuzzleError::SelfOverlap(variable)
        );
    }

    #[test]
    fn test_render_grid() {
        let across = Variable::new(0, 0, Direction::Across, 3);
        let down = Variable::new(0, 1, Direction::Down, 3);
        let model = ExplicitModel::new(&[across, down]).with_overlap(across, down, (1, 0));
        let grid_config =
            generate_grid_config(memory_word_list(&["cat", "ace"]), &model).unwrap();
        let config = grid_config.to_config_ref();

        assert_eq!((config.width, config.height), (3, 3));

        let mut assignment = Assignment::new(config.variable_configs.len());
        assert_eq!(render_grid(&config, &assignment), "...\n#.#\n#.#");

        assignment.assign(0, config.word_list.get_word_id("cat").unwrap());
        assert_eq!(render_grid(&config, &assignment), "cat\n#.#\n#.#");

        assignment.assign(1, config.word_list.get_word_id("ace").unwrap());
        assert_eq!(render_grid(&config, &assignment), "cat\n#c#\n#e#");
    }

    #[test]
    fn test_render_grid_with_custom_cells() {
        let across = Variable::new(0, 0, Direction::Across, 3);
        let down = Variable::new(0, 1, Direction::Down, 3);
        let model = ExplicitModel::new(&[across, down]).with_overlap(across, down, (1, 0));
        let grid_config =
            generate_grid_config(memory_word_list(&["cat", "ace"]), &model).unwrap();
        let config = grid_config.to_config_ref();

        let mut assignment = Assignment::new(config.variable_configs.len());
        assignment.assign(0, config.word_list.get_word_id("cat").unwrap());

        assert_eq!(
            render_grid_with(&config, &assignment, '█', ' '),
            "cat\n█ █\n█ █"
        );
        assert_eq!(
            letter_grid(&config, &assignment)[1],
            vec![GridCell::Block, GridCell::Empty, GridCell::Block]
        );
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::grid_config::{Direction, Variable};

    #[test]
    fn test_variable_serialization() {
        let variable = Variable::new(1, 2, Direction::Across, 5);

        let key = serde_json::to_string(&variable).unwrap();

        assert_eq!(key, "\"1,2,across,5\"");
    }

    #[test]
    fn test_variable_deserialization() {
        let variable: Variable = serde_json::from_str("\"3,4,down,12\"").unwrap();

        assert_eq!(variable, Variable::new(3, 4, Direction::Down, 12));
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Down).unwrap(), "\"down\"");
    }
}
