#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod consistency;
pub mod crossword;
pub mod domains;
pub mod grid_config;
pub mod grid_image;
pub mod ordering;
pub mod types;
pub mod util;
pub mod word_list;

pub const LOG_FILL_PROCESS: bool = cfg!(feature = "log_fill_process");
pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of distinct characters appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single variable.
pub const MAX_SLOT_LENGTH: usize = 21;
