use smallvec::{smallvec, SmallVec};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::Path;
use std::{fmt, fs};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlobalWordId, GlyphId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- only lowercase letters or other valid glyphs.
    pub normalized_string: String,

    /// The word as it appears in the user's word list.
    pub canonical_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,

    /// The index of the source that the word came from. If the same word appears in multiple
    /// sources, this is the first one.
    pub source_index: u16,
}

/// Given a canonical word string from a dictionary file, turn it into the normalized form we'll
/// use in the actual fill engine.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordListError {
    #[error("Can’t read file: “{0}”")]
    InvalidPath(String),

    #[error("Word list contains invalid word: “{0}”")]
    InvalidWord(String),
}

/// Configuration describing a source of wordlist entries.
#[derive(Debug, Clone)]
pub enum WordListSourceConfig {
    Memory { id: String, words: Vec<String> },
    File { id: String, path: OsString },
    FileContents { id: String, contents: &'static str },
}

impl WordListSourceConfig {
    /// The unique, persistent id of this word list.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            WordListSourceConfig::Memory { id, .. }
            | WordListSourceConfig::FileContents { id, .. }
            | WordListSourceConfig::File { id, .. } => id.clone(),
        }
    }
}

/// A single word list entry.
struct RawWordListEntry {
    pub normalized: String,
    pub canonical: String,
    pub source_index: u16,
}

/// Turn a canonical word into a raw entry, or record an error if it can't be used in a grid. Every
/// glyph has to be alphanumeric since structure files use punctuation for blocks and empty cells.
fn parse_word(
    canonical: &str,
    source_index: u16,
    errors: &mut Vec<WordListError>,
) -> Option<RawWordListEntry> {
    let canonical = canonical.trim();
    if canonical.is_empty() {
        return None;
    }

    let normalized = normalize_word(canonical);
    if !normalized.chars().all(char::is_alphanumeric) {
        errors.push(WordListError::InvalidWord(canonical.into()));
        return None;
    }

    Some(RawWordListEntry {
        normalized,
        canonical: canonical.into(),
        source_index,
    })
}

fn parse_word_list_file_contents(
    file_contents: &str,
    source_index: u16,
    errors: &mut Vec<WordListError>,
) -> Vec<RawWordListEntry> {
    file_contents
        .lines()
        .map_while(|line| {
            if errors.len() > 100 {
                return None;
            }
            Some(parse_word(line, source_index, errors))
        })
        .flatten()
        .collect()
}

fn load_words_from_source(
    source: &WordListSourceConfig,
    source_index: u16,
) -> (Vec<RawWordListEntry>, Vec<WordListError>) {
    let mut errors = vec![];

    let entries = match source {
        WordListSourceConfig::Memory { words, .. } => words
            .iter()
            .filter_map(|canonical| parse_word(canonical, source_index, &mut errors))
            .collect(),

        WordListSourceConfig::File { path, .. } => {
            if let Ok(contents) = fs::read_to_string(path) {
                parse_word_list_file_contents(&contents, source_index, &mut errors)
            } else {
                errors.push(WordListError::InvalidPath(path.to_string_lossy().into()));
                vec![]
            }
        }

        WordListSourceConfig::FileContents { contents, .. } => {
            parse_word_list_file_contents(contents, source_index, &mut errors)
        }
    };

    (entries, errors)
}

/// A struct representing the loaded dictionary. Words are bucketed by length, which is all node
/// consistency needs, and each character is interned as a `GlyphId` so that comparing letters at
/// overlaps is an integer comparison.
pub struct WordList {
    /// A list of all characters that occur in any (normalized) word. `GlyphId`s used everywhere
    /// else are indices into this list.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,

    /// The inverse of `glyphs`: a map from a character to the `GlyphId` representing it.
    pub glyph_id_by_char: HashMap<char, GlyphId>,

    /// A list of all loaded words, bucketed by length. An index into `words` is the length of the
    /// words in the bucket, so `words[0]` is always an empty vec.
    pub words: Vec<Vec<Word>>,

    /// A map from a normalized string to the id of the Word representing it.
    pub word_id_by_string: HashMap<String, GlobalWordId>,

    /// The maximum word length provided when configuring the WordList, if any.
    pub max_length: Option<usize>,

    /// Errors emitted by each source, keyed by source id.
    pub source_errors: HashMap<String, Vec<WordListError>>,
}

impl WordList {
    /// Construct a new `WordList` using the given sources (omitting any entries that are longer than
    /// `max_length`). Words appearing in more than one source are only loaded once.
    #[must_use]
    pub fn new(source_configs: Vec<WordListSourceConfig>, max_length: Option<usize>) -> WordList {
        assert!(
            source_configs.len() < 2usize.pow(16),
            "Too many word list sources"
        );

        let mut instance = WordList {
            glyphs: smallvec![],
            glyph_id_by_char: HashMap::new(),
            words: vec![vec![]],
            word_id_by_string: HashMap::new(),
            max_length,
            source_errors: HashMap::new(),
        };

        if let Some(max_length) = max_length {
            while instance.words.len() < max_length + 1 {
                instance.words.push(vec![]);
            }
        }

        let mut seen_words: HashSet<String> = HashSet::new();

        for (source_index, source) in source_configs.iter().enumerate() {
            let (entries, errors) = load_words_from_source(source, source_index as u16);

            for entry in entries {
                let length = entry.normalized.chars().count();
                if max_length.is_some_and(|max_length| length > max_length) {
                    continue;
                }
                if !seen_words.insert(entry.normalized.clone()) {
                    continue;
                }
                instance.add_word(&entry);
            }

            instance.source_errors.insert(source.id(), errors);
        }

        log::debug!(
            "Loaded word list with {} words in {} glyphs",
            instance.word_id_by_string.len(),
            instance.glyphs.len()
        );

        instance
    }

    /// Load a word list from a single file, failing if the file can't be read or contains an
    /// invalid entry.
    pub fn from_file(path: &Path, max_length: Option<usize>) -> Result<WordList, WordListError> {
        let word_list = WordList::new(
            vec![WordListSourceConfig::File {
                id: "0".into(),
                path: path.into(),
            }],
            max_length,
        );

        match word_list
            .source_errors
            .get("0")
            .and_then(|errors| errors.first())
        {
            Some(error) => Err(error.clone()),
            None => Ok(word_list),
        }
    }

    /// Add the given word to the list. The word must not be part of the list yet.
    fn add_word(&mut self, raw_entry: &RawWordListEntry) -> GlobalWordId {
        let glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]> = raw_entry
            .normalized
            .chars()
            .map(|c| self.glyph_id_for_char(c))
            .collect();

        let word_length = glyphs.len();

        while self.words.len() < word_length + 1 {
            self.words.push(vec![]);
        }

        let word_id = self.words[word_length].len();

        self.words[word_length].push(Word {
            normalized_string: raw_entry.normalized.clone(),
            canonical_string: raw_entry.canonical.clone(),
            glyphs,
            source_index: raw_entry.source_index,
        });

        self.word_id_by_string
            .insert(raw_entry.normalized.clone(), (word_length, word_id));

        (word_length, word_id)
    }

    /// What's the unique glyph id for the given char? We do this lazily, instead of just mapping
    /// every letter up front, because word list entries may also contain numbers or non-English
    /// letters.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        self.glyph_id_by_char.get(&ch).copied().unwrap_or_else(|| {
            self.glyphs.push(ch);
            let id = self.glyphs.len() - 1;
            self.glyph_id_by_char.insert(ch, id);
            id
        })
    }

    /// Borrow an existing word using its global id.
    #[must_use]
    pub fn get_word(&self, global_word_id: GlobalWordId) -> &Word {
        &self.words[global_word_id.0][global_word_id.1]
    }

    /// Look up a word by its normalized string.
    #[must_use]
    pub fn get_word_id(&self, word: &str) -> Option<GlobalWordId> {
        self.word_id_by_string.get(&normalize_word(word)).copied()
    }

    /// The words of the given length, or an empty slice if there aren't any.
    #[must_use]
    pub fn words_of_length(&self, length: usize) -> &[Word] {
        self.words.get(length).map_or(&[], Vec::as_slice)
    }

    /// The total number of loaded words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.word_id_by_string.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.word_id_by_string.is_empty()
    }

    /// For each source, return any errors it emitted while loading.
    #[must_use]
    pub fn get_source_errors(&self) -> &HashMap<String, Vec<WordListError>> {
        &self.source_errors
    }
}

impl Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field(
                "words",
                &self.words.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .field("max_length", &self.max_length)
            .finish_non_exhaustive()
    }
}
