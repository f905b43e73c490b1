use smallvec::SmallVec;

use crate::types::WordId;
use crate::word_list::WordList;
use crate::MAX_GLYPH_COUNT;

/// Structure tracking number of occurrences of each glyph in each cell across a set of words of
/// one length. `counts[cell_idx][glyph_id]` is how many of the words have `glyph_id` at
/// `cell_idx`, so "does any word have glyph G at cell C" is a single lookup.
pub type GlyphCountsByCell = Vec<SmallVec<[u32; MAX_GLYPH_COUNT]>>;

/// Build the glyph counts for the given words, all of which must be `length` glyphs long.
#[must_use]
pub fn build_glyph_counts_by_cell(
    word_list: &WordList,
    length: usize,
    options: &[WordId],
) -> GlyphCountsByCell {
    let mut result: GlyphCountsByCell = (0..length)
        .map(|_| (0..word_list.glyphs.len()).map(|_| 0).collect())
        .collect();

    for &word_id in options {
        let word = &word_list.words[length][word_id];
        for (cell_idx, &glyph) in word.glyphs.iter().enumerate() {
            result[cell_idx][glyph] += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use crate::util::build_glyph_counts_by_cell;
    use crate::word_list::{WordList, WordListSourceConfig};

    #[test]
    fn test_glyph_counts_by_cell() {
        let word_list = WordList::new(
            vec![WordListSourceConfig::Memory {
                id: "0".into(),
                words: vec!["cat".into(), "car".into(), "dog".into()],
            }],
            None,
        );

        let counts = build_glyph_counts_by_cell(&word_list, 3, &[0, 1, 2]);
        let c = word_list.glyph_id_by_char[&'c'];
        let a = word_list.glyph_id_by_char[&'a'];
        let o = word_list.glyph_id_by_char[&'o'];

        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0][c], 2);
        assert_eq!(counts[1][a], 2);
        assert_eq!(counts[1][o], 1);

        let counts = build_glyph_counts_by_cell(&word_list, 3, &[2]);
        assert_eq!(counts[0][c], 0);
        assert_eq!(counts[1][o], 1);
    }
}
