use std::mem;

const WORD: usize = mem::size_of::<usize>();

/// Rounds a payload size up to a whole number of machine words, so the
/// header placed after it stays word-aligned.
///
/// Callers keep `size` at least a word below `usize::MAX`.
pub const fn word_align(size: usize) -> usize {
  (size + WORD - 1) & !(WORD - 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_words_round_up() {
    assert_eq!(word_align(1), WORD);
    assert_eq!(word_align(WORD + 1), 2 * WORD);
    assert_eq!(word_align(3 * WORD - 1), 3 * WORD);
  }

  #[test]
  fn whole_words_are_kept() {
    assert_eq!(word_align(0), 0);
    assert_eq!(word_align(WORD), WORD);
    assert_eq!(word_align(7 * WORD), 7 * WORD);
  }

  #[test]
  fn consecutive_headers_stay_aligned() {
    use crate::block::HEADER_SIZE;

    let mut offset = 0;
    for size in [1, 13, 24, 5] {
      offset += HEADER_SIZE + word_align(size);
      assert_eq!(offset % mem::align_of::<usize>(), 0);
    }
  }
}
