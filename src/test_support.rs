//! Helpers shared by the unit tests.

use itertools::Itertools;

// Initialize the logger for the tests
pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// All words over `alphabet` with at most `max_len` symbols, shortest first.
pub(crate) fn words_up_to(alphabet: &[char], max_len: usize) -> Vec<String> {
    std::iter::once(String::new())
        .chain((1..=max_len).flat_map(|len| {
            itertools::repeat_n(alphabet.iter(), len)
                .multi_cartesian_product()
                .map(|word| word.into_iter().collect::<String>())
        }))
        .collect()
}

#[test]
fn test_words_up_to() {
    let words = words_up_to(&['a', 'b'], 2);
    assert_eq!(words, vec!["", "a", "b", "aa", "ab", "ba", "bb"]);
}
