//! The bundled BIP-39 English wordlist and its prebuilt trie artifact.

/// The English BIP-39 wordlist, one word per line in index order.
pub const ENGLISH: &str = include_str!("../data/english.txt");

/// Number of words in [`ENGLISH`].
pub const ENGLISH_WORD_COUNT: usize = 2048;

/// The English trie artifact, raw-deflate compressed.
///
/// Regenerate with `cargo run --bin mnemonic-trie-build`.
pub static ENGLISH_ARTIFACT: &[u8] = include_bytes!("../data/english.trie.bin");

/// Splits a newline-separated wordlist, trimming whitespace and skipping
/// blank lines.
pub fn parse(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Returns the English wordlist in index order.
pub fn english() -> Vec<&'static str> {
    parse(ENGLISH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_has_2048_sorted_words() {
        let words = english();
        assert_eq!(words.len(), ENGLISH_WORD_COUNT);
        assert_eq!(words[0], "abandon");
        assert_eq!(words[2047], "zoo");
        assert!(words.windows(2).all(|w| w[0] < w[1]));
        assert!(words.iter().all(|w| w.bytes().all(|b| b.is_ascii_lowercase())));
    }

    #[test]
    fn some_words_prefix_others() {
        let words = english();
        let pairs = words
            .windows(2)
            .filter(|w| w[1].starts_with(w[0]))
            .count();
        assert_eq!(pairs, 49);
        assert!(words.contains(&"act") && words.contains(&"action"));
    }

    #[test]
    fn parse_skips_blank_lines() {
        assert_eq!(parse("ab\n\n  ac \r\nb\n"), vec!["ab", "ac", "b"]);
    }
}
