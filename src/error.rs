use thiserror::Error;

/// Errors surfaced by word and index lookups.
///
/// Variants carry no payload: a failed conversion never reveals which word,
/// letter or position of a mnemonic was rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    /// A word is not in the wordlist, contains a byte outside `a`..=`z`,
    /// or an index is out of range.
    #[error("invalid mnemonic phrase: the mnemonic phrase contains an unknown word")]
    InvalidMnemonic,
    /// A word index could not be found in the trie, so the loaded data does
    /// not match its word-end table.
    #[error("corrupt trie: word index not reachable from the root")]
    CorruptTrie,
}

/// Errors that can occur while loading a serialized trie.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The underlying stream could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The compressed stream is not valid raw deflate.
    #[error("decompression failed: {0}")]
    Decompression(String),
    /// The data is shorter than its header claims.
    #[error("truncated or corrupted data")]
    TruncatedData,
    /// The node table does not start on a 4-byte boundary.
    #[error("node table is not aligned to 4 bytes")]
    MisalignedData,
    /// The sections are present but describe an impossible trie.
    #[error("invalid trie layout: {0}")]
    InvalidLayout(&'static str),
}

/// Errors that can occur while building a trie from a wordlist.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A word contains a byte outside `a`..=`z`.
    #[error("word {word_index} has a character outside a-z at position {position}")]
    InvalidCharacter {
        /// Index of the offending word in the list.
        word_index: usize,
        /// Byte offset of the offending character.
        position: usize,
    },
    /// A word is empty.
    #[error("word {word_index} is empty")]
    EmptyWord {
        /// Index of the offending word in the list.
        word_index: usize,
    },
    /// A word appears twice.
    #[error("word {word_index} duplicates an earlier word")]
    DuplicateWord {
        /// Index of the second occurrence.
        word_index: usize,
    },
    /// More words than 16-bit indices can address.
    #[error("{0} words exceed the 16-bit index limit")]
    TooManyWords(usize),
    /// More nodes than 16-bit node IDs can address.
    #[error("{0} nodes exceed the 16-bit node ID limit")]
    TooManyNodes(usize),
}
