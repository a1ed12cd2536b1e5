//! A bit-packed BIP-39 wordlist trie.
//!
//! This crate converts between mnemonic words and their positions in a fixed
//! wordlist by walking a compact trie over byte slices, so a wallet never has
//! to hold the phrase as a `String`. Each trie node is two packed `u32` words;
//! children are found by rank over a 26-bit mask instead of stored pointers.
//!
//! - [`CompactTrie`] builds the trie from a wordlist and serializes it into
//!   the raw-deflate artifact.
//! - [`CompactTrieRef`] is a zero-copy view of an uncompressed artifact.
//! - [`MnemonicTrie`] is the runtime handle: it streams and inflates the
//!   artifact once and converts whole mnemonics.
//!
//! # Quick start
//!
//! ```
//! use mnemonic_trie::CompactTrie;
//!
//! let trie = CompactTrie::build(&["ab", "ac", "b"]).unwrap();
//! assert_eq!(trie.find_word_index(b"ac"), Ok(1));
//! assert!(trie.find_word_index(b"a").is_err());
//! assert_eq!(&trie.reconstruct_word(2).unwrap()[..], b"b");
//! ```

#![warn(missing_docs)]

#[cfg(not(target_endian = "little"))]
compile_error!("mnemonic-trie zero-copy loading requires a little-endian platform");

mod build;
mod error;
pub mod mnemonic_trie;
pub mod node;
pub mod rank;
pub mod serial;
mod trie_ref;
mod view;
pub mod wordlist;

use zeroize::Zeroizing;

pub use error::{BuildError, LoadError, TrieError};
pub use mnemonic_trie::{create, shared, MnemonicTrie};
pub use node::{Node, NOT_TERMINAL};
pub use trie_ref::CompactTrieRef;

use view::TrieView;

/// An owned compact trie: the packed node table and the word-end table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactTrie {
    pub(crate) nodes: Vec<Node>,
    pub(crate) word_ends: Vec<u16>,
}

impl CompactTrie {
    /// Creates a CompactTrie with the given components.
    pub(crate) fn new(nodes: Vec<Node>, word_ends: Vec<u16>) -> Self {
        Self { nodes, word_ends }
    }

    #[inline]
    fn view(&self) -> TrieView<'_> {
        TrieView::new(&self.nodes, &self.word_ends)
    }

    /// Returns the number of nodes in the trie.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of words in the trie.
    pub fn num_words(&self) -> usize {
        self.word_ends.len()
    }

    /// Returns the node table, in breadth-first ID order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the word index to node ID table.
    pub fn word_ends(&self) -> &[u16] {
        &self.word_ends
    }

    /// Returns the wordlist index of `word`.
    pub fn find_word_index(&self, word: &[u8]) -> Result<u16, TrieError> {
        self.view().find_word_index(word)
    }

    /// Returns the bytes of the word at `index`.
    pub fn reconstruct_word(&self, index: u16) -> Result<Zeroizing<Vec<u8>>, TrieError> {
        let mut out = Zeroizing::new(Vec::new());
        self.view().append_word_bfs(index, &mut out)?;
        Ok(out)
    }
}
