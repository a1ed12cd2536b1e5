use std::mem;

use zeroize::Zeroizing;

use crate::serial::{parse_header, validate, HEADER_SIZE};
use crate::view::TrieView;
use crate::{CompactTrie, LoadError, Node, TrieError};

/// A zero-copy reference to an uncompressed trie artifact.
///
/// Unlike [`CompactTrie`], this type borrows the node table and word-end
/// table directly from an external byte buffer, avoiding heap allocation
/// for those sections.
pub struct CompactTrieRef<'a> {
    nodes: &'a [Node],
    word_ends: &'a [u16],
}

impl<'a> CompactTrieRef<'a> {
    /// Creates a zero-copy `CompactTrieRef` from an uncompressed artifact.
    ///
    /// The byte slice must be aligned to at least 4 bytes so the node table
    /// (at offset 4) can be read in place.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::TruncatedData`] if the buffer is too short.
    /// Returns [`LoadError::MisalignedData`] if the buffer is not properly aligned.
    /// Returns [`LoadError::InvalidLayout`] if the tables do not form a trie.
    pub fn from_bytes_ref(bytes: &'a [u8]) -> Result<Self, LoadError> {
        let (node_count, word_count) = parse_header(bytes)?;

        let nodes_ptr = bytes[HEADER_SIZE..].as_ptr();
        if !(nodes_ptr as usize).is_multiple_of(mem::align_of::<Node>()) {
            return Err(LoadError::MisalignedData);
        }
        // The node table length is a multiple of 8, so the word-end table
        // inherits the node table's alignment.
        let word_ends_ptr = bytes[HEADER_SIZE + node_count * mem::size_of::<Node>()..].as_ptr();

        // SAFETY:
        // - `Node` is `#[repr(C)]` with two `u32` fields, size 8, align 4, no padding
        // - parse_header checked both sections lie within `bytes`; alignment checked above
        // - any bit pattern is a valid `Node` or `u16`
        // - the crate only builds on little-endian targets, where the in-memory
        //   layout matches the serialized LE format
        // - the lifetime `'a` ties both slices to the input buffer
        let nodes = unsafe { std::slice::from_raw_parts(nodes_ptr as *const Node, node_count) };
        let word_ends =
            unsafe { std::slice::from_raw_parts(word_ends_ptr as *const u16, word_count) };

        validate(nodes, word_count)?;
        Ok(Self { nodes, word_ends })
    }

    #[inline]
    fn view(&self) -> TrieView<'_> {
        TrieView::new(self.nodes, self.word_ends)
    }

    /// Returns the number of nodes in the trie.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of words in the trie.
    pub fn num_words(&self) -> usize {
        self.word_ends.len()
    }

    /// Returns the wordlist index of `word`.
    #[inline]
    pub fn find_word_index(&self, word: &[u8]) -> Result<u16, TrieError> {
        self.view().find_word_index(word)
    }

    /// Returns the bytes of the word at `index`, found by breadth-first search.
    pub fn reconstruct_word(&self, index: u16) -> Result<Zeroizing<Vec<u8>>, TrieError> {
        let mut out = Zeroizing::new(Vec::new());
        self.view().append_word_bfs(index, &mut out)?;
        Ok(out)
    }

    /// Converts this zero-copy reference to an owned [`CompactTrie`].
    pub fn to_owned(&self) -> CompactTrie {
        CompactTrie::new(self.nodes.to_vec(), self.word_ends.to_vec())
    }
}
