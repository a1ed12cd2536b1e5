use log::warn;
use zeroize::{Zeroize, Zeroizing};

use crate::node::{Node, ALPHABET_SIZE, NOT_TERMINAL};
use crate::rank::rank;
use crate::TrieError;

/// A borrowed view over a validated node table and word-end table.
/// All lookups are implemented here and shared between `CompactTrie`,
/// `CompactTrieRef` and `MnemonicTrie`.
///
/// Every child range in `nodes` is in bounds: callers only construct a view
/// over tables produced by the builder or checked by `serial::validate`.
#[derive(Clone, Copy)]
pub(crate) struct TrieView<'a> {
    nodes: &'a [Node],
    word_ends: &'a [u16],
}

impl<'a> TrieView<'a> {
    #[inline]
    pub(crate) fn new(nodes: &'a [Node], word_ends: &'a [u16]) -> Self {
        Self { nodes, word_ends }
    }

    /// Walks the trie from the root one byte at a time and returns the
    /// terminal index of the final node.
    #[inline]
    pub(crate) fn find_word_index(&self, word: &[u8]) -> Result<u16, TrieError> {
        let nodes = self.nodes;
        let mut node_id: usize = 0; // root
        for &byte in word {
            let code = byte.wrapping_sub(b'a') as u32;
            if code >= ALPHABET_SIZE {
                return Err(TrieError::InvalidMnemonic);
            }
            let node = nodes[node_id];
            let mask = node.child_mask();
            if mask & (1 << code) == 0 {
                return Err(TrieError::InvalidMnemonic);
            }
            node_id = node.child_base() as usize + rank(mask, code) as usize;
        }
        match nodes[node_id].terminal_index() {
            // only a prefix of longer words
            NOT_TERMINAL => Err(TrieError::InvalidMnemonic),
            index => Ok(index),
        }
    }

    /// Appends the word at `index` to `out`, walking up from its word-end
    /// node through `parents`. Falls back to a breadth-first search when the
    /// word-end table disagrees with the node table.
    pub(crate) fn append_word(
        &self,
        index: u16,
        parents: &[u16],
        out: &mut Vec<u8>,
    ) -> Result<(), TrieError> {
        if index as usize >= self.word_ends.len() {
            return Err(TrieError::InvalidMnemonic);
        }
        let start = out.len();
        if self.append_word_from_end(index, parents, out) {
            return Ok(());
        }
        out[start..].zeroize();
        out.truncate(start);
        warn!("word-end table disagrees with the node table, falling back to breadth-first search");
        self.append_word_bfs(index, out)
    }

    fn append_word_from_end(&self, index: u16, parents: &[u16], out: &mut Vec<u8>) -> bool {
        let end = self.word_ends[index as usize] as usize;
        // the root never ends a word
        if end == 0 || end >= self.nodes.len() || self.nodes[end].terminal_index() != index {
            return false;
        }
        let start = out.len();
        let mut node_id = end;
        while node_id != 0 {
            let letter = self.nodes[node_id].letter_from_parent();
            if letter == 0 || letter as u32 > ALPHABET_SIZE {
                return false;
            }
            out.push(b'a' + letter - 1);
            node_id = parents[node_id] as usize;
        }
        out[start..].reverse();
        true
    }

    /// Breadth-first search from the root for the node whose terminal index
    /// is `index`, appending the letters on the path to it.
    pub(crate) fn append_word_bfs(&self, index: u16, out: &mut Vec<u8>) -> Result<(), TrieError> {
        if index as usize >= self.word_ends.len() {
            return Err(TrieError::InvalidMnemonic);
        }
        let capacity = self.nodes.len();
        // entry i: node ID, entry of its parent, letter code of the edge
        let mut queue: Zeroizing<Vec<u16>> = Zeroizing::new(Vec::with_capacity(capacity));
        let mut prev: Zeroizing<Vec<u16>> = Zeroizing::new(Vec::with_capacity(capacity));
        let mut letters: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(capacity));
        queue.push(0);
        prev.push(0);
        letters.push(0);

        let mut head = 0;
        while head < queue.len() {
            let node = self.nodes[queue[head] as usize];
            if node.terminal_index() == index {
                let start = out.len();
                let mut entry = head;
                while entry != 0 {
                    out.push(b'a' + letters[entry]);
                    entry = prev[entry] as usize;
                }
                out[start..].reverse();
                return Ok(());
            }
            let mask = node.child_mask();
            let base = node.child_base();
            let mut k = 0u16;
            for code in 0..ALPHABET_SIZE {
                if mask & (1 << code) != 0 {
                    if queue.len() == capacity {
                        // more entries than nodes: the table is not a tree
                        return Err(TrieError::CorruptTrie);
                    }
                    queue.push(base + k);
                    prev.push(head as u16);
                    letters.push(code as u8);
                    k += 1;
                }
            }
            head += 1;
        }
        Err(TrieError::CorruptTrie)
    }
}
