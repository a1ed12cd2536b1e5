use log::debug;

use crate::node::{Node, ALPHABET_SIZE, MAX_NODES, MAX_WORDS, NOT_TERMINAL};
use crate::{BuildError, CompactTrie};

/// Build-time node: children are arena indices, `0` meaning absent
/// (the root sits at index 0 and is never a child).
struct TempNode {
    terminal_index: u16,
    children: [u32; ALPHABET_SIZE as usize],
}

impl TempNode {
    fn new() -> Self {
        Self {
            terminal_index: NOT_TERMINAL,
            children: [0; ALPHABET_SIZE as usize],
        }
    }
}

impl CompactTrie {
    /// Builds a compact trie from an ordered wordlist.
    ///
    /// Each word `words[i]` is assigned index `i`. Node IDs are assigned
    /// breadth-first, so the children of every node occupy a contiguous ID
    /// range starting at its child base, in ascending letter order.
    ///
    /// # Errors
    /// - [`BuildError::InvalidCharacter`] if a word has a byte outside `a`..=`z`.
    /// - [`BuildError::EmptyWord`] / [`BuildError::DuplicateWord`].
    /// - [`BuildError::TooManyWords`] / [`BuildError::TooManyNodes`] if indices
    ///   or node IDs would not fit in 16 bits.
    pub fn build(words: &[impl AsRef<[u8]>]) -> Result<Self, BuildError> {
        if words.len() > MAX_WORDS {
            return Err(BuildError::TooManyWords(words.len()));
        }

        let mut arena = vec![TempNode::new()];
        for (word_index, word) in words.iter().enumerate() {
            let word = word.as_ref();
            if word.is_empty() {
                return Err(BuildError::EmptyWord { word_index });
            }
            let mut current = 0usize;
            for (position, &byte) in word.iter().enumerate() {
                let code = byte.wrapping_sub(b'a') as usize;
                if code >= ALPHABET_SIZE as usize {
                    return Err(BuildError::InvalidCharacter {
                        word_index,
                        position,
                    });
                }
                current = match arena[current].children[code] {
                    0 => {
                        let id = arena.len();
                        arena.push(TempNode::new());
                        arena[current].children[code] = id as u32;
                        id
                    }
                    next => next as usize,
                };
            }
            if arena[current].terminal_index != NOT_TERMINAL {
                return Err(BuildError::DuplicateWord { word_index });
            }
            arena[current].terminal_index = word_index as u16;
        }

        // Every arena entry is reachable, so its length is the node count.
        let total_nodes = arena.len();
        if total_nodes > MAX_NODES {
            return Err(BuildError::TooManyNodes(total_nodes));
        }

        let mut nodes = Vec::with_capacity(total_nodes);
        let mut word_ends = vec![0u16; words.len()];
        // BFS queue of (arena index, letter from parent); position == node ID.
        let mut order: Vec<(u32, u8)> = Vec::with_capacity(total_nodes);
        order.push((0, 0));

        let mut id = 0;
        while id < order.len() {
            let (arena_idx, letter_from_parent) = order[id];
            let temp = &arena[arena_idx as usize];

            let next_free = order.len();
            let mut child_mask = 0u32;
            for (code, &child) in temp.children.iter().enumerate() {
                if child != 0 {
                    child_mask |= 1 << code;
                    order.push((child, code as u8 + 1));
                }
            }
            let child_base = if child_mask == 0 { 0 } else { next_free as u16 };

            if temp.terminal_index != NOT_TERMINAL {
                word_ends[temp.terminal_index as usize] = id as u16;
            }
            nodes.push(Node::new(
                temp.terminal_index,
                child_base,
                letter_from_parent,
                child_mask,
            ));
            id += 1;
        }

        debug!(
            "built trie: {} words, {} nodes ({} bytes)",
            words.len(),
            nodes.len(),
            nodes.len() * std::mem::size_of::<Node>()
        );
        Ok(Self::new(nodes, word_ends))
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{Node, NOT_TERMINAL};
    use crate::{BuildError, CompactTrie, TrieError};

    #[test]
    fn small_list_layout() {
        let trie = CompactTrie::build(&["ab", "ac", "b"]).unwrap();
        // root, a, b, ab, ac
        assert_eq!(trie.num_nodes(), 5);
        let nodes = trie.nodes();
        assert_eq!(nodes[0], Node::new(NOT_TERMINAL, 1, 0, 0b11));
        assert_eq!(nodes[1], Node::new(NOT_TERMINAL, 3, 1, 0b110));
        assert_eq!(nodes[2], Node::new(2, 0, 2, 0));
        assert_eq!(nodes[3], Node::new(0, 0, 2, 0));
        assert_eq!(nodes[4], Node::new(1, 0, 3, 0));
        assert_eq!(trie.word_ends(), &[3, 4, 2]);
    }

    #[test]
    fn small_list_lookup() {
        let trie = CompactTrie::build(&["ab", "ac", "b"]).unwrap();
        assert_eq!(trie.find_word_index(b"ab"), Ok(0));
        assert_eq!(trie.find_word_index(b"ac"), Ok(1));
        assert_eq!(trie.find_word_index(b"b"), Ok(2));
        assert_eq!(trie.find_word_index(b"a"), Err(TrieError::InvalidMnemonic));
        assert_eq!(trie.find_word_index(b"c"), Err(TrieError::InvalidMnemonic));
    }

    #[test]
    fn single_word_scenario() {
        let trie = CompactTrie::build(&["abc"]).unwrap();
        assert_eq!(trie.find_word_index(b"abc"), Ok(0));
        assert_eq!(&trie.reconstruct_word(0).unwrap()[..], b"abc");
        assert_eq!(trie.find_word_index(b"ab"), Err(TrieError::InvalidMnemonic));
        assert_eq!(trie.find_word_index(b"abd"), Err(TrieError::InvalidMnemonic));
    }

    #[test]
    fn prefix_only_path_is_rejected() {
        let trie = CompactTrie::build(&["and"]).unwrap();
        assert_eq!(trie.find_word_index(b"an"), Err(TrieError::InvalidMnemonic));

        let trie = CompactTrie::build(&["an", "and"]).unwrap();
        assert_eq!(trie.find_word_index(b"an"), Ok(0));
        assert_eq!(trie.find_word_index(b"and"), Ok(1));
    }

    #[test]
    fn empty_input_is_not_a_word() {
        let trie = CompactTrie::build(&["a"]).unwrap();
        assert_eq!(trie.find_word_index(b""), Err(TrieError::InvalidMnemonic));
    }

    #[test]
    fn rejects_non_lowercase_bytes() {
        let trie = CompactTrie::build(&["abc"]).unwrap();
        for bad in [&b"Abc"[..], b"ab1", b"a-c", b"ab ", b"\xffbc", b"{bc", b"`bc"] {
            assert_eq!(trie.find_word_index(bad), Err(TrieError::InvalidMnemonic));
        }
    }

    #[test]
    fn children_are_contiguous_in_letter_order() {
        let words = ["cat", "car", "cart", "dog", "do", "zebra", "a"];
        let trie = CompactTrie::build(&words).unwrap();
        let nodes = trie.nodes();
        let mut expected_base = 1usize;
        for node in nodes {
            let mask = node.child_mask();
            if mask == 0 {
                assert_eq!(node.child_base(), 0);
                continue;
            }
            assert_eq!(node.child_base() as usize, expected_base);
            let mut k = 0;
            for code in 0..26u8 {
                if mask & (1 << code) != 0 {
                    let child = nodes[expected_base + k];
                    assert_eq!(child.letter_from_parent(), code + 1);
                    k += 1;
                }
            }
            expected_base += k;
        }
        assert_eq!(expected_base, nodes.len());
    }

    #[test]
    fn every_index_has_exactly_one_terminal() {
        let words = ["cat", "car", "cart", "dog", "do"];
        let trie = CompactTrie::build(&words).unwrap();
        for (i, &end) in trie.word_ends().iter().enumerate() {
            let count = trie
                .nodes()
                .iter()
                .filter(|n| n.terminal_index() == i as u16)
                .count();
            assert_eq!(count, 1);
            assert_eq!(trie.nodes()[end as usize].terminal_index(), i as u16);
        }
        assert!(!trie.nodes()[0].is_terminal());
    }

    #[test]
    fn build_errors() {
        assert_eq!(
            CompactTrie::build(&["ok", "nO"]),
            Err(BuildError::InvalidCharacter {
                word_index: 1,
                position: 1
            })
        );
        assert_eq!(
            CompactTrie::build(&["a", ""]),
            Err(BuildError::EmptyWord { word_index: 1 })
        );
        assert_eq!(
            CompactTrie::build(&["a", "b", "a"]),
            Err(BuildError::DuplicateWord { word_index: 2 })
        );
        let too_many = vec!["a"; 65_536];
        assert_eq!(
            CompactTrie::build(&too_many),
            Err(BuildError::TooManyWords(65_536))
        );
    }

    #[test]
    fn empty_list_has_only_root() {
        let words: [&str; 0] = [];
        let trie = CompactTrie::build(&words).unwrap();
        assert_eq!(trie.num_nodes(), 1);
        assert_eq!(trie.num_words(), 0);
        assert_eq!(trie.find_word_index(b"a"), Err(TrieError::InvalidMnemonic));
    }
}
