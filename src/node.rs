//! Bit-packing codec for trie nodes.

/// Terminal index stored in nodes that do not end a word.
pub const NOT_TERMINAL: u16 = 0xFFFF;

/// Number of letters in the trie alphabet (`a`..=`z`).
pub const ALPHABET_SIZE: u32 = 26;

/// Low 26 bits of the second node word: one bit per child letter.
pub const CHILD_MASK: u32 = 0x03FF_FFFF;

/// Node IDs are stored in 16 bits.
pub const MAX_NODES: usize = 1 << 16;

/// Word indices are stored in 16 bits, with `NOT_TERMINAL` reserved.
pub const MAX_WORDS: usize = NOT_TERMINAL as usize;

const LETTER_SHIFT: u32 = 26;

/// Packs a terminal index (low 16 bits) and a child base (high 16 bits).
#[inline]
pub const fn pack_terminal_and_base(terminal_index: u16, child_base: u16) -> u32 {
    ((child_base as u32) << 16) | terminal_index as u32
}

/// Extracts the terminal index from the first node word.
#[inline]
pub const fn unpack_terminal_index(value: u32) -> u16 {
    (value & 0xFFFF) as u16
}

/// Extracts the child base from the first node word.
#[inline]
pub const fn unpack_child_base(value: u32) -> u16 {
    (value >> 16) as u16
}

/// Packs a 6-bit letter-from-parent (high bits) and a 26-bit child mask.
#[inline]
pub const fn pack_letter_and_mask(letter_from_parent: u8, child_mask: u32) -> u32 {
    (((letter_from_parent & 0x3F) as u32) << LETTER_SHIFT) | (child_mask & CHILD_MASK)
}

/// Extracts the 26-bit child mask from the second node word.
#[inline]
pub const fn unpack_child_mask(value: u32) -> u32 {
    value & CHILD_MASK
}

/// Extracts the letter-from-parent (`0` for the root, else letter code + 1).
#[inline]
pub const fn unpack_letter_from_parent(value: u32) -> u8 {
    (value >> LETTER_SHIFT) as u8
}

/// A node in the compact trie.
///
/// Each node is exactly 8 bytes (`#[repr(C)]`):
/// - `terminal_base`: terminal index (low 16) | child base (high 16)
/// - `letter_mask`: letter from parent (high 6) | child mask (low 26)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    terminal_base: u32,
    letter_mask: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self::new(NOT_TERMINAL, 0, 0, 0)
    }
}

impl Node {
    /// Creates a node from its four logical fields.
    #[inline]
    pub const fn new(
        terminal_index: u16,
        child_base: u16,
        letter_from_parent: u8,
        child_mask: u32,
    ) -> Self {
        Self {
            terminal_base: pack_terminal_and_base(terminal_index, child_base),
            letter_mask: pack_letter_and_mask(letter_from_parent, child_mask),
        }
    }

    /// Creates a node from its two raw packed words.
    #[inline]
    pub const fn from_words(terminal_base: u32, letter_mask: u32) -> Self {
        Self {
            terminal_base,
            letter_mask,
        }
    }

    /// Returns the two raw packed words.
    #[inline]
    pub const fn words(&self) -> [u32; 2] {
        [self.terminal_base, self.letter_mask]
    }

    /// Returns the wordlist index ending here, or `NOT_TERMINAL`.
    #[inline]
    pub const fn terminal_index(&self) -> u16 {
        unpack_terminal_index(self.terminal_base)
    }

    /// Returns true if a word ends at this node.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        self.terminal_index() != NOT_TERMINAL
    }

    /// Returns the ID of the first child. `0` means no children.
    #[inline]
    pub const fn child_base(&self) -> u16 {
        unpack_child_base(self.terminal_base)
    }

    /// Returns the child presence mask.
    #[inline]
    pub const fn child_mask(&self) -> u32 {
        unpack_child_mask(self.letter_mask)
    }

    /// Returns the number of children.
    #[inline]
    pub const fn child_count(&self) -> u32 {
        self.child_mask().count_ones()
    }

    /// Returns the letter code + 1 of the edge leading here, `0` for the root.
    #[inline]
    pub const fn letter_from_parent(&self) -> u8 {
        unpack_letter_from_parent(self.letter_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn node_size_is_8_bytes() {
        assert_eq!(mem::size_of::<Node>(), 8);
        assert_eq!(mem::align_of::<Node>(), 4);
    }

    #[test]
    fn default_node() {
        let n = Node::default();
        assert_eq!(n.terminal_index(), NOT_TERMINAL);
        assert!(!n.is_terminal());
        assert_eq!(n.child_base(), 0);
        assert_eq!(n.child_mask(), 0);
        assert_eq!(n.letter_from_parent(), 0);
    }

    #[test]
    fn terminal_and_base_round_trip() {
        let packed = pack_terminal_and_base(2047, 6245);
        assert_eq!(unpack_terminal_index(packed), 2047);
        assert_eq!(unpack_child_base(packed), 6245);
    }

    #[test]
    fn high_bits_do_not_sign_extend() {
        let packed = pack_terminal_and_base(NOT_TERMINAL, 0xFFFF);
        assert_eq!(packed, u32::MAX);
        assert_eq!(unpack_terminal_index(packed), 0xFFFF);
        assert_eq!(unpack_child_base(packed), 0xFFFF);

        let packed = pack_letter_and_mask(63, CHILD_MASK);
        assert_eq!(packed, u32::MAX);
        assert_eq!(unpack_letter_from_parent(packed), 63);
        assert_eq!(unpack_child_mask(packed), CHILD_MASK);
    }

    #[test]
    fn mask_is_truncated_to_26_bits() {
        let packed = pack_letter_and_mask(1, u32::MAX);
        assert_eq!(unpack_child_mask(packed), CHILD_MASK);
        assert_eq!(unpack_letter_from_parent(packed), 1);
    }

    #[test]
    fn node_fields() {
        let n = Node::new(7, 12, 26, 0b101);
        assert_eq!(n.terminal_index(), 7);
        assert!(n.is_terminal());
        assert_eq!(n.child_base(), 12);
        assert_eq!(n.letter_from_parent(), 26);
        assert_eq!(n.child_mask(), 0b101);
        assert_eq!(n.child_count(), 2);
        assert_eq!(Node::from_words(n.words()[0], n.words()[1]), n);
    }

    #[test]
    fn word_layout_matches_format() {
        let n = Node::new(0x0102, 0x0304, 3, 0x10);
        assert_eq!(n.words(), [0x0304_0102, (3 << 26) | 0x10]);
    }
}
