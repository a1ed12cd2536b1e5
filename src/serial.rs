//! The trie artifact format.
//!
//! ```text
//! offset 0     : u32 LE   node table byte length (N)
//! offset 4     : N bytes  node table, two LE u32 words per node
//! offset 4 + N : rest     word-end table, one LE u16 node ID per word
//! ```
//!
//! The artifact is stored compressed with raw deflate (no zlib or gzip
//! framing).

use std::io::Write;
use std::mem;

use byteorder::{ByteOrder, LittleEndian};
use flate2::write::DeflateEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use log::debug;

use crate::node::{Node, MAX_NODES, MAX_WORDS, NOT_TERMINAL};
use crate::{CompactTrie, LoadError};

/// Size of the artifact header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Inflated bytes produced per decompression step.
pub const INFLATE_CHUNK_SIZE: usize = 8192;

const NODE_SIZE: usize = mem::size_of::<Node>();

impl CompactTrie {
    /// Returns the uncompressed artifact size in bytes.
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE + self.nodes.len() * NODE_SIZE + self.word_ends.len() * 2
    }

    /// Serializes the trie to the uncompressed artifact layout.
    pub fn as_bytes(&self) -> Vec<u8> {
        let node_bytes = self.nodes.len() * NODE_SIZE;
        let mut buf = vec![0u8; self.serialized_size()];
        LittleEndian::write_u32(&mut buf[..HEADER_SIZE], node_bytes as u32);

        let words: Vec<u32> = self.nodes.iter().flat_map(Node::words).collect();
        LittleEndian::write_u32_into(&words, &mut buf[HEADER_SIZE..HEADER_SIZE + node_bytes]);
        LittleEndian::write_u16_into(&self.word_ends, &mut buf[HEADER_SIZE + node_bytes..]);
        buf
    }

    /// Serializes the trie and compresses it with raw deflate.
    pub fn to_compressed(&self, level: Compression) -> std::io::Result<Vec<u8>> {
        let raw = self.as_bytes();
        let mut encoder = DeflateEncoder::new(Vec::new(), level);
        encoder.write_all(&raw)?;
        let compressed = encoder.finish()?;
        debug!(
            "compressed trie artifact: {} -> {} bytes",
            raw.len(),
            compressed.len()
        );
        Ok(compressed)
    }

    /// Deserializes a trie from the uncompressed artifact layout.
    ///
    /// The sections are copied, so `bytes` needs no particular alignment.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let (node_count, word_count) = parse_header(bytes)?;
        let node_bytes = node_count * NODE_SIZE;

        let mut words = vec![0u32; node_count * 2];
        LittleEndian::read_u32_into(&bytes[HEADER_SIZE..HEADER_SIZE + node_bytes], &mut words);
        let nodes: Vec<Node> = words
            .chunks_exact(2)
            .map(|w| Node::from_words(w[0], w[1]))
            .collect();

        let mut word_ends = vec![0u16; word_count];
        LittleEndian::read_u16_into(&bytes[HEADER_SIZE + node_bytes..], &mut word_ends);

        validate(&nodes, word_count)?;
        Ok(Self::new(nodes, word_ends))
    }

    /// Inflates a raw-deflate artifact and deserializes it.
    pub fn from_compressed(compressed: &[u8]) -> Result<Self, LoadError> {
        let mut inflater = Inflater::new(Vec::new());
        inflater.feed(compressed)?;
        let raw = inflater.finish()?;
        Self::from_bytes(&raw)
    }
}

/// Reads the header and returns `(node_count, word_count)`.
///
/// Checks that the sections fit in `bytes`, not that they describe a trie.
pub(crate) fn parse_header(bytes: &[u8]) -> Result<(usize, usize), LoadError> {
    if bytes.len() < HEADER_SIZE {
        return Err(LoadError::TruncatedData);
    }
    let node_bytes = LittleEndian::read_u32(&bytes[..HEADER_SIZE]) as usize;
    let rest = bytes.len() - HEADER_SIZE;
    if node_bytes > rest {
        return Err(LoadError::TruncatedData);
    }
    if node_bytes == 0 {
        return Err(LoadError::InvalidLayout("empty node table"));
    }
    if !node_bytes.is_multiple_of(NODE_SIZE) {
        return Err(LoadError::InvalidLayout(
            "node table length is not a multiple of 8",
        ));
    }
    let word_bytes = rest - node_bytes;
    if !word_bytes.is_multiple_of(2) {
        return Err(LoadError::InvalidLayout("word-end table has odd length"));
    }

    let node_count = node_bytes / NODE_SIZE;
    let word_count = word_bytes / 2;
    if node_count > MAX_NODES {
        return Err(LoadError::InvalidLayout("too many nodes"));
    }
    if word_count > MAX_WORDS {
        return Err(LoadError::InvalidLayout("too many words"));
    }
    Ok((node_count, word_count))
}

/// Checks that `nodes` is a breadth-first trie: child ranges are
/// contiguous, in bounds and follow their parent, letters match the parent
/// masks, and every word index ends at exactly one node.
pub(crate) fn validate(nodes: &[Node], word_count: usize) -> Result<(), LoadError> {
    let mut next_free = 1usize;
    let mut seen = vec![false; word_count];
    let mut terminals = 0usize;
    for (id, node) in nodes.iter().enumerate() {
        if id != 0 && id >= next_free {
            return Err(LoadError::InvalidLayout("node is not reachable from the root"));
        }
        let terminal = node.terminal_index();
        if terminal != NOT_TERMINAL {
            let slot = seen
                .get_mut(terminal as usize)
                .ok_or(LoadError::InvalidLayout("terminal index out of range"))?;
            if *slot {
                return Err(LoadError::InvalidLayout("duplicate terminal index"));
            }
            *slot = true;
            terminals += 1;
        }

        let mask = node.child_mask();
        if mask == 0 {
            continue;
        }
        if node.child_base() as usize != next_free {
            return Err(LoadError::InvalidLayout("child range is not contiguous"));
        }
        let end = next_free + node.child_count() as usize;
        if end > nodes.len() {
            return Err(LoadError::InvalidLayout("child range out of bounds"));
        }
        let mut child = next_free;
        for code in 0..32u8 {
            if mask & (1 << code) != 0 {
                if nodes[child].letter_from_parent() != code + 1 {
                    return Err(LoadError::InvalidLayout("letter does not match parent mask"));
                }
                child += 1;
            }
        }
        next_free = end;
    }
    if next_free != nodes.len() {
        return Err(LoadError::InvalidLayout("node is not reachable from the root"));
    }
    if terminals != word_count {
        return Err(LoadError::InvalidLayout("word index has no terminal node"));
    }
    Ok(())
}

/// Streaming raw-deflate inflater that writes into any sink and requires
/// the deflate stream to reach its end marker.
pub(crate) struct Inflater<W: Write> {
    state: Decompress,
    sink: W,
    out: Vec<u8>,
    done: bool,
}

impl<W: Write> Inflater<W> {
    pub(crate) fn new(sink: W) -> Self {
        Self {
            state: Decompress::new(false),
            sink,
            out: vec![0u8; INFLATE_CHUNK_SIZE],
            done: false,
        }
    }

    /// Runs one inflate step, returning `(consumed, produced)`.
    fn step(&mut self, input: &[u8]) -> Result<(usize, usize), LoadError> {
        let before_in = self.state.total_in();
        let before_out = self.state.total_out();
        let status = self
            .state
            .decompress(input, &mut self.out, FlushDecompress::None)
            .map_err(|e| LoadError::Decompression(e.to_string()))?;
        let consumed = (self.state.total_in() - before_in) as usize;
        let produced = (self.state.total_out() - before_out) as usize;
        self.sink.write_all(&self.out[..produced])?;
        if status == Status::StreamEnd {
            self.done = true;
        }
        Ok((consumed, produced))
    }

    /// Inflates the next piece of the compressed stream.
    pub(crate) fn feed(&mut self, mut input: &[u8]) -> Result<(), LoadError> {
        while !input.is_empty() {
            if self.done {
                return Err(LoadError::Decompression(
                    "trailing bytes after end of deflate stream".to_string(),
                ));
            }
            let (consumed, produced) = self.step(input)?;
            if consumed == 0 && produced == 0 && !self.done {
                return Err(LoadError::Decompression("inflate made no progress".to_string()));
            }
            input = &input[consumed..];
        }
        Ok(())
    }

    /// Drains buffered output and returns the sink. Fails if the stream
    /// stopped before its final block ended.
    pub(crate) fn finish(mut self) -> Result<W, LoadError> {
        while !self.done {
            let (_, produced) = self.step(&[])?;
            if produced == 0 && !self.done {
                return Err(LoadError::Decompression(
                    "deflate stream ended early".to_string(),
                ));
            }
        }
        Ok(self.sink)
    }
}
