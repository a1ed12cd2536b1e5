//! The runtime handle: loads the compressed artifact once and converts
//! mnemonics to wordlist indices and back.

use std::io::{self, Write};
use std::mem;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::OnceCell;
use zeroize::Zeroizing;

use crate::serial::{parse_header, validate, Inflater, HEADER_SIZE};
use crate::view::TrieView;
use crate::wordlist::ENGLISH_ARTIFACT;
use crate::{LoadError, Node, TrieError};

/// Number of compressed bytes read from the source per step.
pub const READ_CHUNK_SIZE: usize = 8192;

static SHARED: OnceCell<MnemonicTrie> = OnceCell::const_new();

/// Loads the process-wide trie from `source`, or from the bundled English
/// artifact when `source` is `None`.
///
/// Concurrent first callers wait on the same load. Once a load succeeds,
/// later calls return the same handle and ignore `source`. A failed load
/// leaves nothing cached, so calling again retries.
pub async fn create<R>(source: Option<R>) -> Result<&'static MnemonicTrie, LoadError>
where
    R: AsyncRead + Unpin,
{
    SHARED
        .get_or_try_init(|| async move {
            match source {
                Some(reader) => MnemonicTrie::load(reader).await,
                None => MnemonicTrie::load(ENGLISH_ARTIFACT).await,
            }
        })
        .await
}

/// Returns the process-wide trie, loading the bundled English artifact on
/// first use.
pub async fn shared() -> Result<&'static MnemonicTrie, LoadError> {
    create(None::<&[u8]>).await
}

/// Growable byte sink backed by `u32` storage, so its contents can be
/// viewed as `Node`s and `u16`s in place.
struct AlignedBuf {
    words: Vec<u32>,
    len: usize,
}

impl AlignedBuf {
    fn new() -> Self {
        Self {
            words: Vec::new(),
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        // SAFETY: `len` never exceeds the byte length of `words`; u8 has no
        // alignment requirement.
        unsafe { std::slice::from_raw_parts(self.words.as_ptr() as *const u8, self.len) }
    }
}

impl Write for AlignedBuf {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let new_len = self.len + data.len();
        let needed = new_len.div_ceil(4);
        if needed > self.words.len() {
            self.words.resize(needed.max(self.words.len() * 2), 0);
        }
        // SAFETY: `words` now covers at least `new_len` bytes.
        let bytes = unsafe {
            std::slice::from_raw_parts_mut(self.words.as_mut_ptr() as *mut u8, new_len)
        };
        bytes[self.len..].copy_from_slice(data);
        self.len = new_len;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A loaded, read-only trie.
///
/// The node table is the inflated artifact itself, viewed in place. Lookups
/// take `&self` and never lock, so one handle can serve every thread.
pub struct MnemonicTrie {
    buf: AlignedBuf,
    node_count: usize,
    word_count: usize,
    /// Parent node ID per node, derived at load for reverse lookups.
    parents: Vec<u16>,
    max_word_len: usize,
}

impl MnemonicTrie {
    /// Streams a raw-deflate artifact from `reader`, inflating it as it
    /// arrives.
    pub async fn load<R>(mut reader: R) -> Result<Self, LoadError>
    where
        R: AsyncRead + Unpin,
    {
        let mut inflater = Inflater::new(AlignedBuf::new());
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        let mut compressed = 0usize;
        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            compressed += n;
            inflater.feed(&chunk[..n])?;
            trace!("inflated {compressed} compressed bytes so far");
        }
        let buf = inflater.finish()?;
        Self::from_inflated(buf, compressed)
    }

    /// Inflates a raw-deflate artifact already in memory.
    pub fn from_compressed(compressed: &[u8]) -> Result<Self, LoadError> {
        let mut inflater = Inflater::new(AlignedBuf::new());
        inflater.feed(compressed)?;
        let buf = inflater.finish()?;
        Self::from_inflated(buf, compressed.len())
    }

    fn from_inflated(buf: AlignedBuf, compressed: usize) -> Result<Self, LoadError> {
        let (node_count, word_count) = parse_header(buf.as_bytes())?;
        let (parents, max_word_len) = {
            let nodes = nodes_in(&buf, node_count);
            validate(nodes, word_count)?;
            derive_parents(nodes)
        };
        debug!(
            "loaded trie: {} compressed bytes, {} inflated bytes, {} nodes, {} words",
            compressed, buf.len, node_count, word_count
        );
        Ok(Self {
            buf,
            node_count,
            word_count,
            parents,
            max_word_len,
        })
    }

    #[inline]
    fn view(&self) -> TrieView<'_> {
        let nodes = nodes_in(&self.buf, self.node_count);
        let offset = HEADER_SIZE + self.node_count * mem::size_of::<Node>();
        // SAFETY: parse_header checked the word-end table lies within the
        // buffer at `offset`, which is 4-aligned since `words` is u32-backed.
        let word_ends = unsafe {
            std::slice::from_raw_parts(
                self.buf.words.as_ptr().cast::<u8>().add(offset) as *const u16,
                self.word_count,
            )
        };
        TrieView::new(nodes, word_ends)
    }

    /// Returns the number of nodes in the trie.
    pub fn num_nodes(&self) -> usize {
        self.node_count
    }

    /// Returns the number of words in the trie.
    pub fn num_words(&self) -> usize {
        self.word_count
    }

    /// Returns the wordlist index of `word`.
    #[inline]
    pub fn find_word_index(&self, word: &[u8]) -> Result<u16, TrieError> {
        self.view().find_word_index(word)
    }

    /// Returns true if `word` is a complete word of the list.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.find_word_index(word.as_bytes()).is_ok()
    }

    /// Returns the bytes of the word at `index`.
    pub fn reconstruct_word(&self, index: u16) -> Result<Zeroizing<Vec<u8>>, TrieError> {
        let mut out = Zeroizing::new(Vec::with_capacity(self.max_word_len));
        self.view().append_word(index, &self.parents, &mut out)?;
        Ok(out)
    }

    /// Converts a space-separated mnemonic to one wordlist index per word.
    ///
    /// Empty tokens from repeated spaces are skipped. Fails on the first
    /// unknown word without saying which.
    pub fn convert_mnemonic_to_wordlist_indices(
        &self,
        mnemonic: &[u8],
    ) -> Result<Zeroizing<Vec<u16>>, TrieError> {
        let words = || mnemonic.split(|&b| b == b' ').filter(|w| !w.is_empty());
        let view = self.view();
        let mut indices = Zeroizing::new(Vec::with_capacity(words().count()));
        for word in words() {
            indices.push(view.find_word_index(word)?);
        }
        Ok(indices)
    }

    /// Converts wordlist indices to a mnemonic joined by single spaces.
    pub fn convert_indices_to_mnemonic(
        &self,
        indices: &[u16],
    ) -> Result<Zeroizing<Vec<u8>>, TrieError> {
        let view = self.view();
        // Sized up front so the buffer never reallocates and strands a copy.
        let capacity = indices.len() * (self.max_word_len + 1);
        let mut out = Zeroizing::new(Vec::with_capacity(capacity));
        for (i, &index) in indices.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }
            view.append_word(index, &self.parents, &mut out)?;
        }
        Ok(out)
    }

    /// Converts a mnemonic to packed little-endian `u16` indices.
    pub fn words_to_indices(&self, mnemonic: &[u8]) -> Result<Zeroizing<Vec<u8>>, TrieError> {
        let indices = self.convert_mnemonic_to_wordlist_indices(mnemonic)?;
        let mut out = Zeroizing::new(vec![0u8; indices.len() * 2]);
        LittleEndian::write_u16_into(&indices, &mut out);
        Ok(out)
    }

    /// Converts packed little-endian `u16` indices to a mnemonic.
    pub fn indices_to_words(&self, index_bytes: &[u8]) -> Result<Zeroizing<Vec<u8>>, TrieError> {
        if !index_bytes.len().is_multiple_of(2) {
            return Err(TrieError::InvalidMnemonic);
        }
        let mut indices = Zeroizing::new(vec![0u16; index_bytes.len() / 2]);
        LittleEndian::read_u16_into(index_bytes, &mut indices);
        self.convert_indices_to_mnemonic(&indices)
    }
}

fn nodes_in(buf: &AlignedBuf, node_count: usize) -> &[Node] {
    // SAFETY:
    // - `Node` is `#[repr(C)]` with two `u32` fields, size 8, align 4, no padding
    // - `words` is u32-backed and the header is 4 bytes, so the table is aligned
    // - parse_header checked `node_count` nodes fit after the header
    // - the crate only builds on little-endian targets, where the in-memory
    //   layout matches the serialized LE format
    unsafe {
        std::slice::from_raw_parts(
            buf.words.as_ptr().add(HEADER_SIZE / 4) as *const Node,
            node_count,
        )
    }
}

/// Returns the parent of every node and the depth of the deepest node.
/// Expects a validated table, where every child ID is above its parent's.
fn derive_parents(nodes: &[Node]) -> (Vec<u16>, usize) {
    let mut parents = vec![0u16; nodes.len()];
    let mut depths = vec![0usize; nodes.len()];
    let mut max_depth = 0;
    for (id, node) in nodes.iter().enumerate() {
        let base = node.child_base() as usize;
        let depth = depths[id] + 1;
        for child in base..base + node.child_count() as usize {
            parents[child] = id as u16;
            depths[child] = depth;
            max_depth = max_depth.max(depth);
        }
    }
    (parents, max_depth)
}
