//! Binary dictionary artifact: header validation, POS table, and the
//! memory-mapped double-array trie. Mirrors
//! `lindera-core/src/prefix_dict.rs` (trie lookup + `(offset << 5) | len`
//! packing) and `lindera-dictionary/src/util.rs`'s `Data` enum (mmap-or-
//! owned-bytes storage), adapted to a single-file layout.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use yada::DoubleArray;

use crate::error::{DictionaryError, InputError};
use crate::segmenter;
use crate::token::Token;
use crate::word_entry::WordEntry;

const MAGIC: &[u8; 8] = b"HIMOTKSP";
const SUPPORTED_VERSION: u32 = 1;
const HEADER_LEN: usize = 0x2C;
const FLAG_HAS_POS_TABLE: u32 = 1;

/// Backing storage for the mapped artifact: either an owned buffer (tests,
/// small embedded dictionaries) or a live file mapping.
enum Data {
    Vec(Vec<u8>),
    Map(Mmap),
}

impl Deref for Data {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            Data::Vec(v) => v,
            Data::Map(m) => m,
        }
    }
}

/// An open dictionary handle. Read-only and safe to share across threads
/// once constructed: all fields are immutable after `open`.
pub struct Dictionary {
    data: Data,
    trie: DoubleArray<Vec<u8>>,
    vals_off: usize,
    pos_names: Vec<String>,
}

fn default_pos_names() -> Vec<String> {
    let mut names = vec![String::from("unc"); 256];
    names[0] = "unk".to_string();
    for (id, name) in [(1, "n"), (2, "n-adv"), (3, "n-pref"), (4, "n-suf"), (5, "n-t")] {
        names[id] = name.to_string();
    }
    for id in 10..=30 {
        names[id] = "v".to_string();
    }
    for (id, name) in [(40, "adj-i"), (41, "adj-na"), (42, "adj-no")] {
        names[id] = name.to_string();
    }
    for id in 43..=46 {
        names[id] = "adj".to_string();
    }
    names[50] = "adv".to_string();
    names[51] = "adv-to".to_string();
    for (id, name) in [(60, "aux"), (61, "aux-v"), (62, "aux-adj")] {
        names[id] = name.to_string();
    }
    for (id, name) in [(70, "conj"), (71, "cop"), (72, "ctr"), (73, "exp"), (74, "int")] {
        names[id] = name.to_string();
    }
    for (id, name) in [(80, "pn"), (81, "pref"), (82, "prt"), (83, "suf"), (84, "unc")] {
        names[id] = name.to_string();
    }
    names[255] = "unk".to_string();
    names
}

impl Dictionary {
    /// Opens and validates the binary dictionary artifact at `path`. The
    /// file is memory-mapped; all bytes are validated here so later queries
    /// can assume validity.
    pub fn open(path: impl AsRef<Path>) -> Result<Dictionary, DictionaryError> {
        let path = path.as_ref();
        log::debug!("opening dictionary artifact at {}", path.display());
        let file = File::open(path).map_err(|_| DictionaryError::NotFound {
            path: path.display().to_string(),
        })?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|err| {
            DictionaryError::corrupt(format!("failed to map dictionary file: {err}"))
        })?;
        let dict = Self::from_data(Data::Map(mmap))?;
        log::debug!("dictionary ready, {} pos entries", dict.pos_names.len());
        Ok(dict)
    }

    /// Builds a `Dictionary` directly from an in-memory byte buffer in the
    /// same layout as `open` expects on disk. Used by tests and by callers
    /// that embed a dictionary at compile time rather than loading it from
    /// disk.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Dictionary, DictionaryError> {
        Self::from_data(Data::Vec(bytes))
    }

    fn from_data(data: Data) -> Result<Dictionary, DictionaryError> {
        let bytes: &[u8] = &data;
        if bytes.len() < HEADER_LEN {
            return Err(DictionaryError::corrupt("file shorter than header"));
        }
        if &bytes[0..8] != MAGIC {
            return Err(DictionaryError::corrupt("bad magic"));
        }
        let version = LittleEndian::read_u32(&bytes[0x08..0x0C]);
        if version != SUPPORTED_VERSION {
            return Err(DictionaryError::VersionMismatch {
                found: version,
                expected: SUPPORTED_VERSION,
            });
        }
        let flags = LittleEndian::read_u32(&bytes[0x0C..0x10]);
        let record_size = LittleEndian::read_u32(&bytes[0x10..0x14]);
        if record_size as usize != WordEntry::SERIALIZED_LEN {
            return Err(DictionaryError::corrupt(format!(
                "unexpected record_size {record_size}"
            )));
        }
        let pos_table_off = LittleEndian::read_u64(&bytes[0x14..0x1C]) as usize;
        let trie_off = LittleEndian::read_u64(&bytes[0x1C..0x24]) as usize;
        let trie_len = LittleEndian::read_u64(&bytes[0x24..0x2C]) as usize;

        let trie_end = trie_off
            .checked_add(trie_len)
            .ok_or_else(|| DictionaryError::corrupt("trie offset overflow"))?;
        if trie_end > bytes.len() {
            return Err(DictionaryError::corrupt("trie region out of bounds"));
        }
        if trie_len < 8 {
            return Err(DictionaryError::corrupt("trie region too short"));
        }

        let pos_names = if flags & FLAG_HAS_POS_TABLE != 0 {
            parse_pos_table(bytes, pos_table_off)?
        } else {
            default_pos_names()
        };

        let trie_region = &bytes[trie_off..trie_end];
        let da_len = LittleEndian::read_u64(&trie_region[0..8]) as usize;
        if 8 + da_len > trie_region.len() {
            return Err(DictionaryError::corrupt("double-array region out of bounds"));
        }
        let da_bytes = trie_region[8..8 + da_len].to_vec();
        let trie = DoubleArray::new(da_bytes);
        let vals_off = trie_off + 8 + da_len;

        Ok(Dictionary {
            data,
            trie,
            vals_off,
            pos_names,
        })
    }

    /// Looks up every dictionary key that is a prefix of `suffix`, yielding
    /// `(char_length, WordEntry)` pairs in insertion order for each match.
    /// Lazily evaluated; allocates only the returned sequence.
    pub fn prefix_lookup<'a>(
        &'a self,
        suffix: &'a str,
    ) -> impl Iterator<Item = (usize, WordEntry)> + 'a {
        let vals_data: &'a [u8] = &self.data[self.vals_off..];
        self.trie
            .common_prefix_search(suffix)
            .flat_map(move |(packed, byte_len)| {
                let count = packed & ((1u32 << 5) - 1u32);
                let index = packed >> 5u32;
                let char_len = suffix[..byte_len].chars().count();
                let offset_bytes = index as usize * WordEntry::SERIALIZED_LEN;
                let record_bytes = &vals_data[offset_bytes..];
                (0..count as usize).map(move |i| {
                    (
                        char_len,
                        WordEntry::deserialize(&record_bytes[WordEntry::SERIALIZED_LEN * i..]),
                    )
                })
            })
    }

    pub fn pos_name(&self, pos_id: u8) -> &str {
        self.pos_names
            .get(pos_id as usize)
            .map(String::as_str)
            .unwrap_or("unk")
    }

    /// Segments `text` into its single best token sequence. Empty input
    /// yields an empty sequence.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        segmenter::tokenize(self, text)
    }

    /// Segments `text` into up to `limit` ranked `(tokens, total_score)`
    /// pairs, best first. `limit` must be at least 1.
    pub fn analyze(&self, text: &str, limit: usize) -> Result<Vec<(Vec<Token>, i64)>, InputError> {
        if limit == 0 {
            return Err(InputError::Empty);
        }
        Ok(segmenter::analyze(self, text, limit))
    }

    /// Releases the mapping. After `close`, the handle is dropped; there is
    /// no further query surface to guard, since the open/closed state is
    /// enforced by ownership rather than a runtime flag.
    pub fn close(self) {
        drop(self);
    }
}

fn parse_pos_table(bytes: &[u8], off: usize) -> Result<Vec<String>, DictionaryError> {
    if off + 2 > bytes.len() {
        return Err(DictionaryError::corrupt("pos table offset out of bounds"));
    }
    let count = LittleEndian::read_u16(&bytes[off..off + 2]) as usize;
    let mut cursor = off + 2;
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        if cursor + 2 > bytes.len() {
            return Err(DictionaryError::corrupt("pos table entry length out of bounds"));
        }
        let len = LittleEndian::read_u16(&bytes[cursor..cursor + 2]) as usize;
        cursor += 2;
        if cursor + len > bytes.len() {
            return Err(DictionaryError::corrupt("pos table entry bytes out of bounds"));
        }
        let name = std::str::from_utf8(&bytes[cursor..cursor + len])
            .map_err(|_| DictionaryError::corrupt("pos table entry is not valid UTF-8"))?
            .to_string();
        cursor += len;
        names.push(name);
    }
    Ok(names)
}
