//! Random access to the reference text.
//!
//! Matching-statistics length reconstruction compares query characters
//! against the reference, so it needs `char_at` over the full text without
//! holding it verbatim in RAM. The shipped implementation is a straight-line
//! program: a grammar whose rules each concatenate two earlier symbols, with
//! precomputed expansion lengths so a lookup walks one root-to-leaf path.
//! The sweep itself only depends on the [`CharAccess`] contract, which plain
//! byte slices also satisfy.

use crate::utils::encoding::{read_u32_le, read_u64_le, write_u32_le, write_u64_le};
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for grammar text files ("MSXS" in little-endian)
pub const SLP_MAGIC: u32 = 0x5358_534D;

/// Current version of the grammar text format
pub const SLP_VERSION: u32 = 1;

/// Symbol ids below this are terminal bytes; `FIRST_RULE + k` is rule k.
const FIRST_RULE: u64 = 256;

/// Reentrant random access to the reference text.
pub trait CharAccess: Sync {
    /// Text length n.
    fn text_len(&self) -> u64;

    /// Byte at position `i`, for `i` in `[0, n)`.
    fn char_at(&self, i: u64) -> u8;
}

impl CharAccess for [u8] {
    fn text_len(&self) -> u64 {
        self.len() as u64
    }

    fn char_at(&self, i: u64) -> u8 {
        self[i as usize]
    }
}

/// Grammar-compressed text with O(depth) `char_at`.
#[derive(Debug, Clone)]
pub struct SlpText {
    text_len: u64,
    root: u64,
    rules: Vec<(u64, u64)>,
    // Expansion length of each rule, computed at load.
    expansions: Vec<u64>,
}

impl SlpText {
    /// Build from a root symbol and rule list, validating that rules only
    /// reference terminals or earlier rules and that the root expands to
    /// `text_len` characters.
    pub fn from_rules(text_len: u64, root: u64, rules: Vec<(u64, u64)>) -> Result<Self> {
        let mut expansions = Vec::with_capacity(rules.len());
        for (k, &(left, right)) in rules.iter().enumerate() {
            let left_len = symbol_len(&expansions, left)
                .with_context(|| format!("grammar rule {} has a forward reference", k))?;
            let right_len = symbol_len(&expansions, right)
                .with_context(|| format!("grammar rule {} has a forward reference", k))?;
            expansions.push(left_len + right_len);
        }

        let root_len = symbol_len(&expansions, root).context("grammar root is undefined")?;
        if root_len != text_len {
            bail!(
                "grammar root expands to {} characters but the header promises {}",
                root_len,
                text_len
            );
        }
        Ok(Self {
            text_len,
            root,
            rules,
            expansions,
        })
    }

    /// Load `<ref>.slp`.
    pub fn load_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open grammar text {}", path.display()))?;
        Self::load(&mut BufReader::new(file))
            .with_context(|| format!("failed to parse grammar text {}", path.display()))
    }

    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = read_u32_le(reader)?;
        if magic != SLP_MAGIC {
            bail!("grammar text has bad magic number {:#010x}", magic);
        }
        let version = read_u32_le(reader)?;
        if version != SLP_VERSION {
            bail!("unsupported grammar text version {}", version);
        }
        let text_len = read_u64_le(reader)?;
        let root = read_u64_le(reader)?;
        let num_rules = read_u64_le(reader)? as usize;

        let mut rules = Vec::with_capacity(num_rules);
        for _ in 0..num_rules {
            let left = read_u64_le(reader)?;
            let right = read_u64_le(reader)?;
            rules.push((left, right));
        }
        Self::from_rules(text_len, root, rules)
    }

    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u32_le(writer, SLP_MAGIC)?;
        write_u32_le(writer, SLP_VERSION)?;
        write_u64_le(writer, self.text_len)?;
        write_u64_le(writer, self.root)?;
        write_u64_le(writer, self.rules.len() as u64)?;
        for &(left, right) in &self.rules {
            write_u64_le(writer, left)?;
            write_u64_le(writer, right)?;
        }
        Ok(())
    }

    /// Write `<ref>.slp`.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.serialize(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    fn len_of(&self, symbol: u64) -> u64 {
        if symbol < FIRST_RULE {
            1
        } else {
            self.expansions[(symbol - FIRST_RULE) as usize]
        }
    }
}

fn symbol_len(expansions: &[u64], symbol: u64) -> Result<u64> {
    if symbol < FIRST_RULE {
        return Ok(1);
    }
    let k = (symbol - FIRST_RULE) as usize;
    if k >= expansions.len() {
        bail!("symbol {} references rule {} which is not yet defined", symbol, k);
    }
    Ok(expansions[k])
}

impl CharAccess for SlpText {
    fn text_len(&self) -> u64 {
        self.text_len
    }

    fn char_at(&self, i: u64) -> u8 {
        debug_assert!(i < self.text_len);
        let mut symbol = self.root;
        let mut i = i;
        while symbol >= FIRST_RULE {
            let (left, right) = self.rules[(symbol - FIRST_RULE) as usize];
            let left_len = self.len_of(left);
            if i < left_len {
                symbol = left;
            } else {
                i -= left_len;
                symbol = right;
            }
        }
        symbol as u8
    }
}

/// Build a balanced grammar over a plain text.
///
/// This is not a compressor; it exists so small references and test
/// fixtures can exercise the same grammar walk the production artifacts
/// use. Adjacent symbols are paired level by level until one root remains.
pub fn build_balanced_grammar(text: &[u8]) -> Result<SlpText> {
    if text.is_empty() {
        bail!("cannot build a grammar over an empty text");
    }

    let mut rules: Vec<(u64, u64)> = Vec::new();
    let mut level: Vec<u64> = text.iter().map(|&b| b as u64).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        let mut iter = level.chunks_exact(2);
        for pair in &mut iter {
            rules.push((pair[0], pair[1]));
            next.push(FIRST_RULE + (rules.len() - 1) as u64);
        }
        if let [odd] = iter.remainder() {
            next.push(*odd);
        }
        level = next;
    }

    SlpText::from_rules(text.len() as u64, level[0], rules)
}
