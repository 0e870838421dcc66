//! The block store: the immutable, ordered input of the classifier.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{decode_text, lines_numbered};

/// One indexed unit of extracted text, typically a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u32,
    pub text: String,
}

impl Block {
    pub fn new(index: u32, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// An order-preserving sequence of blocks whose indices are dense from 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    /// Wrap a block list, rejecting anything but dense indices starting at 0.
    pub fn new(blocks: Vec<Block>) -> Result<Self> {
        if u32::try_from(blocks.len()).is_err() {
            return Err(Error::invalid_input(format!(
                "{} blocks exceed the u32 index space",
                blocks.len()
            )));
        }
        for (position, block) in blocks.iter().enumerate() {
            if block.index as usize != position {
                return Err(Error::invalid_input(format!(
                    "block at position {position} has index {}; indices must be dense and start at 0",
                    block.index
                )));
            }
        }
        Ok(Self { blocks })
    }

    /// Build a store from plain texts, numbering them in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let blocks = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Block::new(i as u32, text))
            .collect();
        Self { blocks }
    }

    /// Parse line-delimited JSON, one `{"index": .., "text": ..}` object per line.
    ///
    /// Blank lines are skipped. A UTF-8 byte order mark is tolerated.
    pub fn from_jsonl(bytes: &[u8]) -> Result<Self> {
        let text = decode_text(bytes);
        let mut blocks = Vec::new();
        for (number, line) in lines_numbered(&text) {
            if line.trim().is_empty() {
                continue;
            }
            let block: Block = serde_json::from_str(line)
                .map_err(|e| Error::invalid_input(format!("line {number}: {e}")))?;
            blocks.push(block);
        }
        Self::new(blocks)
    }

    /// Read and parse a line-delimited JSON block file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_jsonl(&bytes)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Clone the blocks in `start..=end`. Empty when the range is out of bounds.
    pub fn span(&self, start: u32, end: u32) -> Vec<Block> {
        let (start, end) = (start as usize, end as usize);
        if start > end || end >= self.blocks.len() {
            return Vec::new();
        }
        self.blocks[start..=end].to_vec()
    }
}

impl<'a> IntoIterator for &'a BlockStore {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
