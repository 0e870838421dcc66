//! Core data model for document structure classification.
//!
//! This module contains:
//! - The block store (the classifier's only input)
//! - TOC entries, heading candidates and matches
//! - Chapters, front/back matter and warnings

mod block;
mod structure;

pub use block::{Block, BlockStore};

pub use structure::{
    BackMatter, Chapter, FrontMatter, HeadingCandidate, HeadingKind, Match, MatchPass, Matter,
    OrdinalKind, OrdinalValue, TocEntry, TocWindow, Warning, WarningCode,
};
