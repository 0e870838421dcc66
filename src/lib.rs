//! # bookseg
//!
//! Deterministic structure classification for book-length text.
//!
//! Takes the ordered text blocks extracted from a book and splits them into
//! front matter, a table of contents, chapters and back matter. Chapters come
//! from reconciling the table of contents with the headings in the body; when
//! the two disagree, classification fails instead of guessing.
//!
//! ## Features
//!
//! - Bounded table of contents detection (dot leaders, page numbers, bullets)
//! - Chapter, prologue and epilogue headings from a configurable [`Grammar`]
//! - Three-pass matching: exact title, chapter number, then fuzzy title
//! - Byte-identical JSON artifacts for identical input
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookseg::{BlockStore, ClassifierConfig, classify, write_artifacts};
//!
//! let store = BlockStore::open("blocks.jsonl")?;
//! let classification = classify(&store, &ClassifierConfig::default())?;
//! for chapter in &classification.chapters {
//!     println!("{:>3}  {}", chapter.chapter_number, chapter.title);
//! }
//! write_artifacts(&classification, "out")?;
//! # Ok::<(), bookseg::Error>(())
//! ```
//!
//! ## Failure
//!
//! Every [`Error`] names the block or entry responsible, and
//! [`Error::report`] turns it into a serializable [`ErrorReport`]. A missing
//! or too-short table of contents is not an error: the run succeeds with zero
//! chapters and a warning.

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod normalize;
pub(crate) mod util;

pub use classify::{Classification, classify};
pub use config::{BackMatterConfig, ClassifierConfig, FuzzyConfig, Grammar};
pub use error::{Error, ErrorReport, Result};
pub use export::{ArtifactDigest, Artifacts, RenderedArtifacts, write_artifacts};
pub use model::{
    BackMatter, Block, BlockStore, Chapter, FrontMatter, HeadingCandidate, HeadingKind, Match,
    MatchPass, Matter, OrdinalKind, OrdinalValue, TocEntry, TocWindow, Warning, WarningCode,
};
pub use normalize::{NormalizedTitle, normalize};
