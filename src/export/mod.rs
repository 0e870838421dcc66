//! Artifact builder: the four JSON documents of a successful classification.
//!
//! Rendering and writing are separate steps. Every document is serialized in
//! memory first, so a serialization failure leaves the output directory
//! untouched.
//!
//! # Example
//!
//! ```no_run
//! use bookseg::{BlockStore, ClassifierConfig, classify};
//! use bookseg::export::Artifacts;
//!
//! let store = BlockStore::open("blocks.jsonl")?;
//! let classification = classify(&store, &ClassifierConfig::default())?;
//! let digests = Artifacts::from_classification(&classification)
//!     .render()?
//!     .write_to_dir("out")?;
//! for digest in digests {
//!     println!("{}  {}", digest.sha1, digest.file);
//! }
//! # Ok::<(), bookseg::Error>(())
//! ```

mod documents;

use std::fs;
use std::path::Path;

use serde::Serialize;

pub use documents::{ChaptersDocument, MatterDocument, TocDocument, TocEntryDocument};

use crate::classify::Classification;
use crate::error::Result;

pub const TOC_FILE: &str = "toc.json";
pub const CHAPTERS_FILE: &str = "chapters.json";
pub const FRONT_MATTER_FILE: &str = "front_matter.json";
pub const BACK_MATTER_FILE: &str = "back_matter.json";

/// Borrowed views of a classification, ready to serialize.
#[derive(Debug)]
pub struct Artifacts<'a> {
    pub toc: TocDocument<'a>,
    pub chapters: ChaptersDocument<'a>,
    pub front_matter: MatterDocument<'a>,
    pub back_matter: MatterDocument<'a>,
}

impl<'a> Artifacts<'a> {
    pub fn from_classification(classification: &'a Classification) -> Self {
        Self {
            toc: TocDocument::new(classification),
            chapters: ChaptersDocument {
                chapters: &classification.chapters,
            },
            front_matter: &classification.front_matter,
            back_matter: &classification.back_matter,
        }
    }

    /// Serialize all four documents, in file order.
    pub fn render(&self) -> Result<RenderedArtifacts> {
        Ok(RenderedArtifacts {
            files: vec![
                RenderedFile::new(TOC_FILE, &self.toc)?,
                RenderedFile::new(CHAPTERS_FILE, &self.chapters)?,
                RenderedFile::new(FRONT_MATTER_FILE, self.front_matter)?,
                RenderedFile::new(BACK_MATTER_FILE, self.back_matter)?,
            ],
        })
    }
}

/// One serialized artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub file: &'static str,
    pub contents: String,
}

impl RenderedFile {
    fn new<T: Serialize + ?Sized>(file: &'static str, document: &T) -> Result<Self> {
        let mut contents = serde_json::to_string_pretty(document)?;
        contents.push('\n');
        Ok(Self { file, contents })
    }

    pub fn sha1(&self) -> String {
        sha1_smol::Sha1::from(self.contents.as_bytes())
            .digest()
            .to_string()
    }
}

/// All four artifacts, serialized and not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    files: Vec<RenderedFile>,
}

impl RenderedArtifacts {
    pub fn files(&self) -> &[RenderedFile] {
        &self.files
    }

    pub fn get(&self, file: &str) -> Option<&RenderedFile> {
        self.files.iter().find(|f| f.file == file)
    }

    /// Content digests without writing anything.
    pub fn digests(&self) -> Vec<ArtifactDigest> {
        self.files
            .iter()
            .map(|f| ArtifactDigest {
                file: f.file,
                sha1: f.sha1(),
            })
            .collect()
    }

    /// Write every artifact into `dir`, creating it if needed.
    ///
    /// Each file is staged under a temporary name and renamed into place once
    /// all four are on disk.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<ArtifactDigest>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut staged = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let tmp = dir.join(format!(".{}.tmp", file.file));
            if let Err(e) = fs::write(&tmp, &file.contents) {
                for path in &staged {
                    let _ = fs::remove_file(path);
                }
                return Err(e.into());
            }
            staged.push(tmp);
        }
        for (tmp, file) in staged.iter().zip(&self.files) {
            fs::rename(tmp, dir.join(file.file))?;
            log::debug!("wrote {}", dir.join(file.file).display());
        }

        log::info!("wrote {} artifacts to {}", self.files.len(), dir.display());
        Ok(self.digests())
    }
}

/// SHA-1 of one written artifact, for content-addressed caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDigest {
    pub file: &'static str,
    pub sha1: String,
}

/// Render and write a classification's artifacts into `dir`.
pub fn write_artifacts(
    classification: &Classification,
    dir: impl AsRef<Path>,
) -> Result<Vec<ArtifactDigest>> {
    Artifacts::from_classification(classification)
        .render()?
        .write_to_dir(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockStore, ClassifierConfig, classify};

    fn sample() -> Classification {
        let store = BlockStore::from_texts([
            "Table of Contents",
            "1. Arrival",
            "2. Departure",
            "Chapter 1 Arrival",
            "...",
            "Chapter 2: Departure",
            "...",
        ]);
        classify(&store, &ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_render_file_order() {
        let classification = sample();
        let rendered = Artifacts::from_classification(&classification)
            .render()
            .unwrap();
        let names: Vec<_> = rendered.files().iter().map(|f| f.file).collect();
        assert_eq!(
            names,
            vec![TOC_FILE, CHAPTERS_FILE, FRONT_MATTER_FILE, BACK_MATTER_FILE]
        );
        assert!(rendered.files().iter().all(|f| f.contents.ends_with("}\n")));
    }

    #[test]
    fn test_toc_document() {
        let classification = sample();
        let rendered = Artifacts::from_classification(&classification)
            .render()
            .unwrap();
        let toc: serde_json::Value =
            serde_json::from_str(&rendered.get(TOC_FILE).unwrap().contents).unwrap();
        assert_eq!(toc["span_blocks"], serde_json::json!([0, 2]));
        assert_eq!(toc["entries"][0]["raw_text"], "1. Arrival");
        assert_eq!(toc["entries"][0]["normalized_title"], "arrival");
        assert_eq!(toc["entries"][1]["matched_heading_block"], 5);
        assert_eq!(toc["entries"][1]["pass"], "exact");
        assert_eq!(
            toc["entries"][1]["ordinal"],
            serde_json::json!({"kind": "decimal", "value": 2})
        );
    }

    #[test]
    fn test_empty_back_matter_document() {
        let classification = sample();
        let rendered = Artifacts::from_classification(&classification)
            .render()
            .unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&rendered.get(BACK_MATTER_FILE).unwrap().contents).unwrap();
        assert_eq!(
            back,
            serde_json::json!({"span_blocks": null, "paragraphs": [], "warnings": []})
        );
    }

    #[test]
    fn test_digest_is_sha1_hex() {
        let classification = sample();
        let digests = Artifacts::from_classification(&classification)
            .render()
            .unwrap()
            .digests();
        assert_eq!(digests.len(), 4);
        for digest in &digests {
            assert_eq!(digest.sha1.len(), 40);
            assert!(digest.sha1.bytes().all(|b| b.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let digests = write_artifacts(&sample(), &out).unwrap();
        for digest in &digests {
            let bytes = std::fs::read(out.join(digest.file)).unwrap();
            assert_eq!(sha1_smol::Sha1::from(&bytes).digest().to_string(), digest.sha1);
        }
        let leftovers = std::fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
