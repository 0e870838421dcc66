//! Turn validated matches into front matter, chapters and back matter.

use std::collections::BTreeSet;

use crate::config::BackMatterConfig;
use crate::model::{
    BackMatter, BlockStore, Chapter, FrontMatter, HeadingCandidate, Match, Matter, TocWindow,
    Warning, WarningCode,
};
use crate::normalize::normalize_key;

/// Contiguous spans of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub front_matter: FrontMatter,
    pub chapters: Vec<Chapter>,
    pub back_matter: BackMatter,
}

/// Split the store at the matched heading blocks.
///
/// `matches` must already be monotonic. Front matter runs up to the first
/// matched heading and leaves out the TOC span; each chapter runs up to the
/// next matched heading, and the last one to the end of the document unless
/// the tail refinement finds back matter.
pub fn segment(
    store: &BlockStore,
    toc: Option<&TocWindow>,
    matches: &[Match],
    headings: &[HeadingCandidate],
    back_matter: &BackMatterConfig,
) -> Segmentation {
    let total = store.len() as u32;
    let first_heading = matches.first().map_or(total, |m| m.heading_block_index);

    let front_matter = Matter {
        span_blocks: (first_heading > 0).then(|| [0, first_heading - 1]),
        paragraphs: store
            .iter()
            .take(first_heading as usize)
            .filter(|b| !toc.is_some_and(|w| w.contains(b.index)))
            .cloned()
            .collect(),
        warnings: Vec::new(),
    };

    let mut chapters: Vec<Chapter> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let start = m.heading_block_index;
            let end = matches
                .get(i + 1)
                .map_or(total - 1, |next| next.heading_block_index - 1);
            let title = headings
                .binary_search_by_key(&start, |h| h.block_index)
                .map(|pos| headings[pos].display_title.clone())
                .unwrap_or_default();
            Chapter {
                chapter_index: i as u32,
                chapter_number: i as u32 + 1,
                title,
                start_block: start,
                end_block: end,
                paragraphs: Vec::new(),
            }
        })
        .collect();

    let mut back = Matter::default();
    if back_matter.enabled
        && let Some(last) = chapters.last_mut()
        && let Some(start) = find_back_matter(store, last, back_matter)
    {
        log::info!(
            "back matter from block {start}; chapter {} now ends at block {}",
            last.chapter_number,
            start - 1
        );
        last.end_block = start - 1;
        back = Matter {
            span_blocks: Some([start, total - 1]),
            paragraphs: store.span(start, total - 1),
            warnings: vec![
                Warning::at(
                    WarningCode::BackMatterDetected,
                    start,
                    "back matter split from the last chapter",
                )
                .logged(),
            ],
        };
    }

    for chapter in &mut chapters {
        chapter.paragraphs = store.span(chapter.start_block, chapter.end_block);
    }

    Segmentation {
        front_matter,
        chapters,
        back_matter: back,
    }
}

/// First block after the last chapter's heading that is a back-matter heading.
fn find_back_matter(store: &BlockStore, last: &Chapter, config: &BackMatterConfig) -> Option<u32> {
    let keys: BTreeSet<String> = config
        .headings
        .iter()
        .map(|h| normalize_key(h))
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return None;
    }
    store
        .span(last.start_block + 1, last.end_block)
        .into_iter()
        .find(|b| keys.contains(&normalize_key(&b.text)))
        .map(|b| b.index)
}
