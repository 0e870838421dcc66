//! Body heading scanner.

use super::patterns::{CompiledGrammar, collapse_whitespace};
use crate::error::{Error, Result};
use crate::model::{Block, BlockStore, HeadingCandidate, TocWindow};

/// Find every heading outside the TOC window, in document order.
///
/// A block is a heading when its first line matches the grammar. A block that
/// matches twice (a second heading line, or a heading nested in the first
/// heading's title) is rejected with [`Error::MultipleHeadingsInBlock`]: picking
/// one of the two would be a guess.
pub fn scan_headings(
    store: &BlockStore,
    grammar: &CompiledGrammar,
    toc: Option<&TocWindow>,
) -> Result<Vec<HeadingCandidate>> {
    let mut headings = Vec::new();
    for block in store {
        if toc.is_some_and(|window| window.contains(block.index)) {
            continue;
        }
        if let Some(heading) = scan_block(block, grammar)? {
            log::debug!(
                "{} heading at block {}: {:?}",
                heading.kind,
                block.index,
                heading.display_title
            );
            headings.push(heading);
        }
    }
    log::info!("found {} heading candidates", headings.len());
    Ok(headings)
}

fn scan_block(block: &Block, grammar: &CompiledGrammar) -> Result<Option<HeadingCandidate>> {
    let mut lines = block.text.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    let Some(heading) = grammar.match_line(first) else {
        return Ok(None);
    };

    let ambiguous =
        grammar.residual_is_heading(&heading) || lines.any(|line| grammar.match_line(line).is_some());
    if ambiguous {
        log::error!("block {} holds more than one heading", block.index);
        return Err(Error::MultipleHeadingsInBlock {
            block_index: block.index,
        });
    }

    Ok(Some(HeadingCandidate {
        block_index: block.index,
        normalized_title: heading.title,
        ordinal: heading.ordinal,
        kind: heading.kind,
        display_title: collapse_whitespace(first),
    }))
}
