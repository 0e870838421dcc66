//! Order check between the TOC and the body.

use crate::error::{Error, Result};
use crate::model::Match;

/// Require matched heading blocks to increase strictly in TOC order.
///
/// Out-of-order matches are never repaired: sorting by body position would
/// silently overrule the TOC.
pub fn enforce_monotonic(matches: &[Match]) -> Result<()> {
    for pair in matches.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);
        if cur.heading_block_index <= prev.heading_block_index {
            log::error!(
                "entry {} matched block {} but entry {} already matched block {}",
                cur.toc_entry_index,
                cur.heading_block_index,
                prev.toc_entry_index,
                prev.heading_block_index
            );
            return Err(Error::NonMonotonicOrder {
                entry_index: cur.toc_entry_index,
                expected_after: prev.heading_block_index,
                got: cur.heading_block_index,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchPass;

    fn matches(blocks: &[u32]) -> Vec<Match> {
        blocks
            .iter()
            .enumerate()
            .map(|(i, &block)| Match {
                toc_entry_index: i,
                heading_block_index: block,
                pass: MatchPass::Exact,
            })
            .collect()
    }

    #[test]
    fn test_increasing_passes() {
        enforce_monotonic(&matches(&[3, 5, 40])).unwrap();
        enforce_monotonic(&matches(&[7])).unwrap();
        enforce_monotonic(&[]).unwrap();
    }

    #[test]
    fn test_swap_fails() {
        let err = enforce_monotonic(&matches(&[3, 20, 9])).unwrap_err();
        match err {
            Error::NonMonotonicOrder { entry_index, expected_after, got } => {
                assert_eq!(entry_index, 2);
                assert_eq!(expected_after, 20);
                assert_eq!(got, 9);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_equal_blocks_fail() {
        let err = enforce_monotonic(&matches(&[4, 4])).unwrap_err();
        assert_eq!(err.kind(), "non_monotonic_order");
    }
}
