//! Overlap resolution across scanner passes.
//!
//! Each convention scanner returns candidates independently; this module
//! merges them with pass precedence. A candidate from a later pass that
//! intersects an already-accepted span is discarded, so explicit-fence
//! matches win over directive, dash-fence, and bare-keyword matches for the
//! same region, and the final set is pairwise non-overlapping.

use crate::CodeBlock;

fn intersects(a: &CodeBlock, b: &CodeBlock) -> bool {
    a.start < b.end && b.start < a.end
}

/// Merge candidate blocks from scanner passes in precedence order.
///
/// Returns blocks sorted ascending by start offset; sorting is stable so
/// equal starts keep discovery order.
pub fn merge_passes(passes: Vec<Vec<CodeBlock>>) -> Vec<CodeBlock> {
    let mut accepted: Vec<CodeBlock> = Vec::new();

    for pass in passes {
        for candidate in pass {
            if accepted.iter().any(|a| intersects(a, &candidate)) {
                continue;
            }
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|b| b.start);
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    fn block(start: usize, end: usize) -> CodeBlock {
        CodeBlock {
            dialect: Dialect::Mermaid,
            source: "x".repeat(end - start),
            start,
            end,
        }
    }

    #[test]
    fn test_later_pass_inside_accepted_discarded() {
        let merged = merge_passes(vec![vec![block(0, 50)], vec![block(10, 30)]]);
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].start, merged[0].end), (0, 50));
    }

    #[test]
    fn test_straddling_candidate_discarded() {
        let merged = merge_passes(vec![vec![block(20, 60)], vec![block(0, 30)]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start, 20);
    }

    #[test]
    fn test_disjoint_candidates_kept_and_sorted() {
        let merged = merge_passes(vec![vec![block(40, 60)], vec![block(0, 20)]]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].start, 0);
        assert_eq!(merged[1].start, 40);
    }

    #[test]
    fn test_adjacent_spans_not_overlapping() {
        // end is exclusive; a block starting exactly at a previous end is kept
        let merged = merge_passes(vec![vec![block(0, 20)], vec![block(20, 40)]]);
        assert_eq!(merged.len(), 2);
    }
}
