// THEORY:
// The `RectangleMerger` coalesces the per-component rectangles of one detection pass
// into a set of non-overlapping boxes.
//
// Algorithm:
// 1.  Take the first rectangle R off the working set and start a group `[R]`.
// 2.  Sweep the rest of the working set. Any rectangle that overlaps *a member of
//     the group* (not the group's bounding box) is moved into the group. A member
//     added mid-sweep is tested against the rectangles after it in the same sweep.
//     Sweeps repeat until one adds nothing, so chains A-B-C join regardless of the
//     order they arrive in.
// 3.  Emit the bounding box of the group and go back to step 1 until the working
//     set is empty.
// 4.  A merged box can cover a rectangle that touched no member. The whole pass is
//     therefore rerun over its own output until a pass merges nothing, which leaves
//     no two output boxes overlapping.
//
// Testing against members rather than the growing box is part of the contract:
// switching to the box changes which rectangles are pulled into a group.
//
// Cost is O(n^2) per pass in the rectangle count. Counts per color per page are in
// the tens.

use crate::core_modules::rectangle::{OverlapRule, Rectangle};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RectangleMerger {
    pub rule: OverlapRule,
}

impl RectangleMerger {
    pub fn new(rule: OverlapRule) -> Self {
        Self { rule }
    }

    /// Merges until no two output rectangles overlap under `self.rule`.
    pub fn merge(&self, rects: Vec<Rectangle>) -> Vec<Rectangle> {
        let mut current = rects;
        let mut passes = 0u32;
        loop {
            let before = current.len();
            current = self.merge_pass(current);
            passes += 1;
            if current.len() == before {
                tracing::trace!(passes, rectangles = current.len(), "merge converged");
                return current;
            }
        }
    }

    /// One grouping pass over the working set, in input order.
    fn merge_pass(&self, rects: Vec<Rectangle>) -> Vec<Rectangle> {
        let mut working: VecDeque<Rectangle> = rects.into();
        let mut merged = Vec::with_capacity(working.len());

        while let Some(seed) = working.pop_front() {
            let mut group = vec![seed];
            loop {
                let group_size = group.len();
                working.retain(|other| {
                    if group.iter().any(|member| member.overlaps(other, self.rule)) {
                        group.push(*other);
                        false
                    } else {
                        true
                    }
                });
                if group.len() == group_size {
                    break;
                }
            }
            if let Some(bounds) = Rectangle::bounding(&group) {
                merged.push(bounds);
            }
        }

        merged
    }
}

/// Merges with the given overlap rule.
pub fn merge(rects: Vec<Rectangle>, rule: OverlapRule) -> Vec<Rectangle> {
    RectangleMerger::new(rule).merge(rects)
}
