//! Splitting long documents into stacks
//!
//! A single midpage stack gets hard to fold past a few dozen pages, so long
//! documents are printed as several stacks bound one after another.

use crate::planner::{SheetFace, pad_to};
use crate::types::*;
use std::ops::Range;

/// Split `page_count` pages into contiguous stacks of about `stack_size` pages.
///
/// Every stack width is a multiple of 4. Pages left over after the full
/// stacks are rounded up to a multiple of 4 and dealt out 4 at a time
/// starting from the first stack, so no thin trailing stack is produced.
/// The last range ends at `ceil4(page_count)`; the overshoot is blank padding.
pub fn partition_stacks(page_count: usize, stack_size: usize) -> Result<Vec<Range<usize>>> {
    if stack_size == 0 || stack_size % 4 != 0 {
        return Err(PressError::InvalidArgument(format!(
            "Stack size must be a positive multiple of 4, got {stack_size}"
        )));
    }

    if page_count == 0 {
        return Ok(Vec::new());
    }

    let full = page_count / stack_size;
    if full == 0 {
        return Ok(vec![0..pad_to(page_count, 4)]);
    }

    let chunks = pad_to(page_count % stack_size, 4) / 4;
    let base = chunks / full;
    let extra = chunks % full;

    let mut ranges = Vec::with_capacity(full);
    let mut start = 0;
    for stack in 0..full {
        let widened = base + usize::from(stack < extra);
        let end = start + stack_size + widened * 4;
        ranges.push(start..end);
        start = end;
    }
    Ok(ranges)
}

/// Re-base a plan computed for a stack's width onto the stack's position in
/// the whole document. Indices reaching `range.end` or `page_count` are blanked.
pub fn offset_plan(faces: &[SheetFace], range: &Range<usize>, page_count: usize) -> Vec<SheetFace> {
    let limit = range.end.min(page_count);
    faces
        .iter()
        .map(|face| face.offset(range.start, limit))
        .collect()
}
