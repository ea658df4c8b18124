//! Midpage page ordering
//!
//! A midpage book is a stack of sheets folded once across the middle and
//! bound at the fold. Each sheet face carries two book pages, one above the
//! fold and one below. These functions decide which logical page lands in
//! which half of which face so that the folded stack reads in order.
//!
//! Every index at or past the page count is `None`, the blank sentinel.

/// The two halves of one printed face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetFace {
    pub top: Option<usize>,
    pub bottom: Option<usize>,
}

impl SheetFace {
    fn new(top: usize, bottom: usize, page_count: usize) -> Self {
        Self {
            top: real_page(top, page_count),
            bottom: real_page(bottom, page_count),
        }
    }

    /// Both halves, top first
    pub fn halves(&self) -> [Option<usize>; 2] {
        [self.top, self.bottom]
    }

    pub fn is_blank(&self) -> bool {
        self.top.is_none() && self.bottom.is_none()
    }

    /// Shift real indices by `offset`, blanking any that land at or past `limit`
    pub fn offset(&self, offset: usize, limit: usize) -> Self {
        let shift = |page: Option<usize>| page.map(|p| p + offset).filter(|&p| p < limit);
        Self {
            top: shift(self.top),
            bottom: shift(self.bottom),
        }
    }
}

/// One physical sheet printed on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sheet {
    pub front: SheetFace,
    pub back: SheetFace,
}

impl Sheet {
    pub fn faces(&self) -> [SheetFace; 2] {
        [self.front, self.back]
    }
}

fn real_page(index: usize, page_count: usize) -> Option<usize> {
    (index < page_count).then_some(index)
}

/// Round `n` up to the next multiple of `multiple`
pub(crate) fn pad_to(n: usize, multiple: usize) -> usize {
    n.div_ceil(multiple) * multiple
}

/// Sheet order for a double-sided midpage stack of `page_count` pages.
///
/// Yields exactly `ceil4(page_count) / 4` sheets. The outermost sheet comes
/// first: its front holds the last and first pages, its back the second and
/// second-to-last.
pub fn double_sided_midpage_order(page_count: usize) -> Vec<Sheet> {
    let padded = pad_to(page_count, 4);
    let mut sheets = Vec::with_capacity(padded / 4);
    if padded == 0 {
        return sheets;
    }

    let mut start = 0;
    let mut last = padded - 1;
    while start < last {
        sheets.push(Sheet {
            front: SheetFace::new(last, start, page_count),
            back: SheetFace::new(start + 1, last - 1, page_count),
        });
        start += 2;
        last -= 2;
    }
    sheets
}

/// Face order for a single-sided midpage stack of `page_count` pages.
///
/// Yields exactly `ceil2(page_count) / 2` faces, pairing pages from the
/// outside in.
pub fn single_sided_midpage_order(page_count: usize) -> Vec<SheetFace> {
    let padded = pad_to(page_count, 2);
    let mut faces = Vec::with_capacity(padded / 2);
    if padded == 0 {
        return faces;
    }

    let mut start = 0;
    let mut last = padded - 1;
    while start < last {
        faces.push(SheetFace::new(start, last, page_count));
        start += 1;
        last -= 1;
    }
    faces
}

/// Flatten sheets into faces in print order (front, back, front, back, ...)
pub fn faces_in_print_order(sheets: &[Sheet]) -> Vec<SheetFace> {
    sheets.iter().flat_map(Sheet::faces).collect()
}
