use crate::types::*;
use std::ops::Range;

/// Zero-based pages picked out of a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    Single(usize),
    /// Half-open range of pages
    Range(Range<usize>),
}

impl From<usize> for PageSelection {
    fn from(index: usize) -> Self {
        PageSelection::Single(index)
    }
}

impl From<Range<usize>> for PageSelection {
    fn from(range: Range<usize>) -> Self {
        PageSelection::Range(range)
    }
}

/// Parse a 1-based, inclusive page list like `"1-4,7,10-"`.
///
/// An open end (`"10-"`) runs to the last of `page_count` pages. Bounds are
/// not checked here; [`PageRange::new`](super::PageRange::new) does that.
pub fn parse_page_selection(text: &str, page_count: usize) -> Result<Vec<PageSelection>> {
    let invalid = |part: &str| PressError::InvalidArgument(format!("Invalid page selection '{part}'"));
    let page_number = |number: &str, part: &str| -> Result<usize> {
        match number.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(invalid(part)),
        }
    };

    let mut selections = Vec::new();
    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid(text));
        }

        match part.split_once('-') {
            None => selections.push(PageSelection::Single(page_number(part, part)?)),
            Some((first, last)) => {
                let start = page_number(first, part)?;
                let end = if last.trim().is_empty() {
                    page_count
                } else {
                    page_number(last, part)? + 1
                };
                if end <= start {
                    return Err(invalid(part));
                }
                selections.push(PageSelection::Range(start..end));
            }
        }
    }
    Ok(selections)
}
