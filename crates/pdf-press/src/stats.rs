use crate::options::MidpageOptions;
use crate::partition::partition_stacks;
use crate::planner::pad_to;
use crate::types::*;

/// Calculate statistics for a midpage imposition of `source_pages` pages,
/// optionally split into stacks of `stack_size` pages
pub fn calculate_statistics(
    source_pages: usize,
    options: &MidpageOptions,
    stack_size: Option<usize>,
) -> Result<PressStatistics> {
    match stack_size {
        None => Ok(single_stack_stats(source_pages, options, None)),
        Some(size) => {
            let ranges = partition_stacks(source_pages, size)?;
            let padded: usize = ranges.iter().map(|range| range.len()).sum();
            let mut stats = single_stack_stats(padded, options, Some(ranges.len()));
            stats.source_pages = source_pages;
            stats.blank_pages_added = stats.blank_pages_added + padded - source_pages;
            Ok(stats)
        }
    }
}

fn single_stack_stats(
    source_pages: usize,
    options: &MidpageOptions,
    stacks: Option<usize>,
) -> PressStatistics {
    if options.single_sided {
        // Two book pages per output page, one side printed
        let padded = pad_to(source_pages, 2);
        let output_pages = padded / 2;
        PressStatistics {
            source_pages,
            output_sheets: output_pages,
            output_pages,
            blank_pages_added: padded - source_pages,
            stacks,
        }
    } else {
        // Four book pages per sheet, front and back
        let padded = pad_to(source_pages, 4);
        let output_sheets = padded / 4;
        PressStatistics {
            source_pages,
            output_sheets,
            output_pages: output_sheets * 2,
            blank_pages_added: padded - source_pages,
            stacks,
        }
    }
}
