use pdf_press::*;

#[test]
fn test_invalid_stack_size() {
    for size in [0, 2, 6, 41] {
        match partition_stacks(100, size) {
            Err(PressError::InvalidArgument(msg)) => assert!(msg.contains("multiple of 4")),
            other => panic!("Expected InvalidArgument for {size}, got {other:?}"),
        }
    }
}

#[test]
fn test_empty_document() {
    assert!(partition_stacks(0, 40).unwrap().is_empty());
}

#[test]
fn test_short_document_is_one_stack() {
    assert_eq!(partition_stacks(10, 40).unwrap(), vec![0..12]);
    assert_eq!(partition_stacks(40, 40).unwrap(), vec![0..40]);
}

#[test]
fn test_exact_multiple() {
    assert_eq!(partition_stacks(80, 40).unwrap(), vec![0..40, 40..80]);
}

#[test]
fn test_remainder_widens_earliest_stacks() {
    // 20 leftover pages are 5 chunks of 4 dealt over 2 stacks
    assert_eq!(partition_stacks(100, 40).unwrap(), vec![0..52, 52..100]);
    // A lone leftover page still costs a whole chunk
    assert_eq!(partition_stacks(81, 40).unwrap(), vec![0..44, 44..84]);
    assert_eq!(partition_stacks(50, 8).unwrap().first(), Some(&(0..12)));
}

#[test]
fn test_ranges_cover_document() {
    for size in [4, 8, 12, 40] {
        for total in 1..150 {
            let ranges = partition_stacks(total, size).unwrap();
            assert!(!ranges.is_empty());
            assert_eq!(ranges[0].start, 0);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            for range in &ranges {
                assert_eq!(range.len() % 4, 0, "total={total} size={size}");
                assert!(range.len() >= size.min(total.next_multiple_of(4)));
            }
            let end = ranges.last().unwrap().end;
            assert_eq!(end, total.next_multiple_of(4));
        }
    }
}

#[test]
fn test_offset_plan_blanks_past_document_end() {
    let ranges = partition_stacks(81, 40).unwrap();
    let last = &ranges[1];
    let plan: Vec<SheetFace> = double_sided_midpage_order(last.len())
        .iter()
        .flat_map(|sheet| sheet.faces())
        .collect();

    let offset = offset_plan(&plan, last, 81);
    assert_eq!(offset.len(), plan.len());

    let mut seen: Vec<usize> = offset.iter().flat_map(|f| f.halves()).flatten().collect();
    seen.sort_unstable();
    assert_eq!(seen, (44..81).collect::<Vec<_>>());

    // First face holds the stack's last slot (blank) and its first page
    assert_eq!(offset[0], SheetFace { top: None, bottom: Some(44) });
}
