use pdf_press::*;

#[test]
fn test_default_options_are_valid() {
    assert!(MidpageOptions::default().validate().is_ok());
    assert!(StackOptions::default().validate().is_ok());
    assert!(ImageExportOptions::default().validate().is_ok());
}

#[test]
fn test_validation_invalid_ppi() {
    let mut options = MidpageOptions::default();
    for ppi in [0.0, -72.0, f32::NAN] {
        options.ppi = ppi;
        match options.validate() {
            Err(PressError::InvalidArgument(msg)) => assert!(msg.contains("Pixel density")),
            _ => panic!("Expected InvalidArgument error for ppi {ppi}"),
        }
    }
}

#[test]
fn test_validation_negative_margin() {
    let options = MidpageOptions {
        margins: Margins {
            top_mm: -1.0,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        options.validate(),
        Err(PressError::InvalidArgument(_))
    ));
}

#[test]
fn test_validation_single_sided_cannot_split() {
    let options = MidpageOptions {
        single_sided: true,
        separate_even_odd: true,
        ..Default::default()
    };
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_stack_size() {
    let mut options = StackOptions::default();
    assert_eq!(options.stack_size, 40);

    options.stack_size = 12;
    assert!(options.validate().is_ok());

    // Invalid: 0 pages
    options.stack_size = 0;
    assert!(options.validate().is_err());

    // Invalid: not multiple of 4
    options.stack_size = 6;
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_stack_prefix() {
    let options = StackOptions {
        stack_prefix: "../escape".to_string(),
        ..Default::default()
    };
    assert!(options.validate().is_err());
}

#[test]
fn test_validation_image_export() {
    let mut options = ImageExportOptions::default();
    options.resolution = (0, 100);
    assert!(matches!(
        options.validate(),
        Err(PressError::InvalidArgument(_))
    ));

    options.resolution = (100, 100);
    options.format = "jpeg".to_string();
    assert!(options.validate().is_ok());

    options.format = "doc".to_string();
    assert!(matches!(options.validate(), Err(PressError::Unsupported(_))));
}

#[test]
fn test_validation_jpeg_quality() {
    let mut options = ImageExportOptions::default();
    assert_eq!(options.jpeg_quality, 95);

    options.jpeg_quality = 1;
    assert!(options.validate().is_ok());
    options.jpeg_quality = 100;
    assert!(options.validate().is_ok());

    for quality in [0, 101, 255] {
        options.jpeg_quality = quality;
        match options.validate() {
            Err(PressError::InvalidArgument(msg)) => assert!(msg.contains("JPEG quality")),
            other => panic!("Expected InvalidArgument for quality {quality}, got {other:?}"),
        }
    }
}

#[test]
fn test_paper_size_names() {
    assert_eq!("a4".parse::<PaperSize>().unwrap(), PaperSize::A4);
    assert_eq!("Letter".parse::<PaperSize>().unwrap(), PaperSize::Letter);
    assert_eq!(" LEDGER ".parse::<PaperSize>().unwrap(), PaperSize::Ledger);
    assert!(matches!(
        "tabloid".parse::<PaperSize>(),
        Err(PressError::InvalidArgument(_))
    ));
}

#[test]
fn test_margin_shorthand() {
    let m: Margins = "5".parse().unwrap();
    assert_eq!(m, Margins::uniform(5.0));

    let m: Margins = "10, 5".parse().unwrap();
    assert_eq!((m.top_mm, m.outer_mm, m.bottom_mm, m.inner_mm), (10.0, 5.0, 10.0, 5.0));

    let m: Margins = "1,2,3".parse().unwrap();
    assert_eq!((m.top_mm, m.outer_mm, m.bottom_mm, m.inner_mm), (1.0, 2.0, 3.0, 2.0));

    let m: Margins = "1,2,3,4".parse().unwrap();
    assert_eq!((m.top_mm, m.outer_mm, m.bottom_mm, m.inner_mm), (1.0, 2.0, 3.0, 4.0));

    for bad in ["", "1,2,3,4,5", "a", "-1", "1,,2"] {
        assert!(
            matches!(bad.parse::<Margins>(), Err(PressError::InvalidArgument(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn test_face_layout_geometry() {
    let layout = FaceLayout::midpage(PaperSize::Letter, &Margins::default(), false, 72.0).unwrap();
    assert!((layout.sheet_width - 612.0).abs() < 0.01);
    assert!((layout.sheet_height - 792.0).abs() < 0.01);

    // Each half is the full width and half the height
    let close = |a: Rect, b: Rect| {
        (a.x - b.x).abs() < 0.01
            && (a.y - b.y).abs() < 0.01
            && (a.width - b.width).abs() < 0.01
            && (a.height - b.height).abs() < 0.01
    };
    assert!(close(layout.bottom, Rect::new(0.0, 0.0, 612.0, 396.0)));
    assert!(close(layout.top, Rect::new(0.0, 396.0, 612.0, 396.0)));
    // Pages lie on their side, so the render target is the slot turned
    assert_eq!(layout.render_target, (396, 612));
}

#[test]
fn test_face_layout_margins_follow_the_fold() {
    let margins = Margins {
        top_mm: 10.0,
        outer_mm: 20.0,
        bottom_mm: 30.0,
        inner_mm: 40.0,
    };
    let mm = |v: f32| v * 72.0 / 25.4;

    let ltr = FaceLayout::midpage(PaperSize::Letter, &margins, false, 72.0).unwrap();
    // Outer margin at the sheet edge, inner margin at the fold
    assert!((ltr.bottom.y - mm(20.0)).abs() < 0.01);
    assert!((ltr.bottom.top() - (396.0 - mm(40.0))).abs() < 0.01);
    assert!((ltr.top.y - (396.0 + mm(40.0))).abs() < 0.01);
    assert!((ltr.top.top() - (792.0 - mm(20.0))).abs() < 0.01);
    // Turned clockwise: page bottom on the left, page top on the right
    assert!((ltr.bottom.x - mm(30.0)).abs() < 0.01);
    assert!((612.0 - ltr.bottom.right() - mm(10.0)).abs() < 0.01);

    let rtl = FaceLayout::midpage(PaperSize::Letter, &margins, true, 72.0).unwrap();
    assert!((rtl.bottom.x - mm(10.0)).abs() < 0.01);
    assert!((612.0 - rtl.bottom.right() - mm(30.0)).abs() < 0.01);
}

#[test]
fn test_face_layout_rejects_oversized_margins() {
    let result = FaceLayout::midpage(PaperSize::Letter, &Margins::uniform(200.0), false, 300.0);
    assert!(matches!(result, Err(PressError::InvalidArgument(_))));
}

#[test]
fn test_pixels_from_ppi() {
    let (ratio, width) = PaperSize::Letter.ratio_width();
    let (w, h) = geometry::pixels_from_ppi(ratio, width, 100.0);
    assert!((w - 850.0).abs() < 0.01);
    assert!((h - 1100.0).abs() < 0.01);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let options = StackOptions {
        midpage: MidpageOptions {
            paper_size: PaperSize::Custom {
                ratio: 0.5,
                width_in: 6.0,
            },
            margins: "5,10".parse().unwrap(),
            ppi: 150.0,
            right_to_left: true,
            flip_even: true,
            ..Default::default()
        },
        stack_size: 16,
        separate_stacks: true,
        stack_prefix: "part_".to_string(),
    };

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    // Save
    options.save(path).await.unwrap();

    // Load
    let loaded = StackOptions::load(path).await.unwrap();
    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_partial_options_uses_defaults() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), r#"{ "right_to_left": true, "paper_size": "A4" }"#).unwrap();

    let loaded = MidpageOptions::load(temp_file.path()).await.unwrap();
    assert!(loaded.right_to_left);
    assert_eq!(loaded.paper_size, PaperSize::A4);
    assert_eq!(loaded.ppi, MidpageOptions::default().ppi);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_malformed_options() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), "{ not json").unwrap();

    assert!(matches!(
        MidpageOptions::load(temp_file.path()).await,
        Err(PressError::Json(_))
    ));
}
