//! The imposition orchestrator
//!
//! Every long operation starts a [`ProgressTask`] on the blocking pool and
//! returns it at once. Progress counts one unit per output face for
//! imposition and one per source page for merge, image export and text.

use crate::assemble::AssembledDocument;
use crate::geometry::{FaceLayout, Rect};
use crate::options::{ImageExportOptions, MidpageOptions, StackOptions};
use crate::partition::{offset_plan, partition_stacks};
use crate::planner::{SheetFace, double_sided_midpage_order, faces_in_print_order, single_sided_midpage_order};
use crate::registry::open_sources;
use crate::source::PageSource;
use crate::stats::calculate_statistics;
use crate::types::*;
use image::codecs::jpeg::JpegEncoder;
use pdf_progress::{Progress, ProgressTask};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Background task driven by a [`Press`]
pub type PressTask<T> = ProgressTask<T, PressError>;

/// Runs imposition jobs over one logical source document
#[derive(Clone)]
pub struct Press {
    source: Arc<dyn PageSource>,
}

impl Press {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source }
    }

    /// Open input files through the format registry
    pub fn open(paths: &[PathBuf], ignore_errors: bool) -> Result<Self> {
        let source = open_sources(paths, ignore_errors)?;
        Ok(Self::new(Arc::from(source)))
    }

    pub fn source(&self) -> &Arc<dyn PageSource> {
        &self.source
    }

    pub fn page_count(&self) -> usize {
        self.source.len()
    }

    pub fn statistics(
        &self,
        options: &MidpageOptions,
        stack_size: Option<usize>,
    ) -> Result<PressStatistics> {
        calculate_statistics(self.page_count(), options, stack_size)
    }

    /// Impose the whole source as one midpage stack.
    ///
    /// Resolves to the paths written: `output`, or `<stem>_odd.pdf` and
    /// `<stem>_even.pdf` beside it when odd and even pages are separated.
    pub fn midpage(&self, output: impl Into<PathBuf>, options: MidpageOptions) -> PressTask<Vec<PathBuf>> {
        let source = Arc::clone(&self.source);
        let output = output.into();

        ProgressTask::spawn(move |progress| {
            options.validate()?;
            let page_count = non_empty(source.as_ref())?;
            let layout = face_layout(&options)?;

            let faces = plan_faces(page_count, options.single_sided);
            progress.set_total(faces.len());
            progress.set_message(format!("Imposing {page_count} pages"));

            let doc = impose_faces(source.as_ref(), &faces, &layout, options.flip_even, progress)?;
            write_output(doc, &output, options.separate_even_odd)
        })
    }

    /// Impose the source as several midpage stacks, one after another.
    ///
    /// With `separate_stacks`, `output` is a directory receiving one file per
    /// stack; otherwise all stacks go into `output` in order.
    pub fn midpage_multi(&self, output: impl Into<PathBuf>, options: StackOptions) -> PressTask<Vec<PathBuf>> {
        let source = Arc::clone(&self.source);
        let output = output.into();

        ProgressTask::spawn(move |progress| {
            options.validate()?;
            let midpage = &options.midpage;
            let page_count = non_empty(source.as_ref())?;
            let layout = face_layout(midpage)?;

            let ranges = partition_stacks(page_count, options.stack_size)?;
            let plans: Vec<Vec<SheetFace>> = ranges
                .iter()
                .map(|range| offset_plan(&plan_faces(range.len(), midpage.single_sided), range, page_count))
                .collect();
            progress.set_total(plans.iter().map(Vec::len).sum());

            if options.separate_stacks {
                std::fs::create_dir_all(&output)?;
            }
            let digits = ranges.len().to_string().len();

            let mut combined = AssembledDocument::new();
            let mut written = Vec::new();
            for (n, (range, faces)) in ranges.iter().zip(&plans).enumerate() {
                log::info!(
                    "Imposing stack {}/{} (pages {}-{})",
                    n + 1,
                    ranges.len(),
                    range.start + 1,
                    range.end.min(page_count)
                );
                progress.set_message(format!("Stack {}/{}", n + 1, ranges.len()));

                let doc = impose_faces(source.as_ref(), faces, &layout, midpage.flip_even, progress)?;
                if options.separate_stacks {
                    let path = output.join(format!("{}{:0digits$}.pdf", options.stack_prefix, n + 1));
                    written.extend(write_output(doc, &path, midpage.separate_even_odd)?);
                } else {
                    combined.append(doc);
                }
            }

            if !options.separate_stacks {
                written = write_output(combined, &output, midpage.separate_even_odd)?;
            }
            Ok(written)
        })
    }

    /// Rasterize every page into a PDF of the same page count, each output
    /// page sized to its rendering
    pub fn merge(&self, output: impl Into<PathBuf>, resolution: (u32, u32)) -> PressTask<PathBuf> {
        let source = Arc::clone(&self.source);
        let output = output.into();

        ProgressTask::spawn(move |progress| {
            progress.set_total(source.len());
            progress.set_message("Merging");

            let mut doc = AssembledDocument::new();
            for index in 0..source.len() {
                let image = source.render(index, resolution)?;
                let (width, height) = (image.width() as f32, image.height() as f32);
                let page = doc.new_blank_page(width, height);
                doc.place_image(page, &image, Rect::new(0.0, 0.0, width, height), Rotation::None)?;
                progress.increment(1);
            }

            doc.save(&output)?;
            Ok(output)
        })
    }

    /// Render every page to `<prefix><n>.<format>` inside `output_dir`
    pub fn images(&self, output_dir: impl Into<PathBuf>, options: ImageExportOptions) -> PressTask<Vec<PathBuf>> {
        let source = Arc::clone(&self.source);
        let output_dir = output_dir.into();

        ProgressTask::spawn(move |progress| {
            options.validate()?;
            let format = options.image_format()?;
            std::fs::create_dir_all(&output_dir)?;

            progress.set_total(source.len());
            progress.set_message("Exporting images");

            let mut written = Vec::with_capacity(source.len());
            for index in 0..source.len() {
                let image = source.render(index, options.resolution)?;
                let path = output_dir.join(format!("{}{}.{}", options.prefix, index + 1, options.format));
                if format == image::ImageFormat::Jpeg {
                    let writer = BufWriter::new(File::create(&path)?);
                    image
                        .to_rgb8()
                        .write_with_encoder(JpegEncoder::new_with_quality(writer, options.jpeg_quality))?;
                } else {
                    image.save_with_format(&path, format)?;
                }
                written.push(path);
                progress.increment(1);
            }

            log::info!("Exported {} images to {}", written.len(), output_dir.display());
            Ok(written)
        })
    }

    /// Text layer of every page, in order
    pub fn text(&self) -> PressTask<Vec<String>> {
        let source = Arc::clone(&self.source);

        ProgressTask::spawn(move |progress| {
            progress.set_total(source.len());
            progress.set_message("Extracting text");

            let mut pages = Vec::with_capacity(source.len());
            for index in 0..source.len() {
                pages.push(source.text(index)?);
                progress.increment(1);
            }
            Ok(pages)
        })
    }
}

fn non_empty(source: &dyn PageSource) -> Result<usize> {
    match source.len() {
        0 => Err(PressError::InvalidArgument("No pages to impose".to_string())),
        n => Ok(n),
    }
}

fn face_layout(options: &MidpageOptions) -> Result<FaceLayout> {
    FaceLayout::midpage(
        options.paper_size,
        &options.margins,
        options.right_to_left,
        options.ppi,
    )
}

/// Output faces in print order for a stack of `page_count` pages
fn plan_faces(page_count: usize, single_sided: bool) -> Vec<SheetFace> {
    if single_sided {
        single_sided_midpage_order(page_count)
    } else {
        faces_in_print_order(&double_sided_midpage_order(page_count))
    }
}

/// Render each face onto its own output page
fn impose_faces(
    source: &dyn PageSource,
    faces: &[SheetFace],
    layout: &FaceLayout,
    flip_even: bool,
    progress: &Progress,
) -> Result<AssembledDocument> {
    let mut doc = AssembledDocument::new();

    for (face_index, face) in faces.iter().enumerate() {
        let page = doc.new_blank_page(layout.sheet_width, layout.sheet_height);
        let flip = flip_even && face_index % 2 == 1;

        for (slot, index) in [(layout.top, face.top), (layout.bottom, face.bottom)] {
            let Some(index) = index else { continue };

            let image = source.render(index, layout.render_target)?;
            let mut rect = layout.place(&slot, (image.width(), image.height()));
            let mut rotation = layout.rotation;
            if flip {
                rect = rect.half_turn(layout.sheet_width, layout.sheet_height);
                rotation = rotation.half_turn();
            }
            doc.place_image(page, &image, rect, rotation)?;
        }

        progress.increment(1);
    }

    Ok(doc)
}

/// Save `doc` to `output`, or split it into `<stem>_odd.pdf` and `<stem>_even.pdf`
fn write_output(doc: AssembledDocument, output: &Path, separate_even_odd: bool) -> Result<Vec<PathBuf>> {
    if !separate_even_odd {
        doc.save(output)?;
        return Ok(vec![output.to_path_buf()]);
    }

    let (odd, even) = doc.split_alternate();
    let odd_path = suffixed(output, "odd");
    let even_path = suffixed(output, "even");
    odd.save(&odd_path)?;
    even.save(&even_path)?;
    Ok(vec![odd_path, even_path])
}

/// `dir/book.pdf` -> `dir/book_<suffix>.pdf`
pub(crate) fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_{suffix}.pdf"))
}
