//! PDF pages through PDFium
//!
//! PDFium is not reentrant, so one worker thread owns the bound library and
//! serves every [`PdfiumSource`] over a channel. The worker keeps the most
//! recently used documents open between requests.

use super::{PageSource, check_index, check_target, fit_scale};
use crate::types::*;
use image::{DynamicImage, RgbaImage};
use pdfium_render::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// Documents the worker keeps parsed at once
const MAX_OPEN_DOCUMENTS: usize = 8;

type Job = Box<dyn for<'a, 'doc> FnOnce(Result<&'a PdfDocument<'doc>>) + Send>;

struct Request {
    path: PathBuf,
    job: Job,
}

static WORKER: OnceLock<Sender<Request>> = OnceLock::new();

/// Initialize Pdfium, trying the vendored library first, then falling back to system
fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
    // Vendored copy lives under the workspace root
    let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    if let Some(vendor_path) = vendor_path {
        if let Ok(binding) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
        {
            return Ok(Pdfium::new(binding));
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

fn worker() -> &'static Sender<Request> {
    WORKER.get_or_init(|| {
        let (tx, rx) = mpsc::channel();
        let spawned = std::thread::Builder::new()
            .name("pdfium".to_string())
            .spawn(move || run_worker(rx));
        if let Err(e) = spawned {
            log::error!("Could not start the PDFium worker: {e}");
        }
        tx
    })
}

fn run_worker(requests: Receiver<Request>) {
    let pdfium = match init_pdfium() {
        Ok(pdfium) => pdfium,
        Err(e) => {
            let message = format!("PDFium library not available: {e}");
            log::warn!("{message}");
            for request in requests {
                run_job(request.job, Err(PressError::SourceUnavailable(message.clone())));
            }
            return;
        }
    };

    let mut open: Vec<(PathBuf, PdfDocument)> = Vec::new();
    for Request { path, job } in requests {
        let index = match open.iter().position(|(current, _)| *current == path) {
            Some(index) => index,
            None => match pdfium.load_pdf_from_file(&path, None) {
                Ok(document) => {
                    log::debug!("Parsed {}", path.display());
                    if open.len() == MAX_OPEN_DOCUMENTS {
                        open.remove(0);
                    }
                    open.push((path, document));
                    open.len() - 1
                }
                Err(e) => {
                    run_job(job, Err(e.into()));
                    continue;
                }
            },
        };
        run_job(job, Ok(&open[index].1));
    }
}

fn run_job(job: Job, document: Result<&PdfDocument>) {
    if panic::catch_unwind(AssertUnwindSafe(|| job(document))).is_err() {
        log::error!("PDFium request panicked");
    }
}

fn worker_stopped() -> PressError {
    PressError::SourceUnavailable("PDFium worker is not running".to_string())
}

/// Run `f` against the document at `path` on the PDFium worker
fn with_document<T, F>(path: &Path, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&PdfDocument) -> Result<T> + Send + 'static,
{
    let (reply_tx, reply_rx) = mpsc::sync_channel(1);
    let job: Job = Box::new(move |document| {
        let _ = reply_tx.send(document.and_then(f));
    });

    worker()
        .send(Request {
            path: path.to_owned(),
            job,
        })
        .map_err(|_| worker_stopped())?;
    reply_rx.recv().map_err(|_| worker_stopped())?
}

/// PDF document rendered through PDFium
///
/// Holds only the path and page count. Parsed documents live on the worker.
pub struct PdfiumSource {
    path: PathBuf,
    page_count: usize,
}

impl PdfiumSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        if !path.is_file() {
            return Err(PressError::SourceUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let page_count = with_document(&path, |document| Ok(document.pages().len() as usize))?;
        log::debug!("Opened {} ({} pages)", path.display(), page_count);

        Ok(Self { path, page_count })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_page<T, F>(&self, index: usize, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&PdfPage) -> Result<T> + Send + 'static,
    {
        check_index(index, self.page_count)?;
        let page_index = u16::try_from(index).map_err(|_| PressError::OutOfRange {
            index,
            len: self.page_count,
        })?;

        with_document(&self.path, move |document| {
            let page = document.pages().get(page_index)?;
            f(&page)
        })
    }
}

impl PageSource for PdfiumSource {
    fn len(&self) -> usize {
        self.page_count
    }

    fn render(&self, index: usize, target: (u32, u32)) -> Result<DynamicImage> {
        check_target(target)?;
        self.with_page(index, move |page| {
            let scale = fit_scale((page.width().value, page.height().value), target);
            let config = PdfRenderConfig::new().scale_page_by_factor(scale);

            let bitmap = page.render_with_config(&config)?;
            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgba = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes().to_vec())
                .ok_or_else(|| {
                    PressError::Render(format!("PDFium returned a short bitmap for page {index}"))
                })?;
            Ok(DynamicImage::ImageRgba8(rgba))
        })
    }

    fn text(&self, index: usize) -> Result<String> {
        self.with_page(index, |page| Ok(page.text()?.all()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn not_a_pdf(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        path
    }

    #[test]
    fn test_worker_answers_after_a_failed_open() {
        let dir = TempDir::new().unwrap();
        let path = not_a_pdf(&dir);

        // Unbound library or unparsable file, the worker must reply either way
        for _ in 0..3 {
            assert!(matches!(
                PdfiumSource::open(&path),
                Err(PressError::SourceUnavailable(_) | PressError::Render(_))
            ));
        }
    }

    #[test]
    fn test_worker_serves_concurrent_callers() {
        let dir = TempDir::new().unwrap();
        let path = not_a_pdf(&dir);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || PdfiumSource::open(&path).is_err())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_missing_file_is_rejected_before_the_worker() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            PdfiumSource::open(dir.path().join("missing.pdf")),
            Err(PressError::SourceUnavailable(msg)) if msg.contains("does not exist")
        ));
    }
}
