pub mod assemble;
pub mod constants;
pub mod geometry;
mod options;
pub mod partition;
pub mod planner;
mod press;
pub mod registry;
pub mod source;
mod stats;
mod types;

pub use assemble::AssembledDocument;
pub use geometry::{FaceLayout, Margins, PaperSize, Rect};
pub use options::*;
pub use partition::{offset_plan, partition_stacks};
pub use planner::{Sheet, SheetFace, double_sided_midpage_order, single_sided_midpage_order};
pub use press::{Press, PressTask};
pub use registry::{open_source, open_sources};
pub use source::{ConcatSource, ImageSource, PageRange, PageSelection, PageSource};
#[cfg(feature = "pdfium")]
pub use source::PdfiumSource;
pub use stats::calculate_statistics;
pub use types::*;

pub use pdf_progress::{Progress, ProgressSnapshot, ProgressTask, TaskError, TaskStatus};
