mod logger;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logger::StderrLogger;
use pdf_press::constants::{DEFAULT_RESOLUTION, JPEG_QUALITY};
use pdf_press::{
    ImageExportOptions, Margins, MidpageOptions, PageRange, PaperSize, Press, PressStatistics,
    PressTask, StackOptions,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Separates pages in text output
const PAGE_BREAK: &str = "\u{c}\n";

#[derive(Parser)]
#[command(name = "pdfpress", about = "Midpage imposition for bookbinding", version)]
struct Cli {
    /// More log output, repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only, no progress display
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Impose all pages as a single midpage stack
    Midpage {
        #[command(flatten)]
        input: InputArgs,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Impose pages as several stacks folded separately
    MidpageMulti {
        #[command(flatten)]
        input: InputArgs,

        /// Output PDF file, or a directory with --separate-stacks
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Pages per stack (multiple of 4)
        #[arg(long)]
        stack_size: Option<usize>,

        /// Write each stack to its own file
        #[arg(long)]
        separate_stacks: bool,

        /// File name prefix for separate stacks
        #[arg(long)]
        stack_prefix: Option<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Rasterize every page into a single PDF
    Merge {
        #[command(flatten)]
        input: InputArgs,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Bounding box each page is rendered into, e.g. 1600x1600
        #[arg(long, value_parser = parse_resolution)]
        resolution: Option<(u32, u32)>,
    },

    /// Export every page as an image file
    Images {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// File name prefix, followed by the page number
        #[arg(long, default_value = "")]
        prefix: String,

        /// Bounding box each page is rendered into, e.g. 1600x1600
        #[arg(long, value_parser = parse_resolution)]
        resolution: Option<(u32, u32)>,

        /// Image file extension (png, jpg, ...)
        #[arg(long, default_value = "png")]
        format: String,

        /// JPEG quality, 1 to 100
        #[arg(long, default_value_t = JPEG_QUALITY)]
        quality: u8,
    },

    /// Extract the text of every page
    Text {
        #[command(flatten)]
        input: InputArgs,

        /// Output text file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Input files or an image directory - can specify multiple
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Only use these pages, e.g. "1-4,7,10-"
    #[arg(long)]
    pages: Option<String>,

    /// Skip inputs that cannot be opened
    #[arg(long)]
    ignore_errors: bool,
}

#[derive(Args)]
struct GeometryArgs {
    /// Named sheet size (a4, letter, legal, ledger)
    #[arg(long, conflicts_with = "ratio")]
    size: Option<PaperSize>,

    /// Width/height ratio of a custom sheet
    #[arg(long, requires = "width")]
    ratio: Option<f32>,

    /// Width of a custom sheet in inches
    #[arg(long, requires = "ratio")]
    width: Option<f32>,

    /// Margins in mm: 1 to 4 comma separated values (top, outer, bottom, inner)
    #[arg(long)]
    margin: Option<Margins>,

    /// Render density in pixels per inch
    #[arg(long)]
    ppi: Option<f32>,

    /// Right-to-left binding
    #[arg(long)]
    rtl: bool,

    /// Turn every second output page upside down
    #[arg(long)]
    flip_even: bool,

    /// One face per output page
    #[arg(long)]
    single_sided: bool,

    /// Write odd and even output pages to separate files
    #[arg(long)]
    separate_even_odd: bool,
}

impl GeometryArgs {
    /// Flags given on the command line override loaded options
    fn apply(&self, options: &mut MidpageOptions) {
        if let Some(size) = self.size {
            options.paper_size = size;
        }
        if let (Some(ratio), Some(width_in)) = (self.ratio, self.width) {
            options.paper_size = PaperSize::Custom { ratio, width_in };
        }
        if let Some(margins) = self.margin {
            options.margins = margins;
        }
        if let Some(ppi) = self.ppi {
            options.ppi = ppi;
        }
        options.right_to_left |= self.rtl;
        options.flip_even |= self.flip_even;
        options.single_sided |= self.single_sided;
        options.separate_even_odd |= self.separate_even_odd;
    }
}

#[derive(Args)]
struct ConfigArgs {
    /// Load options from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective options to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Show statistics only, don't write output
    #[arg(long)]
    stats_only: bool,
}

fn parse_resolution(value: &str) -> std::result::Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid dimension '{part}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

/// Open the inputs as one document, narrowed to `--pages` if given
fn open_press(args: &InputArgs) -> Result<Press> {
    let press = Press::open(&args.input, args.ignore_errors)?;
    let Some(pages) = &args.pages else {
        return Ok(press);
    };
    let view = PageRange::parse(Arc::clone(press.source()), pages)
        .with_context(|| format!("Invalid page selection '{pages}'"))?;
    Ok(Press::new(Arc::new(view)))
}

async fn run<T: Send + 'static>(task: PressTask<T>, quiet: bool) -> Result<T> {
    let value = if quiet {
        task.synchronize().await?
    } else {
        task.synchronize_with_display(PROGRESS_INTERVAL, std::io::stderr())
            .await?
    };
    Ok(value)
}

fn print_statistics(stats: &PressStatistics) {
    println!("Imposition Statistics:");
    println!("  Source pages: {}", stats.source_pages);
    println!("  Output sheets: {}", stats.output_sheets);
    println!("  Output pages: {}", stats.output_pages);
    println!("  Blank pages added: {}", stats.blank_pages_added);
    if let Some(stacks) = stats.stacks {
        println!("  Stacks: {}", stacks);
    }
}

fn print_written(paths: &[PathBuf]) {
    for path in paths {
        println!("Wrote {}", path.display());
    }
}

async fn load_midpage_options(path: Option<&Path>) -> Result<MidpageOptions> {
    match path {
        Some(path) => MidpageOptions::load(path)
            .await
            .with_context(|| format!("Failed to load options from {}", path.display())),
        None => Ok(MidpageOptions::default()),
    }
}

async fn load_stack_options(path: Option<&Path>) -> Result<StackOptions> {
    match path {
        Some(path) => StackOptions::load(path)
            .await
            .with_context(|| format!("Failed to load options from {}", path.display())),
        None => Ok(StackOptions::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::new(StderrLogger::level_for(cli.verbose, cli.quiet)).init()?;

    match cli.command {
        Commands::Midpage {
            input,
            output,
            geometry,
            config,
        } => {
            let mut options = load_midpage_options(config.config.as_deref()).await?;
            geometry.apply(&mut options);
            options.validate()?;
            if let Some(path) = &config.save_config {
                options.save(path).await?;
            }

            let press = open_press(&input)?;
            print_statistics(&press.statistics(&options, None)?);
            if config.stats_only {
                return Ok(());
            }

            let written = run(press.midpage(output, options), cli.quiet).await?;
            print_written(&written);
        }

        Commands::MidpageMulti {
            input,
            output,
            geometry,
            stack_size,
            separate_stacks,
            stack_prefix,
            config,
        } => {
            let mut options = load_stack_options(config.config.as_deref()).await?;
            geometry.apply(&mut options.midpage);
            if let Some(stack_size) = stack_size {
                options.stack_size = stack_size;
            }
            if let Some(prefix) = stack_prefix {
                options.stack_prefix = prefix;
            }
            options.separate_stacks |= separate_stacks;
            options.validate()?;
            if let Some(path) = &config.save_config {
                options.save(path).await?;
            }

            let press = open_press(&input)?;
            print_statistics(&press.statistics(&options.midpage, Some(options.stack_size))?);
            if config.stats_only {
                return Ok(());
            }

            let written = run(press.midpage_multi(output, options), cli.quiet).await?;
            print_written(&written);
        }

        Commands::Merge {
            input,
            output,
            resolution,
        } => {
            let press = open_press(&input)?;
            let task = press.merge(output, resolution.unwrap_or(DEFAULT_RESOLUTION));
            let written = run(task, cli.quiet).await?;
            print_written(&[written]);
        }

        Commands::Images {
            input,
            output,
            prefix,
            resolution,
            format,
            quality,
        } => {
            let options = ImageExportOptions {
                prefix,
                resolution: resolution.unwrap_or(DEFAULT_RESOLUTION),
                format,
                jpeg_quality: quality,
            };
            options.validate()?;

            let press = open_press(&input)?;
            tokio::fs::create_dir_all(&output).await?;
            let written = run(press.images(output, options), cli.quiet).await?;
            println!("Exported {} images", written.len());
        }

        Commands::Text { input, output } => {
            let press = open_press(&input)?;
            // The progress line would interleave with text on stdout
            let quiet = cli.quiet || output.is_none();
            let pages = run(press.text(), quiet).await?;
            let text = pages.join(PAGE_BREAK);
            match output {
                Some(path) => {
                    tokio::fs::write(&path, text).await?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{text}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("1600x1200"), Ok((1600, 1200)));
        assert_eq!(parse_resolution("64X32"), Ok((64, 32)));
        assert!(parse_resolution("1600").is_err());
        assert!(parse_resolution("0x10").is_err());
        assert!(parse_resolution("ax10").is_err());
    }

    #[test]
    fn test_geometry_flags_override_loaded_options() {
        let cli = Cli::parse_from([
            "pdfpress", "midpage", "-i", "book.pdf", "-o", "out.pdf", "--ratio", "0.5",
            "--width", "6", "--margin", "5,10", "--rtl",
        ]);
        let Commands::Midpage { geometry, .. } = cli.command else {
            panic!("Expected midpage command");
        };

        let mut options = MidpageOptions {
            flip_even: true,
            ..Default::default()
        };
        geometry.apply(&mut options);
        assert_eq!(
            options.paper_size,
            PaperSize::Custom {
                ratio: 0.5,
                width_in: 6.0
            }
        );
        assert_eq!(options.margins, Margins::from_values(&[5.0, 10.0]).unwrap());
        assert!(options.right_to_left);
        assert!(options.flip_even);
    }

    #[test]
    fn test_ratio_requires_width() {
        let result = Cli::try_parse_from([
            "pdfpress", "midpage", "-i", "book.pdf", "-o", "out.pdf", "--ratio", "0.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_images_quality_flag() {
        let cli = Cli::parse_from([
            "pdfpress", "images", "-i", "scan.png", "-o", "out", "--format", "jpg",
        ]);
        let Commands::Images { quality, .. } = cli.command else {
            panic!("Expected images command");
        };
        assert_eq!(quality, JPEG_QUALITY);

        let cli = Cli::parse_from([
            "pdfpress", "images", "-i", "scan.png", "-o", "out", "--quality", "70",
        ]);
        let Commands::Images { quality, .. } = cli.command else {
            panic!("Expected images command");
        };
        assert_eq!(quality, 70);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
