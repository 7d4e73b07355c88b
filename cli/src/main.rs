//! unocr CLI - scanned PDF to text tool
//!
//! A command-line tool that runs OCR over directories of scanned PDFs and
//! reconstructs readable text from the results.

use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use unocr::{
    assemble_pages, discover_pdfs, reconstruct_page_with_options, run_batch_documents,
    BatchConfig, CommandOcrEngine, DocumentOutcome, DocumentStatus, LayoutOptions,
    PopplerRasterizer, ProcessOptions,
};

/// Scanned PDF to text through OCR layout reconstruction
#[derive(Parser)]
#[command(
    name = "unocr",
    author = "iyulab",
    version,
    about = "Reconstruct text from OCR of scanned PDF documents",
    long_about = "unocr - OCR layout reconstruction for scanned PDFs.\n\n\
                  Rasterizes each PDF page, runs an external OCR engine on it and\n\
                  rebuilds reading-order lines from the detections.\n\n\
                  Usage:\n  \
                  unocr batch <dir>          Convert every PDF in a directory\n  \
                  unocr page <ocr.json>      Rebuild one page from saved OCR output"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every PDF in a directory into a text file
    Batch {
        /// Directory containing PDF files
        #[arg(default_value = "./ex_pdf")]
        input: PathBuf,

        /// Output directory for <name>.txt files
        #[arg(short, long, default_value = "./outputs/txt")]
        output: PathBuf,

        /// OCR command run for each page image; it receives
        /// `--image <png> --lang <code>` and prints the result as JSON
        #[arg(long)]
        ocr_program: String,

        /// Argument placed before --image when invoking the OCR command (repeatable)
        #[arg(long = "ocr-arg")]
        ocr_args: Vec<String>,

        /// Rasterization resolution
        #[arg(long, default_value = "300")]
        dpi: u32,

        /// Abort a document after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Process documents in parallel
        #[arg(long)]
        parallel: bool,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// Rebuild one page from a saved OCR JSON result
    Page {
        /// OCR result file (JSON)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the page lines as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        process: ProcessArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by every command that reconstructs text
#[derive(Args)]
struct ProcessArgs {
    /// Language code for OCR and text rules
    #[arg(short, long, default_value = "korean")]
    lang: String,

    /// Vertical line grouping threshold (px)
    #[arg(long, default_value = "20")]
    y_thresh: f64,

    /// Horizontal gap threshold (px)
    #[arg(long, default_value = "10")]
    x_thresh: f64,

    /// Lines shorter than this are merged with the next line
    #[arg(long, default_value = "10")]
    min_length: usize,

    /// Minimum detection confidence
    #[arg(long, default_value = "0.7")]
    min_confidence: f64,
}

impl ProcessArgs {
    fn to_options(&self) -> ProcessOptions {
        ProcessOptions::default()
            .with_language(&self.lang)
            .with_layout(
                LayoutOptions::default()
                    .with_y_thresh(self.y_thresh)
                    .with_x_thresh(self.x_thresh)
                    .with_min_confidence(self.min_confidence),
            )
            .with_min_length(self.min_length)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Batch {
            input,
            output,
            ocr_program,
            ocr_args,
            dpi,
            timeout,
            parallel,
            process,
        } => {
            let mut options = process.to_options().with_dpi(dpi);
            if let Some(secs) = timeout {
                options = options.with_document_timeout(Duration::from_secs(secs));
            }
            if parallel {
                options = options.parallel();
            }

            let engine = ocr_args
                .into_iter()
                .fold(CommandOcrEngine::new(ocr_program), |engine, arg| {
                    engine.with_arg(arg)
                })
                .with_lang(options.ocr_language.clone());
            let rasterizer = PopplerRasterizer::from_options(&options);
            log::debug!("OCR engine: {:?}", engine);
            let config = BatchConfig::new(input, output).with_options(options);

            run_batch_command(&config, &engine, &rasterizer)?;
        }

        Commands::Page {
            input,
            output,
            json,
            process,
        } => {
            let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&input)?)?;
            let page = reconstruct_page_with_options(&raw, &process.to_options())?;

            let content = if json {
                serde_json::to_string_pretty(&page)?
            } else {
                assemble_pages(std::slice::from_ref(&page))
            };
            write_output(output.as_ref(), &content)?;

            if let Some(path) = output {
                println!(
                    "{} Rebuilt {} lines: {}",
                    "✓".green().bold(),
                    page.lines.len(),
                    path.display()
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn run_batch_command(
    config: &BatchConfig,
    engine: &CommandOcrEngine,
    rasterizer: &PopplerRasterizer,
) -> Result<(), Box<dyn std::error::Error>> {
    // Missing input or an empty directory is reported, not treated as a failure
    let pdfs = match discover_pdfs(&config.input_dir) {
        Ok(pdfs) if pdfs.is_empty() => {
            println!(
                "{} No PDF files found in {}",
                "!".yellow().bold(),
                config.input_dir.display()
            );
            return Ok(());
        }
        Ok(pdfs) => pdfs,
        Err(e) if e.is_environment() => {
            println!("{} {}", "!".yellow().bold(), e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let pb = create_progress_bar(pdfs.len() as u64);
    let summary = run_batch_documents(config, &pdfs, engine, rasterizer, |outcome| {
        report_outcome(&pb, outcome);
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    println!("{}", "Batch Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), config.output_dir.display());
    println!(
        "{}: {}, {}: {}",
        "Succeeded".bold(),
        summary.succeeded.to_string().green(),
        "Failed".bold(),
        summary.failed.to_string().red()
    );

    Ok(())
}

fn report_outcome(pb: &ProgressBar, outcome: &DocumentOutcome) {
    let name = outcome
        .input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy();

    match &outcome.status {
        DocumentStatus::Succeeded { failed_pages, .. } if *failed_pages > 0 => {
            pb.println(format!(
                "  {} {} ({} pages skipped)",
                "✓".yellow(),
                name,
                failed_pages
            ));
        }
        DocumentStatus::Succeeded { .. } => {
            pb.println(format!("  {} {}", "✓".green(), name));
        }
        DocumentStatus::Failed { message } => {
            pb.println(format!("  {} {}: {}", "✗".red(), name, message));
        }
    }
}

fn print_version() {
    println!("{} {}", "unocr".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("OCR layout reconstruction for scanned PDF documents");
    println!();
    println!("Requires: poppler-utils (pdfinfo, pdftoppm) and an OCR engine command");
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message("Processing PDFs...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
