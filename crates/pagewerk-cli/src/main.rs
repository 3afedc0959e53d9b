// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewerk — deskew and orientation correction for scanned pages.
//
// Entry point. Initialises logging, loads the optional JSON config, and runs
// one subcommand. Reports go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use pagewerk_core::human_errors::{Disposition, humanize_error};
use pagewerk_core::{
    OrientationConfig, OrientationDecision, OutputFormat, PagewerkConfig, PagewerkError,
    SkewEstimate,
};
use pagewerk_raster::{PageImage, PageProcessor};

#[derive(Parser, Debug)]
#[command(
    name = "pagewerk",
    version,
    about = "Deskew and orientation correction for scanned pages"
)]
struct Cli {
    /// JSON configuration file (missing fields take their defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Estimate the skew angle of a page
    Skew {
        /// Page image to analyse
        path: PathBuf,
        /// Full-resolution search instead of the reduced fast pass
        #[arg(long)]
        thorough: bool,
    },
    /// Straighten a skewed page
    Deskew {
        input: PathBuf,
        /// Output file; the format follows the extension (PNM when unknown)
        output: PathBuf,
    },
    /// Detect the page orientation and turn it upright
    Orient {
        input: PathBuf,
        output: PathBuf,
        /// Deskew before detecting orientation
        #[arg(long)]
        deskew: bool,
        /// Accept weak orientation evidence and pass ambiguous pages through
        #[arg(long)]
        permissive: bool,
    },
    /// Re-encode a page in another format
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// pnm, png, bmp, tiff or jpeg (default: from the output extension)
        #[arg(long)]
        format: Option<OutputFormat>,
    },
}

#[derive(Debug, Serialize)]
struct SkewReport {
    angle: f32,
    degrees: f32,
    confidence: f32,
}

impl From<SkewEstimate> for SkewReport {
    fn from(estimate: SkewEstimate) -> Self {
        Self {
            angle: estimate.angle,
            degrees: estimate.degrees(),
            confidence: estimate.confidence,
        }
    }
}

#[derive(Debug, Serialize)]
struct CorrectionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<OrientationDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    angle: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skew: Option<SkewReport>,
    /// The page was written out unchanged after a processing failure.
    kept_original: bool,
}

impl CorrectionReport {
    fn kept_original() -> Self {
        Self {
            decision: None,
            angle: None,
            skew: None,
            kept_original: true,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = run(cli)?;
    if let Some(json) = report {
        println!("{json}");
    }
    Ok(())
}

/// Run one command. Returns the JSON report to print, if the command has one.
fn run(cli: Cli) -> anyhow::Result<Option<String>> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Skew { path, thorough } => {
            let processor = PageProcessor::new(config).map_err(describe)?;
            let page = load_page(&path)?;
            let estimate = if thorough {
                processor.estimate_skew_thorough(&page)
            } else {
                processor.estimate_skew_fast(&page)
            }
            .map_err(describe)?;
            page.destroy();
            info!(
                degrees = estimate.degrees(),
                confidence = estimate.confidence,
                "Skew estimated"
            );
            to_json(&SkewReport::from(estimate)).map(Some)
        }

        Commands::Deskew { input, output } => {
            let processor = PageProcessor::new(config).map_err(describe)?;
            let page = load_page(&input)?;
            let report = match processor.deskew(&page) {
                Ok((straight, estimate)) => {
                    write_page(&straight, &output)?;
                    straight.destroy();
                    CorrectionReport {
                        decision: None,
                        angle: None,
                        skew: Some(estimate.into()),
                        kept_original: false,
                    }
                }
                Err(err) => {
                    keep_original(&page, &output, err)?;
                    page.destroy();
                    CorrectionReport::kept_original()
                }
            };
            to_json(&report).map(Some)
        }

        Commands::Orient {
            input,
            output,
            deskew,
            permissive,
        } => {
            let mut orientation = if permissive {
                OrientationConfig {
                    deskew_first: config.orientation.deskew_first,
                    min_strokes: config.orientation.min_strokes,
                    ..OrientationConfig::permissive()
                }
            } else {
                config.orientation
            };
            orientation.deskew_first |= deskew;
            config.orientation = orientation;

            let processor = PageProcessor::new(config).map_err(describe)?;
            let page = load_page(&input)?;
            let report = match processor.correct_orientation(&page) {
                Ok(outcome) => {
                    write_page(&outcome.image, &output)?;
                    outcome.image.destroy();
                    CorrectionReport {
                        decision: Some(outcome.decision),
                        angle: Some(outcome.angle),
                        skew: outcome.skew.map(SkewReport::from),
                        kept_original: false,
                    }
                }
                Err(err) => {
                    keep_original(&page, &output, err)?;
                    page.destroy();
                    CorrectionReport::kept_original()
                }
            };
            to_json(&report).map(Some)
        }

        Commands::Convert {
            input,
            output,
            format,
        } => {
            let page = load_page(&input)?;
            match format {
                Some(format) => {
                    let bytes = page.encode(format).map_err(describe)?;
                    std::fs::write(&output, &bytes)
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                }
                None => write_page(&page, &output)?,
            }
            page.destroy();
            Ok(None)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PagewerkConfig> {
    match path {
        Some(path) => PagewerkConfig::from_json_file(path)
            .map_err(describe)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(PagewerkConfig::default()),
    }
}

fn load_page(path: &Path) -> anyhow::Result<PageImage> {
    PageImage::load(path).map_err(describe)
}

fn write_page(page: &PageImage, path: &Path) -> anyhow::Result<()> {
    page.save(path)
        .map_err(describe)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// On a processing failure that leaves the page intact, write the unmodified
/// page to the output. Any other failure is returned.
fn keep_original(page: &PageImage, output: &Path, err: PagewerkError) -> anyhow::Result<()> {
    let human = humanize_error(&err);
    if human.disposition != Disposition::KeepOriginal {
        return Err(describe(err));
    }
    warn!(error = %err, "Processing failed; writing the original page");
    eprintln!("{} {}", human.message, human.suggestion);
    write_page(page, output)
}

/// Attach the plain-English explanation to a library error.
fn describe(err: PagewerkError) -> anyhow::Error {
    let human = humanize_error(&err);
    anyhow::Error::new(err).context(format!("{} {}", human.message, human.suggestion))
}

fn to_json(value: &impl Serialize) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Serialize report")
}
