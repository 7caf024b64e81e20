// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// padinspect — Pad inspection from the command line.
//
// Entry point. Initialises logging, builds the inspector from the optional
// configuration file, inspects one frame and writes the report artifacts.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use padinspect_core::InspectionConfig;
use padinspect_core::error::Result;
use padinspect_vision::{Annotator, FileSource, ImageProcessor, InspectionReport, Inspector};

/// Inspect a photographed pad and report whether it is sound or defective.
#[derive(Debug, Parser)]
#[command(name = "padinspect")]
#[command(version)]
struct Cli {
    /// Path to the input image.
    image: PathBuf,

    /// Where to write the JSON report.
    #[arg(long, default_value = "analysis_results.json")]
    report: PathBuf,

    /// Also write the annotated frame to this path (format from extension).
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// JSON file overriding the default thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TrueType font for label text. Defaults to a system font if one is found.
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "padinspect failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => InspectionConfig::from_json_file(path)?,
        None => InspectionConfig::default(),
    };
    let mut inspector = Inspector::new(config);
    if let Some(path) = &cli.font {
        inspector = inspector.with_annotator(Annotator::with_font_path(path)?);
    }

    tracing::info!(image = %cli.image.display(), "Inspecting");
    let result = inspector.inspect(&FileSource::new(&cli.image));

    if result.pad_found {
        println!("Status: {}", result.status);
        println!(
            "Defects: [{}]",
            result
                .defects
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    } else {
        println!("No pad found in {}", cli.image.display());
    }

    InspectionReport::from_result(&result).write_to(&cli.report)?;

    if let (Some(path), Some(image)) = (&cli.annotated, &result.annotated_image) {
        ImageProcessor::from_rgb(image.clone()).save(path)?;
        tracing::info!(path = %path.display(), "Annotated image written");
    }

    Ok(())
}
