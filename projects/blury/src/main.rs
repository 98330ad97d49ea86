mod cli;
mod config;
mod pipeline;

use anyhow::{anyhow, Result};
use cli::Args;
use pipeline::detection::RtdetrDetector;
use pipeline::face::RustfaceLocator;
use pipeline::filter::BlurFilter;
use pipeline::orchestrator::{run_batch, BlurPipeline};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse_args();

    let dirs = config::resolve_directories(&args);
    let Some((input_dir, output_dir)) = dirs.resolved() else {
        tracing::error!("Errors in directories configuration!");
        return Ok(ExitCode::FAILURE);
    };

    let model = args
        .model
        .as_deref()
        .ok_or_else(|| anyhow!("No detection model given (--model or BLURY_MODEL)"))?;
    let face_model = args
        .face_model
        .as_deref()
        .ok_or_else(|| anyhow!("No face model given (--face-model or BLURY_FACE_MODEL)"))?;

    let detector = RtdetrDetector::new(model, args.threshold)?;
    let faces = RustfaceLocator::new(face_model)?;
    let mut pipeline = BlurPipeline::new(
        Box::new(detector),
        Box::new(faces),
        BlurFilter::new(args.filter),
    );

    run_batch(&mut pipeline, input_dir, output_dir, args.on_inference_error)?;

    Ok(ExitCode::SUCCESS)
}
