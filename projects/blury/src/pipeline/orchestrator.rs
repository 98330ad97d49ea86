// Pipeline orchestrator: walks the input tree and runs
// load -> detect -> blur -> write for one file at a time.

use crate::pipeline::blur::blur_detections;
use crate::pipeline::detection::ObjectDetector;
use crate::pipeline::face::FaceLocator;
use crate::pipeline::filter::BlurFilter;
use crate::pipeline::reader::{load_image, LoadError};
use crate::pipeline::types::{BatchStats, BlurSummary, Detection, InferencePolicy};
use crate::pipeline::writer::save_image;
use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use opencv::core::Mat;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Holds the models and the one image currently being worked on.
pub struct BlurPipeline {
    detector: Box<dyn ObjectDetector>,
    faces: Box<dyn FaceLocator>,
    filter: BlurFilter,
    image: Option<Mat>,
}

impl BlurPipeline {
    pub fn new(
        detector: Box<dyn ObjectDetector>,
        faces: Box<dyn FaceLocator>,
        filter: BlurFilter,
    ) -> Self {
        Self {
            detector,
            faces,
            filter,
            image: None,
        }
    }

    /// Replace the working image with the decoded file.
    ///
    /// On failure the previous image is dropped.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        self.image = None;
        self.image = Some(load_image(path)?);
        Ok(())
    }

    #[cfg(test)]
    pub fn image(&self) -> Option<&Mat> {
        self.image.as_ref()
    }

    /// Run the detector on the working image.
    pub fn predict(&mut self) -> Result<Vec<Detection>> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| anyhow!("No image loaded"))?;
        self.detector.detect(image)
    }

    /// Blur the working image in place.
    pub fn blur(&mut self, detections: &[Detection]) -> Result<BlurSummary> {
        let image = self
            .image
            .as_mut()
            .ok_or_else(|| anyhow!("No image loaded"))?;
        blur_detections(image, detections, self.faces.as_mut(), &self.filter)
    }

    /// Write the working image to `out_dir/file_name`.
    pub fn save(&self, out_dir: &Path, file_name: &str) -> Result<PathBuf> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| anyhow!("No image loaded"))?;
        save_image(image, out_dir, file_name)
    }

    fn detect_and_blur(&mut self) -> Result<BlurSummary> {
        let detections = self.predict()?;
        tracing::debug!("{} detections", detections.len());
        self.blur(&detections)
    }
}

/// Every regular file under `root`, in file-name order within each directory.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Blur every image under `input_dir` into the flat `output_dir`.
///
/// Unloadable files are skipped and write failures are counted. Detector or
/// face-locator errors either end the batch or skip the file, per `policy`.
pub fn run_batch(
    pipeline: &mut BlurPipeline,
    input_dir: &Path,
    output_dir: &Path,
    policy: InferencePolicy,
) -> Result<BatchStats> {
    let start = Instant::now();
    let files = list_files(input_dir);
    tracing::info!("Found {} files under {:?}", files.len(), input_dir);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec:.1.yellow} img/s, {eta})")?
            .progress_chars("#>-"),
    );

    let mut stats = BatchStats::default();
    // Output name -> source that produced it
    let mut written_from: HashMap<String, PathBuf> = HashMap::new();

    for path in &files {
        pb.inc(1);

        if let Err(e) = pipeline.load(path) {
            tracing::info!("Skipping: {}", e);
            stats.skipped += 1;
            continue;
        }

        let summary = match pipeline.detect_and_blur() {
            Ok(summary) => summary,
            Err(e) => match policy {
                InferencePolicy::Abort => {
                    pb.abandon();
                    return Err(e).with_context(|| format!("Inference failed on {:?}", path));
                }
                InferencePolicy::Skip => {
                    tracing::error!("Inference failed on {:?}, skipping: {:#}", path, e);
                    stats.inference_failures += 1;
                    continue;
                }
            },
        };
        stats.processed += 1;
        tracing::debug!(
            "{:?}: {} faces, {} persons, {} plates blurred",
            path,
            summary.faces,
            summary.persons,
            summary.plates
        );

        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            tracing::warn!("Cannot derive an output name for {:?}", path);
            stats.write_failures += 1;
            continue;
        };

        match pipeline.save(output_dir, file_name) {
            Ok(out) => {
                if let Some(previous) = written_from.insert(file_name.to_string(), path.clone()) {
                    tracing::warn!(
                        "{:?} overwrote the output of {:?} at {:?}",
                        path,
                        previous,
                        out
                    );
                }
                stats.written += 1;
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                stats.write_failures += 1;
            }
        }
    }

    pb.finish_with_message("Done");

    tracing::info!(
        "This took {:.3}min: {} processed, {} skipped, {} written, {} write failures, {} inference failures",
        start.elapsed().as_secs_f64() / 60.0,
        stats.processed,
        stats.skipped,
        stats.written,
        stats.write_failures,
        stats.inference_failures
    );

    Ok(stats)
}
