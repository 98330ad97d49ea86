use crate::pipeline::types::FaceRect;
use anyhow::{anyhow, Context, Result};
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;

/// Finds faces inside a cropped person region.
///
/// Rectangles are relative to the region, in the order the backend reports them.
pub trait FaceLocator {
    fn locate(&mut self, region: &Mat) -> Result<Vec<FaceRect>>;
}

impl<F> FaceLocator for F
where
    F: FnMut(&Mat) -> Result<Vec<FaceRect>>,
{
    fn locate(&mut self, region: &Mat) -> Result<Vec<FaceRect>> {
        self(region)
    }
}

/// Face locator backed by the `rustface` crate (SeetaFace engine).
///
/// Tuned for speed: a coarse sliding window and an aggressive pyramid.
pub struct RustfaceLocator {
    detector: Box<dyn rustface::Detector>,
}

impl RustfaceLocator {
    /// Load a SeetaFace model from disk.
    pub fn new(model_path: &str) -> Result<Self> {
        let file = std::fs::File::open(model_path)
            .with_context(|| format!("Failed to open face model: {}", model_path))?;
        let model = rustface::read_model(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to load face model: {}", model_path))?;

        let mut detector = rustface::create_detector_with_model(model);
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        tracing::info!("Loaded face model from {}", model_path);
        Ok(Self { detector })
    }
}

impl FaceLocator for RustfaceLocator {
    fn locate(&mut self, region: &Mat) -> Result<Vec<FaceRect>> {
        if region.empty() {
            return Ok(Vec::new());
        }

        let gray = to_gray(region)?;
        let size = gray.size()?;
        let bytes = gray.data_bytes()?;

        let faces = self.detector.detect(&rustface::ImageData::new(
            bytes,
            size.width as u32,
            size.height as u32,
        ));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceRect {
                    top: bbox.y(),
                    right: bbox.x() + bbox.width() as i32,
                    bottom: bbox.y() + bbox.height() as i32,
                    left: bbox.x(),
                }
            })
            .collect())
    }
}

/// Single-channel continuous copy of a BGR (or already gray) region.
fn to_gray(region: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    match region.channels() {
        1 => region.copy_to(&mut gray)?,
        3 => imgproc::cvt_color_def(region, &mut gray, imgproc::COLOR_BGR2GRAY)?,
        4 => imgproc::cvt_color_def(region, &mut gray, imgproc::COLOR_BGRA2GRAY)?,
        n => return Err(anyhow!("Unsupported channel count for face detection: {}", n)),
    }

    if !gray.is_continuous() {
        return Err(anyhow!("Mat is not continuous"));
    }
    Ok(gray)
}
