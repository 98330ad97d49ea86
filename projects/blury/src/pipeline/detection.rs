use crate::pipeline::types::{BBox, Detection};
use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, ImageBuffer, Rgb};
use opencv::core::Mat;
use opencv::prelude::*;
use usls::models::RTDETR;
use usls::{Config, Image};

/// Object detector run on a whole BGR image.
///
/// Errors are inference failures; the caller decides whether they end the batch.
pub trait ObjectDetector {
    fn detect(&mut self, image: &Mat) -> Result<Vec<Detection>>;
}

/// Any closure with the right signature is a detector. Handy for canned results.
impl<F> ObjectDetector for F
where
    F: FnMut(&Mat) -> Result<Vec<Detection>>,
{
    fn detect(&mut self, image: &Mat) -> Result<Vec<Detection>> {
        self(image)
    }
}

/// A wrapper around the USLS RT-DETR model that handles BGR-to-RGB conversion,
/// corrects for aspect-ratio padding bugs in the underlying model library and
/// drops detections under the confidence threshold.
pub struct RtdetrDetector {
    model: RTDETR,
    min_conf: f32,
}

impl RtdetrDetector {
    /// Create a new detector with the given model path.
    pub fn new(model_path: &str, min_conf: f32) -> Result<Self> {
        let config = detector_config(model_path, min_conf).commit()?;
        let model = RTDETR::new(config)
            .with_context(|| format!("Failed to load detection model: {}", model_path))?;
        tracing::info!("Loaded RT-DETR model from {} (min_conf={})", model_path, min_conf);
        Ok(Self { model, min_conf })
    }
}

impl ObjectDetector for RtdetrDetector {
    fn detect(&mut self, image: &Mat) -> Result<Vec<Detection>> {
        let dynamic_image = mat_to_dynamic_image(image)?;

        // Correction calculations (USLS RT-DETR bug workaround)
        let size = image.size()?;
        let img_w = size.width as f32;
        let img_h = size.height as f32;

        let (x_corr, y_corr) = if img_w > img_h {
            (img_w / img_h, 1.0)
        } else if img_h > img_w {
            (1.0, img_h / img_w)
        } else {
            (1.0, 1.0)
        };

        let results = self.model.forward(&[Image::from(dynamic_image)])?;
        let y = match results.into_iter().next() {
            Some(y) => y,
            None => return Ok(Vec::new()),
        };

        let detections = y
            .hbbs
            .into_iter()
            .filter(|hbb| hbb.confidence().unwrap_or(0.0) >= self.min_conf)
            .map(|hbb| {
                let x = hbb.xmin() * x_corr;
                let w = hbb.width() * x_corr;
                let y_coord = hbb.ymin() * y_corr;
                let h = hbb.height() * y_corr;

                Detection {
                    label: hbb.name().unwrap_or("").to_string(),
                    confidence: hbb.confidence().unwrap_or(0.0),
                    bbox: BBox::new(
                        x as i32,
                        y_coord as i32,
                        (x + w) as i32,
                        (y_coord + h) as i32,
                    ),
                }
            })
            .collect();

        Ok(detections)
    }
}

/// Model config with the class cutoff set to `min_conf`.
///
/// The library default cutoff (0.25) would otherwise drop lower-scoring boxes
/// before they reach our own filter.
fn detector_config(model_path: &str, min_conf: f32) -> Config {
    let config = Config::default()
        .with_model_file(model_path)
        .with_class_names(&usls::NAMES_COCO_80)
        .with_class_confs(&[min_conf]);

    #[cfg(target_os = "macos")]
    let config = config.with_model_device(usls::Device::CoreMl);

    config
}

/// Convert an OpenCV Mat (BGR) to an image::DynamicImage (RGB)
fn mat_to_dynamic_image(mat: &Mat) -> Result<DynamicImage> {
    let mut rgb_mat = Mat::default();
    opencv::imgproc::cvt_color_def(mat, &mut rgb_mat, opencv::imgproc::COLOR_BGR2RGB)?;

    let size = rgb_mat.size()?;
    let width = size.width as u32;
    let height = size.height as u32;

    if !rgb_mat.is_continuous() {
        return Err(anyhow!("Mat is not continuous"));
    }

    let data_bytes = rgb_mat.data_bytes()?;
    let buffer = data_bytes.to_vec();

    let img_buffer = ImageBuffer::<Rgb<u8>, _>::from_vec(width, height, buffer)
        .ok_or_else(|| anyhow!("Failed to create ImageBuffer from Mat data"))?;

    Ok(DynamicImage::ImageRgb8(img_buffer))
}
