use anyhow::Result;
use opencv::core::{Mat, Size};
use opencv::imgproc;
use opencv::prelude::*;

/// Side of the square Gaussian kernel, in pixels.
pub const KERNEL_SIZE: i32 = 25;
/// Standard deviation of the Gaussian kernel.
pub const SIGMA: f64 = 30.0;
pub const DEFAULT_PASSES: u32 = 3;

/// Repeated fixed-kernel Gaussian smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurFilter {
    passes: u32,
}

impl BlurFilter {
    pub fn new(passes: u32) -> Self {
        Self { passes }
    }

    /// Smooth `region` `passes` times, each pass reading the previous output.
    ///
    /// The input is left untouched; the caller writes the result back.
    pub fn apply(&self, region: &impl MatTraitConst) -> Result<Mat> {
        let mut current = Mat::default();
        region.copy_to(&mut current)?;

        for _ in 0..self.passes {
            let mut next = Mat::default();
            // sigma_y defaults to sigma_x
            imgproc::gaussian_blur_def(
                &current,
                &mut next,
                Size::new(KERNEL_SIZE, KERNEL_SIZE),
                SIGMA,
            )?;
            current = next;
        }

        Ok(current)
    }
}

impl Default for BlurFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PASSES)
    }
}
