use anyhow::{anyhow, Result};
use opencv::core::{Mat, Vector};
use opencv::imgcodecs;
use std::path::{Path, PathBuf};

/// Encode `image` into `out_dir/file_name`, format chosen by the extension.
///
/// `out_dir` must already exist.
pub fn save_image(image: &Mat, out_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = out_dir.join(file_name);
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Output path is not valid UTF-8: {:?}", path))?;

    let written = imgcodecs::imwrite(path_str, image, &Vector::new())
        .map_err(|e| anyhow!("Failed to save image {}: {}", file_name, e))?;
    if !written {
        return Err(anyhow!("Failed to save image {}", file_name));
    }

    Ok(path)
}
