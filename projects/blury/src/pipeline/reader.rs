// Reader: decodes image files into the working buffer

use opencv::core::Mat;
use opencv::imgcodecs;
use opencv::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted by the loader, compared exactly.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("this file is not an image: {0}")]
    UnsupportedExtension(PathBuf),

    #[error("failed to read image {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("image decoded to no data: {0}")]
    Empty(PathBuf),
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| IMAGE_EXTENSIONS.contains(&s))
        .unwrap_or(false)
}

/// Decode an image file into a BGR buffer.
///
/// The extension is checked before the file is touched.
pub fn load_image(path: &Path) -> Result<Mat, LoadError> {
    if !is_supported_image(path) {
        return Err(LoadError::UnsupportedExtension(path.to_path_buf()));
    }

    let path_str = path.to_str().ok_or_else(|| LoadError::Unreadable {
        path: path.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })?;

    let mat = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR).map_err(|e| {
        LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    if mat.empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    Ok(mat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, Vector, CV_8UC3};

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("a/b/photo.jpg")));
        assert!(is_supported_image(Path::new("photo.jpeg")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(!is_supported_image(Path::new("photo.PNG")));
        assert!(!is_supported_image(Path::new("x.JPG")));
        assert!(!is_supported_image(Path::new("toto.txt")));
        assert!(!is_supported_image(Path::new("archive.png.gz")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn test_rejects_extension_without_reading() {
        // The file does not exist, so any decode attempt would yield a different error
        let err = load_image(Path::new("/nonexistent/toto.txt")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_uppercase_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.PNG");
        let img = Mat::new_rows_cols_with_default(8, 10, CV_8UC3, Scalar::all(77.0)).unwrap();
        let lower = dir.path().join("photo.png");
        imgcodecs::imwrite(lower.to_str().unwrap(), &img, &Vector::new()).unwrap();
        std::fs::rename(&lower, &path).unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_missing_file_is_failure() {
        let err = load_image(Path::new("/nonexistent/dir/photo.jpg")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Empty(_) | LoadError::Unreadable { .. }
        ));
    }

    #[test]
    fn test_corrupt_file_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Empty(_) | LoadError::Unreadable { .. }
        ));
    }

    #[test]
    fn test_loads_valid_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.png");
        let img = Mat::new_rows_cols_with_default(8, 10, CV_8UC3, Scalar::all(77.0)).unwrap();
        imgcodecs::imwrite(path.to_str().unwrap(), &img, &Vector::new()).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.rows(), 8);
        assert_eq!(loaded.cols(), 10);
        assert_eq!(loaded.channels(), 3);
    }
}
