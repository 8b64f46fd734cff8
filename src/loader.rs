//! Image loading for sprite strips.
//!
//! Decoding is delegated to an [`ImageSource`]. The default
//! [`FileImageSource`] reads from the file system and guesses the format
//! from the file contents, so a mislabelled extension still decodes.

use std::io;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader, RgbaImage};
use thiserror::Error;
use tracing::debug;

/// File extensions offered by file pickers for sprite strips.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Error returned when a sprite strip cannot be loaded.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    /// Nothing exists at the given path
    #[error("image not found: {}", path.display())]
    NotFound { path: PathBuf },
    /// The file exists but could not be read
    #[error("failed to read image {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file was read but is not a decodable raster image
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

impl ImageLoadError {
    /// The path that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            ImageLoadError::NotFound { path }
            | ImageLoadError::Io { path, .. }
            | ImageLoadError::Decode { path, .. } => path,
        }
    }
}

/// Result type for image loading operations
pub type LoadResult<T> = Result<T, ImageLoadError>;

/// Decodes sprite strips into RGBA pixel buffers.
///
/// Implement this trait to load images from somewhere other than the local
/// file system (embedded assets, archives, test fixtures, ...).
pub trait ImageSource {
    /// Decode the image identified by `path`.
    fn decode(&self, path: &Path) -> LoadResult<RgbaImage>;
}

/// Loads images from the local file system using the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn decode(&self, path: &Path) -> LoadResult<RgbaImage> {
        if !path.exists() {
            return Err(ImageLoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let io_err = |source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let reader = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?;
        let image = reader.decode().map_err(|source| ImageLoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let rgba = image.to_rgba8();
        debug!(
            path = %path.display(),
            width = rgba.width(),
            height = rgba.height(),
            "decoded sprite strip"
        );
        Ok(rgba)
    }
}

/// Decode `path` with the default [`FileImageSource`].
pub fn load_image(path: impl AsRef<Path>) -> LoadResult<RgbaImage> {
    FileImageSource.decode(path.as_ref())
}

/// Check whether `path` has one of the [`SUPPORTED_EXTENSIONS`].
///
/// The comparison is case-insensitive. This is only a hint for file pickers;
/// [`FileImageSource`] sniffs the actual format from the file contents.
pub fn is_supported_path(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_load_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strip.png");
        RgbaImage::from_pixel(128, 32, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.dimensions(), (128, 32));
        assert_eq!(image.get_pixel(5, 5), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.png");

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ImageLoadError::NotFound { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_undecodable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
        assert!(err.to_string().contains("notes.png"));
    }

    #[test]
    fn test_directory_is_not_an_image() {
        let dir = TempDir::new().unwrap();
        let err = load_image(dir.path()).unwrap_err();
        assert!(!matches!(err, ImageLoadError::NotFound { .. }));
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_path("walk.png"));
        assert!(is_supported_path("walk.JPG"));
        assert!(is_supported_path("dir/walk.bmp"));
        assert!(!is_supported_path("walk.txt"));
        assert!(!is_supported_path("walk"));
    }
}
