//! Image persistence and decoding helpers.
//!
//! # Responsibility
//! - Store bookmark photos as lossless PNG side-files keyed by bookmark id.
//! - Decode picked/captured photos at bounded resolution.
//!
//! # Invariants
//! - Image failures are reported to callers, which log and continue.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod downsample;
mod image_store;

pub use downsample::{downsampled_dimensions, load_downsampled, sample_factor, ImageSource};
pub use image_store::ImageStore;

pub type ImageResult<T> = Result<T, ImageStoreError>;

#[derive(Debug)]
pub enum ImageStoreError {
    Io(std::io::Error),
    Codec(image::ImageError),
    InvalidBounds { max_width: u32, max_height: u32 },
}

impl Display for ImageStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "image file I/O failed: {err}"),
            Self::Codec(err) => write!(f, "image encode/decode failed: {err}"),
            Self::InvalidBounds {
                max_width,
                max_height,
            } => write!(
                f,
                "downsample bounds must be positive, got {max_width}x{max_height}"
            ),
        }
    }
}

impl Error for ImageStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::InvalidBounds { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImageStoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<image::ImageError> for ImageStoreError {
    fn from(value: image::ImageError) -> Self {
        Self::Codec(value)
    }
}
