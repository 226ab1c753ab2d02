//! Power-of-two downsampled decoding for picked or captured photos.
//!
//! The factor is the smallest `2^n` that brings both dimensions inside the
//! requested bounds; the result is `floor(w / 2^n) x floor(h / 2^n)`.
//! Decoding runs under a fixed allocation budget, so oversized inputs fail
//! with a codec error instead of exhausting memory. The result does not
//! crop or fit exactly.

use super::{ImageResult, ImageStoreError};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, Limits};
use log::debug;
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

/// Upper bound on decoder allocations for one photo.
const DECODE_ALLOC_LIMIT: u64 = 256 * 1024 * 1024;

/// Encoded image input.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

/// Smallest power-of-two factor fitting `width x height` into the bounds.
///
/// Bounds of zero are treated as one.
pub fn sample_factor(width: u32, height: u32, max_width: u32, max_height: u32) -> u32 {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);
    let mut factor = 1u32;
    while width / factor > max_width || height / factor > max_height {
        factor *= 2;
    }
    factor
}

/// Target dimensions for a given source size and factor, never below 1x1.
pub fn downsampled_dimensions(width: u32, height: u32, factor: u32) -> (u32, u32) {
    ((width / factor).max(1), (height / factor).max(1))
}

/// Decodes `source` reduced by the power-of-two factor for the bounds.
pub fn load_downsampled(
    source: ImageSource<'_>,
    max_width: u32,
    max_height: u32,
) -> ImageResult<DynamicImage> {
    load_downsampled_within(source, max_width, max_height, DECODE_ALLOC_LIMIT)
}

fn load_downsampled_within(
    source: ImageSource<'_>,
    max_width: u32,
    max_height: u32,
    alloc_limit: u64,
) -> ImageResult<DynamicImage> {
    if max_width == 0 || max_height == 0 {
        return Err(ImageStoreError::InvalidBounds {
            max_width,
            max_height,
        });
    }

    let (width, height) = read_dimensions(source)?;
    let factor = sample_factor(width, height, max_width, max_height);
    let image = decode(source, alloc_limit)?;

    if factor == 1 {
        return Ok(image);
    }

    let (target_width, target_height) = downsampled_dimensions(width, height, factor);
    debug!(
        "event=image_downsample module=media status=ok source={}x{} factor={} target={}x{}",
        width, height, factor, target_width, target_height
    );
    Ok(image.resize_exact(target_width, target_height, FilterType::Triangle))
}

fn read_dimensions(source: ImageSource<'_>) -> ImageResult<(u32, u32)> {
    let dimensions = match source {
        ImageSource::Path(path) => ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()?,
        ImageSource::Bytes(bytes) => ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .into_dimensions()?,
    };
    Ok(dimensions)
}

fn decode(source: ImageSource<'_>, alloc_limit: u64) -> ImageResult<DynamicImage> {
    match source {
        ImageSource::Path(path) => {
            decode_limited(ImageReader::open(path)?.with_guessed_format()?, alloc_limit)
        }
        ImageSource::Bytes(bytes) => decode_limited(
            ImageReader::new(Cursor::new(bytes)).with_guessed_format()?,
            alloc_limit,
        ),
    }
}

fn decode_limited<R: BufRead + Seek>(
    mut reader: ImageReader<R>,
    alloc_limit: u64,
) -> ImageResult<DynamicImage> {
    let mut limits = Limits::default();
    limits.max_alloc = Some(alloc_limit);
    reader.limits(limits);
    Ok(reader.decode()?)
}

#[cfg(test)]
mod tests {
    use super::{
        downsampled_dimensions, load_downsampled, load_downsampled_within, sample_factor,
        ImageSource,
    };
    use crate::media::ImageStoreError;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::{BufRead, Cursor, Seek};

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn sample_factor_picks_smallest_fitting_power_of_two() {
        assert_eq!(sample_factor(4000, 3000, 512, 512), 8);
        assert_eq!(downsampled_dimensions(4000, 3000, 8), (500, 375));
        assert_eq!(sample_factor(512, 512, 512, 512), 1);
        assert_eq!(sample_factor(513, 10, 512, 512), 2);
        assert_eq!(sample_factor(100, 5000, 1000, 1000), 8);
    }

    #[test]
    fn sample_factor_treats_zero_bounds_as_one() {
        assert_eq!(sample_factor(8, 8, 0, 0), 8);
        assert_eq!(downsampled_dimensions(3, 1, 4), (1, 1));
    }

    #[test]
    fn load_downsampled_from_bytes_and_path() {
        let bytes = encoded_png(64, 48);
        let from_bytes = load_downsampled(ImageSource::Bytes(&bytes), 16, 16).unwrap();
        assert_eq!((from_bytes.width(), from_bytes.height()), (16, 12));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, &bytes).unwrap();
        let from_path = load_downsampled(ImageSource::Path(&path), 40, 40).unwrap();
        assert_eq!((from_path.width(), from_path.height()), (32, 24));
    }

    #[test]
    fn load_downsampled_keeps_small_images_untouched() {
        let bytes = encoded_png(10, 6);
        let image = load_downsampled(ImageSource::Bytes(&bytes), 512, 512).unwrap();
        assert_eq!((image.width(), image.height()), (10, 6));
    }

    #[test]
    fn load_downsampled_rejects_zero_bounds() {
        let bytes = encoded_png(4, 4);
        let err = load_downsampled(ImageSource::Bytes(&bytes), 0, 10).unwrap_err();
        assert!(matches!(err, ImageStoreError::InvalidBounds { .. }));
    }

    #[test]
    fn decode_over_alloc_budget_fails_with_codec_error() {
        let bytes = encoded_png(64, 48);
        let err = load_downsampled_within(ImageSource::Bytes(&bytes), 16, 16, 1024).unwrap_err();
        assert!(matches!(err, ImageStoreError::Codec(_)));

        let within = load_downsampled_within(ImageSource::Bytes(&bytes), 16, 16, 1 << 20).unwrap();
        assert_eq!((within.width(), within.height()), (16, 12));
    }
}
