// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame handling — decode, strict region extraction, grayscale and lossless
// encoding. Operates on in-memory RGB frames using the `image` crate.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use padinspect_core::BoundingBox;
use padinspect_core::error::PadInspectError;
use tracing::{debug, info, instrument};

/// Thin wrapper around one decoded RGB frame.
///
/// The wrapped image is never mutated; every operation returns a new buffer.
///
/// ```ignore
/// let frame = ImageProcessor::open("pad.jpg")?;
/// let region = frame.crop_region(&bbox)?;
/// let png = ImageProcessor::from_rgb(region).to_png_bytes()?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    image: RgbImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, PadInspectError> {
        let img = image::open(path.as_ref()).map_err(|err| {
            PadInspectError::Decode(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self::from_dynamic(img))
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PadInspectError> {
        let img = image::load_from_memory(data)
            .map_err(|err| PadInspectError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self::from_dynamic(img))
    }

    /// Wrap an already-decoded `DynamicImage`, dropping any alpha channel.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }

    /// Wrap an RGB buffer.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    // -- Derived buffers ------------------------------------------------------

    /// Single-channel BT.601 luma copy of the frame.
    pub fn grayscale(&self) -> GrayImage {
        GrayImage::from_fn(self.image.width(), self.image.height(), |x, y| {
            Luma([luma_bt601(self.image.get_pixel(x, y))])
        })
    }

    /// Copy the pixels under `bbox` into a new buffer.
    ///
    /// Unlike a clamping crop, a box whose bottom-right corner lies outside
    /// the frame is rejected with `PadInspectError::InvalidRegion`.
    #[instrument(skip(self), fields(x = bbox.x, y = bbox.y, w = bbox.width, h = bbox.height))]
    pub fn crop_region(&self, bbox: &BoundingBox) -> Result<RgbImage, PadInspectError> {
        let (img_w, img_h) = self.image.dimensions();
        if !bbox.fits_within(img_w, img_h) {
            return Err(PadInspectError::InvalidRegion {
                x: bbox.x,
                y: bbox.y,
                width: bbox.width,
                height: bbox.height,
                image_width: img_w,
                image_height: img_h,
            });
        }
        let region = image::imageops::crop_imm(&self.image, bbox.x, bbox.y, bbox.width, bbox.height)
            .to_image();
        debug!(
            region_w = region.width(),
            region_h = region.height(),
            "Region extracted"
        );
        Ok(region)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the frame as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, PadInspectError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Write the frame to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), PadInspectError> {
        self.image.save(path.as_ref()).map_err(|err| {
            PadInspectError::Encode(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// BT.601 luma (0.299 R + 0.587 G + 0.114 B) in 14-bit fixed point, rounded
/// to nearest. Every threshold in the inspection is expressed on this scale.
pub fn luma_bt601(pixel: &Rgb<u8>) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const SHIFT: u32 = 14;

    let Rgb([r, g, b]) = *pixel;
    let weighted = r as u32 * R + g as u32 * G + b as u32 * B + (1 << (SHIFT - 1));
    (weighted >> SHIFT) as u8
}

/// Encode an RGB image into the specified format, returning the raw bytes.
pub(crate) fn encode_to_format(
    image: &RgbImage,
    format: ImageFormat,
) -> Result<Vec<u8>, PadInspectError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| PadInspectError::Encode(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]))
    }

    #[test]
    fn crop_region_has_box_dimensions() {
        let frame = ImageProcessor::from_rgb(gradient(120, 80));
        for (x, y, w, h) in [(0, 0, 4, 4), (10, 5, 100, 70), (116, 76, 4, 4), (0, 0, 120, 80)] {
            let bbox = BoundingBox::new(x, y, w, h).unwrap();
            let region = frame.crop_region(&bbox).unwrap();
            assert_eq!(region.dimensions(), (w, h));
            assert_eq!(region.get_pixel(0, 0), frame.as_rgb().get_pixel(x, y));
        }
    }

    #[test]
    fn crop_region_rejects_box_past_edge() {
        let frame = ImageProcessor::from_rgb(gradient(120, 80));
        let bbox = BoundingBox::new(20, 10, 101, 40).unwrap();
        let err = frame.crop_region(&bbox).unwrap_err();
        assert!(matches!(
            err,
            PadInspectError::InvalidRegion {
                image_width: 120,
                image_height: 80,
                ..
            }
        ));
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let original = gradient(16, 9);
        let bytes = ImageProcessor::from_rgb(original.clone())
            .to_png_bytes()
            .unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        let decoded = ImageProcessor::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.as_rgb(), &original);
    }

    #[test]
    fn luma_uses_bt601_weights() {
        for v in [0u8, 1, 50, 100, 180, 181, 255] {
            assert_eq!(luma_bt601(&Rgb([v, v, v])), v);
        }
        assert_eq!(luma_bt601(&Rgb([255, 0, 0])), 76);
        assert_eq!(luma_bt601(&Rgb([0, 255, 0])), 150);
        assert_eq!(luma_bt601(&Rgb([0, 0, 255])), 29);
        assert_eq!(luma_bt601(&Rgb([0, 145, 0])), 85);
    }

    #[test]
    fn grayscale_applies_luma_per_pixel() {
        let frame = ImageProcessor::from_rgb(gradient(16, 9));
        let gray = frame.grayscale();
        assert_eq!(gray.dimensions(), (16, 9));
        assert_eq!(gray.get_pixel(5, 3).0[0], luma_bt601(&Rgb([5, 3, 7])));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = ImageProcessor::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PadInspectError::Decode(_)));
    }

    #[test]
    fn open_missing_file_is_decode_error() {
        let err = ImageProcessor::open("/nonexistent/pad.png").unwrap_err();
        assert!(matches!(err, PadInspectError::Decode(_)));
    }
}
