// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region locator — finds the bounding box of the largest bright region in a
// frame via smoothing, a fixed brightness threshold and external contours.

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::filter::separable_filter_equal;
use imageproc::geometry::contour_area;
use padinspect_core::{BoundingBox, LocatorConfig};
use tracing::{debug, info, instrument, warn};

use crate::annotate::{HIGHLIGHT_COLOR, draw_outline};
use crate::frame::ImageProcessor;

/// Where the pad was found, plus a copy of the frame with its box outlined.
#[derive(Debug, Clone)]
pub struct PadLocation {
    pub bbox: BoundingBox,
    /// Polygon area of the selected contour, in pixels.
    pub area: f64,
    pub annotated: RgbImage,
}

/// Why no pad was reported.
#[derive(Debug, Clone, PartialEq)]
pub enum LocateMiss {
    /// Nothing in the frame passed the brightness threshold.
    NoRegion,
    /// The largest bright region is below the minimum area.
    TooSmall { area: f64, min_area: f64 },
}

/// Bright-region localizer. Stateless apart from its thresholds.
#[derive(Debug, Clone, Default)]
pub struct RegionLocator {
    config: LocatorConfig,
}

impl RegionLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Locate the pad in `image`.
    ///
    /// ## Pipeline
    ///
    /// 1. Convert to luma
    /// 2. 5x5 Gaussian blur to suppress sensor noise
    /// 3. Binarize: luma strictly above the brightness threshold is foreground
    /// 4. Extract external contours only
    /// 5. Keep the contour with the largest polygon area, rejecting it when
    ///    below the minimum area
    /// 6. Take its axis-aligned bounding box and outline it on a copy
    ///
    /// The input frame is left untouched.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn locate(&self, image: &RgbImage) -> Result<PadLocation, LocateMiss> {
        let gray = ImageProcessor::from_rgb(image.clone()).grayscale();
        let blurred = smooth(&gray, self.config.blur_sigma);
        let mask = threshold(
            &blurred,
            self.config.brightness_threshold,
            ThresholdType::Binary,
        );

        let contours = find_contours::<u32>(&mask);
        let largest = contours
            .iter()
            .filter(|contour| is_external(contour))
            .map(|contour| (contour, contour_area(&contour.points)))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let Some((contour, area)) = largest else {
            warn!("No bright region found");
            return Err(LocateMiss::NoRegion);
        };
        debug!(
            candidates = contours.len(),
            area, "Largest external contour selected"
        );

        if area < self.config.min_area {
            warn!(
                area,
                min_area = self.config.min_area,
                "Largest bright region too small"
            );
            return Err(LocateMiss::TooSmall {
                area,
                min_area: self.config.min_area,
            });
        }

        let bbox = bounding_rect(contour).ok_or(LocateMiss::NoRegion)?;
        info!(
            x = bbox.x,
            y = bbox.y,
            w = bbox.width,
            h = bbox.height,
            area,
            "Pad located"
        );

        let mut annotated = image.clone();
        draw_outline(
            &mut annotated,
            &bbox,
            self.config.outline_thickness,
            HIGHLIGHT_COLOR,
        );

        Ok(PadLocation {
            bbox,
            area,
            annotated,
        })
    }
}

/// Taps of the smoothing kernel.
const KERNEL_TAPS: usize = 5;

/// Normalized 1-D Gaussian of `KERNEL_TAPS` taps at `sigma`.
fn gaussian_taps(sigma: f32) -> [f32; KERNEL_TAPS] {
    let center = (KERNEL_TAPS / 2) as f32;
    let mut taps = [0.0f32; KERNEL_TAPS];
    for (i, tap) in taps.iter_mut().enumerate() {
        let d = i as f32 - center;
        *tap = (-(d * d) / (2.0 * sigma * sigma)).exp();
    }
    let sum: f32 = taps.iter().sum();
    taps.iter_mut().for_each(|tap| *tap /= sum);
    taps
}

/// Separable 5x5 Gaussian smoothing. Both passes run in `f32` and the result
/// is rounded to nearest once, so a uniform area keeps its exact level.
fn smooth(gray: &GrayImage, sigma: f32) -> GrayImage {
    let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([f32::from(gray.get_pixel(x, y).0[0])])
        });
    let blurred = separable_filter_equal(&levels, &gaussian_taps(sigma));
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([blurred.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}

/// Outer border with no enclosing contour.
fn is_external(contour: &Contour<u32>) -> bool {
    matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none()
}

/// Smallest axis-aligned box containing every contour point.
fn bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::point::Point;

    fn frame_with_rect(
        (w, h): (u32, u32),
        (rx, ry, rw, rh): (u32, u32, u32, u32),
    ) -> RgbImage {
        let mut img = RgbImage::from_pixel(w, h, Rgb([0, 0, 0]));
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        img
    }

    fn assert_close(actual: u32, expected: u32, tolerance: u32) {
        assert!(
            actual.abs_diff(expected) <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn locates_bright_rectangle() {
        let img = frame_with_rect((400, 300), (100, 100, 200, 100));
        let location = RegionLocator::default().locate(&img).unwrap();

        // Blurring softens the border by about one pixel on each side.
        assert_close(location.bbox.x, 100, 2);
        assert_close(location.bbox.y, 100, 2);
        assert_close(location.bbox.width, 200, 3);
        assert_close(location.bbox.height, 100, 3);
        assert!(location.area > 18_000.0);
    }

    #[test]
    fn input_frame_is_not_modified() {
        let img = frame_with_rect((400, 300), (100, 100, 200, 100));
        let copy = img.clone();
        let location = RegionLocator::default().locate(&img).unwrap();
        assert_eq!(img, copy);
        assert_ne!(location.annotated, img, "annotated copy carries the outline");
    }

    #[test]
    fn outline_is_drawn_around_box() {
        let img = frame_with_rect((400, 300), (100, 100, 200, 100));
        let location = RegionLocator::default().locate(&img).unwrap();
        let bbox = location.bbox;
        // Top-left corner of the outline sits on the box corner.
        assert_eq!(
            location.annotated.get_pixel(bbox.x, bbox.y),
            &HIGHLIGHT_COLOR
        );
    }

    #[test]
    fn dark_frame_has_no_region() {
        let img = RgbImage::from_pixel(200, 200, Rgb([40, 40, 40]));
        assert_eq!(
            RegionLocator::default().locate(&img).unwrap_err(),
            LocateMiss::NoRegion
        );
    }

    #[test]
    fn small_bright_blob_is_rejected() {
        // 30x30 contour encloses well under 1000 px after blurring.
        let img = frame_with_rect((200, 200), (50, 50, 30, 30));
        match RegionLocator::default().locate(&img).unwrap_err() {
            LocateMiss::TooSmall { area, min_area } => {
                assert!(area < min_area);
                assert_eq!(min_area, 1000.0);
            }
            other => panic!("unexpected miss: {other:?}"),
        }
    }

    #[test]
    fn many_small_blobs_never_qualify() {
        let mut img = RgbImage::from_pixel(300, 300, Rgb([0, 0, 0]));
        for (ox, oy) in [(10, 10), (100, 10), (200, 200), (20, 150)] {
            for y in oy..oy + 25 {
                for x in ox..ox + 25 {
                    img.put_pixel(x, y, Rgb([255, 255, 255]));
                }
            }
        }
        assert!(RegionLocator::default().locate(&img).is_err());
    }

    #[test]
    fn largest_region_wins() {
        let mut img = frame_with_rect((500, 400), (20, 20, 60, 40));
        for y in 200..320 {
            for x in 150..430 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let location = RegionLocator::default().locate(&img).unwrap();
        assert_close(location.bbox.x, 150, 2);
        assert_close(location.bbox.y, 200, 2);
    }

    #[test]
    fn region_touching_frame_edge_is_found() {
        let img = frame_with_rect((300, 200), (0, 0, 150, 80));
        let location = RegionLocator::default().locate(&img).unwrap();
        assert!(location.bbox.x <= 1);
        assert!(location.bbox.y <= 1);
        assert!(location.bbox.fits_within(300, 200));
    }

    #[test]
    fn brightness_threshold_is_strict() {
        let pad_at = |v: u8| {
            let mut img = RgbImage::from_pixel(400, 300, Rgb([0, 0, 0]));
            for y in 100..200 {
                for x in 100..300 {
                    img.put_pixel(x, y, Rgb([v, v, v]));
                }
            }
            img
        };
        let locator = RegionLocator::default();
        assert_eq!(locator.locate(&pad_at(180)).unwrap_err(), LocateMiss::NoRegion);
        assert!(locator.locate(&pad_at(181)).is_ok());
    }

    #[test]
    fn smoothing_kernel_is_five_normalized_taps() {
        let taps = gaussian_taps(1.1);
        assert_eq!(taps.len(), 5);
        assert!((taps.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(taps[0], taps[4]);
        assert_eq!(taps[1], taps[3]);
        assert!(taps[2] > taps[1] && taps[1] > taps[0]);
    }

    #[test]
    fn smoothing_reaches_two_pixels_only() {
        // A single bright pixel spreads over exactly a 5x5 neighbourhood.
        let mut gray = GrayImage::new(11, 11);
        gray.put_pixel(5, 5, Luma([255]));
        let blurred = smooth(&gray, 1.1);
        assert!(blurred.get_pixel(3, 5).0[0] > 0);
        assert!(blurred.get_pixel(7, 7).0[0] > 0);
        assert_eq!(blurred.get_pixel(2, 5).0[0], 0);
        assert_eq!(blurred.get_pixel(5, 8).0[0], 0);
    }

    #[test]
    fn smoothing_keeps_uniform_level() {
        let gray = GrayImage::from_pixel(9, 9, Luma([181]));
        assert!(smooth(&gray, 1.1).pixels().all(|p| p.0[0] == 181));
    }

    #[test]
    fn contour_area_of_square_outline() {
        let contour = Contour {
            points: vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 5),
                Point::new(0, 5),
            ],
            border_type: BorderType::Outer,
            parent: None,
        };
        assert!((contour_area(&contour.points) - 50.0).abs() < 1e-9);
        assert_eq!(
            bounding_rect(&contour),
            BoundingBox::new(0, 0, 11, 6)
        );
    }
}
