// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation — draws the pad outline and the verdict labels onto a copy of
// the frame. Runs after the verdict is decided and never feeds back into it.

use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use padinspect_core::error::{PadInspectError, Result};
use padinspect_core::{BoundingBox, DefectLabel, InspectionStatus};
use tracing::{debug, info};

/// Outline and positive-verdict color.
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Defect label color.
pub const ALARM_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Text shown for a sound pad.
pub const SOUND_MARKER: &str = "Sound";

/// Vertical distance between stacked labels.
const LINE_SPACING: i32 = 20;
/// Gap between the box top and the first label baseline.
const ABOVE_GAP: i32 = 5;
/// Gap between the box bottom and the first label baseline when placed below.
const BELOW_GAP: i32 = 15;
/// Labels whose baseline would land above this row move below the box.
const TOP_MARGIN: i32 = 10;
/// Side of the swatch drawn in place of text when no font is loaded.
const MARKER_SIZE: u32 = 10;

/// Draw a `thickness`-pixel outline around `bbox`, growing outwards so the
/// pad pixels themselves stay untouched beyond the first ring.
pub fn draw_outline(image: &mut RgbImage, bbox: &BoundingBox, thickness: u32, color: Rgb<u8>) {
    for t in 0..thickness.max(1) as i32 {
        let rect = Rect::at(bbox.x as i32 - t, bbox.y as i32 - t)
            .of_size(bbox.width + 2 * t as u32, bbox.height + 2 * t as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Baseline anchors (x, y) for the verdict labels of one pad.
///
/// A sound pad gets a single marker 5px above the box, or 15px below it when
/// that would leave the frame. Defect labels stack upwards one line per label
/// starting 5px above the box; any label whose baseline would rise above
/// y=10 is placed below the box instead, at its own line index, so label
/// order is kept in both directions.
pub fn label_anchors(bbox: &BoundingBox, status: InspectionStatus, count: usize) -> Vec<(i32, i32)> {
    let x = bbox.x as i32;
    let top = bbox.y as i32;
    let below = top + bbox.height as i32 + BELOW_GAP;

    match status {
        InspectionStatus::Sound => {
            let y = if top - ABOVE_GAP > 0 { top - ABOVE_GAP } else { below };
            vec![(x, y)]
        }
        InspectionStatus::Defective => (0..count as i32)
            .map(|i| {
                let above = top - ABOVE_GAP - i * LINE_SPACING;
                if above < TOP_MARGIN {
                    (x, below + i * LINE_SPACING)
                } else {
                    (x, above)
                }
            })
            .collect(),
        InspectionStatus::Unknown | InspectionStatus::ReadFailure => Vec::new(),
    }
}

/// Renders verdict text. Without a font, colored swatches mark each label
/// position instead of text.
pub struct Annotator {
    font: Option<FontVec>,
    font_scale: f32,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("has_font", &self.has_font())
            .field("font_scale", &self.font_scale)
            .finish()
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 18.0,
        }
    }
}

impl Annotator {
    /// Annotator using the font at `font_path`.
    pub fn with_font_path(font_path: &Path) -> Result<Self> {
        let data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(data).map_err(|_| {
            PadInspectError::Config(format!("failed to parse font file: {}", font_path.display()))
        })?;
        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }

    /// Try a few common system font locations, falling back to swatches.
    pub fn with_system_font() -> Self {
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];
        for path in font_paths {
            if let Ok(annotator) = Self::with_font_path(Path::new(path)) {
                info!(path, "Loaded system font");
                return annotator;
            }
        }
        debug!("No system font found, labels will be drawn as swatches");
        Self::default()
    }

    /// Whether labels are rendered as text rather than swatches.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Overlay the verdict for `bbox` onto `image`.
    pub fn draw_verdict(
        &self,
        image: &mut RgbImage,
        bbox: &BoundingBox,
        status: InspectionStatus,
        defects: &[DefectLabel],
    ) {
        let anchors = label_anchors(bbox, status, defects.len());
        match status {
            InspectionStatus::Sound => {
                for &(x, y) in &anchors {
                    self.draw_label(image, x, y, SOUND_MARKER, HIGHLIGHT_COLOR);
                }
            }
            InspectionStatus::Defective => {
                for (&(x, y), label) in anchors.iter().zip(defects) {
                    self.draw_label(image, x, y, &label.to_string(), ALARM_COLOR);
                }
            }
            InspectionStatus::Unknown | InspectionStatus::ReadFailure => {}
        }
    }

    /// Draw one label whose baseline starts at (x, y).
    fn draw_label(&self, image: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        match &self.font {
            Some(font) => {
                let top = y - self.font_scale as i32;
                draw_text_mut(image, color, x, top, self.font_scale, font, text);
            }
            None => {
                let rect = Rect::at(x, y - MARKER_SIZE as i32).of_size(MARKER_SIZE, MARKER_SIZE);
                draw_filled_rect_mut(image, rect, color);
            }
        }
    }
}
