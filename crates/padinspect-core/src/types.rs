// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for pad inspection.

use serde::{Deserialize, Serialize, Serializer};

/// Axis-aligned rectangle occupied by the detected pad, in image pixels.
///
/// `x`/`y` are the top-left corner. Width and height are always non-zero for
/// boxes produced by the locator; `new` refuses degenerate sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Build a box, returning `None` when either side is zero.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// One past the right-most column covered by the box.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// One past the bottom-most row covered by the box.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Width divided by height, or `None` for a zero-height box.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }

    /// True when the whole box lies inside an image of the given size.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.right() <= image_width as u64 && self.bottom() <= image_height as u64
    }

    /// `[x, y, width, height]`, the layout used by the report.
    pub fn to_array(&self) -> [u32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// A named finding emitted by a defect check.
///
/// The set is open in the sense that new checks may add variants; the
/// display text is what ends up in reports and on the annotated image.
#[derive(Debug, Clone, PartialEq)]
pub enum DefectLabel {
    /// Too many pixels fall outside the expected near-white color band.
    ColorDeviation,
    /// Too many dark pixels inside the pad region.
    Stain,
    /// Box aspect ratio outside the expected cut range.
    CutRatio { ratio: f64 },
    /// Too many very dark pixels, presumed holes or tears.
    StructuralDegradation,
    /// The pad box did not fit inside the image used for extraction.
    RoiOutOfBounds,
}

impl std::fmt::Display for DefectLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColorDeviation => f.write_str("Color Error"),
            Self::Stain => f.write_str("Stain Detected"),
            Self::CutRatio { ratio } => write!(f, "Cut Error (Ratio: {ratio:.2})"),
            Self::StructuralDegradation => f.write_str("Structural Degradation Suspected"),
            Self::RoiOutOfBounds => f.write_str("ROI Error"),
        }
    }
}

impl Serialize for DefectLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Aggregated verdict of one inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InspectionStatus {
    /// Nothing decided yet, or no pad was found.
    #[default]
    Unknown,
    /// Pad located and every check passed.
    Sound,
    /// At least one defect label was raised.
    Defective,
    /// The pad was located but the original image could not be re-read.
    ReadFailure,
}

impl InspectionStatus {
    /// Human-readable status string used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Sound => "Sound",
            Self::Defective => "Defective",
            Self::ReadFailure => "Read Failure",
        }
    }

    /// Sound when no defects were raised, Defective otherwise.
    pub fn from_defects(defects: &[DefectLabel]) -> Self {
        if defects.is_empty() {
            Self::Sound
        } else {
            Self::Defective
        }
    }
}

impl std::fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
