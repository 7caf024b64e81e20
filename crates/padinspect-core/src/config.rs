// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inspection configuration. All thresholds are fixed per run and handed to
// the inspector at construction time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PadInspectError, Result};

/// Complete set of tunable thresholds for one inspector.
///
/// Loading from JSON is partial: any section or field left out keeps its
/// default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionConfig {
    pub locator: LocatorConfig,
    pub color: ColorBand,
    pub stain: DarkPixelConfig,
    pub aspect: AspectRange,
    pub integrity: DarkPixelConfig,
}

/// Bright-region localization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Luma strictly above this value counts as pad foreground.
    pub brightness_threshold: u8,
    /// Gaussian sigma of the 5x5 pre-threshold smoothing kernel. 1.1 is the
    /// sigma a 5x5 kernel implies when none is given.
    pub blur_sigma: f32,
    /// Minimum contour area (pixels) for a region to count as a pad.
    pub min_area: f64,
    /// Outline thickness of the box drawn on the annotated image.
    pub outline_thickness: u32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 180,
            blur_sigma: 1.1,
            min_area: 1000.0,
            outline_thickness: 2,
        }
    }
}

/// Expected pad color as an HSV band plus the tolerated out-of-band share.
///
/// Hue is in degrees (0..=360), saturation and value are fractions (0..=1).
/// Bounds are inclusive and are matched after quantising to 8-bit HSV
/// (hue in half degrees, saturation and value in 1/255 steps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorBand {
    pub hue: (f32, f32),
    pub saturation: (f32, f32),
    pub value: (f32, f32),
    pub max_out_of_band_ratio: f64,
}

impl Default for ColorBand {
    fn default() -> Self {
        // White to near-white: any hue, saturation up to 30/255, value from 180/255.
        Self {
            hue: (0.0, 360.0),
            saturation: (0.0, 30.0 / 255.0),
            value: (180.0 / 255.0, 1.0),
            max_out_of_band_ratio: 0.05,
        }
    }
}

/// A dark-pixel check: pixels with luma at or below `threshold` count as
/// dark, and the check fires when their share exceeds `max_ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DarkPixelConfig {
    pub threshold: u8,
    pub max_ratio: f64,
}

impl DarkPixelConfig {
    /// Defaults for the stain check.
    pub const STAIN: Self = Self {
        threshold: 100,
        max_ratio: 0.01,
    };

    /// Defaults for the structural integrity check.
    pub const INTEGRITY: Self = Self {
        threshold: 50,
        max_ratio: 0.02,
    };
}

impl Default for DarkPixelConfig {
    fn default() -> Self {
        Self::STAIN
    }
}

/// Accepted range of box width / height, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectRange {
    pub min: f64,
    pub max: f64,
}

impl Default for AspectRange {
    fn default() -> Self {
        Self { min: 1.5, max: 4.0 }
    }
}

impl AspectRange {
    pub fn contains(&self, ratio: f64) -> bool {
        (self.min..=self.max).contains(&ratio)
    }
}

impl InspectionConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        // Omitted sections come from `InspectionConfig::default()`, so an
        // absent `integrity` keeps the integrity thresholds, not the stain ones.
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Reject thresholds that cannot describe a meaningful check.
    pub fn validate(&self) -> Result<()> {
        if self.locator.blur_sigma.is_nan() || self.locator.blur_sigma <= 0.0 {
            return Err(PadInspectError::Config(format!(
                "blur_sigma must be positive, got {}",
                self.locator.blur_sigma
            )));
        }
        if self.locator.min_area < 0.0 {
            return Err(PadInspectError::Config("min_area must not be negative".into()));
        }
        let band = &self.color;
        for (name, (lo, hi)) in [
            ("hue", band.hue),
            ("saturation", band.saturation),
            ("value", band.value),
        ] {
            if lo > hi {
                return Err(PadInspectError::Config(format!(
                    "color band {name} range is inverted: {lo} > {hi}"
                )));
            }
        }
        for (name, ratio) in [
            ("color.max_out_of_band_ratio", band.max_out_of_band_ratio),
            ("stain.max_ratio", self.stain.max_ratio),
            ("integrity.max_ratio", self.integrity.max_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(PadInspectError::Config(format!(
                    "{name} must be within 0..=1, got {ratio}"
                )));
            }
        }
        if self.aspect.min > self.aspect.max {
            return Err(PadInspectError::Config(format!(
                "aspect range is inverted: {} > {}",
                self.aspect.min, self.aspect.max
            )));
        }
        Ok(())
    }
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            locator: LocatorConfig::default(),
            color: ColorBand::default(),
            stain: DarkPixelConfig::STAIN,
            aspect: AspectRange::default(),
            integrity: DarkPixelConfig::INTEGRITY,
        }
    }
}
