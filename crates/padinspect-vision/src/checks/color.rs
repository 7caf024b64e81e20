// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color deviation check — the pad should be white or near-white. Pixels are
// converted to HSV, quantised to 8-bit channels, and compared against an
// inclusive reference band on the same scale.

use image::{Rgb, RgbImage};
use padinspect_core::{ColorBand, DefectLabel};
use palette::{FromColor, Hsv, Srgb};
use tracing::{debug, warn};

use super::{CheckInput, CheckOutcome, DefectCheck};

/// Fires when more than `max_out_of_band_ratio` of the region (default 5%)
/// falls outside the reference HSV band.
#[derive(Debug, Clone, Default)]
pub struct ColorDeviationCheck {
    band: ColorBand,
}

impl ColorDeviationCheck {
    pub fn new(band: ColorBand) -> Self {
        Self { band }
    }

    /// Whether one pixel lies inside the reference band.
    ///
    /// Hue is compared in half-degree steps (0..=180) and saturation/value in
    /// 0..=255 steps, each rounded to nearest, so a band edge such as
    /// saturation 30/255 admits everything that rounds to 30.
    pub fn in_band(&self, pixel: &Rgb<u8>) -> bool {
        let Rgb([r, g, b]) = *pixel;
        let rgb: Srgb<f32> = Srgb::new(r, g, b).into_format();
        let hsv: Hsv = Hsv::from_color(rgb);

        let hue = hsv.hue.into_positive_degrees();
        let band = &self.band;
        within_steps(hue, band.hue, HUE_STEPS_PER_DEGREE)
            && within_steps(hsv.saturation, band.saturation, CHANNEL_STEPS)
            && within_steps(hsv.value, band.value, CHANNEL_STEPS)
    }

    /// Fraction of pixels outside the band, or `None` for an empty region.
    pub fn out_of_band_ratio(&self, region: &RgbImage) -> Option<f64> {
        let total = region.width() as u64 * region.height() as u64;
        if total == 0 {
            return None;
        }
        let outside = region.pixels().filter(|p| !self.in_band(p)).count() as u64;
        Some(outside as f64 / total as f64)
    }
}

const HUE_STEPS_PER_DEGREE: f32 = 0.5;
const CHANNEL_STEPS: f32 = 255.0;

/// Inclusive range test after scaling `value` and both bounds by `steps` and
/// rounding each to the nearest step.
fn within_steps(value: f32, (lo, hi): (f32, f32), steps: f32) -> bool {
    let quantise = |v: f32| (v * steps).round();
    (quantise(lo)..=quantise(hi)).contains(&quantise(value))
}

impl DefectCheck for ColorDeviationCheck {
    fn name(&self) -> &'static str {
        "color_deviation"
    }

    fn check(&self, input: &CheckInput<'_>) -> CheckOutcome {
        let Some(ratio) = self.out_of_band_ratio(input.region) else {
            warn!(check = self.name(), "Empty region; no opinion");
            return CheckOutcome::Indeterminate;
        };
        debug!(
            ratio,
            max_ratio = self.band.max_out_of_band_ratio,
            "Color out-of-band ratio"
        );
        CheckOutcome::from_flag(
            ratio > self.band.max_out_of_band_ratio,
            DefectLabel::ColorDeviation,
        )
    }
}
