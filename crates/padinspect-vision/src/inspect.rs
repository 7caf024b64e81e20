// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inspection orchestrator — locate, extract, check, aggregate, annotate.

use image::RgbImage;
use padinspect_core::{BoundingBox, DefectLabel, InspectionConfig, InspectionStatus};
use tracing::{debug, info, instrument, warn};

use crate::annotate::Annotator;
use crate::checks::{
    AspectRatioCheck, CheckInput, CheckOutcome, ColorDeviationCheck, DefectCheck, StainCheck,
    StructuralIntegrityCheck,
};
use crate::frame::ImageProcessor;
use crate::locate::RegionLocator;
use crate::source::ImageSource;

/// Everything one inspection produced.
///
/// Starts out empty with `InspectionStatus::Unknown` and is filled in stage
/// by stage; it is not touched again once returned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InspectionResult {
    pub pad_found: bool,
    pub pad_box: Option<BoundingBox>,
    pub status: InspectionStatus,
    /// Defect labels in check order.
    pub defects: Vec<DefectLabel>,
    /// Checks that ran but had no opinion (for example on an empty region).
    pub indeterminate_checks: Vec<&'static str>,
    pub annotated_image: Option<RgbImage>,
}

/// Verdict for an already extracted pad, before any drawing happens.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub status: InspectionStatus,
    pub defects: Vec<DefectLabel>,
    pub indeterminate_checks: Vec<&'static str>,
}

/// Drives the locator and the defect checks over one frame at a time.
///
/// Holds only configuration; each call works on its own copies of the
/// frame, so repeated inspections of the same input give identical results.
pub struct Inspector {
    locator: RegionLocator,
    checks: Vec<Box<dyn DefectCheck>>,
    annotator: Annotator,
}

impl std::fmt::Debug for Inspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.checks.iter().map(|c| c.name()).collect();
        f.debug_struct("Inspector")
            .field("locator", &self.locator)
            .field("checks", &names)
            .field("annotator", &self.annotator)
            .finish()
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectionConfig::default())
    }
}

impl Inspector {
    /// Inspector running the standard checks, in their canonical order:
    /// color deviation, stain, aspect ratio, structural integrity.
    ///
    /// Labels are drawn with a system font when one is installed; use
    /// `with_annotator` to pick a specific font.
    pub fn new(config: InspectionConfig) -> Self {
        let checks: Vec<Box<dyn DefectCheck>> = vec![
            Box::new(ColorDeviationCheck::new(config.color.clone())),
            Box::new(StainCheck::new(config.stain)),
            Box::new(AspectRatioCheck::new(config.aspect)),
            Box::new(StructuralIntegrityCheck::new(config.integrity)),
        ];
        Self::with_checks(config, checks)
    }

    /// Inspector with a custom check list. Labels are reported in the order
    /// the checks appear here.
    pub fn with_checks(config: InspectionConfig, checks: Vec<Box<dyn DefectCheck>>) -> Self {
        let annotator = Annotator::with_system_font();
        debug!(
            checks = checks.len(),
            text_labels = annotator.has_font(),
            "Inspector ready"
        );
        Self {
            locator: RegionLocator::new(config.locator),
            checks,
            annotator,
        }
    }

    /// Replace the annotator (for example one with a loaded font).
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// Inspect an in-memory frame.
    pub fn inspect_image(&self, image: &RgbImage) -> InspectionResult {
        self.inspect(image)
    }

    /// Run the full inspection against `source`.
    ///
    /// Never fails: decode errors and missing pads give `pad_found = false`,
    /// a source that cannot be re-read gives `ReadFailure`, and a box that
    /// does not fit the re-read frame gives a `ROI Error` defect.
    #[instrument(skip_all, fields(source = %source.describe()))]
    pub fn inspect(&self, source: &dyn ImageSource) -> InspectionResult {
        let mut result = InspectionResult::default();

        // Start: locate the pad.
        let frame = match source.load() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "Could not decode frame; pad not found");
                return result;
            }
        };
        let location = match self.locator.locate(&frame) {
            Ok(location) => location,
            Err(miss) => {
                warn!(?miss, "Pad not found");
                return result;
            }
        };
        drop(frame);

        result.pad_found = true;
        result.pad_box = Some(location.bbox);
        let mut annotated = location.annotated;

        // Located: obtain the untouched original for extraction.
        let original = match source.load() {
            Ok(original) => original,
            Err(err) => {
                warn!(error = %err, "Could not re-read original frame");
                result.status = InspectionStatus::ReadFailure;
                result.annotated_image = Some(annotated);
                return result;
            }
        };

        // Extract, detect, aggregate.
        let evaluation = self.evaluate(&original, &location.bbox);
        result.status = evaluation.status;
        result.defects = evaluation.defects;
        result.indeterminate_checks = evaluation.indeterminate_checks;

        // Annotate.
        self.annotator
            .draw_verdict(&mut annotated, &location.bbox, result.status, &result.defects);
        result.annotated_image = Some(annotated);

        info!(
            status = %result.status,
            defects = result.defects.len(),
            "Inspection complete"
        );
        result
    }

    /// Cut the pad region out of `original` and run every check on it.
    ///
    /// A box reaching past the frame is not clamped: it yields a single
    /// `ROI Error` and no check runs.
    pub fn evaluate(&self, original: &RgbImage, bbox: &BoundingBox) -> Evaluation {
        let region = match ImageProcessor::from_rgb(original.clone()).crop_region(bbox) {
            Ok(region) => region,
            Err(err) => {
                warn!(error = %err, "Pad box exceeds frame; skipping checks");
                return Evaluation {
                    status: InspectionStatus::Defective,
                    defects: vec![DefectLabel::RoiOutOfBounds],
                    indeterminate_checks: Vec::new(),
                };
            }
        };

        let input = CheckInput::new(&region, *bbox);
        let mut defects = Vec::new();
        let mut indeterminate_checks = Vec::new();
        for check in &self.checks {
            match check.check(&input) {
                CheckOutcome::Pass => debug!(check = check.name(), "Check passed"),
                CheckOutcome::Defect(label) => {
                    info!(check = check.name(), %label, "Defect raised");
                    defects.push(label);
                }
                CheckOutcome::Indeterminate => indeterminate_checks.push(check.name()),
            }
        }

        Evaluation {
            status: InspectionStatus::from_defects(&defects),
            defects,
            indeterminate_checks,
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use padinspect_core::error::{PadInspectError, Result};
    use std::cell::Cell;

    /// 400x300 black frame with a white 200x100 pad at (100, 100).
    fn pad_frame() -> RgbImage {
        let mut img = RgbImage::from_pixel(400, 300, Rgb([0, 0, 0]));
        for y in 100..200 {
            for x in 100..300 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        img
    }

    /// Serves `first` on the first load and `second` afterwards.
    struct SwappingSource {
        first: RgbImage,
        second: Option<RgbImage>,
        loads: Cell<u32>,
    }

    impl ImageSource for SwappingSource {
        fn load(&self) -> Result<RgbImage> {
            let n = self.loads.get();
            self.loads.set(n + 1);
            if n == 0 {
                return Ok(self.first.clone());
            }
            self.second
                .clone()
                .ok_or_else(|| PadInspectError::Decode("source vanished".into()))
        }

        fn describe(&self) -> String {
            "swapping".into()
        }
    }

    #[test]
    fn white_pad_is_sound() {
        let result = Inspector::default().inspect_image(&pad_frame());
        assert!(result.pad_found);
        assert_eq!(result.status, InspectionStatus::Sound);
        assert!(result.defects.is_empty());
        assert!(result.annotated_image.is_some());
        let bbox = result.pad_box.unwrap();
        let ratio = bbox.aspect_ratio().unwrap();
        assert!((ratio - 2.0).abs() < 0.1, "ratio {ratio}");
    }

    #[test]
    fn hole_in_pad_is_structural_degradation() {
        let mut img = pad_frame();
        // 40x50 black hole = 2000 px, 10% of the 200x100 pad.
        for y in 125..175 {
            for x in 180..220 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let result = Inspector::default().inspect_image(&img);
        assert_eq!(result.status, InspectionStatus::Defective);
        assert!(result.defects.contains(&DefectLabel::StructuralDegradation));
        // The box comes from the outer border, so the hole does not shrink it.
        assert!(result.pad_box.unwrap().width >= 196);
    }

    #[test]
    fn labels_follow_check_order() {
        let mut img = pad_frame();
        for y in 125..175 {
            for x in 180..220 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let result = Inspector::default().inspect_image(&img);
        assert_eq!(
            result.defects,
            vec![
                DefectLabel::ColorDeviation,
                DefectLabel::Stain,
                DefectLabel::StructuralDegradation,
            ]
        );
    }

    #[test]
    fn elongated_pad_is_a_cut_error() {
        let mut img = RgbImage::from_pixel(700, 200, Rgb([0, 0, 0]));
        for y in 50..150 {
            for x in 50..650 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let result = Inspector::default().inspect_image(&img);
        assert_eq!(result.status, InspectionStatus::Defective);
        assert_eq!(result.defects.len(), 1);
        assert!(matches!(
            result.defects[0],
            DefectLabel::CutRatio { ratio } if ratio > 5.5
        ));
    }

    #[test]
    fn empty_frame_reports_not_found() {
        let img = RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]));
        let result = Inspector::default().inspect_image(&img);
        assert_eq!(result, InspectionResult::default());
    }

    #[test]
    fn undecodable_source_reports_not_found() {
        let source = crate::source::FileSource::new("/nonexistent/pad.png");
        let result = Inspector::default().inspect(&source);
        assert!(!result.pad_found);
        assert_eq!(result.status, InspectionStatus::Unknown);
        assert!(result.annotated_image.is_none());
    }

    #[test]
    fn failed_reread_is_read_failure() {
        let source = SwappingSource {
            first: pad_frame(),
            second: None,
            loads: Cell::new(0),
        };
        let result = Inspector::default().inspect(&source);
        assert!(result.pad_found);
        assert_eq!(result.status, InspectionStatus::ReadFailure);
        assert!(result.defects.is_empty());
        assert!(result.annotated_image.is_some());
    }

    #[test]
    fn box_past_reread_frame_is_roi_error() {
        // The pad was located on the full frame, but the re-read frame is
        // one pixel narrower than the box's right edge.
        let first = pad_frame();
        let bbox = Inspector::default().inspect_image(&first).pad_box.unwrap();
        let narrow_width = bbox.x + bbox.width - 1;
        let second = image::imageops::crop_imm(&first, 0, 0, narrow_width, 300).to_image();

        let source = SwappingSource {
            first,
            second: Some(second),
            loads: Cell::new(0),
        };
        let result = Inspector::default().inspect(&source);
        assert_eq!(result.status, InspectionStatus::Defective);
        assert_eq!(result.defects, vec![DefectLabel::RoiOutOfBounds]);
        assert!(result.indeterminate_checks.is_empty());
    }

    #[test]
    fn evaluate_rejects_out_of_bounds_box() {
        let img = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        let bbox = BoundingBox::new(0, 0, 101, 50).unwrap();
        let evaluation = Inspector::default().evaluate(&img, &bbox);
        assert_eq!(evaluation.defects, vec![DefectLabel::RoiOutOfBounds]);
        assert_eq!(evaluation.status, InspectionStatus::Defective);
    }

    #[test]
    fn evaluate_in_bounds_white_region_is_sound() {
        let img = RgbImage::from_pixel(100, 50, Rgb([255, 255, 255]));
        let bbox = BoundingBox::new(0, 0, 100, 50).unwrap();
        let evaluation = Inspector::default().evaluate(&img, &bbox);
        assert_eq!(evaluation.status, InspectionStatus::Sound);
    }

    #[test]
    fn inspection_is_repeatable() {
        let mut img = pad_frame();
        for y in 140..150 {
            for x in 120..160 {
                img.put_pixel(x, y, Rgb([70, 70, 70]));
            }
        }
        let inspector = Inspector::default();
        let first = inspector.inspect_image(&img);
        let second = inspector.inspect_image(&img);
        assert_eq!(first, second);
    }

    #[test]
    fn indeterminate_checks_are_recorded() {
        struct NoOpinion;
        impl DefectCheck for NoOpinion {
            fn name(&self) -> &'static str {
                "no_opinion"
            }
            fn check(&self, _input: &CheckInput<'_>) -> CheckOutcome {
                CheckOutcome::Indeterminate
            }
        }

        let inspector =
            Inspector::with_checks(InspectionConfig::default(), vec![Box::new(NoOpinion)]);
        let result = inspector.inspect_image(&pad_frame());
        assert_eq!(result.status, InspectionStatus::Sound);
        assert_eq!(result.indeterminate_checks, vec!["no_opinion"]);
    }

    #[test]
    fn default_inspector_uses_system_font_when_present() {
        let inspector = Inspector::default();
        assert_eq!(
            inspector.annotator.has_font(),
            Annotator::with_system_font().has_font()
        );
        let swatches = inspector.with_annotator(Annotator::default());
        assert!(!swatches.annotator.has_font());
    }

    #[test]
    fn annotated_image_differs_from_input() {
        let img = pad_frame();
        let result = Inspector::default().inspect_image(&img);
        assert_ne!(result.annotated_image.as_ref(), Some(&img));
    }
}
