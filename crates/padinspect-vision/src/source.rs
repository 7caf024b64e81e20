// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image sources — where the inspector obtains the frame it works on.

use std::path::PathBuf;

use image::RgbImage;
use padinspect_core::error::Result;

use crate::frame::ImageProcessor;

/// Anything that can produce a decoded RGB frame on demand.
///
/// The inspector loads the frame twice: once for localization and once for
/// region extraction. Each call must return an independent buffer.
pub trait ImageSource {
    /// Decode (or copy) the frame.
    fn load(&self) -> Result<RgbImage>;

    /// Short description used in log fields.
    fn describe(&self) -> String;
}

/// A frame stored on disk, decoded through the `image` crate on every load.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileSource {
    fn load(&self) -> Result<RgbImage> {
        Ok(ImageProcessor::open(&self.path)?.into_rgb())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// An already-decoded frame held in memory.
impl ImageSource for RgbImage {
    fn load(&self) -> Result<RgbImage> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory {}x{}", self.width(), self.height())
    }
}
