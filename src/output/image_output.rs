// This file is part of the Padidet (deteksi padi) project.
// src/output/image_output.rs - output artifact writing
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// Copyright (C) 2026 Padidet contributors

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::detect::Detection;

/// Fixed local path the annotated result is written to, overwritten on each
/// run.
pub const DEFAULT_OUTPUT_PATH: &str = "detected_image.jpg";

/// File name the artifact is offered back to the user under.
pub const DOWNLOAD_FILE_NAME: &str = "deteksi_padi.jpg";

/// MIME type of the artifact.
pub const DOWNLOAD_MIME_TYPE: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("image encoding error: {0}")]
  Image(#[from] image::ImageError),
}

/// Writes the annotated result image (and optionally the detection table) to
/// disk.
pub struct ImageOutput {
  path: PathBuf,
}

impl Default for ImageOutput {
  fn default() -> Self {
    Self::new(DEFAULT_OUTPUT_PATH)
  }
}

impl ImageOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Save the annotated image. The encoding follows the path extension;
  /// the default path produces the JPEG artifact.
  pub fn save(&self, image: &RgbImage) -> Result<(), OutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;
    info!("saved result image to {}", self.path.display());

    Ok(())
  }

  /// Write the detection table as a plain-text sidecar next to the image,
  /// one `label, confidence` line per detection.
  pub fn record(&self, detections: &[Detection]) -> Result<(), OutputError> {
    let records: Vec<String> = detections
      .iter()
      .map(|d| format!("{}, {}", d.label, d.confidence))
      .collect();

    let path = self.path.with_extension("txt");
    std::fs::write(&path, records.join("\n"))?;
    info!("saved detection record to {}", path.display());

    Ok(())
  }
}
