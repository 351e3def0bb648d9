// This file is part of the Padidet (deteksi padi) project.
// src/detect.rs - detection post-processing pipeline
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

use image::{DynamicImage, RgbImage};
use thiserror::Error;
use tracing::{debug, info};

use crate::frame::{self, Frame};
use crate::labels::label_for;
use crate::model::{ModelError, ModelProvider};
use crate::output::Draw;

/// Per-invocation configuration, supplied by the presentation shell.
#[derive(Debug, Clone, Copy)]
pub struct DetectConfig {
  /// Minimum confidence for a box to be reported.
  pub confidence_threshold: f32,
  /// Draw box annotations on the result image. Reporting is independent of
  /// this flag; disabling it never changes the detection list.
  pub show_bounding_box: bool,
}

impl Default for DetectConfig {
  fn default() -> Self {
    Self {
      confidence_threshold: 0.5,
      show_bounding_box: true,
    }
  }
}

/// One filtered, labeled result surfaced to the user. The confidence is
/// already formatted as a percentage string; the raw float stays inside the
/// pipeline so every surface renders it identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
  pub label: String,
  pub confidence: String,
}

/// Result of one detection pass: the (possibly annotated) 640x640 image and
/// the detection list, which may be empty.
#[derive(Debug, Clone)]
pub struct Detected {
  pub image: RgbImage,
  pub detections: Vec<Detection>,
}

#[derive(Error, Debug)]
pub enum DetectError {
  #[error("confidence threshold {0} is outside [0.0, 1.0]")]
  InvalidThreshold(f32),
  #[error(transparent)]
  Model(#[from] ModelError),
}

/// The detection post-processor: normalizes an input image, runs the model
/// provider over it, filters and labels the raw boxes, and annotates the
/// result.
pub struct Detector<M> {
  model: M,
  draw: Draw,
}

impl<M: ModelProvider> Detector<M> {
  pub fn new(model: M) -> Self {
    Self {
      model,
      draw: Draw::default(),
    }
  }

  /// Run one synchronous detection pass.
  ///
  /// The result image always has the normalized 640x640 dimensions and is
  /// returned in RGB regardless of the channel order the model consumed. A
  /// provider failure fails the whole operation; there is no retry or
  /// partial result.
  pub fn detect(
    &self,
    image: &DynamicImage,
    config: &DetectConfig,
  ) -> Result<Detected, DetectError> {
    let threshold = config.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
      return Err(DetectError::InvalidThreshold(threshold));
    }

    debug!("normalizing input image");
    let normalized = frame::normalize(image);
    let frame = Frame::from_rgb(&normalized, self.model.channel_order());

    debug!("running model inference");
    let now = std::time::Instant::now();
    let raw_boxes = self.model.infer(&frame)?;
    info!(
      "inference finished in {:.2?}, {} raw boxes",
      now.elapsed(),
      raw_boxes.len()
    );

    // Reverse the channel conversion before anything touches the pixels for
    // display; skipping this would swap blue and red in the result.
    let mut canvas = frame.to_rgb_image();

    let mut detections = Vec::new();
    for raw in &raw_boxes {
      if raw.confidence < threshold {
        continue;
      }

      let label = label_for(raw.class_id);
      let confidence = format_confidence(raw.confidence);

      if config.show_bounding_box {
        self
          .draw
          .box_with_label(&mut canvas, &raw.bbox, &format!("{label} ({confidence})"));
      }

      detections.push(Detection {
        label: label.to_string(),
        confidence,
      });
    }

    debug!(
      "{} of {} boxes pass threshold {threshold}",
      detections.len(),
      raw_boxes.len()
    );

    Ok(Detected {
      image: canvas,
      detections,
    })
  }
}

/// Render a confidence score as a percentage string with two decimals,
/// e.g. `0.8735` -> `"87.35%"`.
pub fn format_confidence(confidence: f32) -> String {
  format!("{:.2}%", confidence * 100.0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::ChannelOrder;
  use crate::model::RawBox;

  /// Deterministic stand-in for the pretrained model.
  struct MockModel {
    boxes: Vec<RawBox>,
    order: ChannelOrder,
  }

  impl MockModel {
    fn with_boxes(boxes: Vec<RawBox>) -> Self {
      Self {
        boxes,
        order: ChannelOrder::Bgr,
      }
    }
  }

  impl ModelProvider for MockModel {
    fn channel_order(&self) -> ChannelOrder {
      self.order
    }

    fn infer(&self, _frame: &Frame) -> Result<Vec<RawBox>, ModelError> {
      Ok(self.boxes.clone())
    }
  }

  struct FailingModel;

  impl ModelProvider for FailingModel {
    fn channel_order(&self) -> ChannelOrder {
      ChannelOrder::Bgr
    }

    fn infer(&self, _frame: &Frame) -> Result<Vec<RawBox>, ModelError> {
      Err(ModelError::BadOutput("broken provider".to_string()))
    }
  }

  fn raw(class_id: u32, confidence: f32) -> RawBox {
    RawBox {
      class_id,
      confidence,
      bbox: [100, 100, 300, 300],
    }
  }

  fn test_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(640, 640, |x, y| {
      image::Rgb([(x % 256) as u8, 60, (y % 256) as u8])
    }))
  }

  #[test]
  fn confidence_formats_with_two_decimals() {
    assert_eq!(format_confidence(0.62), "62.00%");
    assert_eq!(format_confidence(0.8735), "87.35%");
    assert_eq!(format_confidence(1.0), "100.00%");
    assert_eq!(format_confidence(0.005), "0.50%");
  }

  #[test]
  fn boxes_exactly_at_the_threshold_are_kept() {
    let detector = Detector::new(MockModel::with_boxes(vec![raw(0, 0.5)]));
    let config = DetectConfig::default();

    let result = detector.detect(&test_image(), &config).unwrap();
    assert_eq!(result.detections.len(), 1);
    assert_eq!(result.detections[0].confidence, "50.00%");
  }

  #[test]
  fn unknown_class_ids_are_reported_not_fatal() {
    let detector = Detector::new(MockModel::with_boxes(vec![raw(9, 0.8)]));
    let result = detector
      .detect(&test_image(), &DetectConfig::default())
      .unwrap();

    assert_eq!(result.detections[0].label, "Unknown");
  }

  #[test]
  fn out_of_range_thresholds_are_rejected() {
    let detector = Detector::new(MockModel::with_boxes(vec![raw(0, 0.9)]));
    for bad in [-0.1, 1.5, f32::NAN] {
      let config = DetectConfig {
        confidence_threshold: bad,
        ..DetectConfig::default()
      };
      assert!(matches!(
        detector.detect(&test_image(), &config),
        Err(DetectError::InvalidThreshold(_))
      ));
    }
  }

  #[test]
  fn provider_errors_propagate_unchanged() {
    let detector = Detector::new(FailingModel);
    assert!(matches!(
      detector.detect(&test_image(), &DetectConfig::default()),
      Err(DetectError::Model(ModelError::BadOutput(_)))
    ));
  }

  #[test]
  fn hiding_boxes_never_changes_the_detection_list() {
    let boxes = vec![raw(0, 0.9), raw(2, 0.62), raw(3, 0.55)];
    let detector = Detector::new(MockModel::with_boxes(boxes));

    let shown = detector
      .detect(&test_image(), &DetectConfig::default())
      .unwrap();
    let hidden = detector
      .detect(
        &test_image(),
        &DetectConfig {
          show_bounding_box: false,
          ..DetectConfig::default()
        },
      )
      .unwrap();

    assert_eq!(shown.detections, hidden.detections);
  }

  #[test]
  fn filtering_preserves_the_provider_output_order() {
    let boxes = vec![raw(3, 0.55), raw(0, 0.9), raw(2, 0.62)];
    let detector = Detector::new(MockModel::with_boxes(boxes));

    let result = detector
      .detect(&test_image(), &DetectConfig::default())
      .unwrap();
    let labels: Vec<&str> = result.detections.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["Stem Borer", "Blast", "Hawar Daun Bakteri"]);
  }
}
