// This file is part of the Padidet (deteksi padi) project.
// src/model/yolo.rs - YOLO ONNX model provider
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
use std::sync::Mutex;

use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use tracing::{debug, info};

use crate::frame::{ChannelOrder, FRAME_SIZE, Frame};
use crate::model::{ModelError, ModelProvider, RawBox};

/// Default location of the pretrained artifact, the ONNX export of the
/// original `best.pt`. Loaded once at startup; absence is a fatal error.
pub const DEFAULT_MODEL_PATH: &str = "best.onnx";

const YOLO_INPUT_NAME: &str = "images";
const YOLO_OUTPUT_NAME: &str = "output0";

// Ultralytics prediction defaults. Candidates below this score never leave
// the model; the user-facing threshold is applied downstream.
const CANDIDATE_THRESHOLD: f32 = 0.25;
const NMS_IOU_THRESHOLD: f32 = 0.45;

const DEFAULT_INTRA_THREADS: usize = 4;

/// A YOLO detection model running on ONNX Runtime.
///
/// The session is created once and kept for the process lifetime. ONNX
/// Runtime wants exclusive access while running, so the session sits behind
/// a mutex and concurrent callers serialize around the inference call.
pub struct YoloModel {
  session: Mutex<Session>,
}

pub struct YoloModelBuilder {
  model_path: PathBuf,
  intra_threads: usize,
}

impl YoloModelBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    Self {
      model_path: model_path.into(),
      intra_threads: DEFAULT_INTRA_THREADS,
    }
  }

  pub fn intra_threads(mut self, intra_threads: usize) -> Self {
    self.intra_threads = intra_threads;
    self
  }

  pub fn build(self) -> Result<YoloModel, ModelError> {
    let path = self.model_path.display().to_string();
    info!("loading model file: {path}");

    let metadata = std::fs::metadata(&self.model_path).map_err(|source| {
      ModelError::ModelLoad {
        path: path.clone(),
        source,
      }
    })?;
    debug!(
      "model file size: {:.2} MB",
      metadata.len() as f64 / (1024.0 * 1024.0)
    );

    info!("creating ONNX Runtime session");
    let session = Session::builder()?
      .with_optimization_level(GraphOptimizationLevel::Level3)?
      .with_intra_threads(self.intra_threads)?
      .commit_from_file(&self.model_path)?;
    info!("model loaded");

    Ok(YoloModel {
      session: Mutex::new(session),
    })
  }
}

impl YoloModel {
  pub fn builder(model_path: impl Into<PathBuf>) -> YoloModelBuilder {
    YoloModelBuilder::new(model_path)
  }

  pub fn load(model_path: impl AsRef<Path>) -> Result<Self, ModelError> {
    YoloModelBuilder::new(model_path.as_ref()).build()
  }
}

impl ModelProvider for YoloModel {
  // The original pipeline feeds the model OpenCV-style BGR frames.
  fn channel_order(&self) -> ChannelOrder {
    ChannelOrder::Bgr
  }

  fn infer(&self, frame: &Frame) -> Result<Vec<RawBox>, ModelError> {
    debug!("preparing input tensor");
    let (shape, data) = preprocess(frame);
    let input = Tensor::from_array((shape, data))?;

    debug!("running inference");
    let mut session = self
      .session
      .lock()
      .unwrap_or_else(std::sync::PoisonError::into_inner);
    let outputs = session.run(ort::inputs![YOLO_INPUT_NAME => input])?;

    debug!("extracting model output");
    let (shape, data) = outputs[YOLO_OUTPUT_NAME].try_extract_tensor::<f32>()?;
    let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
    if dims.len() != 3 || dims[0] != 1 || dims[1] <= 4 {
      return Err(ModelError::BadOutput(format!(
        "expected output shape [1, 4+nc, anchors], found {dims:?}"
      )));
    }

    let num_classes = dims[1] - 4;
    let num_anchors = dims[2];
    let boxes = decode_predictions(data, num_classes, num_anchors);
    debug!("model produced {} candidate boxes", boxes.len());

    Ok(boxes)
  }
}

/// Lay the frame bytes out as a [1, 3, 640, 640] float tensor scaled to
/// [0, 1], the planar layout the YOLO export expects.
fn preprocess(frame: &Frame) -> ([usize; 4], Box<[f32]>) {
  let (width, height, channels) = (frame.width(), frame.height(), frame.channels());
  let bytes = frame.as_bytes();
  let plane = width * height;

  let mut data = vec![0f32; channels * plane];
  for idx in 0..plane {
    for c in 0..channels {
      data[c * plane + idx] = bytes[idx * channels + c] as f32 / 255.0;
    }
  }

  ([1, channels, height, width], data.into_boxed_slice())
}

#[derive(Debug, Clone)]
struct Candidate {
  class_id: u32,
  confidence: f32,
  bbox: [f32; 4],
}

/// Decode a raw [1, 4+nc, anchors] prediction tensor: per-anchor argmax over
/// the class rows, candidate thresholding, box decode from center form, and
/// class-aware NMS. Surviving boxes come out in confidence-descending order,
/// the model's native order.
fn decode_predictions(data: &[f32], num_classes: usize, num_anchors: usize) -> Vec<RawBox> {
  let limit = FRAME_SIZE as f32;
  let mut candidates = Vec::new();

  for i in 0..num_anchors {
    let mut best_score = 0.0f32;
    let mut best_class = 0usize;
    for c in 0..num_classes {
      let score = data[(4 + c) * num_anchors + i];
      if score > best_score {
        best_score = score;
        best_class = c;
      }
    }

    if best_score < CANDIDATE_THRESHOLD {
      continue;
    }

    let cx = data[i];
    let cy = data[num_anchors + i];
    let w = data[2 * num_anchors + i];
    let h = data[3 * num_anchors + i];

    candidates.push(Candidate {
      class_id: best_class as u32,
      confidence: best_score,
      bbox: [
        (cx - w / 2.0).clamp(0.0, limit),
        (cy - h / 2.0).clamp(0.0, limit),
        (cx + w / 2.0).clamp(0.0, limit),
        (cy + h / 2.0).clamp(0.0, limit),
      ],
    });
  }

  nms(candidates)
    .into_iter()
    .map(|c| RawBox {
      class_id: c.class_id,
      confidence: c.confidence,
      bbox: [
        c.bbox[0].round() as i32,
        c.bbox[1].round() as i32,
        c.bbox[2].round() as i32,
        c.bbox[3].round() as i32,
      ],
    })
    .collect()
}

/// Class-aware non-maximum suppression.
fn nms(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
  candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

  let mut result = Vec::new();
  while !candidates.is_empty() {
    let best = candidates.remove(0);
    candidates.retain(|other| {
      other.class_id != best.class_id || iou(&best.bbox, &other.bbox) < NMS_IOU_THRESHOLD
    });
    result.push(best);
  }
  result
}

fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
  let x1 = a[0].max(b[0]);
  let y1 = a[1].max(b[1]);
  let x2 = a[2].min(b[2]);
  let y2 = a[3].min(b[3]);

  let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
  let area_a = (a[2] - a[0]) * (a[3] - a[1]);
  let area_b = (b[2] - b[0]) * (b[3] - b[1]);
  let union = area_a + area_b - intersection;

  if union > 0.0 { intersection / union } else { 0.0 }
}

#[cfg(test)]
mod tests {
  use super::*;

  const NC: usize = 4;

  /// Build a flat [1, 4+nc, anchors] tensor from (cx, cy, w, h, scores).
  fn tensor(anchors: &[([f32; 4], [f32; NC])]) -> Vec<f32> {
    let n = anchors.len();
    let mut data = vec![0.0f32; (4 + NC) * n];
    for (i, (bbox, scores)) in anchors.iter().enumerate() {
      for (attr, &v) in bbox.iter().enumerate() {
        data[attr * n + i] = v;
      }
      for (c, &s) in scores.iter().enumerate() {
        data[(4 + c) * n + i] = s;
      }
    }
    data
  }

  #[test]
  fn decode_picks_argmax_class_and_decodes_center_form() {
    let data = tensor(&[([320.0, 320.0, 100.0, 100.0], [0.05, 0.05, 0.9, 0.05])]);
    let boxes = decode_predictions(&data, NC, 1);

    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].class_id, 2);
    assert!((boxes[0].confidence - 0.9).abs() < 1e-6);
    assert_eq!(boxes[0].bbox, [270, 270, 370, 370]);
  }

  #[test]
  fn decode_drops_candidates_below_model_threshold() {
    let data = tensor(&[([320.0, 320.0, 100.0, 100.0], [0.1, 0.2, 0.1, 0.05])]);
    assert!(decode_predictions(&data, NC, 1).is_empty());
  }

  #[test]
  fn decode_clamps_boxes_to_frame_bounds() {
    let data = tensor(&[([10.0, 630.0, 100.0, 100.0], [0.8, 0.0, 0.0, 0.0])]);
    let boxes = decode_predictions(&data, NC, 1);
    assert_eq!(boxes[0].bbox, [0, 580, 60, 640]);
  }

  #[test]
  fn nms_suppresses_overlapping_same_class_boxes() {
    let data = tensor(&[
      ([320.0, 320.0, 100.0, 100.0], [0.0, 0.0, 0.9, 0.0]),
      ([325.0, 325.0, 100.0, 100.0], [0.0, 0.0, 0.6, 0.0]),
    ]);
    let boxes = decode_predictions(&data, NC, 2);

    assert_eq!(boxes.len(), 1);
    assert!((boxes[0].confidence - 0.9).abs() < 1e-6);
  }

  #[test]
  fn nms_keeps_overlapping_boxes_of_different_classes() {
    let data = tensor(&[
      ([320.0, 320.0, 100.0, 100.0], [0.0, 0.0, 0.9, 0.0]),
      ([325.0, 325.0, 100.0, 100.0], [0.0, 0.6, 0.0, 0.0]),
    ]);
    assert_eq!(decode_predictions(&data, NC, 2).len(), 2);
  }

  #[test]
  fn survivors_come_out_confidence_descending() {
    let data = tensor(&[
      ([100.0, 100.0, 50.0, 50.0], [0.4, 0.0, 0.0, 0.0]),
      ([500.0, 500.0, 50.0, 50.0], [0.0, 0.0, 0.0, 0.8]),
    ]);
    let boxes = decode_predictions(&data, NC, 2);

    assert_eq!(boxes.len(), 2);
    assert!(boxes[0].confidence >= boxes[1].confidence);
    assert_eq!(boxes[0].class_id, 3);
  }

  #[test]
  fn preprocess_produces_planar_unit_scaled_floats() {
    use image::{Rgb, RgbImage};

    let image = RgbImage::from_pixel(FRAME_SIZE, FRAME_SIZE, Rgb([255, 0, 51]));
    let frame = Frame::from_rgb(&image, ChannelOrder::Bgr);

    let (shape, data) = preprocess(&frame);
    assert_eq!(shape, [1, 3, 640, 640]);

    let plane = 640 * 640;
    // BGR frame: plane 0 is blue, plane 2 is red.
    assert!((data[0] - 51.0 / 255.0).abs() < 1e-6);
    assert!((data[plane] - 0.0).abs() < 1e-6);
    assert!((data[2 * plane] - 1.0).abs() < 1e-6);
  }

  #[test]
  fn iou_of_disjoint_boxes_is_zero() {
    let a = [0.0, 0.0, 10.0, 10.0];
    let b = [20.0, 20.0, 30.0, 30.0];
    assert_eq!(iou(&a, &b), 0.0);
  }

  #[test]
  fn iou_of_identical_boxes_is_one() {
    let a = [10.0, 10.0, 50.0, 50.0];
    assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
  }
}
