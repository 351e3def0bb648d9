// This file is part of the Padidet (deteksi padi) project.
// src/model.rs - model provider interface
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

use thiserror::Error;

use crate::frame::{ChannelOrder, Frame};

/// One unfiltered box out of the detection model, in pixel coordinates of
/// the 640x640 frame. Thresholding and labeling happen downstream in the
/// post-processor.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBox {
  pub class_id: u32,
  pub confidence: f32,
  /// [x_min, y_min, x_max, y_max]
  pub bbox: [i32; 4],
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("failed to read model file {path}: {source}")]
  ModelLoad {
    path: String,
    source: std::io::Error,
  },
  #[error("inference runtime error: {0}")]
  Runtime(#[from] ort::Error),
  #[error("unexpected model output: {0}")]
  BadOutput(String),
}

/// An opaque pretrained detection model.
///
/// Implementations are loaded once per process and shared across sequential
/// calls; `infer` takes `&self` so a provider that needs exclusive access to
/// its runtime must serialize internally. The declared [`channel_order`] is
/// a precondition on the frames passed to `infer`: the caller converts into
/// that order before inference and reverses the conversion before display.
///
/// [`channel_order`]: ModelProvider::channel_order
pub trait ModelProvider {
  /// Channel order this model expects its input frames in.
  fn channel_order(&self) -> ChannelOrder;

  /// Run one inference pass over a normalized frame and return the model's
  /// candidate boxes in its native output order.
  fn infer(&self, frame: &Frame) -> Result<Vec<RawBox>, ModelError>;
}

impl<M: ModelProvider + ?Sized> ModelProvider for &M {
  fn channel_order(&self) -> ChannelOrder {
    (**self).channel_order()
  }

  fn infer(&self, frame: &Frame) -> Result<Vec<RawBox>, ModelError> {
    (**self).infer(frame)
  }
}

mod yolo;
pub use self::yolo::{DEFAULT_MODEL_PATH, YoloModel, YoloModelBuilder};
