// This file is part of the Padidet (deteksi padi) project.
// src/args.rs - command line arguments
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

use std::path::PathBuf;

use clap::Parser;

use padidet::model::DEFAULT_MODEL_PATH;
use padidet::output::DEFAULT_OUTPUT_PATH;

/// Detect rice pests and diseases in a photo of a rice plant.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// ONNX export of the pretrained detection model
  #[arg(long, value_name = "FILE", default_value = DEFAULT_MODEL_PATH)]
  pub model: PathBuf,

  /// Input image (JPEG or PNG)
  #[arg(long, value_name = "IMAGE")]
  pub input: PathBuf,

  /// Where to write the annotated result image
  #[arg(long, value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
  pub output: PathBuf,

  /// Confidence threshold (0.0 - 1.0)
  #[arg(long, default_value = "0.5", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// Skip drawing bounding boxes (detections are still reported)
  #[arg(long)]
  pub no_bbox: bool,

  /// Also write the detection table as a text file next to the image
  #[arg(long)]
  pub record: bool,
}
