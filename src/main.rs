// This file is part of the Padidet (deteksi padi) project.
// src/main.rs - command line entry point
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageReader;
use tracing::info;

use padidet::detect::{DetectConfig, Detector};
use padidet::model::YoloModel;
use padidet::output::ImageOutput;

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("model file: {}", args.model.display());
  info!("input image: {}", args.input.display());
  info!("output image: {}", args.output.display());
  info!("confidence threshold: {}", args.confidence);

  // The model artifact is a startup dependency; fail before touching the
  // input if it cannot be loaded.
  let model = YoloModel::builder(&args.model)
    .build()
    .with_context(|| format!("failed to load model {}", args.model.display()))?;

  let image = ImageReader::open(&args.input)
    .with_context(|| format!("failed to open image {}", args.input.display()))?
    .decode()
    .with_context(|| format!("failed to decode image {}", args.input.display()))?;

  let config = DetectConfig {
    confidence_threshold: args.confidence,
    show_bounding_box: !args.no_bbox,
  };

  let detector = Detector::new(model);
  let detected = detector.detect(&image, &config)?;

  if detected.detections.is_empty() {
    println!("No objects detected at this confidence threshold.");
  } else {
    println!("{:<4} {:<24} {}", "No", "Label", "Confidence");
    for (i, detection) in detected.detections.iter().enumerate() {
      println!(
        "{:<4} {:<24} {}",
        i + 1,
        detection.label,
        detection.confidence
      );
    }
  }

  let output = ImageOutput::new(&args.output);
  output.save(&detected.image)?;
  if args.record {
    output.record(&detected.detections)?;
  }

  Ok(())
}
