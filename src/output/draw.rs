// This file is part of the Padidet (deteksi padi) project.
// src/output/draw.rs - bounding box and label drawing
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

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

// Annotation style: green boxes with a 3 pixel stroke, label text slightly
// above the top-left corner.
const BOX_COLOR: [u8; 3] = [0, 255, 0];
const STROKE_WIDTH: i32 = 3;
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_OFFSET_Y: i32 = 22;

/// Draws detection annotations on normalized frames.
pub struct Draw {
  font: FontArc,
  font_scale: PxScale,
  color: Rgb<u8>,
}

impl Default for Draw {
  fn default() -> Self {
    let font_data = include_bytes!("../../assets/DejaVuSans.ttf");
    let font = FontArc::try_from_slice(font_data).expect("embedded font data is valid");

    Self {
      font,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      color: Rgb(BOX_COLOR),
    }
  }
}

impl Draw {
  /// Draw one bounding box with its label text. `bbox` is
  /// [x_min, y_min, x_max, y_max] in pixel coordinates of `image`;
  /// degenerate or fully out-of-bounds boxes are skipped.
  pub fn box_with_label(&self, image: &mut RgbImage, bbox: &[i32; 4], label: &str) {
    let (w, h) = (image.width() as i32, image.height() as i32);

    let x_min = bbox[0].clamp(0, w - 1);
    let y_min = bbox[1].clamp(0, h - 1);
    let x_max = bbox[2].clamp(0, w - 1);
    let y_max = bbox[3].clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    // Stroke the rectangle inward so the outer edge stays on the box.
    for t in 0..STROKE_WIDTH {
      let width = x_max - x_min - 2 * t;
      let height = y_max - y_min - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, self.color);
    }

    let text_y = (y_min - LABEL_OFFSET_Y).max(0);
    draw_text_mut(
      image,
      self.color,
      x_min,
      text_y,
      self.font_scale,
      &self.font,
      label,
    );
  }
}
