// This file is part of the Padidet (deteksi padi) project.
// src/frame.rs - normalized NHWC frame and channel-order handling
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

use image::{DynamicImage, RgbImage, imageops::FilterType};

/// Side length of the square frame every input is normalized to.
pub const FRAME_SIZE: u32 = 640;

const CHANNELS: usize = 3;

/// Channel order of a frame's byte layout.
///
/// The order a model expects is an interface precondition, declared by
/// [`crate::model::ModelProvider::channel_order`]. A frame built in `Bgr`
/// order must be converted back before display; the swap is its own inverse,
/// so [`Frame::to_rgb_image`] restores exactly the bytes the frame was built
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
  Rgb,
  Bgr,
}

/// A 640x640 3-channel 8-bit frame in NHWC byte layout, tagged with the
/// channel order of its bytes.
#[derive(Debug, Clone)]
pub struct Frame {
  data: Box<[u8]>,
  order: ChannelOrder,
}

/// Normalize an input image to the fixed frame size: 3-channel RGB, resized
/// to 640x640 with a triangle filter.
pub fn normalize(image: &DynamicImage) -> RgbImage {
  let rgb = image.to_rgb8();
  if rgb.dimensions() == (FRAME_SIZE, FRAME_SIZE) {
    return rgb;
  }
  image::imageops::resize(&rgb, FRAME_SIZE, FRAME_SIZE, FilterType::Triangle)
}

impl Frame {
  /// Build a frame from an already normalized 640x640 RGB image, laying the
  /// bytes out in `order`.
  ///
  /// Panics if the image is not 640x640; callers go through [`normalize`]
  /// first.
  pub fn from_rgb(image: &RgbImage, order: ChannelOrder) -> Self {
    assert_eq!(
      image.dimensions(),
      (FRAME_SIZE, FRAME_SIZE),
      "frame input must be normalized to {FRAME_SIZE}x{FRAME_SIZE}",
    );

    let mut data = vec![0u8; FRAME_SIZE as usize * FRAME_SIZE as usize * CHANNELS];
    for (x, y, pixel) in image.enumerate_pixels() {
      let idx = (y as usize * FRAME_SIZE as usize + x as usize) * CHANNELS;
      match order {
        ChannelOrder::Rgb => {
          data[idx] = pixel[0];
          data[idx + 1] = pixel[1];
          data[idx + 2] = pixel[2];
        }
        ChannelOrder::Bgr => {
          data[idx] = pixel[2];
          data[idx + 1] = pixel[1];
          data[idx + 2] = pixel[0];
        }
      }
    }

    Self {
      data: data.into_boxed_slice(),
      order,
    }
  }

  /// Convert back to an RGB image, reversing the channel swap when the frame
  /// is in `Bgr` order.
  pub fn to_rgb_image(&self) -> RgbImage {
    RgbImage::from_fn(FRAME_SIZE, FRAME_SIZE, |x, y| {
      let idx = (y as usize * FRAME_SIZE as usize + x as usize) * CHANNELS;
      let (a, b, c) = (self.data[idx], self.data[idx + 1], self.data[idx + 2]);
      match self.order {
        ChannelOrder::Rgb => image::Rgb([a, b, c]),
        ChannelOrder::Bgr => image::Rgb([c, b, a]),
      }
    })
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }

  pub fn order(&self) -> ChannelOrder {
    self.order
  }

  pub fn width(&self) -> usize {
    FRAME_SIZE as usize
  }

  pub fn height(&self) -> usize {
    FRAME_SIZE as usize
  }

  pub fn channels(&self) -> usize {
    CHANNELS
  }
}
