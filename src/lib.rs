// This file is part of the Padidet (deteksi padi) project.
// src/lib.rs - library root
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

pub mod detect;
pub mod frame;
pub mod labels;
pub mod model;
pub mod output;

pub use detect::{DetectConfig, Detected, Detection, Detector};
pub use frame::{ChannelOrder, FRAME_SIZE, Frame};
pub use model::{ModelProvider, RawBox, YoloModel, YoloModelBuilder};
