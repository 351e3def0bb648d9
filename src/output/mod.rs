// This file is part of the Padidet (deteksi padi) project.
// src/output/mod.rs - output module
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

mod draw;
mod image_output;

pub use draw::Draw;
pub use image_output::{
  DEFAULT_OUTPUT_PATH, DOWNLOAD_FILE_NAME, DOWNLOAD_MIME_TYPE, ImageOutput, OutputError,
};
