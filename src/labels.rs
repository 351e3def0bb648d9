// This file is part of the Padidet (deteksi padi) project.
// src/labels.rs - class label table
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

/// Display names for the four pest/disease classes the model was trained on.
/// The index is the model's class id.
pub const CLASS_LABELS: [&str; 4] = [
  "Blast",
  "Hama Putih Palsu",
  "Hawar Daun Bakteri",
  "Stem Borer",
];

/// Label reported for any class id outside the table.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Total lookup over the label table. Ids the table does not cover map to
/// [`UNKNOWN_LABEL`] instead of failing the request.
pub fn label_for(class_id: u32) -> &'static str {
  CLASS_LABELS
    .get(class_id as usize)
    .copied()
    .unwrap_or(UNKNOWN_LABEL)
}
