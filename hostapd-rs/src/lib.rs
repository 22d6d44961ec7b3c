// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # hostapd-rs
//!
//! Access point management on top of the `hostapd` engine: generates the
//! per instance `hostapd.conf`, brings single, bridged and multi-link (MLO)
//! access points up and down, and routes engine events to the registered
//! listeners.
//!
//! * **`hostapd`:** the service object and its RPC surface.
//! * **`config`** and **`op_class`:** config generation.
//! * **`engine`** and **`system`:** the collaborators the service drives.
//! * **`event_router`:** translation of engine events into listener callbacks.

pub mod config;
pub mod engine;
pub mod error;
pub mod event_router;
pub mod hostapd;
pub mod lifecycle;
pub mod op_class;
pub mod options;
pub mod params;
pub mod system;

#[cfg(test)]
mod fakes;
