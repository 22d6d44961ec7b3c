//
//  Copyright 2024 Google, Inc.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at:
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! Utilities shared by the hostapd service crates: logging, `key=value`
//! files and the handful of OS queries the access point code relies on.

pub mod util {
    pub mod hostapd_logger;
    pub mod kv_file;
    pub mod os_utils;
    pub mod time_display;
}
