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

//! A logger for the hostapd service and its tools.
//!
//! Uses the env_logger crate that allows control of logging through
//! the RUST_LOG environment variable.

use env_logger::{Builder, Env};
use log::{Level, Record};
use std::{ffi::OsStr, io::Write, path::Path};

use crate::util::time_display::log_current_time;

/// Initiating the environment for logging with given prefix
///
/// Lines look like `<prefix> <L> <time> <file>:<line> - <message>`.
/// Calling it more than once is harmless; later calls are ignored.
pub fn init(prefix: &'static str) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "{} {} {} {}:{} - {}",
            prefix,
            level_to_string(record.level()),
            log_current_time(),
            format_file(record),
            record.line().unwrap_or(0),
            record.args()
        )
    });
    let _ = builder.try_init();
}

/// Initiating the environment for logging in Rust unit tests
pub fn init_for_test() {
    let mut binding = Builder::from_env(Env::default().default_filter_or("debug"));
    let builder = binding.is_test(true);
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "{} {} \t| hostapd-test: {}",
            level_to_string(record.level()),
            log_current_time(),
            record.args()
        )
    });
    let _ = builder.try_init();
}

fn format_file<'a>(record: &'a Record<'a>) -> &'a str {
    record
        .file()
        .and_then(|filepath| Path::new(filepath).file_name())
        .and_then(OsStr::to_str)
        .unwrap_or("N/A")
}

fn level_to_string(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}
