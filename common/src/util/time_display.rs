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

//! # Time Display class

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// A point in time to be rendered in log lines.
pub struct TimeDisplay {
    /// seconds since std::time::UNIX_EPOCH
    secs: i64,
    /// nano sub seconds since std::time::UNIX_EPOCH
    nsecs: u32,
}

impl TimeDisplay {
    pub fn new(secs: i64, nsecs: u32) -> TimeDisplay {
        TimeDisplay { secs, nsecs }
    }

    /// Displays time in UTC with a format MM-DD HH:MM:SS.mmm, the logcat layout.
    pub fn utc_display_log(&self) -> String {
        match DateTime::<Utc>::from_timestamp(self.secs, self.nsecs) {
            Some(datetime) => datetime.format("%m-%d %H:%M:%S%.3f").to_string(),
            None => "INVALID-TIMESTAMP".to_string(),
        }
    }
}

fn get_current_time() -> TimeDisplay {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => {
            TimeDisplay::new(since_epoch.as_secs() as i64, since_epoch.subsec_nanos())
        }
        Err(_) => TimeDisplay::new(0, 0),
    }
}

/// Return the timestamp of the current time for logs
pub fn log_current_time() -> String {
    get_current_time().utc_display_log()
}
