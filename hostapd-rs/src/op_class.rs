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

//! Global operating classes, IEEE 802.11 Annex E table E-4.

use crate::params::BandMask;

/// Returned when no operating class matches.
pub const OP_CLASS_INVALID: u8 = 0;

/// Returns the operating class for `channel` in `band`.
///
/// Bands are tried in 2.4, 5, 6, 60 GHz order and the first band present
/// in the mask decides. Returns [`OP_CLASS_INVALID`] for channels the band
/// does not define.
pub fn op_class_for_channel(channel: i32, band: BandMask, has_11n: bool, has_11ac: bool) -> u8 {
    if band.intersects(BandMask::BAND_2_GHZ) {
        op_class_2ghz(channel, has_11n)
    } else if band.intersects(BandMask::BAND_5_GHZ) {
        op_class_5ghz(channel, has_11n, has_11ac)
    } else if band.intersects(BandMask::BAND_6_GHZ) {
        op_class_6ghz(channel)
    } else if band.intersects(BandMask::BAND_60_GHZ) {
        op_class_60ghz(channel)
    } else {
        OP_CLASS_INVALID
    }
}

fn op_class_2ghz(channel: i32, has_11n: bool) -> u8 {
    match channel {
        14 => 82,
        1..=13 if !has_11n => 81,
        // HT40, secondary channel above the primary.
        1..=9 => 83,
        // HT40, secondary channel below the primary.
        10..=13 => 84,
        _ => OP_CLASS_INVALID,
    }
}

fn op_class_5ghz(channel: i32, has_11n: bool, has_11ac: bool) -> u8 {
    if has_11ac {
        match channel {
            42 | 58 | 106 | 122 | 138 | 155 => return 128,
            50 | 114 => return 129,
            _ => {}
        }
    }
    if !has_11n {
        return match channel {
            36..=48 => 115,
            52..=64 => 118,
            100..=144 => 121,
            149..=161 => 124,
            165..=169 => 125,
            _ => OP_CLASS_INVALID,
        };
    }
    // HT40, 116/119/122/126 have the secondary channel above the primary.
    match channel {
        36 | 44 => 116,
        40 | 48 => 117,
        52 | 60 => 119,
        56 | 64 => 120,
        100 | 108 | 116 | 124 | 132 | 140 => 122,
        104 | 112 | 120 | 128 | 136 | 144 => 123,
        149 | 157 => 126,
        153 | 161 => 127,
        _ => OP_CLASS_INVALID,
    }
}

fn op_class_6ghz(channel: i32) -> u8 {
    if channel & 0x03 == 0x01 {
        131
    } else if channel & 0x07 == 0x03 {
        132
    } else if channel & 0x0F == 0x07 {
        133
    } else if channel & 0x1F == 0x0F {
        134
    } else if channel == 2 {
        136
    } else {
        OP_CLASS_INVALID
    }
}

fn op_class_60ghz(channel: i32) -> u8 {
    match channel {
        1..=8 => 180,
        9..=15 => 181,
        17..=22 => 182,
        25..=29 => 183,
        _ => OP_CLASS_INVALID,
    }
}
