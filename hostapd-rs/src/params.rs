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

//! Value types exchanged with the hostapd service callers.
//!
//! These mirror the parcelables of the `android.hardware.wifi.hostapd`
//! interface. They are created per request and never persisted.

use crate::error::ConfigError;
use std::fmt;
use std::ops::BitOr;

/// Size limits of the network parameters, in bytes.
pub mod limits {
    pub const SSID_MAX_LEN_IN_BYTES: usize = 32;
    pub const WPA2_PSK_PASSPHRASE_MIN_LEN_IN_BYTES: usize = 8;
    pub const WPA2_PSK_PASSPHRASE_MAX_LEN_IN_BYTES: usize = 63;
}

/// IEEE 802.11 reason code carried by deauthentication frames.
pub type Ieee80211ReasonCode = u16;

/// Reason reported when a station's own reason is not known.
pub const WLAN_REASON_UNSPECIFIED: Ieee80211ReasonCode = 1;

/// Combinable set of radio bands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BandMask(u32);

impl BandMask {
    pub const BAND_2_GHZ: BandMask = BandMask(1 << 0);
    pub const BAND_5_GHZ: BandMask = BandMask(1 << 1);
    pub const BAND_6_GHZ: BandMask = BandMask(1 << 2);
    pub const BAND_60_GHZ: BandMask = BandMask(1 << 3);

    pub const fn from_bits(bits: u32) -> BandMask {
        BandMask(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if any band of `other` is set in `self`.
    pub const fn intersects(self, other: BandMask) -> bool {
        self.0 & other.0 != 0
    }

    /// True if `self` is exactly the single band `other`.
    pub fn is_only(self, other: BandMask) -> bool {
        self == other
    }
}

impl BitOr for BandMask {
    type Output = BandMask;

    fn bitor(self, rhs: BandMask) -> BandMask {
        BandMask(self.0 | rhs.0)
    }
}

/// Channel bandwidth, both as requested and as reported by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelBandwidth {
    #[default]
    Invalid,
    Auto,
    Bandwidth20NoHt,
    Bandwidth20,
    Bandwidth40,
    Bandwidth80,
    Bandwidth80P80,
    Bandwidth160,
    Bandwidth2160,
    Bandwidth4320,
    Bandwidth6480,
    Bandwidth8640,
    Bandwidth320,
}

/// Wi-Fi generation of a running access point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    Unknown,
    Legacy,
    Wifi11N,
    Wifi11AC,
    Wifi11AD,
    Wifi11AX,
    Wifi11BE,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncryptionType {
    #[default]
    None,
    Wpa,
    Wpa2,
    Wpa3SaeTransition,
    Wpa3Sae,
    Wpa3OweTransition,
    Wpa3Owe,
}

impl TryFrom<i32> for EncryptionType {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EncryptionType::None),
            1 => Ok(EncryptionType::Wpa),
            2 => Ok(EncryptionType::Wpa2),
            3 => Ok(EncryptionType::Wpa3SaeTransition),
            4 => Ok(EncryptionType::Wpa3Sae),
            5 => Ok(EncryptionType::Wpa3OweTransition),
            6 => Ok(EncryptionType::Wpa3Owe),
            other => Err(ConfigError::UnknownEncryptionType(other)),
        }
    }
}

/// Engine verbosity, most verbose first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Excessive,
    MsgDump,
    Debug,
    Info,
    Warning,
    Error,
}

/// Capabilities the access point should run with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HwModeParams {
    pub enable_80211n: bool,
    pub enable_80211ac: bool,
    pub enable_80211ax: bool,
    pub enable_6ghz_band: bool,
    pub enable_he_single_user_beamformer: bool,
    pub enable_he_single_user_beamformee: bool,
    pub enable_he_multi_user_beamformer: bool,
    pub enable_he_target_wake_time: bool,
    pub enable_edmg: bool,
    pub enable_80211be: bool,
    pub maximum_channel_bandwidth: ChannelBandwidth,
}

/// Inclusive frequency range for automatic channel selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrequencyRange {
    pub start_mhz: i32,
    pub end_mhz: i32,
}

/// Channel selection for one access point instance.
///
/// With `enable_acs` the engine picks from `acs_channel_freq_ranges_mhz`
/// and `channel` is ignored; otherwise `channel` is used as is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelParams {
    pub band_mask: BandMask,
    pub channel: i32,
    pub enable_acs: bool,
    pub acs_should_exclude_dfs: bool,
    pub acs_channel_freq_ranges_mhz: Vec<FrequencyRange>,
}

/// Interface half of an add access point request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IfaceParams {
    /// Interface name, or the bridge / MLD name for concurrent requests.
    pub name: String,
    pub hw_mode_params: HwModeParams,
    /// One entry per instance, one or two are accepted.
    pub channel_params: Vec<ChannelParams>,
    pub uses_mlo: bool,
    /// Link ids of the MLD links, used in place of bridge members for MLO.
    pub instance_identities: Option<Vec<String>>,
}

/// Network half of an add access point request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkParams {
    /// Raw SSID bytes, may be non printable.
    pub ssid: Vec<u8>,
    pub is_hidden: bool,
    pub encryption_type: EncryptionType,
    pub passphrase: String,
    pub is_metered: bool,
    pub vendor_elements: Vec<u8>,
    pub is_client_isolation_enabled: bool,
}

/// A 6 byte IEEE 802 MAC address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const LEN: usize = 6;

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Ok(MacAddress(bytes.try_into()?))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", b[0], b[1], b[2], b[3], b[4], b[5])
    }
}

/// Published when an access point instance comes up or switches channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApInfo {
    /// Bridge name for bridged instances, otherwise the interface name.
    pub iface_name: String,
    /// Link id for MLO links, otherwise the instance interface name.
    pub ap_iface_instance: String,
    pub freq_mhz: i32,
    pub channel_bandwidth: ChannelBandwidth,
    pub generation: Generation,
    pub ap_iface_instance_mac_address: MacAddress,
    pub mld_mac_address: Option<MacAddress>,
}

/// Published when a client connects to or leaves an access point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInfo {
    pub iface_name: String,
    pub ap_iface_instance: String,
    pub client_address: MacAddress,
    pub is_connected: bool,
    /// Only filled for disconnects on service version 3 and later.
    pub disconnect_reason_code: Option<Ieee80211ReasonCode>,
}
