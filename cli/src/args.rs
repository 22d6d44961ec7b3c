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

use clap::{Parser, ValueEnum};
use hostapd_rs::params::{
    BandMask, ChannelBandwidth, ChannelParams, EncryptionType, FrequencyRange, HwModeParams,
    IfaceParams, NetworkParams,
};
use std::path::PathBuf;

/// Render the hostapd.conf of an access point without starting it.
#[derive(Debug, Parser)]
#[command(name = "hostapd-conf", version)]
pub struct HostapdConfArgs {
    /// Interface the access point runs on
    #[arg(long)]
    pub iface: String,
    /// Radio band, repeat for a multi band access point
    #[arg(long, value_enum, ignore_case = true, required = true)]
    pub band: Vec<Band>,
    /// Channel number, ignored when ACS ranges are given
    #[arg(long, default_value_t = 0)]
    pub channel: i32,
    /// Enable 802.11n
    #[arg(long)]
    pub ieee80211n: bool,
    /// Enable 802.11ac
    #[arg(long)]
    pub ieee80211ac: bool,
    /// Enable 802.11ax
    #[arg(long)]
    pub ieee80211ax: bool,
    /// Enable 802.11be
    #[arg(long)]
    pub ieee80211be: bool,
    /// Network SSID
    #[arg(long, default_value = "")]
    pub ssid: String,
    /// Security of the network
    #[arg(long, value_enum, ignore_case = true, default_value = "none")]
    pub encryption: Encryption,
    /// Passphrase for WPA, WPA2 and SAE networks
    #[arg(long, default_value = "")]
    pub passphrase: String,
    /// Mark the upstream connection as metered
    #[arg(long)]
    pub metered: bool,
    /// Hide the SSID from beacons
    #[arg(long)]
    pub hidden: bool,
    /// Frequency range for automatic channel selection, as `start-end` or a
    /// single frequency in MHz. Enables ACS.
    #[arg(long = "acs-range", value_parser = parse_freq_range)]
    pub acs_ranges: Vec<FrequencyRange>,
    /// Maximum channel bandwidth
    #[arg(long, value_enum, default_value = "auto")]
    pub bandwidth: Bandwidth,
    /// Bridge the access point belongs to
    #[arg(long, default_value = "")]
    pub bridge: String,
    /// Service options file with `key=value` lines
    #[arg(long)]
    pub options: Option<PathBuf>,
    /// Write the config to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Band {
    #[value(name = "2g")]
    Band2G,
    #[value(name = "5g")]
    Band5G,
    #[value(name = "6g")]
    Band6G,
    #[value(name = "60g")]
    Band60G,
}

impl From<Band> for BandMask {
    fn from(band: Band) -> Self {
        match band {
            Band::Band2G => BandMask::BAND_2_GHZ,
            Band::Band5G => BandMask::BAND_5_GHZ,
            Band::Band6G => BandMask::BAND_6_GHZ,
            Band::Band60G => BandMask::BAND_60_GHZ,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Encryption {
    None,
    Wpa,
    Wpa2,
    Wpa3SaeTransition,
    Wpa3Sae,
    Wpa3OweTransition,
    Wpa3Owe,
}

impl From<Encryption> for EncryptionType {
    fn from(encryption: Encryption) -> Self {
        match encryption {
            Encryption::None => EncryptionType::None,
            Encryption::Wpa => EncryptionType::Wpa,
            Encryption::Wpa2 => EncryptionType::Wpa2,
            Encryption::Wpa3SaeTransition => EncryptionType::Wpa3SaeTransition,
            Encryption::Wpa3Sae => EncryptionType::Wpa3Sae,
            Encryption::Wpa3OweTransition => EncryptionType::Wpa3OweTransition,
            Encryption::Wpa3Owe => EncryptionType::Wpa3Owe,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Bandwidth {
    Auto,
    #[value(name = "20")]
    Mhz20,
    #[value(name = "40")]
    Mhz40,
    #[value(name = "80")]
    Mhz80,
    #[value(name = "160")]
    Mhz160,
}

impl From<Bandwidth> for ChannelBandwidth {
    fn from(bandwidth: Bandwidth) -> Self {
        match bandwidth {
            Bandwidth::Auto => ChannelBandwidth::Auto,
            Bandwidth::Mhz20 => ChannelBandwidth::Bandwidth20,
            Bandwidth::Mhz40 => ChannelBandwidth::Bandwidth40,
            Bandwidth::Mhz80 => ChannelBandwidth::Bandwidth80,
            Bandwidth::Mhz160 => ChannelBandwidth::Bandwidth160,
        }
    }
}

fn parse_freq_range(arg: &str) -> Result<FrequencyRange, String> {
    let parse = |s: &str| s.trim().parse::<i32>().map_err(|e| format!("{s}: {e}"));
    let (start_mhz, end_mhz) = match arg.split_once('-') {
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let freq = parse(arg)?;
            (freq, freq)
        }
    };
    if start_mhz > end_mhz {
        return Err(format!("range start {start_mhz} is above its end {end_mhz}"));
    }
    Ok(FrequencyRange { start_mhz, end_mhz })
}

impl HostapdConfArgs {
    pub fn band_mask(&self) -> BandMask {
        self.band.iter().fold(BandMask::default(), |mask, band| mask | BandMask::from(*band))
    }

    pub fn channel_params(&self) -> ChannelParams {
        ChannelParams {
            band_mask: self.band_mask(),
            channel: self.channel,
            enable_acs: !self.acs_ranges.is_empty(),
            acs_should_exclude_dfs: false,
            acs_channel_freq_ranges_mhz: self.acs_ranges.clone(),
        }
    }

    pub fn iface_params(&self) -> IfaceParams {
        IfaceParams {
            name: self.iface.clone(),
            hw_mode_params: HwModeParams {
                enable_80211n: self.ieee80211n,
                enable_80211ac: self.ieee80211ac,
                enable_80211ax: self.ieee80211ax,
                enable_6ghz_band: self.band.contains(&Band::Band6G),
                enable_80211be: self.ieee80211be,
                maximum_channel_bandwidth: self.bandwidth.into(),
                ..Default::default()
            },
            channel_params: vec![self.channel_params()],
            ..Default::default()
        }
    }

    pub fn network_params(&self) -> NetworkParams {
        NetworkParams {
            ssid: self.ssid.as_bytes().to_vec(),
            is_hidden: self.hidden,
            encryption_type: self.encryption.into(),
            passphrase: self.passphrase.clone(),
            is_metered: self.metered,
            ..Default::default()
        }
    }
}
