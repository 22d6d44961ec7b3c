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

//! # hostapd.conf generation
//!
//! Every access point instance gets its own configuration file which the
//! engine parses with its regular line oriented config loader. The builder
//! validates the request first and then accumulates ordered `key=value`
//! entries, so nothing is produced for a request that fails validation.

use crate::error::ConfigError;
use crate::op_class::{op_class_for_channel, OP_CLASS_INVALID};
use crate::options::{HostapdOptions, ServiceVersions};
use crate::params::{
    limits, BandMask, ChannelBandwidth, ChannelParams, EncryptionType, IfaceParams, NetworkParams,
};
use crate::system::SystemOps;
use hostapd_common::util::kv_file::KvFile;
use log::{error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// Keys a vendor overlay may set for unmetered networks.
///
/// `assocresp_elementsbeacon_int` and `wmm_ac_bk_cwminwmm_ac_bk_cwmaxwmm_ac_bk_aifs` are
/// kept exactly as the platform ships them, so `assocresp_elements`,
/// `beacon_int` and the three `wmm_ac_bk_*` keys are not overlayable.
// TODO: drop the merged entries once the intended allow-list is confirmed.
pub const OVERLAYABLE_KEYS: &[&str] = &[
    "ap_max_inactivity",
    "assocresp_elementsbeacon_int",
    "disassoc_low_ack",
    "dtim_period",
    "fragm_threshold",
    "max_listen_interval",
    "max_num_sta",
    "rts_threshold",
    "skip_inactivity_poll",
    "uapsd_advertisement_enabled",
    "wmm_enabled",
    "wmm_ac_vo_aifs",
    "wmm_ac_vo_cwmin",
    "wmm_ac_vo_cwmax",
    "wmm_ac_vo_txop_limit",
    "wmm_ac_vo_acm",
    "wmm_ac_vi_aifs",
    "wmm_ac_vi_cwmin",
    "wmm_ac_vi_cwmax",
    "wmm_ac_vi_txop_limit",
    "wmm_ac_vi_acm",
    "wmm_ac_bk_cwminwmm_ac_bk_cwmaxwmm_ac_bk_aifs",
    "wmm_ac_bk_txop_limit",
    "wmm_ac_bk_acm",
    "wmm_ac_be_aifs",
    "wmm_ac_be_cwmin",
    "wmm_ac_be_cwmax",
    "wmm_ac_be_txop_limit",
    "wmm_ac_be_acm",
];

/// Path of the config file for an instance.
///
/// MLO links share one interface, so their files are named after the MLD
/// and the link: `hostapd_<br>-<link>.conf`.
pub fn config_file_path(
    conf_dir: &Path,
    instance_name: &str,
    br_name: &str,
    uses_mlo: bool,
) -> PathBuf {
    let name = if uses_mlo { format!("{br_name}-{instance_name}") } else { instance_name.into() };
    conf_dir.join(format!("hostapd_{name}.conf"))
}

/// An ordered list of hostapd config entries.
///
/// Keys may repeat; the engine keeps the last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostapdConfig {
    entries: Vec<(String, String)>,
}

impl HostapdConfig {
    pub fn push(&mut self, key: &str, value: impl fmt::Display) {
        self.entries.push((key.to_owned(), value.to_string()));
    }

    pub fn append(&mut self, other: HostapdConfig) {
        self.entries.extend(other.entries);
    }

    /// The effective value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for HostapdConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Band facts derived once from a channel's band mask.
#[derive(Clone, Copy)]
struct Band {
    mask: BandMask,
    only_2ghz: bool,
    only_6ghz: bool,
    only_60ghz: bool,
    has_6ghz: bool,
    has_60ghz: bool,
}

impl Band {
    fn new(mask: BandMask) -> Self {
        Band {
            mask,
            only_2ghz: mask.is_only(BandMask::BAND_2_GHZ),
            only_6ghz: mask.is_only(BandMask::BAND_6_GHZ),
            only_60ghz: mask.is_only(BandMask::BAND_60_GHZ),
            has_6ghz: mask.intersects(BandMask::BAND_6_GHZ),
            has_60ghz: mask.intersects(BandMask::BAND_60_GHZ),
        }
    }

    fn pairwise_cipher(&self) -> &'static str {
        if self.only_60ghz {
            "GCMP"
        } else {
            "CCMP"
        }
    }
}

/// Builds hostapd configuration files.
pub struct ConfigBuilder<'a> {
    system: &'a dyn SystemOps,
    ctrl_dir: &'a Path,
    overlay_path: &'a Path,
    versions: ServiceVersions,
}

impl<'a> ConfigBuilder<'a> {
    pub fn new(
        system: &'a dyn SystemOps,
        options: &'a HostapdOptions,
        versions: ServiceVersions,
    ) -> Self {
        ConfigBuilder {
            system,
            ctrl_dir: &options.ctrl_dir,
            overlay_path: &options.overlay_path,
            versions,
        }
    }

    /// Generates the config of one instance.
    ///
    /// `iface_params.name` is the instance name. `br_name` is the bridge
    /// or MLD the instance belongs to and may be empty. A non empty
    /// `owe_transition_ifname` pairs the instance with its OWE companion.
    pub fn build(
        &self,
        iface_params: &IfaceParams,
        channel_params: &ChannelParams,
        nw_params: &NetworkParams,
        br_name: &str,
        owe_transition_ifname: &str,
    ) -> Result<HostapdConfig, ConfigError> {
        if nw_params.ssid.len() > limits::SSID_MAX_LEN_IN_BYTES {
            error!("Invalid SSID size: {}", nw_params.ssid.len());
            return Err(ConfigError::SsidTooLong(nw_params.ssid.len()));
        }
        let band = Band::new(channel_params.band_mask);
        let hw = &iface_params.hw_mode_params;

        let encryption = encryption_block(iface_params, nw_params, band)?;
        let channel = channel_block(iface_params, channel_params, band);
        let (hw_mode, edmg) = hw_mode_block(iface_params, channel_params, band)?;
        let he = he_block(iface_params, band);
        let eht = self.eht_block(iface_params, br_name, band)?;
        let bandwidth = bandwidth_block(iface_params, band);
        let overlay = self.overlay_block(nw_params)?;

        let mut config = overlay;
        let interface = if iface_params.uses_mlo { br_name } else { iface_params.name.as_str() };
        config.push("interface", interface);
        config.push("driver", "nl80211");
        config.push(
            "ctrl_interface",
            self.ctrl_dir.join(format!("ctrl_{}", iface_params.name)).display(),
        );
        // ssid2 takes the SSID as hex, which carries non printable bytes.
        config.push("ssid2", hex::encode(&nw_params.ssid));
        config.append(channel);
        config.push("ieee80211n", u8::from(hw.enable_80211n));
        config.push("ieee80211ac", u8::from(hw.enable_80211ac));
        config.append(he);
        config.append(eht);
        config.append(hw_mode);
        config.append(bandwidth);
        config.push("ignore_broadcast_ssid", u8::from(nw_params.is_hidden));
        config.push("wowlan_triggers", "any");
        if nw_params.is_metered {
            config.push("interworking", 1);
            // CHARGEABLE_PUBLIC_NETWORK
            config.push("access_network_type", 2);
        } else {
            config.push("interworking", 0);
        }
        config.append(encryption);
        if !br_name.is_empty() && !iface_params.uses_mlo {
            config.push("bridge", br_name);
        }
        if !owe_transition_ifname.is_empty() {
            config.push("owe_transition_ifname", owe_transition_ifname);
        }
        config.append(edmg);
        if !nw_params.vendor_elements.is_empty() {
            config.push("vendor_elements", hex::encode(&nw_params.vendor_elements));
        }
        let isolate = self.versions.service_at_least(3) && nw_params.is_client_isolation_enabled;
        config.push("ap_isolate", u8::from(isolate));
        Ok(config)
    }

    fn eht_block(
        &self,
        iface_params: &IfaceParams,
        br_name: &str,
        band: Band,
    ) -> Result<HostapdConfig, ConfigError> {
        let mut config = HostapdConfig::default();
        if !iface_params.hw_mode_params.enable_80211be || band.has_60ghz {
            config.push("ieee80211be", 0);
            return Ok(config);
        }
        config.push("ieee80211be", 1);
        if self.versions.service_and_client_at_least(2) {
            let iface = if iface_params.uses_mlo { br_name } else { iface_params.name.as_str() };
            let mac = self.system.interface_mac_address(iface).map_err(|e| {
                error!("Unable to set interface mac address as bssid for 11BE SAP");
                ConfigError::MacAddress { iface: iface.to_owned(), reason: e.to_string() }
            })?;
            config.push(if iface_params.uses_mlo { "mld_addr" } else { "bssid" }, mac);
            config.push("mld_ap", 1);
        }
        Ok(config)
    }

    /// Allow-listed overlay entries, only for unmetered networks.
    fn overlay_block(&self, nw_params: &NetworkParams) -> Result<HostapdConfig, ConfigError> {
        let mut config = HostapdConfig::default();
        if nw_params.is_metered {
            return Ok(config);
        }
        let contents = self.system.read_overlay(self.overlay_path).map_err(|e| {
            ConfigError::OverlayRead {
                path: self.overlay_path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let Some(contents) = contents else {
            return Ok(config);
        };
        let mut overlay = KvFile::new(self.overlay_path.to_path_buf());
        overlay.parse(&contents);
        overlay.retain(|key| OVERLAYABLE_KEYS.contains(&key));
        for (key, value) in overlay.iter() {
            config.push(key, value);
        }
        Ok(config)
    }
}

fn validate_passphrase(
    encryption: EncryptionType,
    passphrase: &str,
    min_len: usize,
    max_len: Option<usize>,
) -> Result<(), ConfigError> {
    let len = passphrase.len();
    if len < min_len || max_len.is_some_and(|max| len > max) {
        error!("Invalid passphrase length {len} for {encryption:?}");
        return Err(ConfigError::InvalidPassphrase { encryption, len });
    }
    Ok(())
}

fn validate_wpa2_passphrase(
    encryption: EncryptionType,
    passphrase: &str,
) -> Result<(), ConfigError> {
    validate_passphrase(
        encryption,
        passphrase,
        limits::WPA2_PSK_PASSPHRASE_MIN_LEN_IN_BYTES,
        Some(limits::WPA2_PSK_PASSPHRASE_MAX_LEN_IN_BYTES),
    )
}

fn encryption_block(
    iface_params: &IfaceParams,
    nw_params: &NetworkParams,
    band: Band,
) -> Result<HostapdConfig, ConfigError> {
    let mut config = HostapdConfig::default();
    let encryption = nw_params.encryption_type;
    let passphrase = nw_params.passphrase.as_str();
    let ext_key = iface_params.hw_mode_params.enable_80211be;
    let sae_key_mgmt = if ext_key { "SAE SAE-EXT-KEY" } else { "SAE" };
    let sae_pwe = if band.only_6ghz { 1 } else { 2 };
    match encryption {
        EncryptionType::None => {}
        EncryptionType::Wpa => {
            validate_wpa2_passphrase(encryption, passphrase)?;
            config.push("wpa", 3);
            config.push("wpa_pairwise", if band.only_60ghz { "GCMP" } else { "TKIP CCMP" });
            config.push("wpa_passphrase", passphrase);
        }
        EncryptionType::Wpa2 => {
            validate_wpa2_passphrase(encryption, passphrase)?;
            config.push("wpa", 2);
            config.push("rsn_pairwise", band.pairwise_cipher());
            config.push("wpa_passphrase", passphrase);
        }
        // WPA-PSK is not allowed in 6GHz, transition mode becomes SAE only.
        EncryptionType::Wpa3SaeTransition if band.has_6ghz => {
            validate_wpa2_passphrase(encryption, passphrase)?;
            info!("WPA3_SAE_TRANSITION configured in 6GHz band. Enable only SAE in key_mgmt");
            config.push("wpa", 2);
            config.push("rsn_pairwise", "CCMP");
            config.push("wpa_key_mgmt", sae_key_mgmt);
            config.push("ieee80211w", 2);
            config.push("sae_require_mfp", 2);
            config.push("sae_pwe", sae_pwe);
            config.push("sae_password", passphrase);
        }
        EncryptionType::Wpa3SaeTransition => {
            validate_wpa2_passphrase(encryption, passphrase)?;
            config.push("wpa", 2);
            config.push("rsn_pairwise", band.pairwise_cipher());
            config.push(
                "wpa_key_mgmt",
                if ext_key { "WPA-PSK SAE SAE-EXT-KEY" } else { "WPA-PSK SAE" },
            );
            config.push("ieee80211w", 1);
            config.push("sae_require_mfp", 1);
            config.push("wpa_passphrase", passphrase);
            config.push("sae_password", passphrase);
        }
        EncryptionType::Wpa3Sae => {
            validate_passphrase(encryption, passphrase, 1, None)?;
            config.push("wpa", 2);
            config.push("rsn_pairwise", band.pairwise_cipher());
            config.push("wpa_key_mgmt", sae_key_mgmt);
            config.push("ieee80211w", 2);
            config.push("sae_require_mfp", 2);
            config.push("sae_pwe", sae_pwe);
            config.push("sae_password", passphrase);
        }
        EncryptionType::Wpa3OweTransition | EncryptionType::Wpa3Owe => {
            config.push("wpa", 2);
            config.push("rsn_pairwise", band.pairwise_cipher());
            config.push("wpa_key_mgmt", "OWE");
            config.push("ieee80211w", 2);
        }
    }
    Ok(config)
}

fn channel_block(
    iface_params: &IfaceParams,
    channel_params: &ChannelParams,
    band: Band,
) -> HostapdConfig {
    let mut config = HostapdConfig::default();
    if channel_params.enable_acs {
        let freqlist = channel_params
            .acs_channel_freq_ranges_mhz
            .iter()
            .map(|range| {
                if range.start_mhz != range.end_mhz {
                    format!("{}-{}", range.start_mhz, range.end_mhz)
                } else {
                    range.start_mhz.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(",");
        config.push("channel", 0);
        config.push("acs_exclude_dfs", u8::from(channel_params.acs_should_exclude_dfs));
        config.push("freqlist", freqlist);
    } else {
        let hw = &iface_params.hw_mode_params;
        let op_class = op_class_for_channel(
            channel_params.channel,
            band.mask,
            hw.enable_80211n,
            hw.enable_80211ac,
        );
        if op_class == OP_CLASS_INVALID {
            warn!(
                "No operating class for channel {} in band {:#x}",
                channel_params.channel,
                band.mask.bits()
            );
        }
        config.push("channel", channel_params.channel);
        config.push("op_class", op_class);
    }
    config
}

/// Returns the `hw_mode` entry and the EDMG entries, which go at the end.
fn hw_mode_block(
    iface_params: &IfaceParams,
    channel_params: &ChannelParams,
    band: Band,
) -> Result<(HostapdConfig, HostapdConfig), ConfigError> {
    let mut hw_mode = HostapdConfig::default();
    let mut edmg = HostapdConfig::default();
    let mask = band.mask;
    if band.has_60ghz {
        hw_mode.push("hw_mode", "ad");
        if iface_params.hw_mode_params.enable_edmg {
            edmg.push("enable_edmg", 1);
            edmg.push("edmg_channel", channel_params.channel);
        }
    } else if mask.intersects(BandMask::BAND_2_GHZ) {
        let dual = mask.intersects(BandMask::BAND_5_GHZ | BandMask::BAND_6_GHZ);
        hw_mode.push("hw_mode", if dual { "any" } else { "g" });
    } else if mask.intersects(BandMask::BAND_5_GHZ | BandMask::BAND_6_GHZ) {
        hw_mode.push("hw_mode", "a");
    } else {
        error!("Invalid band");
        return Err(ConfigError::InvalidBand(mask.bits()));
    }
    Ok((hw_mode, edmg))
}

fn he_block(iface_params: &IfaceParams, band: Band) -> HostapdConfig {
    let hw = &iface_params.hw_mode_params;
    let mut config = HostapdConfig::default();
    if hw.enable_80211ax && !band.has_60ghz {
        config.push("ieee80211ax", 1);
        config.push("he_su_beamformer", u8::from(hw.enable_he_single_user_beamformer));
        config.push("he_su_beamformee", u8::from(hw.enable_he_single_user_beamformee));
        config.push("he_mu_beamformer", u8::from(hw.enable_he_multi_user_beamformer));
        config.push("he_twt_required", u8::from(hw.enable_he_target_wake_time));
    } else {
        config.push("ieee80211ax", 0);
    }
    config
}

fn bandwidth_block(iface_params: &IfaceParams, band: Band) -> HostapdConfig {
    let hw = &iface_params.hw_mode_params;
    let eht = hw.enable_80211be && !band.has_60ghz;
    let he = hw.enable_80211ax && !band.has_60ghz;
    let mut config = HostapdConfig::default();
    // (ht40, oper_chwidth, op_class in 6GHz) of the fixed widths.
    let fixed = match hw.maximum_channel_bandwidth {
        ChannelBandwidth::Bandwidth20 => Some((false, 0, 131)),
        ChannelBandwidth::Bandwidth40 => Some((true, 0, 132)),
        ChannelBandwidth::Bandwidth80 => Some((true, 1, 133)),
        ChannelBandwidth::Bandwidth160 => Some((true, 2, 134)),
        _ => None,
    };
    match fixed {
        Some((ht40, chwidth, op_class)) => {
            if ht40 {
                config.push("ht_capab", "[HT40+]");
            }
            config.push("eht_oper_chwidth", if eht { chwidth } else { 0 });
            config.push("he_oper_chwidth", if he { chwidth } else { 0 });
            config.push("vht_oper_chwidth", if hw.enable_80211ac { chwidth } else { 0 });
            if band.has_6ghz {
                config.push("op_class", op_class);
            }
        }
        None if !band.only_2ghz && !band.has_60ghz => {
            if hw.enable_80211ac {
                config.push("ht_capab", "[HT40+]");
                config.push("vht_oper_chwidth", 1);
            }
            if band.has_6ghz {
                config.push("op_class", if hw.enable_80211be { 137 } else { 134 });
            }
            if hw.enable_80211ax {
                config.push("he_oper_chwidth", 1);
            }
            if hw.enable_80211be {
                config.push("eht_oper_chwidth", 1);
            }
        }
        None => {}
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeSystem;
    use crate::params::{FrequencyRange, HwModeParams, MacAddress};

    const PASSPHRASE: &str = "verysecurewowe";

    fn versions(service: i32, client: i32) -> ServiceVersions {
        ServiceVersions { service, client }
    }

    fn iface(name: &str) -> IfaceParams {
        IfaceParams {
            name: name.into(),
            hw_mode_params: HwModeParams { enable_80211n: true, ..Default::default() },
            ..Default::default()
        }
    }

    fn channel(band_mask: BandMask, channel: i32) -> ChannelParams {
        ChannelParams { band_mask, channel, ..Default::default() }
    }

    fn network(encryption_type: EncryptionType, passphrase: &str) -> NetworkParams {
        NetworkParams {
            ssid: b"123abcd".to_vec(),
            encryption_type,
            passphrase: passphrase.into(),
            is_metered: true,
            ..Default::default()
        }
    }

    fn build_with(
        system: &FakeSystem,
        versions: ServiceVersions,
        iface_params: &IfaceParams,
        channel_params: &ChannelParams,
        nw_params: &NetworkParams,
        br_name: &str,
    ) -> Result<HostapdConfig, ConfigError> {
        let options = HostapdOptions {
            ctrl_dir: PathBuf::from("/data/vendor/wifi/hostapd"),
            overlay_path: PathBuf::from("/vendor/etc/wifi/hostapd_unmetered_overlay.conf"),
            ..Default::default()
        };
        ConfigBuilder::new(system, &options, versions).build(
            iface_params,
            channel_params,
            nw_params,
            br_name,
            "",
        )
    }

    fn build(
        iface_params: &IfaceParams,
        channel_params: &ChannelParams,
        nw_params: &NetworkParams,
    ) -> Result<HostapdConfig, ConfigError> {
        build_with(
            &FakeSystem::default(),
            versions(3, 3),
            iface_params,
            channel_params,
            nw_params,
            "",
        )
    }

    #[test]
    fn test_wpa2_2ghz_channel_6() {
        let config = build(
            &iface("wlan42"),
            &channel(BandMask::BAND_2_GHZ, 6),
            &network(EncryptionType::Wpa2, PASSPHRASE),
        )
        .unwrap();
        let text = config.to_string();
        for line in [
            "interface=wlan42",
            "driver=nl80211",
            "ctrl_interface=/data/vendor/wifi/hostapd/ctrl_wlan42",
            "channel=6",
            "op_class=83",
            "ssid2=31323361626364",
            "ieee80211n=1",
            "ieee80211ac=0",
            "hw_mode=g",
            "wpa=2",
            "rsn_pairwise=CCMP",
            "wpa_passphrase=verysecurewowe",
            "interworking=1",
            "access_network_type=2",
            "ap_isolate=0",
        ] {
            assert!(text.lines().any(|l| l == line), "missing {line} in\n{text}");
        }
        assert!(!config.contains_key("bridge"));
        assert!(!config.contains_key("vendor_elements"));
        // Fixed order of the leading entries.
        let keys: Vec<&str> = config.iter().map(|(k, _)| k).take(6).collect();
        assert_eq!(keys, ["interface", "driver", "ctrl_interface", "ssid2", "channel", "op_class"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let iface_params = iface("wlan0");
        let channel_params = channel(BandMask::BAND_5_GHZ, 36);
        let nw_params = network(EncryptionType::Wpa3Sae, "pw");
        assert_eq!(
            build(&iface_params, &channel_params, &nw_params).unwrap().to_string(),
            build(&iface_params, &channel_params, &nw_params).unwrap().to_string()
        );
    }

    #[test]
    fn test_ssid_too_long() {
        let mut nw_params = network(EncryptionType::None, "");
        nw_params.ssid = vec![b'a'; 33];
        assert_eq!(
            build(&iface("wlan0"), &channel(BandMask::BAND_2_GHZ, 1), &nw_params),
            Err(ConfigError::SsidTooLong(33))
        );
        nw_params.ssid = vec![0xff; 32];
        assert!(build(&iface("wlan0"), &channel(BandMask::BAND_2_GHZ, 1), &nw_params).is_ok());
    }

    #[test]
    fn test_passphrase_lengths() {
        let iface_params = iface("wlan0");
        let channel_params = channel(BandMask::BAND_2_GHZ, 1);
        let len = |encryption, n: usize| {
            build(&iface_params, &channel_params, &network(encryption, &"x".repeat(n))).is_ok()
        };
        assert!(!len(EncryptionType::Wpa2, 7));
        assert!(len(EncryptionType::Wpa2, 8));
        assert!(len(EncryptionType::Wpa2, 63));
        assert!(!len(EncryptionType::Wpa2, 64));
        assert!(!len(EncryptionType::Wpa, 7));
        assert!(!len(EncryptionType::Wpa3SaeTransition, 64));
        assert!(!len(EncryptionType::Wpa3Sae, 0));
        assert!(len(EncryptionType::Wpa3Sae, 1));
        assert!(len(EncryptionType::Wpa3Sae, 200));
        assert!(len(EncryptionType::Wpa3Owe, 0));
        assert!(len(EncryptionType::Wpa3OweTransition, 500));
    }

    #[test]
    fn test_owe_has_no_passphrase() {
        let config = build(
            &iface("wlan0"),
            &channel(BandMask::BAND_5_GHZ, 149),
            &network(EncryptionType::Wpa3Owe, "ignored-passphrase"),
        )
        .unwrap();
        assert_eq!(config.get("wpa_key_mgmt"), Some("OWE"));
        assert_eq!(config.get("ieee80211w"), Some("2"));
        assert!(!config.contains_key("wpa_passphrase"));
        assert!(!config.contains_key("sae_password"));
    }

    #[test]
    fn test_sae_transition_outside_6ghz() {
        let config = build(
            &iface("wlan0"),
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::Wpa3SaeTransition, PASSPHRASE),
        )
        .unwrap();
        assert_eq!(config.get("wpa_key_mgmt"), Some("WPA-PSK SAE"));
        assert_eq!(config.get("ieee80211w"), Some("1"));
        assert_eq!(config.get("sae_require_mfp"), Some("1"));
        assert_eq!(config.get("wpa_passphrase"), Some(PASSPHRASE));
        assert_eq!(config.get("sae_password"), Some(PASSPHRASE));
        assert!(!config.contains_key("sae_pwe"));
    }

    #[test]
    fn test_sae_transition_upgraded_in_6ghz() {
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_80211be = true;
        let config = build_with(
            &FakeSystem::default(),
            versions(1, 1),
            &iface_params,
            &channel(BandMask::BAND_6_GHZ, 5),
            &network(EncryptionType::Wpa3SaeTransition, PASSPHRASE),
            "",
        )
        .unwrap();
        assert_eq!(config.get("wpa_key_mgmt"), Some("SAE SAE-EXT-KEY"));
        assert_eq!(config.get("ieee80211w"), Some("2"));
        assert_eq!(config.get("sae_pwe"), Some("1"));
        assert!(!config.contains_key("wpa_passphrase"));

        // Any 6GHz bit upgrades, sae_pwe follows "6GHz only".
        let config = build(
            &iface("wlan0"),
            &channel(BandMask::BAND_5_GHZ | BandMask::BAND_6_GHZ, 36),
            &network(EncryptionType::Wpa3SaeTransition, PASSPHRASE),
        )
        .unwrap();
        assert_eq!(config.get("wpa_key_mgmt"), Some("SAE"));
        assert_eq!(config.get("sae_pwe"), Some("2"));
    }

    #[test]
    fn test_60ghz_uses_gcmp_and_edmg() {
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_edmg = true;
        iface_params.hw_mode_params.enable_80211ax = true;
        let config = build(
            &iface_params,
            &channel(BandMask::BAND_60_GHZ, 9),
            &network(EncryptionType::Wpa3Sae, PASSPHRASE),
        )
        .unwrap();
        assert_eq!(config.get("rsn_pairwise"), Some("GCMP"));
        assert_eq!(config.get("hw_mode"), Some("ad"));
        assert_eq!(config.get("op_class"), Some("181"));
        assert_eq!(config.get("ieee80211ax"), Some("0"));
        assert_eq!(config.get("enable_edmg"), Some("1"));
        assert_eq!(config.get("edmg_channel"), Some("9"));

        let wpa = build(
            &iface("wlan0"),
            &channel(BandMask::BAND_60_GHZ, 9),
            &network(EncryptionType::Wpa, PASSPHRASE),
        )
        .unwrap();
        assert_eq!(wpa.get("wpa_pairwise"), Some("GCMP"));
    }

    #[test]
    fn test_hw_mode_per_band() {
        let hw_mode = |mask| {
            build(&iface("wlan0"), &channel(mask, 1), &network(EncryptionType::None, ""))
                .map(|c| c.get("hw_mode").map(str::to_owned))
        };
        assert_eq!(hw_mode(BandMask::BAND_2_GHZ), Ok(Some("g".into())));
        assert_eq!(hw_mode(BandMask::BAND_2_GHZ | BandMask::BAND_5_GHZ), Ok(Some("any".into())));
        assert_eq!(hw_mode(BandMask::BAND_2_GHZ | BandMask::BAND_6_GHZ), Ok(Some("any".into())));
        assert_eq!(hw_mode(BandMask::BAND_5_GHZ), Ok(Some("a".into())));
        assert_eq!(hw_mode(BandMask::BAND_6_GHZ), Ok(Some("a".into())));
        assert_eq!(hw_mode(BandMask::default()), Err(ConfigError::InvalidBand(0)));
    }

    #[test]
    fn test_acs_freqlist() {
        let channel_params = ChannelParams {
            band_mask: BandMask::BAND_2_GHZ,
            enable_acs: true,
            acs_should_exclude_dfs: true,
            acs_channel_freq_ranges_mhz: vec![
                FrequencyRange { start_mhz: 2412, end_mhz: 2462 },
                FrequencyRange { start_mhz: 2472, end_mhz: 2472 },
            ],
            ..Default::default()
        };
        let config =
            build(&iface("wlan0"), &channel_params, &network(EncryptionType::None, "")).unwrap();
        assert_eq!(config.get("channel"), Some("0"));
        assert_eq!(config.get("acs_exclude_dfs"), Some("1"));
        assert_eq!(config.get("freqlist"), Some("2412-2462,2472"));
        assert!(!config.contains_key("op_class"));
    }

    #[test]
    fn test_invalid_op_class_is_kept() {
        let config = build(
            &iface("wlan0"),
            &channel(BandMask::BAND_2_GHZ, 15),
            &network(EncryptionType::None, ""),
        )
        .unwrap();
        assert_eq!(config.get("op_class"), Some("0"));
    }

    #[test]
    fn test_he_block() {
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_80211ax = true;
        iface_params.hw_mode_params.enable_he_single_user_beamformee = true;
        iface_params.hw_mode_params.enable_he_target_wake_time = true;
        let config = build(
            &iface_params,
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::None, ""),
        )
        .unwrap();
        assert_eq!(config.get("ieee80211ax"), Some("1"));
        assert_eq!(config.get("he_su_beamformer"), Some("0"));
        assert_eq!(config.get("he_su_beamformee"), Some("1"));
        assert_eq!(config.get("he_mu_beamformer"), Some("0"));
        assert_eq!(config.get("he_twt_required"), Some("1"));
    }

    #[test]
    fn test_eht_sets_bssid_from_interface_mac() {
        let mut system = FakeSystem::default();
        system.macs.insert("wlan0".into(), MacAddress([0x02, 0, 0, 0, 0, 0x42]));
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_80211be = true;
        let config = build_with(
            &system,
            versions(2, 2),
            &iface_params,
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::Wpa3Sae, PASSPHRASE),
            "",
        )
        .unwrap();
        assert_eq!(config.get("ieee80211be"), Some("1"));
        assert_eq!(config.get("bssid"), Some("02:00:00:00:00:42"));
        assert_eq!(config.get("mld_ap"), Some("1"));
        assert_eq!(config.get("wpa_key_mgmt"), Some("SAE SAE-EXT-KEY"));
    }

    #[test]
    fn test_eht_mlo_uses_mld_mac() {
        let mut system = FakeSystem::default();
        system.macs.insert("wlan1".into(), MacAddress([0x02, 0, 0, 0, 0, 0x01]));
        let mut iface_params = iface("0");
        iface_params.uses_mlo = true;
        iface_params.hw_mode_params.enable_80211be = true;
        let config = build_with(
            &system,
            versions(3, 3),
            &iface_params,
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::Wpa3Sae, PASSPHRASE),
            "wlan1",
        )
        .unwrap();
        assert_eq!(config.get("interface"), Some("wlan1"));
        assert_eq!(config.get("ctrl_interface"), Some("/data/vendor/wifi/hostapd/ctrl_0"));
        assert_eq!(config.get("mld_addr"), Some("02:00:00:00:00:01"));
        assert!(!config.contains_key("bssid"));
        assert!(!config.contains_key("bridge"));
    }

    #[test]
    fn test_eht_mac_lookup_failure() {
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_80211be = true;
        let result = build_with(
            &FakeSystem::default(),
            versions(3, 3),
            &iface_params,
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::Wpa3Sae, PASSPHRASE),
            "",
        );
        assert!(matches!(result, Err(ConfigError::MacAddress { .. })));

        // Older clients never ask for the MAC.
        let config = build_with(
            &FakeSystem::default(),
            versions(3, 1),
            &iface_params,
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::Wpa3Sae, PASSPHRASE),
            "",
        )
        .unwrap();
        assert_eq!(config.get("ieee80211be"), Some("1"));
        assert!(!config.contains_key("mld_ap"));
    }

    #[test]
    fn test_bandwidth_fixed_widths() {
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_80211ac = true;
        iface_params.hw_mode_params.enable_80211ax = true;
        iface_params.hw_mode_params.maximum_channel_bandwidth = ChannelBandwidth::Bandwidth160;
        let config = build(
            &iface_params,
            &channel(BandMask::BAND_6_GHZ, 15),
            &network(EncryptionType::Wpa3Sae, PASSPHRASE),
        )
        .unwrap();
        assert_eq!(config.get("ht_capab"), Some("[HT40+]"));
        assert_eq!(config.get("eht_oper_chwidth"), Some("0"));
        assert_eq!(config.get("he_oper_chwidth"), Some("2"));
        assert_eq!(config.get("vht_oper_chwidth"), Some("2"));
        assert_eq!(config.get("op_class"), Some("134"));

        iface_params.hw_mode_params.maximum_channel_bandwidth = ChannelBandwidth::Bandwidth20;
        let config = build(
            &iface_params,
            &channel(BandMask::BAND_5_GHZ, 36),
            &network(EncryptionType::None, ""),
        )
        .unwrap();
        assert!(!config.contains_key("ht_capab"));
        assert_eq!(config.get("vht_oper_chwidth"), Some("0"));
        assert_eq!(config.get("op_class"), Some("116"));
    }

    #[test]
    fn test_bandwidth_auto() {
        let mut iface_params = iface("wlan0");
        iface_params.hw_mode_params.enable_80211ac = true;
        iface_params.hw_mode_params.enable_80211ax = true;
        iface_params.hw_mode_params.maximum_channel_bandwidth = ChannelBandwidth::Auto;
        let config = build(
            &iface_params,
            &channel(BandMask::BAND_5_GHZ | BandMask::BAND_6_GHZ, 36),
            &network(EncryptionType::None, ""),
        )
        .unwrap();
        assert_eq!(config.get("ht_capab"), Some("[HT40+]"));
        assert_eq!(config.get("vht_oper_chwidth"), Some("1"));
        assert_eq!(config.get("he_oper_chwidth"), Some("1"));
        assert_eq!(config.get("op_class"), Some("134"));
        assert!(!config.contains_key("eht_oper_chwidth"));

        // Nothing for 2.4GHz only.
        let config = build(
            &iface_params,
            &channel(BandMask::BAND_2_GHZ, 6),
            &network(EncryptionType::None, ""),
        )
        .unwrap();
        assert!(!config.contains_key("ht_capab"));
        assert!(!config.contains_key("vht_oper_chwidth"));
    }

    #[test]
    fn test_overlay_filtering() {
        let mut system = FakeSystem::default();
        system.overlay =
            Some("dtim_period=2\ninvalid_key=x\n ap_max_inactivity = 300\nbeacon_int=50\n".into());
        let mut nw_params = network(EncryptionType::None, "");
        nw_params.is_metered = false;
        let config = build_with(
            &system,
            versions(3, 3),
            &iface("wlan0"),
            &channel(BandMask::BAND_2_GHZ, 6),
            &nw_params,
            "",
        )
        .unwrap();
        let text = config.to_string();
        assert!(text.starts_with("dtim_period=2\nap_max_inactivity=300\ninterface=wlan0\n"));
        assert!(!text.contains("invalid_key"));
        assert!(!text.contains("beacon_int"));
        assert_eq!(config.get("interworking"), Some("0"));
        assert!(!config.contains_key("access_network_type"));
    }

    #[test]
    fn test_overlay_ignored_when_metered() {
        let mut system = FakeSystem::default();
        system.overlay = Some("dtim_period=2\n".into());
        let config = build_with(
            &system,
            versions(3, 3),
            &iface("wlan0"),
            &channel(BandMask::BAND_2_GHZ, 6),
            &network(EncryptionType::None, ""),
            "",
        )
        .unwrap();
        assert!(!config.contains_key("dtim_period"));
    }

    #[test]
    fn test_overlay_read_failure() {
        let system = FakeSystem { overlay_error: true, ..Default::default() };
        let mut nw_params = network(EncryptionType::None, "");
        nw_params.is_metered = false;
        let result = build_with(
            &system,
            versions(3, 3),
            &iface("wlan0"),
            &channel(BandMask::BAND_2_GHZ, 6),
            &nw_params,
            "",
        );
        assert!(matches!(result, Err(ConfigError::OverlayRead { .. })));
    }

    #[test]
    fn test_bridge_vendor_elements_and_isolation() {
        let mut nw_params = network(EncryptionType::None, "");
        nw_params.vendor_elements = vec![0xdd, 0x04, 0x00, 0x50, 0xf2, 0x01];
        nw_params.is_client_isolation_enabled = true;
        nw_params.is_hidden = true;
        let config = build_with(
            &FakeSystem::default(),
            versions(3, 3),
            &iface("wlan0"),
            &channel(BandMask::BAND_2_GHZ, 6),
            &nw_params,
            "ap_br_wlan0",
        )
        .unwrap();
        assert_eq!(config.get("bridge"), Some("ap_br_wlan0"));
        assert_eq!(config.get("interface"), Some("wlan0"));
        assert_eq!(config.get("vendor_elements"), Some("dd040050f201"));
        assert_eq!(config.get("ap_isolate"), Some("1"));
        assert_eq!(config.get("ignore_broadcast_ssid"), Some("1"));

        // Isolation needs service version 3.
        let config = build_with(
            &FakeSystem::default(),
            versions(2, 3),
            &iface("wlan0"),
            &channel(BandMask::BAND_2_GHZ, 6),
            &nw_params,
            "",
        )
        .unwrap();
        assert_eq!(config.get("ap_isolate"), Some("0"));
    }

    #[test]
    fn test_owe_transition_ifname() {
        let options = HostapdOptions::default();
        let system = FakeSystem::default();
        let config = ConfigBuilder::new(&system, &options, versions(3, 3))
            .build(
                &iface("wlan0"),
                &channel(BandMask::BAND_2_GHZ, 6),
                &network(EncryptionType::None, ""),
                "ap_br_wlan0",
                "wlan1",
            )
            .unwrap();
        assert_eq!(config.get("owe_transition_ifname"), Some("wlan1"));
    }

    #[test]
    fn test_config_file_path() {
        let dir = Path::new("/data/vendor/wifi/hostapd");
        assert_eq!(
            config_file_path(dir, "wlan0", "", false),
            PathBuf::from("/data/vendor/wifi/hostapd/hostapd_wlan0.conf")
        );
        assert_eq!(
            config_file_path(dir, "wlan1", "ap_br_wlan0", false),
            PathBuf::from("/data/vendor/wifi/hostapd/hostapd_wlan1.conf")
        );
        assert_eq!(
            config_file_path(dir, "1", "wlan2", true),
            PathBuf::from("/data/vendor/wifi/hostapd/hostapd_wlan2-1.conf")
        );
    }
}
