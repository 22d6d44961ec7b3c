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

//! # Access point engine interface
//!
//! The engine owns the running BSS instances: it parses the generated
//! config files, drives the radio and reports lifecycle and station events.
//! Instances are referred to by [`InstanceHandle`], never by reference, so
//! the service can hold on to them across engine calls.

use crate::error::EngineError;
use crate::params::{DebugLevel, Ieee80211ReasonCode, MacAddress};
use std::fmt;
use std::path::Path;

/// Engine assigned identifier of one running BSS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(pub u32);

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of an engine interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IfaceState {
    Uninitialized,
    Disabled,
    CountryUpdate,
    Acs,
    HtScan,
    Dfs,
    NoIr,
    Enabled,
}

impl fmt::Display for IfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IfaceState::Uninitialized => "UNINITIALIZED",
            IfaceState::Disabled => "DISABLED",
            IfaceState::CountryUpdate => "COUNTRY_UPDATE",
            IfaceState::Acs => "ACS",
            IfaceState::HtScan => "HT_SCAN",
            IfaceState::Dfs => "DFS",
            IfaceState::NoIr => "NO_IR",
            IfaceState::Enabled => "ENABLED",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwMode {
    Ieee80211B,
    Ieee80211G,
    Ieee80211A,
    Ieee80211Ad,
    Any,
}

/// Capabilities of the hardware mode an interface currently runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HwModeInfo {
    pub mode: HwMode,
    pub ht_capab: u16,
    pub vht_capab: u32,
    pub he_supported: bool,
}

/// Operating channel width of an interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperChannelWidth {
    /// 20 or 40 MHz, decided by the HT settings.
    #[default]
    UseHt,
    Mhz80,
    Mhz160,
    Mhz80P80,
    Mhz2160,
    Mhz4320,
    Mhz6480,
    Mhz8640,
    Mhz320,
}

/// Snapshot of the engine side state of an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceState {
    /// `interface=` of the instance config, the MLD name for MLO links.
    pub iface: String,
    /// `bridge=` of the instance config, empty when not bridged.
    pub bridge: String,
    pub mld_ap: bool,
    pub mld_link_id: u8,
    pub iface_state: IfaceState,
    pub freq_mhz: i32,
    pub current_mode: Option<HwModeInfo>,
    pub oper_chwidth: OperChannelWidth,
    pub ieee80211n: bool,
    pub secondary_channel: i8,
    pub own_addr: MacAddress,
    pub mld_addr: Option<MacAddress>,
}

/// A station associated to an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StationInfo {
    pub addr: MacAddress,
    /// Reason of the last deauthentication of this station.
    pub deauth_reason: Ieee80211ReasonCode,
}

/// Events the engine delivers for an instance, see
/// [`crate::hostapd::Hostapd::handle_engine_event`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// The setup state machine of the instance finished, successfully or not.
    SetupComplete,
    StaAuthorized { addr: MacAddress, authorized: bool },
    /// A control interface message such as `AP-ENABLED `.
    WpaMsg { text: String },
}

/// The access point engine.
pub trait HostapdEngine: Send {
    /// Adds an interface running the config at `config_path`.
    fn add_iface(&mut self, iface: &str, config_path: &Path) -> Result<(), EngineError>;

    fn remove_iface(&mut self, handle: InstanceHandle) -> Result<(), EngineError>;

    fn enable_iface(&mut self, handle: InstanceHandle) -> Result<(), EngineError>;

    /// The instance whose `interface=` is `iface`.
    fn get_iface(&self, iface: &str) -> Option<InstanceHandle>;

    /// The MLO link with id `link_id`. Instances that are not MLD links
    /// never match.
    fn get_iface_by_link_id(&self, link_id: u8) -> Option<InstanceHandle>;

    /// Every BSS of every interface, in engine order.
    fn instances(&self) -> Vec<InstanceHandle>;

    fn instance_state(&self, handle: InstanceHandle) -> Option<InstanceState>;

    /// Live stations of an instance, `None` when it has no station list.
    fn stations(&self, handle: InstanceHandle) -> Option<Vec<StationInfo>>;

    fn disconnect_station(
        &mut self,
        handle: InstanceHandle,
        addr: &MacAddress,
        reason: Ieee80211ReasonCode,
    ) -> Result<(), EngineError>;

    /// Removes one link from its MLD.
    fn remove_link(&mut self, handle: InstanceHandle) -> Result<(), EngineError>;

    fn set_debug_level(&mut self, level: DebugLevel);

    /// Stops the event loop.
    fn terminate(&mut self);
}
