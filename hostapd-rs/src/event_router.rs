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

//! # Event routing
//!
//! Every started instance has an entry in a callback table keyed by its
//! [`InstanceHandle`]. Engine events are looked up in the table, translated
//! with the instance's current state and fanned out to every registered
//! [`HostapdCallback`].

use crate::engine::{
    EngineEvent, HostapdEngine, HwMode, HwModeInfo, IfaceState, InstanceHandle, InstanceState,
    OperChannelWidth, StationInfo,
};
use crate::error::CallbackError;
use crate::options::ServiceVersions;
use crate::params::{
    ApInfo, ChannelBandwidth, ClientInfo, Generation, MacAddress, WLAN_REASON_UNSPECIFIED,
};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

pub const AP_EVENT_ENABLED: &str = "AP-ENABLED ";
pub const WPA_EVENT_CHANNEL_SWITCH: &str = "CTRL-EVENT-CHANNEL-SWITCH ";
pub const AP_EVENT_DISABLED: &str = "AP-DISABLED ";
pub const INTERFACE_DISABLED: &str = "INTERFACE-DISABLED ";

/// A registered listener of access point events.
pub trait HostapdCallback: Send + Sync {
    fn on_ap_instance_info_changed(&self, info: &ApInfo) -> Result<(), CallbackError>;

    fn on_connected_clients_changed(&self, info: &ClientInfo) -> Result<(), CallbackError>;

    fn on_failure(&self, iface_name: &str, instance_name: &str) -> Result<(), CallbackError>;

    /// Interface version the listener implements.
    fn interface_version(&self) -> i32;

    /// Arms the death notification of the listener.
    fn link_to_death(&self) -> Result<(), CallbackError> {
        Ok(())
    }
}

#[derive(Debug)]
struct CallbackEntry {
    /// Setup completion is only reported once for bridged instances.
    one_shot_setup: bool,
    setup_armed: bool,
}

/// Callback table plus the registered listeners.
#[derive(Default)]
pub struct EventRouter {
    listeners: Vec<Arc<dyn HostapdCallback>>,
    entries: HashMap<InstanceHandle, CallbackEntry>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn HostapdCallback>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Routes events of `handle`. A `one_shot_setup` entry reports setup
    /// completion only the first time.
    pub fn bind(&mut self, handle: InstanceHandle, one_shot_setup: bool) {
        self.entries.insert(handle, CallbackEntry { one_shot_setup, setup_armed: true });
    }

    pub fn unbind(&mut self, handle: InstanceHandle) {
        self.entries.remove(&handle);
    }

    pub fn is_bound(&self, handle: InstanceHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Translates one engine event of `handle` into listener callbacks.
    pub fn dispatch(
        &mut self,
        engine: &dyn HostapdEngine,
        versions: ServiceVersions,
        handle: InstanceHandle,
        event: &EngineEvent,
    ) {
        let Some(entry) = self.entries.get_mut(&handle) else {
            debug!("Dropping {event:?} for unbound instance {handle}");
            return;
        };
        let setup_fires = entry.setup_armed;
        if matches!(event, EngineEvent::SetupComplete) && entry.one_shot_setup {
            entry.setup_armed = false;
        }
        let Some(state) = engine.instance_state(handle) else {
            warn!("No engine state for instance {handle}");
            return;
        };
        match event {
            EngineEvent::SetupComplete if setup_fires => self.on_setup_complete(&state),
            EngineEvent::SetupComplete => debug!("Setup of {handle} already reported"),
            EngineEvent::StaAuthorized { addr, authorized } => {
                let stations = engine.stations(handle);
                self.on_sta_authorized(&state, stations.as_deref(), versions, addr, *authorized)
            }
            EngineEvent::WpaMsg { text } => self.on_wpa_msg(&state, text),
        }
    }

    fn on_setup_complete(&self, state: &InstanceState) {
        info!("AP interface setup completed - state {}", state.iface_state);
        if state.iface_state == IfaceState::Disabled {
            self.notify_failure(state);
        }
    }

    fn on_sta_authorized(
        &self,
        state: &InstanceState,
        stations: Option<&[StationInfo]>,
        versions: ServiceVersions,
        addr: &MacAddress,
        authorized: bool,
    ) {
        debug!("notify client {} {}", addr, if authorized { "Connected" } else { "Disconnected" });
        let disconnect_reason_code = (versions.service_at_least(3) && !authorized).then(|| {
            find_station(stations, addr).map_or(WLAN_REASON_UNSPECIFIED, |sta| sta.deauth_reason)
        });
        let info = ClientInfo {
            iface_name: iface_name(state).to_owned(),
            ap_iface_instance: instance_name(state),
            client_address: *addr,
            is_connected: authorized,
            disconnect_reason_code,
        };
        for listener in &self.listeners {
            if let Err(e) = listener.on_connected_clients_changed(&info) {
                error!("Failed to invoke onConnectedClientsChanged: {e}");
            }
        }
    }

    fn on_wpa_msg(&self, state: &InstanceState, text: &str) {
        debug!("Receive wpa msg : {text}");
        if text.starts_with(AP_EVENT_ENABLED) || text.starts_with(WPA_EVENT_CHANNEL_SWITCH) {
            let info = ApInfo {
                iface_name: iface_name(state).to_owned(),
                ap_iface_instance: instance_name(state),
                freq_mhz: state.freq_mhz,
                channel_bandwidth: channel_bandwidth(state),
                generation: generation(state.current_mode.as_ref()),
                ap_iface_instance_mac_address: state.own_addr,
                mld_mac_address: if state.mld_ap { state.mld_addr } else { None },
            };
            for listener in &self.listeners {
                if let Err(e) = listener.on_ap_instance_info_changed(&info) {
                    error!("Failed to invoke onApInstanceInfoChanged: {e}");
                }
            }
        } else if text.starts_with(AP_EVENT_DISABLED) || text.starts_with(INTERFACE_DISABLED) {
            self.notify_failure(state);
        }
    }

    fn notify_failure(&self, state: &InstanceState) {
        let iface = iface_name(state);
        let instance = instance_name(state);
        for listener in &self.listeners {
            if let Err(e) = listener.on_failure(iface, &instance) {
                error!("Failed to invoke onFailure: {e}");
            }
        }
    }
}

/// The bridge of a bridged instance, otherwise its own interface.
fn iface_name(state: &InstanceState) -> &str {
    if state.bridge.is_empty() {
        &state.iface
    } else {
        &state.bridge
    }
}

/// The link id of an MLD link, otherwise the interface name.
fn instance_name(state: &InstanceState) -> String {
    if state.mld_ap && state.bridge.is_empty() {
        state.mld_link_id.to_string()
    } else {
        state.iface.clone()
    }
}

/// Finds the station with address `addr`. A missing station list has no
/// stations.
pub fn find_station<'a>(
    stations: Option<&'a [StationInfo]>,
    addr: &MacAddress,
) -> Option<&'a StationInfo> {
    stations?.iter().find(|sta| sta.addr == *addr)
}

pub fn generation(mode: Option<&HwModeInfo>) -> Generation {
    let Some(mode) = mode else {
        return Generation::Unknown;
    };
    debug!(
        "getGeneration hwmode={:?}, ht_enabled={}, vht_enabled={}, he_supported={}",
        mode.mode,
        mode.ht_capab != 0,
        mode.vht_capab != 0,
        mode.he_supported
    );
    match mode.mode {
        HwMode::Ieee80211B => Generation::Legacy,
        HwMode::Ieee80211G if mode.ht_capab == 0 => Generation::Legacy,
        HwMode::Ieee80211G => Generation::Wifi11N,
        HwMode::Ieee80211A if mode.he_supported => Generation::Wifi11AX,
        HwMode::Ieee80211A if mode.vht_capab == 0 => Generation::Wifi11N,
        HwMode::Ieee80211A => Generation::Wifi11AC,
        HwMode::Ieee80211Ad => Generation::Wifi11AD,
        HwMode::Any => Generation::Unknown,
    }
}

pub fn channel_bandwidth(state: &InstanceState) -> ChannelBandwidth {
    match state.oper_chwidth {
        OperChannelWidth::Mhz80 => ChannelBandwidth::Bandwidth80,
        OperChannelWidth::Mhz80P80 => ChannelBandwidth::Bandwidth80P80,
        OperChannelWidth::Mhz160 => ChannelBandwidth::Bandwidth160,
        OperChannelWidth::UseHt if !state.ieee80211n => ChannelBandwidth::Bandwidth20NoHt,
        OperChannelWidth::UseHt if state.secondary_channel != 0 => ChannelBandwidth::Bandwidth40,
        OperChannelWidth::UseHt => ChannelBandwidth::Bandwidth20,
        OperChannelWidth::Mhz2160 => ChannelBandwidth::Bandwidth2160,
        OperChannelWidth::Mhz4320 => ChannelBandwidth::Bandwidth4320,
        OperChannelWidth::Mhz6480 => ChannelBandwidth::Bandwidth6480,
        OperChannelWidth::Mhz8640 => ChannelBandwidth::Bandwidth8640,
        OperChannelWidth::Mhz320 => ChannelBandwidth::Invalid,
    }
}
