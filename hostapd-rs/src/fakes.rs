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

//! In-memory collaborators for unit tests.

use crate::engine::{
    HostapdEngine, IfaceState, InstanceHandle, InstanceState, OperChannelWidth, StationInfo,
};
use crate::error::{CallbackError, EngineError};
use crate::event_router::HostapdCallback;
use crate::params::{ApInfo, ClientInfo, DebugLevel, Ieee80211ReasonCode, MacAddress};
use crate::system::SystemOps;
use anyhow::anyhow;
use hostapd_common::util::kv_file::KvFile;
use log::info;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct FakeSystem {
    pub overlay: Option<String>,
    pub overlay_error: bool,
    pub macs: HashMap<String, MacAddress>,
    pub bridges: HashMap<String, Vec<String>>,
    pub fail_writes: bool,
    pub written: Mutex<Vec<(PathBuf, String)>>,
}

impl FakeSystem {
    /// Contents last written to `path`.
    pub fn written_config(&self, path: &Path) -> Option<String> {
        let written = self.written.lock().unwrap();
        written.iter().rev().find(|(p, _)| p == path).map(|(_, contents)| contents.clone())
    }

    pub fn written_paths(&self) -> Vec<PathBuf> {
        self.written.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }
}

impl SystemOps for FakeSystem {
    fn read_overlay(&self, _path: &Path) -> anyhow::Result<Option<String>> {
        if self.overlay_error {
            return Err(anyhow!("Is a directory"));
        }
        Ok(self.overlay.clone())
    }

    fn interface_mac_address(&self, if_name: &str) -> anyhow::Result<MacAddress> {
        self.macs.get(if_name).copied().ok_or_else(|| anyhow!("No such device: {if_name}"))
    }

    fn bridge_members(&self, br_name: &str) -> anyhow::Result<Vec<String>> {
        self.bridges.get(br_name).cloned().ok_or_else(|| anyhow!("No such bridge: {br_name}"))
    }

    fn write_config(&self, path: &Path, contents: &str) -> anyhow::Result<()> {
        if self.fail_writes {
            return Err(anyhow!("Permission denied"));
        }
        self.written.lock().unwrap().push((path.to_path_buf(), contents.to_owned()));
        Ok(())
    }
}

/// An enabled, non bridged instance on `iface`.
pub fn instance_state(iface: &str) -> InstanceState {
    InstanceState {
        iface: iface.into(),
        bridge: String::new(),
        mld_ap: false,
        mld_link_id: 0,
        iface_state: IfaceState::Enabled,
        freq_mhz: 2437,
        current_mode: None,
        oper_chwidth: OperChannelWidth::UseHt,
        ieee80211n: true,
        secondary_channel: 0,
        own_addr: MacAddress::default(),
        mld_addr: None,
    }
}

struct FakeInstance {
    state: InstanceState,
    stations: Option<Vec<StationInfo>>,
    config_path: PathBuf,
    enabled: bool,
}

#[derive(Default)]
struct EngineState {
    next_handle: u32,
    instances: BTreeMap<InstanceHandle, FakeInstance>,
    fail_add: HashSet<String>,
    fail_enable: HashSet<String>,
    fail_remove: HashSet<String>,
    fail_remove_link: bool,
    calls: Vec<String>,
    debug_level: Option<DebugLevel>,
    terminated: bool,
}

/// Engine keeping its instances in memory. Clones share state, so a test
/// can keep one while the service owns another.
///
/// When built [`FakeEngine::with_system`], added instances take `bridge=`
/// and `mld_ap=` from the config the service wrote.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<EngineState>>,
    system: Option<Arc<FakeSystem>>,
}

impl FakeEngine {
    pub fn with_system(system: Arc<FakeSystem>) -> Self {
        FakeEngine { system: Some(system), ..Default::default() }
    }

    pub fn insert_instance(&self, state: InstanceState) -> InstanceHandle {
        self.insert(state, PathBuf::new())
    }

    fn insert(&self, state: InstanceState, config_path: PathBuf) -> InstanceHandle {
        let mut engine = self.state.lock().unwrap();
        let handle = InstanceHandle(engine.next_handle);
        engine.next_handle += 1;
        engine.instances.insert(
            handle,
            FakeInstance { state, stations: Some(Vec::new()), config_path, enabled: false },
        );
        handle
    }

    pub fn set_stations(&self, handle: InstanceHandle, stations: Option<Vec<StationInfo>>) {
        if let Some(instance) = self.state.lock().unwrap().instances.get_mut(&handle) {
            instance.stations = stations;
        }
    }

    pub fn set_iface_state(&self, handle: InstanceHandle, iface_state: IfaceState) {
        if let Some(instance) = self.state.lock().unwrap().instances.get_mut(&handle) {
            instance.state.iface_state = iface_state;
        }
    }

    /// Makes `add_iface` fail for `iface`.
    pub fn fail_add(&self, iface: &str) {
        self.state.lock().unwrap().fail_add.insert(iface.into());
    }

    pub fn fail_enable(&self, iface: &str) {
        self.state.lock().unwrap().fail_enable.insert(iface.into());
    }

    pub fn fail_remove(&self, iface: &str) {
        self.state.lock().unwrap().fail_remove.insert(iface.into());
    }

    pub fn fail_remove_link(&self) {
        self.state.lock().unwrap().fail_remove_link = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn is_enabled(&self, handle: InstanceHandle) -> bool {
        self.state.lock().unwrap().instances.get(&handle).is_some_and(|i| i.enabled)
    }

    pub fn config_path(&self, handle: InstanceHandle) -> Option<PathBuf> {
        self.state.lock().unwrap().instances.get(&handle).map(|i| i.config_path.clone())
    }

    pub fn debug_level(&self) -> Option<DebugLevel> {
        self.state.lock().unwrap().debug_level
    }

    pub fn is_terminated(&self) -> bool {
        self.state.lock().unwrap().terminated
    }

    fn record(&self, call: String) {
        info!("fake engine: {call}");
        self.state.lock().unwrap().calls.push(call);
    }

    fn iface_of(&self, handle: InstanceHandle) -> Result<String, EngineError> {
        let engine = self.state.lock().unwrap();
        engine
            .instances
            .get(&handle)
            .map(|i| i.state.iface.clone())
            .ok_or_else(|| EngineError::UnknownInstance(handle.to_string()))
    }

    /// Instance state for a config written by the service.
    fn state_from_config(&self, iface: &str, config_path: &Path) -> InstanceState {
        let mut state = instance_state(iface);
        state.iface_state = IfaceState::Uninitialized;
        let contents = self.system.as_ref().and_then(|s| s.written_config(config_path));
        if let Some(contents) = contents {
            let mut kv = KvFile::new(config_path.to_path_buf());
            kv.parse(&contents);
            state.bridge = kv.get("bridge").unwrap_or_default().to_owned();
            state.mld_ap = kv.get("mld_ap") == Some("1");
        }
        state
    }
}

impl HostapdEngine for FakeEngine {
    fn add_iface(&mut self, iface: &str, config_path: &Path) -> Result<(), EngineError> {
        self.record(format!("add_iface {iface} {}", config_path.display()));
        if self.state.lock().unwrap().fail_add.contains(iface) {
            return Err(EngineError::AddIface(iface.into()));
        }
        let mut state = self.state_from_config(iface, config_path);
        if state.mld_ap {
            let engine = self.state.lock().unwrap();
            let links = engine
                .instances
                .values()
                .filter(|i| i.state.mld_ap && i.state.iface == iface)
                .count();
            state.mld_link_id = links as u8;
        }
        self.insert(state, config_path.to_path_buf());
        Ok(())
    }

    fn remove_iface(&mut self, handle: InstanceHandle) -> Result<(), EngineError> {
        self.record(format!("remove_iface {handle}"));
        let iface = self.iface_of(handle)?;
        let mut engine = self.state.lock().unwrap();
        if engine.fail_remove.contains(&iface) {
            return Err(EngineError::RemoveIface(iface));
        }
        engine.instances.remove(&handle);
        Ok(())
    }

    fn enable_iface(&mut self, handle: InstanceHandle) -> Result<(), EngineError> {
        self.record(format!("enable_iface {handle}"));
        let iface = self.iface_of(handle)?;
        let mut engine = self.state.lock().unwrap();
        if engine.fail_enable.contains(&iface) {
            return Err(EngineError::EnableIface(iface));
        }
        if let Some(instance) = engine.instances.get_mut(&handle) {
            instance.enabled = true;
            instance.state.iface_state = IfaceState::Enabled;
        }
        Ok(())
    }

    fn get_iface(&self, iface: &str) -> Option<InstanceHandle> {
        let engine = self.state.lock().unwrap();
        engine.instances.iter().find(|(_, i)| i.state.iface == iface).map(|(h, _)| *h)
    }

    fn get_iface_by_link_id(&self, link_id: u8) -> Option<InstanceHandle> {
        let engine = self.state.lock().unwrap();
        engine
            .instances
            .iter()
            .find(|(_, i)| i.state.mld_ap && i.state.mld_link_id == link_id)
            .map(|(h, _)| *h)
    }

    fn instances(&self) -> Vec<InstanceHandle> {
        self.state.lock().unwrap().instances.keys().copied().collect()
    }

    fn instance_state(&self, handle: InstanceHandle) -> Option<InstanceState> {
        self.state.lock().unwrap().instances.get(&handle).map(|i| i.state.clone())
    }

    fn stations(&self, handle: InstanceHandle) -> Option<Vec<StationInfo>> {
        self.state.lock().unwrap().instances.get(&handle).and_then(|i| i.stations.clone())
    }

    fn disconnect_station(
        &mut self,
        handle: InstanceHandle,
        addr: &MacAddress,
        reason: Ieee80211ReasonCode,
    ) -> Result<(), EngineError> {
        self.record(format!("disconnect {handle} {addr} {reason}"));
        let mut engine = self.state.lock().unwrap();
        let instance = engine
            .instances
            .get_mut(&handle)
            .ok_or_else(|| EngineError::UnknownInstance(handle.to_string()))?;
        if let Some(stations) = instance.stations.as_mut() {
            stations.retain(|sta| sta.addr != *addr);
        }
        Ok(())
    }

    fn remove_link(&mut self, handle: InstanceHandle) -> Result<(), EngineError> {
        self.record(format!("remove_link {handle}"));
        let mut engine = self.state.lock().unwrap();
        let link_id = engine.instances.get(&handle).map_or(0, |i| i.state.mld_link_id);
        if engine.fail_remove_link {
            return Err(EngineError::RemoveLink(link_id));
        }
        engine.instances.remove(&handle);
        Ok(())
    }

    fn set_debug_level(&mut self, level: DebugLevel) {
        self.state.lock().unwrap().debug_level = Some(level);
    }

    fn terminate(&mut self) {
        self.record("terminate".into());
        self.state.lock().unwrap().terminated = true;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackEvent {
    ApInfo(ApInfo),
    Client(ClientInfo),
    /// (iface name, instance name)
    Failure(String, String),
}

/// Listener that records every callback. `fail` makes deliveries fail
/// after recording, `fail_link` makes death registration fail.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    pub fail: bool,
    pub fail_link: bool,
    pub version: i32,
    pub events: Mutex<Vec<CallbackEvent>>,
}

impl RecordingCallback {
    pub fn with_version(version: i32) -> Self {
        RecordingCallback { version, ..Default::default() }
    }

    pub fn events(&self) -> Vec<CallbackEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, name: &str, event: CallbackEvent) -> Result<(), CallbackError> {
        self.events.lock().unwrap().push(event);
        if self.fail {
            return Err(CallbackError(name.into()));
        }
        Ok(())
    }
}

impl HostapdCallback for RecordingCallback {
    fn on_ap_instance_info_changed(&self, info: &ApInfo) -> Result<(), CallbackError> {
        self.push("onApInstanceInfoChanged", CallbackEvent::ApInfo(info.clone()))
    }

    fn on_connected_clients_changed(&self, info: &ClientInfo) -> Result<(), CallbackError> {
        self.push("onConnectedClientsChanged", CallbackEvent::Client(info.clone()))
    }

    fn on_failure(&self, iface_name: &str, instance_name: &str) -> Result<(), CallbackError> {
        self.push("onFailure", CallbackEvent::Failure(iface_name.into(), instance_name.into()))
    }

    fn interface_version(&self) -> i32 {
        self.version
    }

    fn link_to_death(&self) -> Result<(), CallbackError> {
        if self.fail_link {
            return Err(CallbackError("linkToDeath".into()));
        }
        Ok(())
    }
}
