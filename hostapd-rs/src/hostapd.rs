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

//! # Hostapd service
//!
//! [`Hostapd`] brings access points up and down on top of a
//! [`HostapdEngine`]. A request with one channel spec starts a single
//! instance. A request with two starts a pair of instances sharing either a
//! Linux bridge or an MLD:
//!
//! ```text
//!                  | br_name     | instance #1 | instance #2
//! -----------------+-------------+-------------+------------
//! bridged dual APs | ap_br_wlanX | wlanX       | wlanY
//! MLO AP           | wlanX       | 0           | 1
//! ```
//!
//! Both kinds are recorded under `br_name` so that removing `br_name`
//! removes every instance. Bring-up only issues the start; the engine
//! reports the outcome later through [`Hostapd::handle_engine_event`].

use crate::config::{config_file_path, ConfigBuilder};
use crate::engine::{EngineEvent, HostapdEngine, InstanceHandle};
use crate::error::{HostapdError, HostapdResult, HostapdStatusCode};
use crate::event_router::{find_station, EventRouter, HostapdCallback};
use crate::lifecycle::{BringUp, BringUpState};
use crate::options::{HostapdOptions, RollbackPolicy, ServiceVersions};
use crate::params::{
    ChannelParams, DebugLevel, EncryptionType, IfaceParams, Ieee80211ReasonCode, MacAddress,
    NetworkParams,
};
use crate::system::SystemOps;
use log::{debug, error, info, warn, LevelFilter};
use rand::{distributions::Alphanumeric, Rng};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Length of the random part of an OWE companion SSID.
const OWE_SSID_RANDOM_LEN: usize = 8;

/// One instance of an add access point request.
struct InstanceRequest<'a> {
    iface_params: &'a IfaceParams,
    channel_params: &'a ChannelParams,
    nw_params: &'a NetworkParams,
    /// Bridge or MLD name, empty for a single AP.
    br_name: &'a str,
    owe_transition_ifname: &'a str,
}

pub struct Hostapd {
    options: HostapdOptions,
    system: Arc<dyn SystemOps>,
    engine: Box<dyn HostapdEngine>,
    router: EventRouter,
    /// Bridge or MLD name to the instance names it manages.
    br_interfaces: BTreeMap<String, Vec<String>>,
    versions: ServiceVersions,
    terminated: bool,
}

impl Hostapd {
    pub fn new(
        options: HostapdOptions,
        system: Arc<dyn SystemOps>,
        engine: Box<dyn HostapdEngine>,
    ) -> Self {
        Hostapd {
            options,
            system,
            engine,
            router: EventRouter::new(),
            br_interfaces: BTreeMap::new(),
            versions: ServiceVersions::default(),
            terminated: false,
        }
    }

    pub fn options(&self) -> &HostapdOptions {
        &self.options
    }

    pub fn versions(&self) -> ServiceVersions {
        self.versions
    }

    /// Instances recorded for a bridge or MLD.
    pub fn bridge_members(&self, br_name: &str) -> Option<&[String]> {
        self.br_interfaces.get(br_name).map(Vec::as_slice)
    }

    pub fn listener_count(&self) -> usize {
        self.router.listener_count()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn add_access_point(
        &mut self,
        iface_params: &IfaceParams,
        nw_params: &NetworkParams,
    ) -> HostapdResult<()> {
        match iface_params.channel_params.as_slice() {
            [channel_params] => {
                info!("AddSingleAccessPoint, iface={}", iface_params.name);
                let mut bring_up = BringUp::new(1, false);
                let mut started = Vec::new();
                let request = InstanceRequest {
                    iface_params,
                    channel_params,
                    nw_params,
                    br_name: "",
                    owe_transition_ifname: "",
                };
                self.add_single_access_point(&mut bring_up, &request, &mut started)?;
                bring_up.advance(BringUpState::Enabled)
            }
            [_, _] => {
                info!("AddDualAccessPoint, iface={}", iface_params.name);
                self.add_concurrent_access_points(iface_params, nw_params)
            }
            params => Err(HostapdError::with_msg(
                HostapdStatusCode::FailureArgsInvalid,
                format!("Unsupported number of channel params: {}", params.len()),
            )),
        }
    }

    fn add_concurrent_access_points(
        &mut self,
        iface_params: &IfaceParams,
        nw_params: &NetworkParams,
    ) -> HostapdResult<()> {
        let br_name = iface_params.name.as_str();
        let channel_count = iface_params.channel_params.len();
        let mut bring_up = BringUp::new(channel_count, iface_params.uses_mlo);
        bring_up.advance(BringUpState::ResolvingInstances)?;

        let managed_instances = self.managed_instances(iface_params)?;
        if managed_instances.len() < channel_count {
            return Err(HostapdError::with_msg(
                HostapdStatusCode::FailureUnknown,
                "Available interfaces less than requested bands",
            ));
        }
        if iface_params.uses_mlo {
            if nw_params.encryption_type == EncryptionType::Wpa3OweTransition {
                return Err(HostapdError::with_msg(
                    HostapdStatusCode::FailureUnknown,
                    "Invalid encryptionType (OWE transition) for MLO SAP.",
                ));
            }
            // Every link runs on the MLD interface, so it must not exist yet.
            if self.engine.get_iface(br_name).is_some() {
                error!("Instance interface {br_name} already present");
                return Err(HostapdError::new(HostapdStatusCode::FailureIfaceExists));
            }
        }

        let mut started = Vec::new();
        let result = self.start_instances(
            &mut bring_up,
            iface_params,
            nw_params,
            &managed_instances,
            &mut started,
        );
        if let Err(e) = result {
            bring_up.fail();
            self.roll_back(br_name, &started);
            return Err(e);
        }
        bring_up.advance(BringUpState::Enabled)?;
        self.br_interfaces.insert(br_name.to_owned(), managed_instances);
        Ok(())
    }

    /// Instance names of a concurrent request, in channel spec order.
    fn managed_instances(&self, iface_params: &IfaceParams) -> HostapdResult<Vec<String>> {
        if iface_params.uses_mlo {
            // MLO links use their link id as instance name.
            return Ok(iface_params.instance_identities.clone().unwrap_or_default());
        }
        self.system.bridge_members(&iface_params.name).map_err(|e| {
            error!("Failed to list interfaces of bridge {}: {e}", iface_params.name);
            HostapdError::with_msg(
                HostapdStatusCode::FailureUnknown,
                "Get interfaces in bridge failed.",
            )
        })
    }

    fn start_instances(
        &mut self,
        bring_up: &mut BringUp,
        iface_params: &IfaceParams,
        nw_params: &NetworkParams,
        managed_instances: &[String],
        started: &mut Vec<InstanceHandle>,
    ) -> HostapdResult<()> {
        let channel_count = iface_params.channel_params.len();
        for (i, channel_params) in iface_params.channel_params.iter().enumerate() {
            let mut instance_params = iface_params.clone();
            instance_params.name = managed_instances[i].clone();
            let mut instance_nw_params = nw_params.clone();
            let mut owe_transition_ifname = "";
            if nw_params.encryption_type == EncryptionType::Wpa3OweTransition {
                if i == 0 && i + 1 < channel_count {
                    owe_transition_ifname = managed_instances[i + 1].as_str();
                    instance_nw_params.encryption_type = EncryptionType::None;
                } else {
                    owe_transition_ifname = managed_instances[0].as_str();
                    instance_nw_params.is_hidden = true;
                    instance_nw_params.ssid = generate_random_owe_ssid();
                }
            }
            let request = InstanceRequest {
                iface_params: &instance_params,
                channel_params,
                nw_params: &instance_nw_params,
                br_name: &iface_params.name,
                owe_transition_ifname,
            };
            if let Err(e) = self.add_single_access_point(bring_up, &request, started) {
                error!("Failed to addAccessPoint {}", managed_instances[i]);
                return Err(e);
            }
            if iface_params.uses_mlo {
                bring_up.advance(BringUpState::WaitingForPeers)?;
            }
        }
        if iface_params.uses_mlo {
            self.enable_all_instances(bring_up, &iface_params.name)?;
        }
        Ok(())
    }

    /// Enables every BSS of every interface. MLD links only become usable
    /// once all links of the MLD are set, so this waits for all of them.
    fn enable_all_instances(&mut self, bring_up: &BringUp, br_name: &str) -> HostapdResult<()> {
        if !bring_up.all_started() {
            return Err(HostapdError::with_msg(
                HostapdStatusCode::FailureUnknown,
                format!("Not every link of {br_name} has been started"),
            ));
        }
        for handle in self.engine.instances() {
            if let Err(e) = self.engine.enable_iface(handle) {
                error!("Enabling interface {br_name} failed on {handle}: {e}");
                return Err(HostapdError::new(HostapdStatusCode::FailureUnknown));
            }
        }
        Ok(())
    }

    fn roll_back(&mut self, br_name: &str, started: &[InstanceHandle]) {
        if started.is_empty() {
            return;
        }
        match self.options.rollback_policy {
            RollbackPolicy::LeaveRunning => {
                warn!("Leaving {} started instance(s) of {br_name} running", started.len())
            }
            RollbackPolicy::RemoveStarted => {
                for &handle in started.iter().rev() {
                    info!("Removing {handle} of failed bring-up of {br_name}");
                    self.router.unbind(handle);
                    if let Err(e) = self.engine.remove_iface(handle) {
                        error!("Rollback of {handle} failed: {e}");
                    }
                }
            }
        }
    }

    /// Starts one instance. MLO instances are named by link id and run on
    /// the MLD interface `br_name`; they are enabled later, all at once.
    fn add_single_access_point(
        &mut self,
        bring_up: &mut BringUp,
        request: &InstanceRequest,
        started: &mut Vec<InstanceHandle>,
    ) -> HostapdResult<()> {
        let iface_params = request.iface_params;
        let name = iface_params.name.as_str();
        let uses_mlo = iface_params.uses_mlo;
        let link_id = if uses_mlo { Some(parse_link_id(name)?) } else { None };
        match link_id {
            Some(id) if self.engine.get_iface_by_link_id(id).is_some() => {
                error!("Instance link id {name} already present");
                return Err(HostapdError::new(HostapdStatusCode::FailureIfaceExists));
            }
            None if self.engine.get_iface(name).is_some() => {
                error!("Instance interface {name} already present");
                return Err(HostapdError::new(HostapdStatusCode::FailureIfaceExists));
            }
            _ => {}
        }

        bring_up.advance(BringUpState::Configuring)?;
        let config = ConfigBuilder::new(self.system.as_ref(), &self.options, self.versions)
            .build(
                iface_params,
                request.channel_params,
                request.nw_params,
                request.br_name,
                request.owe_transition_ifname,
            )
            .map_err(|e| {
                error!("Failed to create config params: {e}");
                HostapdError::from(e)
            })?;
        let conf_file_path =
            config_file_path(&self.options.conf_dir, name, request.br_name, uses_mlo);
        if let Err(e) = self.system.write_config(&conf_file_path, &config.to_string()) {
            error!("Failed to write config file: {e}");
            return Err(HostapdError::with_msg(
                HostapdStatusCode::FailureUnknown,
                format!("Failed to write {}", conf_file_path.display()),
            ));
        }

        bring_up.advance(BringUpState::Starting)?;
        let engine_iface = if uses_mlo { request.br_name } else { name };
        if let Err(e) = self.engine.add_iface(engine_iface, &conf_file_path) {
            error!(
                "Adding hostapd iface {engine_iface} config={} failed",
                conf_file_path.display()
            );
            return Err(e.into());
        }
        let handle = match link_id {
            Some(id) => self.engine.get_iface_by_link_id(id),
            None => self.engine.get_iface(name),
        }
        .ok_or_else(|| {
            HostapdError::with_msg(
                HostapdStatusCode::FailureUnknown,
                format!("Instance {name} not found after it was added"),
            )
        })?;
        started.push(handle);
        bring_up.record_started(name);
        // Classic bridges report setup completion once for the whole bridge.
        self.router.bind(handle, !request.br_name.is_empty() && !uses_mlo);
        debug!("Instance {name} started as {handle}");

        if !uses_mlo {
            if let Err(e) = self.engine.enable_iface(handle) {
                error!("Enabling interface {name} failed: {e}");
                return Err(HostapdError::new(HostapdStatusCode::FailureUnknown));
            }
        }
        Ok(())
    }

    /// Engine handle of an instance name, which is a link id for MLO links.
    fn resolve_instance(&self, instance: &str) -> Option<InstanceHandle> {
        self.engine.get_iface(instance).or_else(|| {
            instance.parse::<u8>().ok().and_then(|id| self.engine.get_iface_by_link_id(id))
        })
    }

    /// Removes an instance, or every instance of a bridge or MLD. All
    /// removals are attempted even when some of them fail.
    pub fn remove_access_point(&mut self, iface_name: &str) -> HostapdResult<()> {
        let instances = match self.br_interfaces.remove(iface_name) {
            Some(members) => members,
            None => vec![iface_name.to_owned()],
        };
        let mut is_error = false;
        for instance in &instances {
            let Some(handle) = self.resolve_instance(instance) else {
                info!("Remove interface {instance} failed: unknown instance");
                is_error = true;
                continue;
            };
            match self.engine.remove_iface(handle) {
                Ok(()) => self.router.unbind(handle),
                Err(e) => {
                    info!("Remove interface {instance} failed: {e}");
                    is_error = true;
                }
            }
        }
        if is_error {
            return Err(HostapdError::new(HostapdStatusCode::FailureUnknown));
        }
        Ok(())
    }

    /// Disconnects a station from `iface_name`, which is an instance or a
    /// bridge whose instances are tried in order.
    pub fn force_client_disconnect(
        &mut self,
        iface_name: &str,
        client_address: &[u8],
        reason_code: Ieee80211ReasonCode,
    ) -> HostapdResult<()> {
        let addr = MacAddress::try_from(client_address).ok();
        let handles: Vec<InstanceHandle> = match self.engine.get_iface(iface_name) {
            Some(handle) => vec![handle],
            None => self
                .br_interfaces
                .get(iface_name)
                .into_iter()
                .flatten()
                .filter_map(|instance| self.engine.get_iface(instance))
                .collect(),
        };
        if handles.is_empty() {
            error!("Interface {iface_name} doesn't exist");
            return Err(HostapdError::new(HostapdStatusCode::FailureIfaceUnknown));
        }
        for handle in handles {
            if self.force_sta_disconnection(handle, addr.as_ref(), reason_code)? {
                return Ok(());
            }
        }
        Err(HostapdError::new(HostapdStatusCode::FailureClientUnknown))
    }

    fn force_sta_disconnection(
        &mut self,
        handle: InstanceHandle,
        addr: Option<&MacAddress>,
        reason_code: Ieee80211ReasonCode,
    ) -> HostapdResult<bool> {
        let Some(addr) = addr else {
            return Ok(false);
        };
        let stations = self.engine.stations(handle);
        if find_station(stations.as_deref(), addr).is_none() {
            return Ok(false);
        }
        info!("Force client:{addr} disconnect with reason: {reason_code}");
        self.engine.disconnect_station(handle, addr, reason_code)?;
        Ok(true)
    }

    /// Adds a listener. The first registration fixes the service and
    /// client versions.
    pub fn register_callback(&mut self, callback: Arc<dyn HostapdCallback>) -> HostapdResult<()> {
        if let Err(e) = callback.link_to_death() {
            error!("Error registering for death notification for hostapd callback object: {e}");
            return Err(HostapdError::new(HostapdStatusCode::FailureUnknown));
        }
        if self.versions.service == 0 {
            self.versions.service = self.options.service_version;
            info!("AIDL service version: {}", self.versions.service);
        }
        if self.versions.client == 0 {
            self.versions.client = callback.interface_version();
            info!("AIDL client version: {}", self.versions.client);
        }
        self.router.add_listener(callback);
        Ok(())
    }

    pub fn set_debug_params(&mut self, level: DebugLevel) -> HostapdResult<()> {
        self.engine.set_debug_level(level);
        log::set_max_level(level_filter(level));
        Ok(())
    }

    /// Removes one link of the MLD `iface_name`.
    pub fn remove_link_from_multiple_link_bridged_ap_iface(
        &mut self,
        iface_name: &str,
        link_identity: &str,
    ) -> HostapdResult<()> {
        if self.engine.get_iface(iface_name).is_none() {
            error!("Interface {iface_name} doesn't exist");
            return Err(HostapdError::new(HostapdStatusCode::FailureIfaceUnknown));
        }
        let link_id = parse_link_id(link_identity)?;
        let handle = self.engine.get_iface_by_link_id(link_id).ok_or_else(|| {
            HostapdError::with_msg(
                HostapdStatusCode::FailureArgsInvalid,
                format!("Unknown link {link_identity}"),
            )
        })?;
        if let Err(e) = self.engine.remove_link(handle) {
            error!("Removing link {link_identity} of {iface_name} failed: {e}");
            return Err(HostapdError::new(HostapdStatusCode::FailureArgsInvalid));
        }
        self.router.unbind(handle);
        if let Some(members) = self.br_interfaces.get_mut(iface_name) {
            members.retain(|member| member != link_identity);
        }
        Ok(())
    }

    pub fn terminate(&mut self) -> HostapdResult<()> {
        info!("Terminating...");
        // Listeners must not be called while the engine shuts down.
        self.router.clear_listeners();
        self.engine.terminate();
        self.terminated = true;
        Ok(())
    }

    /// Death notification of a registered listener.
    pub fn on_client_death(&mut self) {
        error!("Client died. Terminating...");
        self.engine.terminate();
        self.terminated = true;
    }

    /// Entry point of engine events for a started instance.
    pub fn handle_engine_event(&mut self, handle: InstanceHandle, event: &EngineEvent) {
        self.router.dispatch(self.engine.as_ref(), self.versions, handle, event);
    }
}

fn parse_link_id(link_identity: &str) -> HostapdResult<u8> {
    link_identity.parse().map_err(|_| {
        HostapdError::with_msg(
            HostapdStatusCode::FailureArgsInvalid,
            format!("Invalid link identity {link_identity}"),
        )
    })
}

/// SSID of the hidden OWE companion of an OWE transition pair.
fn generate_random_owe_ssid() -> Vec<u8> {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OWE_SSID_RANDOM_LEN)
        .map(char::from)
        .collect();
    let ssid = format!("Owe-{random}");
    info!("Generated OWE SSID: {ssid}");
    ssid.into_bytes()
}

fn level_filter(level: DebugLevel) -> LevelFilter {
    match level {
        DebugLevel::Excessive | DebugLevel::MsgDump => LevelFilter::Trace,
        DebugLevel::Debug => LevelFilter::Debug,
        DebugLevel::Info => LevelFilter::Info,
        DebugLevel::Warning => LevelFilter::Warn,
        DebugLevel::Error => LevelFilter::Error,
    }
}
