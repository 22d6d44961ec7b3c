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

/// Runtime options for the hostapd service
use anyhow::{anyhow, Context};
use hostapd_common::util::kv_file::KvFile;
use hostapd_common::util::os_utils::resolve_vendor_conf_path;
use log::warn;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONF_DIR: &str = "/data/vendor/wifi/hostapd";
pub const UNMETERED_IFACE_OVERLAY_PATH: &str = "/etc/wifi/hostapd_unmetered_overlay.conf";

/// Interface version implemented by this service.
pub const SERVICE_VERSION: i32 = 3;

/// What to do with instances already started when a multi-instance
/// bring-up fails part way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RollbackPolicy {
    /// Leave started siblings running and report the failure.
    #[default]
    LeaveRunning,
    /// Remove every sibling started by the failed request.
    RemoveStarted,
}

impl FromStr for RollbackPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leave_running" => Ok(RollbackPolicy::LeaveRunning),
            "remove_started" => Ok(RollbackPolicy::RemoveStarted),
            _ => Err(anyhow!("Invalid rollback_policy: {s}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostapdOptions {
    /// Where `hostapd_<name>.conf` files are written.
    pub conf_dir: PathBuf,
    /// Parent of the `ctrl_<name>` control sockets.
    pub ctrl_dir: PathBuf,
    /// Vendor overlay applied to unmetered networks.
    pub overlay_path: PathBuf,
    /// Recorded as the service version on the first callback registration.
    pub service_version: i32,
    pub rollback_policy: RollbackPolicy,
}

impl Default for HostapdOptions {
    fn default() -> Self {
        HostapdOptions {
            conf_dir: PathBuf::from(DEFAULT_CONF_DIR),
            ctrl_dir: PathBuf::from(DEFAULT_CONF_DIR),
            overlay_path: resolve_vendor_conf_path(UNMETERED_IFACE_OVERLAY_PATH),
            service_version: SERVICE_VERSION,
            rollback_policy: RollbackPolicy::default(),
        }
    }
}

impl HostapdOptions {
    /// Reads options from a `key=value` file. Missing keys keep their
    /// defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let mut kv = KvFile::new(path.to_path_buf());
        kv.read().with_context(|| format!("Failed to read options file {}", path.display()))?;
        Self::from_kv(&kv)
    }

    pub fn from_kv(kv: &KvFile) -> anyhow::Result<Self> {
        let mut options = HostapdOptions::default();
        for (key, value) in kv.iter() {
            match key {
                "conf_dir" => options.conf_dir = PathBuf::from(value),
                "ctrl_dir" => options.ctrl_dir = PathBuf::from(value),
                "overlay_path" => options.overlay_path = PathBuf::from(value),
                "service_version" => {
                    options.service_version = value
                        .parse()
                        .map_err(|e| anyhow!("Invalid service_version {value}: {e}"))?
                }
                "rollback_policy" => options.rollback_policy = value.parse()?,
                _ => warn!("Ignoring unknown option {key}"),
            }
        }
        Ok(options)
    }
}

/// Interface versions that gate optional config keys and callback fields.
///
/// Both start at 0 and are filled in on the first callback registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServiceVersions {
    pub service: i32,
    pub client: i32,
}

impl ServiceVersions {
    pub fn service_at_least(&self, version: i32) -> bool {
        version <= self.service
    }

    pub fn client_at_least(&self, version: i32) -> bool {
        version <= self.client
    }

    pub fn service_and_client_at_least(&self, version: i32) -> bool {
        self.service_at_least(version) && self.client_at_least(version)
    }
}
