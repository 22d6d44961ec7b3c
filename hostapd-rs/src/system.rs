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

//! Operating system services used while configuring access points.

use crate::params::MacAddress;
use hostapd_common::util::os_utils;
use std::io::ErrorKind;
use std::path::Path;

/// Filesystem and network interface queries.
pub trait SystemOps: Send + Sync {
    /// Contents of the overlay at `path`, or `None` when there is no
    /// readable overlay.
    fn read_overlay(&self, path: &Path) -> anyhow::Result<Option<String>>;

    fn interface_mac_address(&self, if_name: &str) -> anyhow::Result<MacAddress>;

    /// Member interfaces of a bridge, in port order.
    fn bridge_members(&self, br_name: &str) -> anyhow::Result<Vec<String>>;

    /// Writes a generated configuration file.
    fn write_config(&self, path: &Path, contents: &str) -> anyhow::Result<()>;
}

/// [`SystemOps`] backed by the running Linux host.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxSystem;

impl SystemOps for LinuxSystem {
    fn read_overlay(&self, path: &Path) -> anyhow::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                Ok(None)
            }
            Err(e) => {
                os_utils::log_config_file_error(&e, path);
                Err(e.into())
            }
        }
    }

    fn interface_mac_address(&self, if_name: &str) -> anyhow::Result<MacAddress> {
        os_utils::get_interface_mac_address(if_name).map(MacAddress::from)
    }

    fn bridge_members(&self, br_name: &str) -> anyhow::Result<Vec<String>> {
        os_utils::get_interfaces_in_bridge(br_name)
    }

    fn write_config(&self, path: &Path, contents: &str) -> anyhow::Result<()> {
        os_utils::write_config_file(path, contents)
    }
}
