//
//  Copyright 2024 Google, Inc.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at:
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! # os utility functions

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use log::error;

/// Owner and group read-write.
pub const CONFIG_FILE_MODE: u32 = 0o660;

const APEX_ROOT: &str = "/apex/";

/// Resolve a vendor configuration path for the running binary.
///
/// Inside an APEX the file lives under `/apex/<apexname>`, otherwise
/// under `/vendor`.
pub fn resolve_vendor_conf_path(conf_path: &str) -> PathBuf {
    let exe = std::env::current_exe().unwrap_or_default();
    resolve_vendor_conf_path_for(&exe, conf_path)
}

fn resolve_vendor_conf_path_for(exe: &Path, conf_path: &str) -> PathBuf {
    let exe = exe.to_string_lossy();
    if let Some(rest) = exe.strip_prefix(APEX_ROOT) {
        let apex_name = rest.split('/').next().unwrap_or_default();
        if !apex_name.is_empty() {
            return PathBuf::from(format!("{APEX_ROOT}{apex_name}{conf_path}"));
        }
    }
    PathBuf::from(format!("/vendor{conf_path}"))
}

/// Write `contents` to `path` readable and writable by the owner and group
/// only, owned by the running uid/gid.
///
/// On failure the path is stat'ed and its ownership and mode are logged
/// before the error is returned.
pub fn write_config_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    let result = write_config_file_internal(path, contents);
    if let Err(e) = &result {
        log_config_file_error(e, path);
    }
    result
}

fn write_config_file_internal(path: &Path, contents: &str) -> anyhow::Result<()> {
    let mut f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(CONFIG_FILE_MODE)
        .open(path)?;
    f.write_all(contents.as_bytes())?;
    f.flush()?;
    // An existing file keeps its old mode, so set it explicitly.
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(CONFIG_FILE_MODE))?;
    // SAFETY: getuid and getgid take no arguments and cannot fail.
    let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
    std::os::unix::fs::chown(path, Some(uid), Some(gid))?;
    Ok(())
}

/// Log a config file read/write failure together with the file's
/// ownership and mode.
pub fn log_config_file_error(err: &dyn std::fmt::Display, path: &Path) {
    error!("Cannot read/write hostapd config {}, error: {}", path.display(), err);
    match std::fs::metadata(path) {
        Ok(st) => error!(
            "hostapd config file uid: {}, gid: {}, mode: {:o}",
            st.uid(),
            st.gid(),
            st.mode()
        ),
        Err(e) => error!("Error calling stat() on hostapd config file: {}", e),
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod net {
    use anyhow::{anyhow, bail};
    use std::ffi::CStr;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    const MAX_PORTS: usize = 1024;
    const SIOCDEVPRIVATE: libc::c_ulong = 0x89F0;
    const BRCTL_GET_PORT_LIST: libc::c_ulong = 5;

    fn inet_dgram_socket() -> anyhow::Result<OwnedFd> {
        // SAFETY: plain socket(2) call; the result is checked before use.
        let fd = unsafe { libc::socket(libc::PF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
        if fd < 0 {
            bail!("Failed to create sock ({})", std::io::Error::last_os_error());
        }
        // SAFETY: fd is a freshly created, owned descriptor.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }

    fn ifreq_for(if_name: &str) -> anyhow::Result<libc::ifreq> {
        if if_name.is_empty() || if_name.len() >= libc::IFNAMSIZ || if_name.contains('\0') {
            bail!("Invalid interface name '{if_name}'");
        }
        // SAFETY: ifreq is plain old data; all-zero is a valid value.
        let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
        for (dst, src) in ifr.ifr_name.iter_mut().zip(if_name.bytes()) {
            *dst = src as libc::c_char;
        }
        Ok(ifr)
    }

    pub fn get_interfaces_in_bridge(br_name: &str) -> anyhow::Result<Vec<String>> {
        let sock = inet_dgram_socket()?;
        let mut ifindices = [0 as libc::c_int; MAX_PORTS];
        let mut args: [libc::c_ulong; 3] = [
            BRCTL_GET_PORT_LIST,
            ifindices.as_mut_ptr() as libc::c_ulong,
            MAX_PORTS as libc::c_ulong,
        ];
        let mut request = ifreq_for(br_name)?;
        request.ifr_ifru.ifru_data = args.as_mut_ptr() as *mut libc::c_char;

        // SAFETY: `request` points at `args`, which points at `ifindices`;
        // both outlive the call and the kernel writes at most MAX_PORTS ints.
        let ret = unsafe {
            libc::ioctl(sock.as_raw_fd(), SIOCDEVPRIVATE as _, &mut request as *mut libc::ifreq)
        };
        if ret < 0 {
            bail!("Failed to ioctl SIOCDEVPRIVATE: {}", std::io::Error::last_os_error());
        }

        let mut interfaces = Vec::new();
        for &ifindex in ifindices.iter().filter(|&&i| i != 0) {
            let mut if_name = [0 as libc::c_char; libc::IFNAMSIZ];
            // SAFETY: if_name has IFNAMSIZ bytes as if_indextoname requires.
            let name =
                unsafe { libc::if_indextoname(ifindex as libc::c_uint, if_name.as_mut_ptr()) };
            if name.is_null() {
                continue;
            }
            // SAFETY: on success if_indextoname wrote a NUL terminated name.
            let name = unsafe { CStr::from_ptr(if_name.as_ptr()) };
            interfaces.push(name.to_string_lossy().into_owned());
        }
        Ok(interfaces)
    }

    pub fn get_interface_mac_address(if_name: &str) -> anyhow::Result<[u8; 6]> {
        let sock = inet_dgram_socket()?;
        let mut ifr = ifreq_for(if_name)?;
        // SAFETY: ifr is a valid ifreq with a NUL terminated name.
        let ret = unsafe {
            libc::ioctl(sock.as_raw_fd(), libc::SIOCGIFHWADDR as _, &mut ifr as *mut libc::ifreq)
        };
        if ret < 0 {
            return Err(anyhow!(
                "Could not get interface {} hwaddr: {}",
                if_name,
                std::io::Error::last_os_error()
            ));
        }
        let mut addr = [0u8; 6];
        // SAFETY: SIOCGIFHWADDR fills the hwaddr member of the union.
        let sa_data = unsafe { ifr.ifr_ifru.ifru_hwaddr.sa_data };
        for (dst, src) in addr.iter_mut().zip(sa_data.iter()) {
            *dst = *src as u8;
        }
        Ok(addr)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
mod net {
    pub fn get_interfaces_in_bridge(br_name: &str) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("Bridge enumeration of {br_name} is only supported on Linux")
    }

    pub fn get_interface_mac_address(if_name: &str) -> anyhow::Result<[u8; 6]> {
        anyhow::bail!("Hardware address lookup of {if_name} is only supported on Linux")
    }
}

/// List the member interfaces of the bridge `br_name`, in port order.
pub fn get_interfaces_in_bridge(br_name: &str) -> anyhow::Result<Vec<String>> {
    net::get_interfaces_in_bridge(br_name)
}

/// Hardware (MAC) address of the interface `if_name`.
pub fn get_interface_mac_address(if_name: &str) -> anyhow::Result<[u8; 6]> {
    net::get_interface_mac_address(if_name)
}
