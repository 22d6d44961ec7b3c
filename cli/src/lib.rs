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

//! Command line renderer of hostapd configs.
//!
//! Runs the config generation of the hostapd service on flags and prints
//! or writes the result. No access point is started.

pub mod args;

use anyhow::Context;
use args::HostapdConfArgs;
use clap::Parser;
use hostapd_common::util::{hostapd_logger, os_utils};
use hostapd_rs::config::ConfigBuilder;
use hostapd_rs::options::{HostapdOptions, ServiceVersions};
use hostapd_rs::system::{LinuxSystem, SystemOps};
use log::{error, info};
use std::process::ExitCode;

/// Generates the config text for `args`.
///
/// The service version of `options` stands in for both sides of the
/// version handshake, since no client registers here.
pub fn render(
    system: &dyn SystemOps,
    options: &HostapdOptions,
    args: &HostapdConfArgs,
) -> anyhow::Result<String> {
    let versions =
        ServiceVersions { service: options.service_version, client: options.service_version };
    let iface_params = args.iface_params();
    let config = ConfigBuilder::new(system, options, versions)
        .build(
            &iface_params,
            &args.channel_params(),
            &args.network_params(),
            &args.bridge,
            "",
        )
        .with_context(|| format!("Failed to generate config for {}", args.iface))?;
    Ok(config.to_string())
}

fn run(args: &HostapdConfArgs) -> anyhow::Result<()> {
    let options = match &args.options {
        Some(path) => HostapdOptions::from_file(path)?,
        None => HostapdOptions::default(),
    };
    let config = render(&LinuxSystem, &options, args)?;
    match &args.output {
        Some(path) => {
            os_utils::write_config_file(path, &config)?;
            info!("Wrote config for {} to {}", args.iface, path.display());
        }
        None => print!("{config}"),
    }
    Ok(())
}

pub fn rust_main() -> ExitCode {
    let args = HostapdConfArgs::parse();
    hostapd_logger::init("hostapd-conf");
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
