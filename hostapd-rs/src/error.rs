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

//! Error types of the hostapd service.

use crate::params::EncryptionType;
use thiserror::Error;

/// Service specific status codes returned to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum HostapdStatusCode {
    Success = 0,
    FailureUnknown = 1,
    FailureArgsInvalid = 2,
    FailureIfaceUnknown = 3,
    FailureIfaceExists = 4,
    FailureClientUnknown = 5,
}

/// An error returned by a service operation. Carries the status code the
/// caller sees and an optional human readable message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{code:?}{}", suffix(.msg))]
pub struct HostapdError {
    pub code: HostapdStatusCode,
    pub msg: Option<String>,
}

impl HostapdError {
    pub fn new(code: HostapdStatusCode) -> Self {
        HostapdError { code, msg: None }
    }

    pub fn with_msg(code: HostapdStatusCode, msg: impl Into<String>) -> Self {
        HostapdError { code, msg: Some(msg.into()) }
    }
}

impl From<ConfigError> for HostapdError {
    fn from(err: ConfigError) -> Self {
        HostapdError::with_msg(HostapdStatusCode::FailureArgsInvalid, err.to_string())
    }
}

impl From<EngineError> for HostapdError {
    fn from(err: EngineError) -> Self {
        HostapdError::with_msg(HostapdStatusCode::FailureUnknown, err.to_string())
    }
}

fn suffix(msg: &Option<String>) -> String {
    msg.as_ref().map(|m| format!(": {m}")).unwrap_or_default()
}

pub type HostapdResult<T> = Result<T, HostapdError>;

/// Reasons the configuration text could not be generated.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid SSID size: {0}")]
    SsidTooLong(usize),
    #[error("Invalid passphrase length {len} for {encryption:?}")]
    InvalidPassphrase { encryption: EncryptionType, len: usize },
    #[error("Invalid band mask {0:#x}")]
    InvalidBand(u32),
    #[error("Unknown encryption type {0}")]
    UnknownEncryptionType(i32),
    #[error("Unable to get mac address of {iface} for 11BE SAP: {reason}")]
    MacAddress { iface: String, reason: String },
    #[error("Cannot read overlay {path}: {reason}")]
    OverlayRead { path: String, reason: String },
}

/// Failures reported by the engine collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Adding hostapd iface {0} failed")]
    AddIface(String),
    #[error("Enabling interface {0} failed")]
    EnableIface(String),
    #[error("Remove interface {0} failed")]
    RemoveIface(String),
    #[error("Removing link {0} failed")]
    RemoveLink(u8),
    #[error("Unknown instance {0}")]
    UnknownInstance(String),
}

/// A listener could not be reached.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Failed to invoke {0}")]
pub struct CallbackError(pub String);
