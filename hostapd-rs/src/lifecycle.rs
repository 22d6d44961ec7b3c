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

//! Bring-up state of one add access point request.
//!
//! ```text
//! Validating -> ResolvingInstances -> Configuring -> Starting -> Enabled
//!      |                                  ^            |    \
//!      +-------------> Configuring        +------------+     WaitingForPeers -> Enabled
//!                                                              (multi-link)
//! ```
//!
//! Any non terminal state may move to `Failed`. Multi-link requests only
//! reach `Enabled` once every expected instance has been started.

use crate::error::{HostapdError, HostapdResult, HostapdStatusCode};
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BringUpState {
    Validating,
    ResolvingInstances,
    Configuring,
    Starting,
    WaitingForPeers,
    Enabled,
    Failed,
}

/// Tracks one bring-up request.
#[derive(Debug)]
pub struct BringUp {
    state: BringUpState,
    expected: usize,
    multi_link: bool,
    started: Vec<String>,
}

impl BringUp {
    /// A request for `expected` instances. `multi_link` requests defer
    /// enabling until all links have been started.
    pub fn new(expected: usize, multi_link: bool) -> Self {
        BringUp { state: BringUpState::Validating, expected, multi_link, started: Vec::new() }
    }

    pub fn state(&self) -> BringUpState {
        self.state
    }

    /// Instance names started so far, in start order.
    pub fn started(&self) -> &[String] {
        &self.started
    }

    pub fn all_started(&self) -> bool {
        self.started.len() >= self.expected
    }

    fn allowed(&self, next: BringUpState) -> bool {
        use BringUpState::*;
        match (self.state, next) {
            (Enabled | Failed, _) => false,
            (_, Failed) => true,
            (Validating, ResolvingInstances | Configuring) => true,
            (ResolvingInstances, Configuring) => true,
            (Configuring, Starting) => true,
            (Starting, Configuring) => !self.multi_link,
            (Starting, WaitingForPeers) => self.multi_link,
            (WaitingForPeers, Configuring) => true,
            (Starting | WaitingForPeers, Enabled) => self.all_started(),
            _ => false,
        }
    }

    /// Moves to `next`, refusing transitions the diagram does not allow.
    pub fn advance(&mut self, next: BringUpState) -> HostapdResult<()> {
        if !self.allowed(next) {
            return Err(HostapdError::with_msg(
                HostapdStatusCode::FailureUnknown,
                format!(
                    "Invalid bring-up transition {:?} -> {:?} ({}/{} started)",
                    self.state,
                    next,
                    self.started.len(),
                    self.expected
                ),
            ));
        }
        debug!("Bring-up {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Records that `instance` was handed to the engine.
    pub fn record_started(&mut self, instance: &str) {
        self.started.push(instance.to_owned());
    }

    pub fn fail(&mut self) {
        if self.state != BringUpState::Enabled {
            self.state = BringUpState::Failed;
        }
    }
}
