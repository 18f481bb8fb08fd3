/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::resource::*;
use crate::constraints::ConstraintFormat;
use crate::programmer::Programmer;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    Trellis,
    Diamond,
    Vivado,
}

impl Toolchain {
    pub fn constraint_format(self) -> ConstraintFormat {
        match self {
            Self::Trellis | Self::Diamond => ConstraintFormat::Lpf,
            Self::Vivado => ConstraintFormat::Xdc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trellis => "trellis",
            Self::Diamond => "diamond",
            Self::Vivado => "vivado",
        }
    }
}

impl FromStr for Toolchain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trellis" => Ok(Self::Trellis),
            "diamond" => Ok(Self::Diamond),
            "vivado" => Ok(Self::Vivado),
            _ => Err(format!("unknown toolchain \"{}\"", s)),
        }
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clock period applied at finalization. `signal` is `name` or `name:subsignal`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodConstraint {
    pub signal: String,
    #[serde(default)]
    pub index: u32,
    pub period_ns: f64,
}

impl PeriodConstraint {
    pub fn new(signal: &str, index: u32, period_ns: f64) -> Self {
        Self { signal: signal.to_string(), index, period_ns }
    }
}

/// One hardware revision of a board: the device fitted and its pin tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub name: String,
    pub device: String,
    pub io: Vec<SignalRecord>,
    #[serde(default)]
    pub connectors: Vec<ConnectorRecord>,
}

/// Everything known about a board; also the on-disk board file format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardDescription {
    pub name: String,
    pub default_clk_name: String,
    pub default_clk_period_ns: f64,
    /// Supported toolchains, the first one being the default.
    pub toolchains: Vec<Toolchain>,
    pub programmer: Programmer,
    pub default_revision: String,
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub period_constraints: Vec<PeriodConstraint>,
    #[serde(default)]
    pub platform_commands: Vec<String>,
    /// Pins deliberately wired to more than one record (shared buses).
    #[serde(default)]
    pub shared_pins: Vec<String>,
}

impl BoardDescription {
    pub fn revision(&self, name: &str) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.name == name)
    }

    pub fn revision_names(&self) -> Vec<&str> {
        self.revisions.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn default_toolchain(&self) -> Option<Toolchain> {
        self.toolchains.first().copied()
    }
}
