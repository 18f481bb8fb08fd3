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

//! Pin-table building blocks: pins, I/O standards, attributes, signal records
//! and connectors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::*;

/// Ordered list of package pin identifiers (or `connector:position` references).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pins(pub Vec<String>);

impl Pins {
    /// Builds a pin list from one or more whitespace-separated groups.
    pub fn new<S>(groups: &[S]) -> Self where S: AsRef<str> {
        Self(split_pin_groups(groups))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<&str> for Pins {
    fn from(s: &str) -> Self {
        Self::new(&[s])
    }
}

impl From<String> for Pins {
    fn from(s: String) -> Self {
        Self::new(&[s])
    }
}

impl From<Pins> for String {
    fn from(pins: Pins) -> Self {
        pins.0.join(" ")
    }
}

/// Electrical signaling standard of a pin group, spelled the way vendor tools
/// spell it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IoStandard {
    Lvcmos12,
    Lvcmos33,
    Sstl15I,
    Sstl15dI,
    Sstl12Dci,
    DiffSstl12,
    DiffSstl12Dci,
    Pod12Dci,
    DiffPod12,
    Other(String),
}

impl IoStandard {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lvcmos12 => "LVCMOS12",
            Self::Lvcmos33 => "LVCMOS33",
            Self::Sstl15I => "SSTL15_I",
            Self::Sstl15dI => "SSTL15D_I",
            Self::Sstl12Dci => "SSTL12_DCI",
            Self::DiffSstl12 => "DIFF_SSTL12",
            Self::DiffSstl12Dci => "DIFF_SSTL12_DCI",
            Self::Pod12Dci => "POD12_DCI",
            Self::DiffPod12 => "DIFF_POD12",
            Self::Other(s) => s,
        }
    }

    /// Differential standards drive a pin pair, the `_p` pin being the one
    /// constrained.
    pub fn is_differential(&self) -> bool {
        let s = self.as_str();
        s.starts_with("DIFF_") || s == "SSTL15D_I" || s.starts_with("LVDS")
    }
}

impl From<&str> for IoStandard {
    fn from(s: &str) -> Self {
        match s {
            "LVCMOS12" => Self::Lvcmos12,
            "LVCMOS33" => Self::Lvcmos33,
            "SSTL15_I" => Self::Sstl15I,
            "SSTL15D_I" => Self::Sstl15dI,
            "SSTL12_DCI" => Self::Sstl12Dci,
            "DIFF_SSTL12" => Self::DiffSstl12,
            "DIFF_SSTL12_DCI" => Self::DiffSstl12Dci,
            "POD12_DCI" => Self::Pod12Dci,
            "DIFF_POD12" => Self::DiffPod12,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for IoStandard {
    fn from(s: String) -> Self {
        IoStandard::from(s.as_str())
    }
}

impl From<IoStandard> for String {
    fn from(std: IoStandard) -> Self {
        std.as_str().to_string()
    }
}

impl fmt::Display for IoStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form `KEY=VALUE` pin attribute (slew rate, termination, pull mode...).
/// Board files refuse attributes without a `=`; records built in code are
/// checked by the validator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Misc(pub String);

impl Misc {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn is_well_formed(&self) -> bool {
        match self.0.split_once('=') {
            Some((key, value)) => !key.is_empty()
                && !value.is_empty()
                && !self.0.contains(|c: char| c.is_whitespace() || c == ';'),
            None => false,
        }
    }

    pub fn from_pair(key: &str, value: &str) -> Self {
        Self(format!("{}={}", key, value))
    }

    pub fn key(&self) -> &str {
        self.0.split_once('=').map(|(k, _)| k).unwrap_or(&self.0)
    }

    pub fn value(&self) -> Option<&str> {
        self.0.split_once('=').map(|(_, v)| v)
    }
}

impl fmt::Display for Misc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Misc {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let misc = Misc(s);
        if misc.is_well_formed() {
            Ok(misc)
        } else {
            Err(format!("attribute \"{}\" is not of the form KEY=VALUE", misc))
        }
    }
}

impl From<Misc> for String {
    fn from(misc: Misc) -> Self {
        misc.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsignal {
    pub name: String,
    pub pins: Pins,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iostandard: Option<IoStandard>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<Misc>,
}

impl Subsignal {
    pub fn new<P>(name: &str, pins: P) -> Self where P: Into<Pins> {
        Self { name: name.to_string(), pins: pins.into(), iostandard: None, misc: Vec::new() }
    }

    pub fn iostandard(mut self, std: &str) -> Self {
        self.iostandard = Some(std.into());
        self
    }

    pub fn misc(mut self, misc: &str) -> Self {
        self.misc.push(Misc::new(misc));
        self
    }
}

/// Location of a signal record: either pins directly or a group of subsignals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBody {
    Pins(Pins),
    Subsignals(Vec<Subsignal>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub name: String,
    #[serde(default)]
    pub index: u32,
    #[serde(flatten)]
    pub body: SignalBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iostandard: Option<IoStandard>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<Misc>,
}

impl SignalRecord {
    pub fn pins<P>(name: &str, index: u32, pins: P) -> Self where P: Into<Pins> {
        Self {
            name: name.to_string(),
            index,
            body: SignalBody::Pins(pins.into()),
            iostandard: None,
            misc: Vec::new(),
        }
    }

    pub fn subsignals(name: &str, index: u32, subsignals: Vec<Subsignal>) -> Self {
        Self {
            name: name.to_string(),
            index,
            body: SignalBody::Subsignals(subsignals),
            iostandard: None,
            misc: Vec::new(),
        }
    }

    pub fn iostandard(mut self, std: &str) -> Self {
        self.iostandard = Some(std.into());
        self
    }

    pub fn misc(mut self, misc: &str) -> Self {
        self.misc.push(Misc::new(misc));
        self
    }

    pub fn subsignal(&self, name: &str) -> Option<&Subsignal> {
        match &self.body {
            SignalBody::Subsignals(subs) => subs.iter().find(|s| s.name == name),
            SignalBody::Pins(_) => None,
        }
    }

    /// Every pin of the record, subsignals in declaration order.
    pub fn all_pins(&self) -> Vec<&str> {
        match &self.body {
            SignalBody::Pins(pins) => pins.iter().map(|p| p.as_str()).collect(),
            SignalBody::Subsignals(subs) => subs.iter()
                .flat_map(|s| s.pins.iter().map(|p| p.as_str()))
                .collect(),
        }
    }

    /// Flattened ports of the record: `(port name, subsignal, pins, standard, misc)`
    /// with record-level properties already merged in.
    pub fn ports(&self) -> Vec<Port> {
        let normalized = self.normalized();
        match normalized.body {
            SignalBody::Pins(pins) => vec![Port {
                name: port_name(&self.name, self.index, None),
                resource: self.name.clone(),
                index: self.index,
                subsignal: None,
                pins,
                iostandard: normalized.iostandard,
                misc: normalized.misc,
            }],
            SignalBody::Subsignals(subs) => subs.into_iter()
                .map(|s| Port {
                    name: port_name(&self.name, self.index, Some(&s.name)),
                    resource: self.name.clone(),
                    index: self.index,
                    subsignal: Some(s.name),
                    pins: s.pins,
                    iostandard: s.iostandard,
                    misc: s.misc,
                })
                .collect(),
        }
    }

    /// The form toolchain constraint files can express: record-level standard and
    /// attributes are pushed down into every subsignal. Subsignal standards take
    /// precedence, record attributes come before subsignal ones.
    pub fn normalized(&self) -> SignalRecord {
        match &self.body {
            SignalBody::Pins(_) => self.clone(),
            SignalBody::Subsignals(subs) => {
                let subs = subs.iter()
                    .map(|s| {
                        let mut misc = self.misc.clone();
                        for m in &s.misc {
                            if !misc.contains(m) {
                                misc.push(m.clone());
                            }
                        }
                        Subsignal {
                            name: s.name.clone(),
                            pins: s.pins.clone(),
                            iostandard: s.iostandard.clone().or_else(|| self.iostandard.clone()),
                            misc,
                        }
                    })
                    .collect();
                SignalRecord {
                    name: self.name.clone(),
                    index: self.index,
                    body: SignalBody::Subsignals(subs),
                    iostandard: None,
                    misc: Vec::new(),
                }
            }
        }
    }
}

/// One toolchain-level port produced by flattening a signal record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub resource: String,
    pub index: u32,
    pub subsignal: Option<String>,
    pub pins: Pins,
    pub iostandard: Option<IoStandard>,
    pub misc: Vec<Misc>,
}

impl Port {
    pub fn tag(&self) -> String {
        resource_tag(&self.resource, self.index, self.subsignal.as_deref())
    }

    /// `(bit name, pin)` pairs.
    pub fn bits(&self) -> Vec<(String, &str)> {
        bit_names(&self.name, self.pins.len()).into_iter()
            .zip(self.pins.iter().map(|p| p.as_str()))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub name: String,
    pub pins: Pins,
}

impl ConnectorRecord {
    pub fn new(name: &str, pins: &str) -> Self {
        Self { name: name.to_string(), pins: pins.into() }
    }

    /// Pin behind a connector position, `None` for placeholders and
    /// out-of-range positions.
    pub fn pin(&self, position: usize) -> Option<&str> {
        self.pins.0.get(position)
            .map(|p| p.as_str())
            .filter(|p| *p != NC_PIN)
    }
}

impl fmt::Display for SignalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extras = |std: &Option<IoStandard>, misc: &[Misc]| {
            let mut s = String::new();
            if let Some(std) = std {
                s += &format!(" {}", std);
            }
            for m in misc {
                s += &format!(" {}", m);
            }
            s
        };

        match &self.body {
            SignalBody::Pins(pins) => writeln!(
                f, "{}:{}  {}{}",
                self.name, self.index, String::from(pins.clone()),
                extras(&self.iostandard, &self.misc)
            ),
            SignalBody::Subsignals(subs) => {
                writeln!(f, "{}:{}{}", self.name, self.index, extras(&self.iostandard, &self.misc))?;
                for s in subs {
                    writeln!(
                        f, "    .{:<10} {}{}",
                        s.name, String::from(s.pins.clone()), extras(&s.iostandard, &s.misc)
                    )?;
                }
                Ok(())
            }
        }
    }
}
