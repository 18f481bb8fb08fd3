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

//! Toolchain constraint files. Every port is preceded by a `# name:index[.sub]`
//! comment, which is what lets the readers rebuild signal records from a flat
//! list of ports.

pub mod lpf;
pub mod xdc;
#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::*;
use crate::log::*;
use crate::platform::{IoStandard, Misc, Pins, SignalBody, SignalRecord, Subsignal};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintFormat {
    /// Xilinx Design Constraints (Vivado)
    Xdc,
    /// Lattice Preference File (Trellis, Diamond)
    Lpf,
}

impl ConstraintFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xdc => ".xdc",
            Self::Lpf => ".lpf",
        }
    }
}

impl FromStr for ConstraintFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xdc" => Ok(Self::Xdc),
            "lpf" => Ok(Self::Lpf),
            _ => Err(format!("unknown constraint format \"{}\"", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimingConstraint {
    pub port: String,
    pub period_ns: f64,
}

/// What goes into a constraint file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConstraintSet {
    pub records: Vec<SignalRecord>,
    pub timing: Vec<TimingConstraint>,
    pub commands: Vec<String>,
}

/// Contents read back from a constraint file. Records come out normalized
/// (see [`SignalRecord::normalized`]).
pub type ParsedConstraints = ConstraintSet;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Syntax { line: usize, text: String },
    OrphanPort { line: usize, port: String },
    UnexpectedPort { line: usize, expected: String, found: String },
    MissingBit { port: String, bit: usize },
    BadNumber { line: usize, text: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { line, text } =>
                write!(f, "line {}: cannot parse \"{}\"", line, text),
            Self::OrphanPort { line, port } =>
                write!(f, "line {}: port {} is not preceded by a resource tag", line, port),
            Self::UnexpectedPort { line, expected, found } =>
                write!(f, "line {}: expected port {}, found {}", line, expected, found),
            Self::MissingBit { port, bit } =>
                write!(f, "port {} has no location for bit {}", port, bit),
            Self::BadNumber { line, text } =>
                write!(f, "line {}: \"{}\" is not a number", line, text),
        }
    }
}

impl std::error::Error for ParseError {}

pub fn write(format: ConstraintFormat, set: &ConstraintSet) -> String {
    match format {
        ConstraintFormat::Xdc => xdc::write(set),
        ConstraintFormat::Lpf => lpf::write(set),
    }
}

pub fn parse(format: ConstraintFormat, text: &str) -> Result<ParsedConstraints, ParseError> {
    match format {
        ConstraintFormat::Xdc => xdc::parse(text),
        ConstraintFormat::Lpf => lpf::parse(text),
    }
}

/* Reader side --------------------------------------------------------------- */

struct PendingPort {
    name: String,
    index: u32,
    sub: Option<String>,
    port: String,
    pins: Vec<Option<String>>,
    iostandard: Option<IoStandard>,
    misc: Vec<Misc>,
}

/// Collects ports in file order and turns them back into signal records.
#[derive(Default)]
pub(crate) struct RecordAssembler {
    ports: Vec<PendingPort>,
}

impl RecordAssembler {
    /// Handles a `# ...` comment; returns false if it is not a resource tag.
    pub fn tag(&mut self, comment: &str) -> bool {
        match parse_resource_tag(comment.trim()) {
            Some((name, index, sub)) => {
                self.ports.push(PendingPort {
                    name: name.to_string(),
                    index,
                    sub: sub.map(String::from),
                    port: port_name(name, index, sub),
                    pins: Vec::new(),
                    iostandard: None,
                    misc: Vec::new(),
                });
                true
            },
            None => false,
        }
    }

    fn current(&mut self, line: usize, bit: &str) -> Result<(&mut PendingPort, Option<usize>), ParseError> {
        let (base, idx) = split_bit_name(bit);
        let port = self.ports.last_mut()
            .ok_or_else(|| ParseError::OrphanPort { line, port: bit.to_string() })?;
        if port.port != base {
            return Err(ParseError::UnexpectedPort {
                line,
                expected: port.port.clone(),
                found: base.to_string(),
            });
        }
        Ok((port, idx))
    }

    pub fn location(&mut self, line: usize, bit: &str, pin: &str) -> Result<(), ParseError> {
        let (port, idx) = self.current(line, bit)?;
        let idx = idx.unwrap_or(0);
        if port.pins.len() <= idx {
            port.pins.resize(idx + 1, None);
        }
        port.pins[idx] = Some(pin.to_string());
        Ok(())
    }

    /// Bus bits repeat the same properties; only the first bit is recorded.
    pub fn iostandard(&mut self, line: usize, bit: &str, std: &str) -> Result<(), ParseError> {
        let (port, idx) = self.current(line, bit)?;
        if idx.unwrap_or(0) == 0 {
            port.iostandard = Some(std.into());
        }
        Ok(())
    }

    pub fn misc(&mut self, line: usize, bit: &str, key: &str, value: &str) -> Result<(), ParseError> {
        let (port, idx) = self.current(line, bit)?;
        if idx.unwrap_or(0) == 0 {
            port.misc.push(Misc::from_pair(key, value));
        }
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<SignalRecord>, ParseError> {
        let mut records: Vec<SignalRecord> = Vec::new();
        for p in self.ports {
            let mut pins = Vec::with_capacity(p.pins.len());
            for (bit, pin) in p.pins.into_iter().enumerate() {
                pins.push(pin.ok_or_else(|| ParseError::MissingBit { port: p.port.clone(), bit })?);
            }
            let pins = Pins(pins);

            match p.sub {
                None => records.push(SignalRecord {
                    name: p.name,
                    index: p.index,
                    body: SignalBody::Pins(pins),
                    iostandard: p.iostandard,
                    misc: p.misc,
                }),
                Some(sub) => {
                    let subsignal = Subsignal { name: sub, pins, iostandard: p.iostandard, misc: p.misc };
                    let existing = records.iter_mut()
                        .rev()
                        .find(|r| r.name == p.name && r.index == p.index);
                    match existing.map(|r| &mut r.body) {
                        Some(SignalBody::Subsignals(subs)) => subs.push(subsignal),
                        _ => records.push(SignalRecord::subsignals(&p.name, p.index, vec![subsignal])),
                    }
                },
            }
        }
        Ok(records)
    }
}

/* Writer side --------------------------------------------------------------- */

pub(crate) const SECTION_RULE: &str =
    "################################################################################";

/// Attributes without a value have no spelling in either format and are left
/// out of the written file.
pub(crate) fn well_formed(misc: &Misc, port: &str) -> bool {
    if !misc.is_well_formed() {
        dbg_log!(DBG_WARN, "Dropping attribute \"{}\" of port {}: not KEY=VALUE", misc, port);
        return false;
    }
    true
}

pub(crate) fn section(out: &mut String, title: &str) {
    out.push_str(SECTION_RULE);
    out.push_str("\n# ");
    out.push_str(title);
    out.push('\n');
    out.push_str(SECTION_RULE);
    out.push_str("\n\n");
}
