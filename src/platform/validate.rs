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

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::resource::*;
use crate::log::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DuplicateSignal { name: String, index: u32 },
    DuplicateSubsignal { name: String, index: u32, subsignal: String },
    EmptyPins { port: String },
    EmptySubsignals { name: String, index: u32 },
    MalformedMisc { port: String, misc: String },
    /* `first` and `second` are port names */
    PinConflict { pin: String, first: String, second: String },
    PortNameCollision { port: String },
    DuplicateConnector { name: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSignal { name, index } =>
                write!(f, "signal {}:{} declared more than once", name, index),
            Self::DuplicateSubsignal { name, index, subsignal } =>
                write!(f, "subsignal \"{}\" declared more than once in {}:{}", subsignal, name, index),
            Self::EmptyPins { port } =>
                write!(f, "port {} has no pins", port),
            Self::EmptySubsignals { name, index } =>
                write!(f, "signal {}:{} has no subsignals", name, index),
            Self::MalformedMisc { port, misc } =>
                write!(f, "attribute \"{}\" of port {} is not KEY=VALUE", misc, port),
            Self::PinConflict { pin, first, second } =>
                write!(f, "pin {} assigned to both {} and {}", pin, first, second),
            Self::PortNameCollision { port } =>
                write!(f, "more than one record flattens to port {}", port),
            Self::DuplicateConnector { name } =>
                write!(f, "connector {} declared more than once", name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return writeln!(f, "OK");
        }
        for v in &self.violations {
            writeln!(f, "  {}", v)?;
        }
        Ok(())
    }
}

/// Checks a pin table and its connectors. `shared_pins` lists pins that the
/// board wires to several records on purpose; those are not reported.
pub fn validate(
    io: &[SignalRecord],
    connectors: &[ConnectorRecord],
    shared_pins: &[String],
) -> ValidationReport {
    let mut violations = Vec::new();

    let mut seen_signals = HashSet::new();
    for record in io {
        if !seen_signals.insert((record.name.as_str(), record.index)) {
            violations.push(Violation::DuplicateSignal {
                name: record.name.clone(),
                index: record.index,
            });
        }
        if let SignalBody::Subsignals(subs) = &record.body {
            if subs.is_empty() {
                violations.push(Violation::EmptySubsignals {
                    name: record.name.clone(),
                    index: record.index,
                });
            }
            let mut seen_subs = HashSet::new();
            for s in subs {
                if !seen_subs.insert(s.name.as_str()) {
                    violations.push(Violation::DuplicateSubsignal {
                        name: record.name.clone(),
                        index: record.index,
                        subsignal: s.name.clone(),
                    });
                }
            }
        }
    }

    let shared: HashSet<&str> = shared_pins.iter().map(|p| p.as_str()).collect();
    let mut pin_owner: HashMap<String, String> = HashMap::new();
    let mut port_owner: HashMap<String, (&str, u32)> = HashMap::new();
    for record in io {
        let key = (record.name.as_str(), record.index);
        for port in record.ports() {
            if port.pins.is_empty() {
                violations.push(Violation::EmptyPins { port: port.name.clone() });
            }
            for m in port.misc.iter().filter(|m| !m.is_well_formed()) {
                violations.push(Violation::MalformedMisc {
                    port: port.name.clone(),
                    misc: m.to_string(),
                });
            }
            /* Repeats within one (name, index) are reported as duplicates above */
            match port_owner.get(&port.name) {
                Some(owner) if *owner != key =>
                    violations.push(Violation::PortNameCollision { port: port.name.clone() }),
                Some(_) => (),
                None => {
                    port_owner.insert(port.name.clone(), key);
                },
            }
            for pin in port.pins.iter() {
                if shared.contains(pin.as_str()) {
                    continue;
                }
                match pin_owner.get(pin) {
                    Some(first) => violations.push(Violation::PinConflict {
                        pin: pin.clone(),
                        first: first.clone(),
                        second: port.name.clone(),
                    }),
                    None => {
                        pin_owner.insert(pin.clone(), port.name.clone());
                    }
                }
            }
        }
    }

    let mut seen_connectors = HashSet::new();
    for c in connectors {
        if !seen_connectors.insert(c.name.as_str()) {
            violations.push(Violation::DuplicateConnector { name: c.name.clone() });
        }
    }

    for v in &violations {
        dbg_log!(DBG_WARN, "{}", v);
    }

    ValidationReport { violations }
}
