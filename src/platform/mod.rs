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

pub mod board;
pub mod resource;
pub mod validate;
#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::fmt;

pub use self::board::*;
pub use self::resource::*;
pub use self::validate::*;
use crate::common::port_name;
use crate::constraints::{self, ConstraintFormat, ConstraintSet, TimingConstraint};
use crate::log::*;
use crate::programmer::Programmer;

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformError {
    UnsupportedRevision { board: String, revision: String, supported: Vec<String> },
    UnsupportedToolchain { board: String, toolchain: Toolchain },
    ResourceNotFound { name: String, index: Option<u32> },
    ResourceAlreadyRequested { name: String, index: u32 },
    LookupFailed { signal: String, index: Option<u32> },
    ConnectorPinUnresolved { reference: String },
    ConflictingPeriod { port: String, existing_ns: f64, requested_ns: f64 },
    InvalidExtension(ValidationReport),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRevision { board, revision, supported } => write!(
                f, "board {} has no revision \"{}\" (supported: {})",
                board, revision, supported.join(", ")
            ),
            Self::UnsupportedToolchain { board, toolchain } =>
                write!(f, "board {} cannot be built with {}", board, toolchain),
            Self::ResourceNotFound { name, index: Some(index) } =>
                write!(f, "resource {}:{} not found", name, index),
            Self::ResourceNotFound { name, index: None } =>
                write!(f, "no available instance of resource {}", name),
            Self::ResourceAlreadyRequested { name, index } =>
                write!(f, "resource {}:{} already requested", name, index),
            Self::LookupFailed { signal, index: Some(index) } =>
                write!(f, "requested signal {}:{} not found", signal, index),
            Self::LookupFailed { signal, index: None } =>
                write!(f, "requested signal {} not found", signal),
            Self::ConnectorPinUnresolved { reference } =>
                write!(f, "connector pin {} cannot be resolved", reference),
            Self::ConflictingPeriod { port, existing_ns, requested_ns } => write!(
                f, "{} is already constrained to {} ns, refusing {} ns",
                port, existing_ns, requested_ns
            ),
            Self::InvalidExtension(report) =>
                write!(f, "extension conflicts with the pin table:\n{}", report),
        }
    }
}

impl std::error::Error for PlatformError {}

#[derive(Default, Debug, Clone)]
pub struct PlatformOpts {
    pub revision: Option<String>,
    pub toolchain: Option<Toolchain>,
}

/// A requested signal, possibly narrowed down to a single subsignal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRef {
    pub name: String,
    pub index: u32,
    pub subsignal: Option<String>,
}

impl SignalRef {
    pub fn port_name(&self) -> String {
        crate::common::port_name(&self.name, self.index, self.subsignal.as_deref())
    }
}

/// A board bound to one revision and toolchain. Board data is fixed at
/// construction; requests, timing and commands accumulate until the constraint
/// file is produced.
pub struct Platform {
    board: String,
    revision: String,
    device: String,
    toolchain: Toolchain,
    programmer: Programmer,
    default_clk_name: String,
    default_clk_period_ns: f64,
    io: Vec<SignalRecord>,
    connectors: Vec<ConnectorRecord>,
    shared_pins: Vec<String>,
    board_periods: Vec<PeriodConstraint>,
    board_commands: Vec<String>,
    requested: Vec<usize>,
    timing: Vec<TimingConstraint>,
    commands: Vec<String>,
    finalized: bool,
}

impl Platform {
    pub fn new(board: &BoardDescription, opts: PlatformOpts) -> Result<Self, PlatformError> {
        let revision_name = opts.revision.unwrap_or_else(|| board.default_revision.clone());
        let revision = board.revision(&revision_name).ok_or_else(|| {
            PlatformError::UnsupportedRevision {
                board: board.name.clone(),
                revision: revision_name.clone(),
                supported: board.revision_names().into_iter().map(String::from).collect(),
            }
        })?;

        let toolchain = match opts.toolchain {
            Some(t) if board.toolchains.is_empty() || board.toolchains.contains(&t) => t,
            Some(t) => return Err(PlatformError::UnsupportedToolchain {
                board: board.name.clone(),
                toolchain: t,
            }),
            None => board.default_toolchain().unwrap_or(Toolchain::Trellis),
        };

        dbg_log!(
            DBG_INFO, "Platform {} rev. {} ({}, {})",
            board.name, revision.name, revision.device, toolchain
        );

        Ok(Self {
            board: board.name.clone(),
            revision: revision.name.clone(),
            device: revision.device.clone(),
            toolchain,
            programmer: board.programmer.clone(),
            default_clk_name: board.default_clk_name.clone(),
            default_clk_period_ns: board.default_clk_period_ns,
            io: revision.io.clone(),
            connectors: revision.connectors.clone(),
            shared_pins: board.shared_pins.clone(),
            board_periods: board.period_constraints.clone(),
            board_commands: board.platform_commands.clone(),
            requested: Vec::new(),
            timing: Vec::new(),
            commands: Vec::new(),
            finalized: false,
        })
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn revision(&self) -> &str {
        &self.revision
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn toolchain(&self) -> Toolchain {
        self.toolchain
    }

    pub fn io(&self) -> &[SignalRecord] {
        &self.io
    }

    pub fn connectors(&self) -> &[ConnectorRecord] {
        &self.connectors
    }

    pub fn timing(&self) -> &[TimingConstraint] {
        &self.timing
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn create_programmer(&self) -> Programmer {
        self.programmer.clone()
    }

    pub fn validate(&self) -> ValidationReport {
        validate(&self.io, &self.connectors, &self.shared_pins)
    }

    /* Constraint manager --------------------------------------------------- */

    fn find(&self, name: &str, index: u32) -> Option<usize> {
        self.io.iter().position(|r| r.name == name && r.index == index)
    }

    /// Marks a resource as used by the design. Without an index, the lowest
    /// available instance is taken.
    pub fn request(&mut self, name: &str, index: Option<u32>)
        -> Result<&SignalRecord, PlatformError>
    {
        let idx = match index {
            Some(index) => {
                let idx = self.find(name, index).ok_or_else(|| {
                    PlatformError::ResourceNotFound { name: name.to_string(), index: Some(index) }
                })?;
                if self.requested.contains(&idx) {
                    return Err(PlatformError::ResourceAlreadyRequested {
                        name: name.to_string(),
                        index,
                    });
                }
                idx
            },
            None => self.io.iter()
                .enumerate()
                .filter(|(i, r)| r.name == name && !self.requested.contains(i))
                .min_by_key(|(_, r)| r.index)
                .map(|(i, _)| i)
                .ok_or_else(|| {
                    PlatformError::ResourceNotFound { name: name.to_string(), index: None }
                })?,
        };

        dbg_log!(DBG_EXTRA, "Requested {}:{}", name, self.io[idx].index);
        self.requested.push(idx);
        Ok(&self.io[idx])
    }

    /// Requests every remaining instance of `name`, returning their indices.
    pub fn request_all(&mut self, name: &str) -> Result<Vec<u32>, PlatformError> {
        let mut indices: Vec<u32> = self.io.iter()
            .enumerate()
            .filter(|(i, r)| r.name == name && !self.requested.contains(i))
            .map(|(_, r)| r.index)
            .collect();
        if indices.is_empty() {
            return Err(PlatformError::ResourceNotFound { name: name.to_string(), index: None });
        }
        indices.sort();
        for &index in &indices {
            self.request(name, Some(index))?;
        }
        Ok(indices)
    }

    /// Requests everything not yet requested.
    pub fn request_remaining(&mut self) {
        for idx in 0 .. self.io.len() {
            if !self.requested.contains(&idx) {
                self.requested.push(idx);
            }
        }
    }

    pub fn is_requested(&self, name: &str, index: u32) -> bool {
        self.find(name, index).map_or(false, |idx| self.requested.contains(&idx))
    }

    /// Finds a requested signal by `name` or `name:subsignal`. With `loose`,
    /// a signal that is not requested (or does not exist) yields `Ok(None)`.
    pub fn lookup_request(&self, signal: &str, index: Option<u32>, loose: bool)
        -> Result<Option<SignalRef>, PlatformError>
    {
        let (name, sub) = match signal.split_once(':') {
            Some((name, sub)) => (name, Some(sub)),
            None => (signal, None),
        };

        let found = self.requested.iter()
            .map(|&idx| &self.io[idx])
            .filter(|r| r.name == name && index.map_or(true, |i| r.index == i))
            .min_by_key(|r| r.index)
            .and_then(|r| match sub {
                Some(sub) => r.subsignal(sub).map(|s| SignalRef {
                    name: r.name.clone(),
                    index: r.index,
                    subsignal: Some(s.name.clone()),
                }),
                None => Some(SignalRef { name: r.name.clone(), index: r.index, subsignal: None }),
            });

        match found {
            Some(found) => Ok(Some(found)),
            None if loose => Ok(None),
            None => Err(PlatformError::LookupFailed { signal: signal.to_string(), index }),
        }
    }

    /// Translates a `connector:position` reference into a package pin. Plain
    /// pin names are returned unchanged.
    pub fn resolve_pin(&self, pin: &str) -> Result<String, PlatformError> {
        let (connector, position) = match pin.split_once(':') {
            Some(v) => v,
            None => return Ok(pin.to_string()),
        };
        let unresolved = || PlatformError::ConnectorPinUnresolved { reference: pin.to_string() };
        let position: usize = position.parse().map_err(|_| unresolved())?;
        self.connectors.iter()
            .find(|c| c.name == connector)
            .and_then(|c| c.pin(position))
            .map(|p| p.to_string())
            .ok_or_else(unresolved)
    }

    /// Adds records (e.g. for an add-on board plugged into a connector).
    /// Connector references are resolved and the result must not conflict with
    /// the existing table.
    pub fn add_extension(&mut self, records: Vec<SignalRecord>) -> Result<(), PlatformError> {
        let mut resolved = Vec::with_capacity(records.len());
        for mut record in records {
            match &mut record.body {
                SignalBody::Pins(pins) => self.resolve_pins(pins)?,
                SignalBody::Subsignals(subs) => {
                    for s in subs.iter_mut() {
                        self.resolve_pins(&mut s.pins)?;
                    }
                },
            }
            resolved.push(record);
        }

        let mut candidate = self.io.clone();
        candidate.extend(resolved.iter().cloned());
        let report = validate(&candidate, &self.connectors, &self.shared_pins);
        if !report.is_ok() {
            return Err(PlatformError::InvalidExtension(report));
        }

        self.io = candidate;
        Ok(())
    }

    fn resolve_pins(&self, pins: &mut Pins) -> Result<(), PlatformError> {
        for pin in pins.0.iter_mut() {
            *pin = self.resolve_pin(pin)?;
        }
        Ok(())
    }

    /* Timing and vendor commands ------------------------------------------- */

    /* A differential clock is constrained on its positive leg */
    fn clock_port(&self, signal: &SignalRef) -> String {
        if signal.subsignal.is_none() {
            let positive = self.find(&signal.name, signal.index)
                .and_then(|idx| self.io[idx].subsignal("p"));
            if positive.is_some() {
                return port_name(&signal.name, signal.index, Some("p"));
            }
        }
        signal.port_name()
    }

    pub fn add_period_constraint(&mut self, signal: &SignalRef, period_ns: f64)
        -> Result<(), PlatformError>
    {
        let port = self.clock_port(signal);
        if let Some(existing) = self.timing.iter().find(|t| t.port == port) {
            if existing.period_ns == period_ns {
                return Ok(());
            }
            return Err(PlatformError::ConflictingPeriod {
                port,
                existing_ns: existing.period_ns,
                requested_ns: period_ns,
            });
        }
        dbg_log!(DBG_INFO, "Period constraint {} = {} ns", port, period_ns);
        self.timing.push(TimingConstraint { port, period_ns });
        Ok(())
    }

    pub fn add_platform_command(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }

    /// Applies the board's timing constraints to whatever got requested and
    /// appends its vendor commands. Calling it again does nothing.
    pub fn finalize(&mut self) -> Result<(), PlatformError> {
        if self.finalized {
            return Ok(());
        }

        for pc in self.board_periods.clone() {
            if let Some(signal) = self.lookup_request(&pc.signal, Some(pc.index), true)? {
                self.add_period_constraint(&signal, pc.period_ns)?;
            }
        }

        let default_clk = self.default_clk_name.clone();
        if let Some(signal) = self.lookup_request(&default_clk, None, true)? {
            let port = self.clock_port(&signal);
            if !self.timing.iter().any(|t| t.port == port) {
                self.add_period_constraint(&signal, self.default_clk_period_ns)?;
            }
        }

        for cmd in self.board_commands.clone() {
            self.add_platform_command(&cmd);
        }

        self.finalized = true;
        Ok(())
    }

    /// Requested records in table order.
    pub fn requested_records(&self) -> Vec<&SignalRecord> {
        let requested: HashSet<usize> = self.requested.iter().copied().collect();
        self.io.iter()
            .enumerate()
            .filter(|(i, _)| requested.contains(i))
            .map(|(_, r)| r)
            .collect()
    }

    /// Finalizes the platform and renders the toolchain constraint file. When
    /// nothing was requested, the whole table is constrained.
    pub fn build_constraints(&mut self) -> Result<String, PlatformError> {
        if self.requested.is_empty() {
            self.request_remaining();
        }
        self.finalize()?;
        Ok(constraints::write(self.toolchain.constraint_format(), &self.constraint_set()))
    }

    pub fn constraint_set(&self) -> ConstraintSet {
        ConstraintSet {
            records: self.requested_records().into_iter().cloned().collect(),
            timing: self.timing.clone(),
            commands: self.commands.clone(),
        }
    }

    pub fn constraint_format(&self) -> ConstraintFormat {
        self.toolchain.constraint_format()
    }
}
