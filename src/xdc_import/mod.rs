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

//! Builds a pin table out of a vendor master XDC file.
//!
//! Port names follow the Alveo (U200/U250/VCU1525) board files. Other boards
//! need their own naming rules in [`map_port`] and their own extras.


use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;

use crate::log::*;
use crate::platform::{Misc, Pins, SignalBody, SignalRecord, Subsignal, IoStandard};

#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    UnknownPort(String),
    BadPort(String),
    MissingBit { resource: String, signal: String, bit: usize },
    NoPackagePins,
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPort(p) => write!(f, "no naming rule for port {}", p),
            Self::BadPort(p) => write!(f, "malformed port name {}", p),
            Self::MissingBit { resource, signal, bit } =>
                write!(f, "{}.{} has no pin for bit {}", resource, signal, bit),
            Self::NoPackagePins => write!(f, "no PACKAGE_PIN constraints found"),
        }
    }
}

impl std::error::Error for ImportError {}

#[derive(Default, Debug, Clone)]
pub struct ImportOpts {
    /// Skip ports with no naming rule or a malformed name instead of failing.
    pub lenient: bool,
}

/// Resource key: name and index.
type ResKey = (String, u32);

/// Where a port lands: its resource, subsignal name and bit within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub resource: ResKey,
    pub signal: String,
    pub bit: usize,
}

#[derive(Clone, Copy)]
enum Extra {
    Std(&'static str),
    Attr(&'static str),
}

/* Wildcard "*" matches any signal of a resource, `None` applies to the record */
type ExtraKey = (&'static str, Option<&'static str>);

lazy_static! {
    static ref RE_PACKAGE_PIN: Regex = Regex::new(r"PACKAGE_PIN\s+([A-Za-z0-9_]+)").unwrap();
    static ref RE_GET_PORTS: Regex = Regex::new(r#"get_ports\s+[{"]?([^\s{}"\]]+)"#).unwrap();
    static ref RE_DDR4: Regex = Regex::new(r"^DDR4_C(\d)_(.*)$").unwrap();

    static ref EXTRAS: Vec<(ExtraKey, Vec<Extra>)> = {
        use Extra::*;

        let dq = vec![
            Std("POD12_DCI"),
            Attr("PRE_EMPHASIS=RDRV_240"),
            Attr("EQUALIZATION=EQ_LEVEL2"),
        ];
        let dqs = vec![
            Std("DIFF_POD12"),
            Attr("PRE_EMPHASIS=RDRV_240"),
            Attr("EQUALIZATION=EQ_LEVEL2"),
        ];
        let lvcmos12 = vec![Std("LVCMOS12")];

        let mut m: Vec<(ExtraKey, Vec<Extra>)> = Vec::new();
        m.push((("ddram", Some("dm")), vec![Std("POD12_DCI")]));
        m.push((("ddram", Some("dq")), dq));
        m.push((("ddram", Some("dqs_p")), dqs.clone()));
        m.push((("ddram", Some("dqs_n")), dqs));
        m.push((("ddram", Some("clk_p")), vec![Std("DIFF_SSTL12_DCI")]));
        m.push((("ddram", Some("clk_n")), vec![Std("DIFF_SSTL12_DCI")]));
        m.push((("ddram", Some("reset_n")), lvcmos12.clone()));
        m.push((("ddram", Some("*")), vec![Std("SSTL12_DCI")]));
        m.push((("ddram", None), vec![Attr("SLEW=FAST")]));
        m.push((("clk300", Some("*")), vec![Std("DIFF_SSTL12")]));
        m.push((("user_si570_clock", Some("*")), vec![Std("DIFF_SSTL12")]));
        for res in [
            "cpu_reset", "ddr4_reset_gate", "gpio_msp", "user_led", "dip_sw", "set_sw",
            "serial", "i2c", "i2c_main_reset_n", "serial_msp",
        ] {
            m.push(((res, Some("*")), lvcmos12.clone()));
        }
        m.push((("pcie_x16", Some("rst_n")), lvcmos12.clone()));
        for sig in ["modskll", "resetl", "intl", "lpmode", "refclk_reset", "fs0", "fs1"] {
            m.push((("qsfp28", Some(sig)), lvcmos12.clone()));
        }
        m
    };

    static ref SIMPLE_PORTS: HashMap<&'static str, (&'static str, u32)> = {
        let mut m = HashMap::new();
        m.insert("CPU_RESET_FPGA", ("cpu_reset", 0));
        m.insert("DDR4_RESET_GATE", ("ddr4_reset_gate", 0));
        m.insert("GPIO_MSP0", ("gpio_msp", 0));
        m.insert("GPIO_MSP1", ("gpio_msp", 1));
        m.insert("GPIO_MSP2", ("gpio_msp", 2));
        m.insert("GPIO_MSP3", ("gpio_msp", 3));
        m.insert("STATUS_LED0_FPGA", ("user_led", 0));
        m.insert("STATUS_LED1_FPGA", ("user_led", 1));
        m.insert("STATUS_LED2_FPGA", ("user_led", 2));
        m.insert("SW_DP0", ("dip_sw", 0));
        m.insert("SW_DP1", ("dip_sw", 1));
        m.insert("SW_DP2", ("dip_sw", 2));
        m.insert("SW_DP3", ("dip_sw", 3));
        m.insert("SW_SET1_FPGA", ("set_sw", 0));
        m.insert("I2C_MAIN_RESET_B_LS", ("i2c_main_reset_n", 0));
        m
    };
}

/// Extracts `(pin, port)` from a constraint line, if it places a package pin.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    if !line.contains("PACKAGE_PIN") {
        return None;
    }
    let pin = RE_PACKAGE_PIN.captures(line)?.get(1)?.as_str().to_string();
    let port = RE_GET_PORTS.captures(line)?.get(1)?.as_str().to_string();
    Some((pin, port))
}

/// DQS strobes are numbered with all the upper-nibble strobes after the lower
/// ones in the vendor file; interleave them back.
pub fn permute_dqs(i: usize) -> usize {
    if i >= 9 {
        (i - 9) * 2 + 1
    } else {
        i * 2
    }
}

fn num<T: std::str::FromStr>(port: &str, s: Option<&str>) -> Result<T, ImportError> {
    s.and_then(|s| s.parse().ok()).ok_or_else(|| ImportError::BadPort(port.to_string()))
}

fn last_lower(port: &str) -> String {
    port.chars().last().map(|c| c.to_ascii_lowercase().to_string()).unwrap_or_default()
}

fn mapping(res: &str, index: u32, signal: &str, bit: usize) -> Option<Mapping> {
    Some(Mapping { resource: (res.to_string(), index), signal: signal.to_string(), bit })
}

fn map_ddr4(port: &str, channel: u32, x: &str) -> Result<Option<Mapping>, ImportError> {
    let ddr = |signal: &str, bit: usize| mapping("ddram", channel, signal, bit);

    /* Lines the fitted DIMM leaves unconnected are dropped */
    let m = if let Some(i) = x.strip_prefix("ADR") {
        match num::<usize>(port, Some(i))? {
            17 => None,
            16 => ddr("ras_n", 0),
            15 => ddr("cas_n", 0),
            14 => ddr("we_n", 0),
            i => ddr("a", i),
        }
    } else if let Some(i) = x.strip_prefix("BA") {
        ddr("ba", num(port, Some(i))?)
    } else if let Some(i) = x.strip_prefix("BG") {
        ddr("bg", num(port, Some(i))?)
    } else if let Some(i) = x.strip_prefix("CK_T") {
        match num::<usize>(port, Some(i))? { 0 => ddr("clk_p", 0), _ => None }
    } else if let Some(i) = x.strip_prefix("CK_C") {
        match num::<usize>(port, Some(i))? { 0 => ddr("clk_n", 0), _ => None }
    } else if let Some(i) = x.strip_prefix("CKE") {
        match num::<usize>(port, Some(i))? { 0 => ddr("cke", 0), _ => None }
    } else if let Some(i) = x.strip_prefix("CS_B") {
        match num::<usize>(port, Some(i))? { 0 => ddr("cs_n", 0), _ => None }
    } else if let Some(i) = x.strip_prefix("ODT") {
        match num::<usize>(port, Some(i))? { 0 => ddr("odt", 0), _ => None }
    } else if x == "ACT_B" {
        ddr("act_n", 0)
    } else if x == "RESET_N" {
        ddr("reset_n", 0)
    } else if matches!(x, "ALERT_B" | "EVENT_B" | "PAR") {
        None
    } else if let Some(i) = x.strip_prefix("DQS_T") {
        let i = permute_dqs(num(port, Some(i))?);
        if i >= 16 { None } else { ddr("dqs_p", i) }
    } else if let Some(i) = x.strip_prefix("DQS_C") {
        let i = permute_dqs(num(port, Some(i))?);
        if i >= 16 { None } else { ddr("dqs_n", i) }
    } else if let Some(i) = x.strip_prefix("DQ") {
        match num::<usize>(port, Some(i))? {
            i if i >= 64 => None,
            i => ddr("dq", i),
        }
    } else {
        return Err(ImportError::UnknownPort(port.to_string()));
    };
    Ok(m)
}

/// Maps a vendor port name. `Ok(None)` for ports that are deliberately left
/// out (power rails, sysmon, test points, unused DIMM lines).
pub fn map_port(port: &str) -> Result<Option<Mapping>, ImportError> {
    if let Some(caps) = RE_DDR4.captures(port) {
        let channel = num(port, Some(&caps[1]))?;
        return map_ddr4(port, channel, &caps[2]);
    }

    if let Some((res, index)) = SIMPLE_PORTS.get(port) {
        return Ok(mapping(res, *index, res, 0));
    }

    let bad = || ImportError::BadPort(port.to_string());
    let m = if port.starts_with("SYSCLK") && port.contains("_300_") {
        mapping("clk300", num(port, port.get(6 .. 7))?, &last_lower(port), 0)
    } else if let Some(rest) = port.strip_prefix("PEX_") {
        if rest.starts_with("TX") || rest.starts_with("RX") {
            let end = port.rfind('_').ok_or_else(bad)?;
            let lane = num(port, port.get(6 .. end))?;
            let dir = rest[.. 2].to_ascii_lowercase();
            mapping("pcie_x16", 0, &format!("{}_{}", dir, last_lower(port)), lane)
        } else if rest.starts_with("REFCLK") {
            mapping("pcie_x16", 0, &format!("clk_{}", last_lower(port)), 0)
        } else {
            return Err(ImportError::UnknownPort(port.to_string()));
        }
    } else if port == "PCIE_PERST_LS" {
        mapping("pcie_x16", 0, "rst_n", 0)
    } else if port.starts_with("USB_UART_") {
        /* Named from the FTDI side */
        let signal = if port.ends_with("RX") { "tx" } else { "rx" };
        mapping("serial", 0, signal, 0)
    } else if port.starts_with("MGT_SI570_CLOCK") {
        mapping("mgt_si570_clock", num(port, port.get(15 .. 16))?, &last_lower(port), 0)
    } else if port.starts_with("USER_SI570_CLOCK") {
        mapping("user_si570_clock", 0, &last_lower(port), 0)
    } else if port.starts_with("QSFP") {
        let cage = num(port, port.get(4 .. 5))?;
        let kind = port.get(6 ..).ok_or_else(bad)?;
        if kind.starts_with("TX") || kind.starts_with("RX") {
            let lane: usize = num(port, port.get(8 .. 9))?;
            let lane = lane.checked_sub(1).ok_or_else(bad)?;
            let signal = format!("{}{}", kind[.. 2].to_ascii_lowercase(), last_lower(port));
            mapping("qsfp28", cage, &signal, lane)
        } else if kind.starts_with("CLOCK") {
            mapping("qsfp28", cage, &format!("clk_{}", last_lower(port)), 0)
        } else if port.ends_with("REFCLK_RESET") || port.contains("_FS") {
            mapping("qsfp28", cage, &kind.to_ascii_lowercase(), 0)
        } else if port.ends_with("_LS") {
            let signal = port.split('_').nth(1).ok_or_else(bad)?.to_ascii_lowercase();
            mapping("qsfp28", cage, &signal, 0)
        } else {
            return Err(ImportError::UnknownPort(port.to_string()));
        }
    } else if port.starts_with("I2C_FPGA_") {
        let signal = port.split('_').nth(2).ok_or_else(bad)?.to_ascii_lowercase();
        mapping("i2c", 0, &signal, 0)
    } else if port.ends_with("_MSP") {
        let mut signal = port.split('_').nth(1).ok_or_else(bad)?.to_ascii_lowercase();
        signal.pop();
        mapping("serial_msp", 0, &signal, 0)
    } else if port == "No"
        || port.starts_with("VR")
        || port.starts_with("N3")
        || port.contains("SYSMON")
        || port.starts_with("TEST")
    {
        None
    } else {
        return Err(ImportError::UnknownPort(port.to_string()));
    };
    Ok(m)
}

fn apply_extras(
    res: &str,
    key: Option<&str>,
    iostandard: &mut Option<IoStandard>,
    misc: &mut Vec<Misc>,
) {
    let lookup = |sig: Option<&str>| EXTRAS.iter()
        .find(|((r, s), _)| *r == res && *s == sig)
        .map(|(_, extras)| extras);
    let extras = match key {
        Some(sig) => lookup(Some(sig)).or_else(|| lookup(Some("*"))),
        None => lookup(None),
    };
    for extra in extras.into_iter().flatten() {
        match extra {
            Extra::Std(s) => *iostandard = Some((*s).into()),
            Extra::Attr(s) => misc.push(Misc::new(s)),
        }
    }
}

/// Turns the text of a vendor XDC into signal records, sorted by resource name
/// and index, subsignals sorted by name.
pub fn import(text: &str, opts: ImportOpts) -> Result<Vec<SignalRecord>, ImportError> {
    let mut groups: BTreeMap<ResKey, BTreeMap<String, BTreeMap<usize, String>>> = BTreeMap::new();
    let mut placed = 0;

    for line in text.lines() {
        let (pin, port) = match parse_line(line) {
            Some(v) => v,
            None => continue,
        };
        placed += 1;
        let m = match map_port(&port) {
            Ok(Some(m)) => m,
            Ok(None) => continue,
            Err(ImportError::UnknownPort(p)) if opts.lenient => {
                dbg_log!(DBG_WARN, "Skipping port {} (no naming rule)", p);
                continue;
            },
            Err(ImportError::BadPort(p)) if opts.lenient => {
                dbg_log!(DBG_WARN, "Skipping port {} (malformed name)", p);
                continue;
            },
            Err(e) => return Err(e),
        };
        groups.entry(m.resource)
            .or_default()
            .entry(m.signal)
            .or_default()
            .insert(m.bit, pin);
    }

    if placed == 0 {
        return Err(ImportError::NoPackagePins);
    }

    let mut records = Vec::with_capacity(groups.len());
    for ((res, index), signals) in groups {
        let mut subsignals = Vec::with_capacity(signals.len());
        for (signal, bits) in signals {
            let width = bits.keys().max().map_or(0, |m| m + 1);
            let mut pins = Vec::with_capacity(width);
            for bit in 0 .. width {
                let pin = bits.get(&bit).ok_or_else(|| ImportError::MissingBit {
                    resource: res.clone(),
                    signal: signal.clone(),
                    bit,
                })?;
                pins.push(pin.clone());
            }
            let mut sub = Subsignal {
                name: signal,
                pins: Pins(pins),
                iostandard: None,
                misc: Vec::new(),
            };
            apply_extras(&res, Some(&sub.name), &mut sub.iostandard, &mut sub.misc);
            subsignals.push(sub);
        }

        /* Only channel 0 keeps the plain DDR name */
        let (name, index) = if res == "ddram" && index > 0 {
            (format!("ddram_ch{}", index + 1), 0)
        } else {
            (res.clone(), index)
        };

        let mut record = if subsignals.len() == 1 {
            let sub = subsignals.remove(0);
            SignalRecord {
                name,
                index,
                body: SignalBody::Pins(sub.pins),
                iostandard: sub.iostandard,
                misc: sub.misc,
            }
        } else {
            SignalRecord::subsignals(&name, index, subsignals)
        };
        apply_extras(&res, None, &mut record.iostandard, &mut record.misc);

        dbg_log!(DBG_EXTRA, "Imported {}:{}", record.name, record.index);
        records.push(record);
    }

    Ok(records)
}
