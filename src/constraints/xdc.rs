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

use regex::Regex;

use super::*;

lazy_static! {
    static ref RE_PORT_PROPERTY: Regex = Regex::new(
        r"^set_property\s+(\S+)\s+(\S+)\s+\[get_ports\s+\{?(\S+?)\}?\]$"
    ).unwrap();
    static ref RE_CREATE_CLOCK: Regex = Regex::new(
        r"^create_clock\s+-name\s+(\S+)\s+-period\s+(\S+)\s+\[get_ports\s+\{?(\S+?)\}?\]$"
    ).unwrap();
}

fn port_property(out: &mut String, key: &str, value: &str, bit: &str) {
    out.push_str(&format!("set_property {} {} [get_ports {{{}}}]\n", key, value, bit));
}

pub fn write(set: &ConstraintSet) -> String {
    let mut out = String::new();

    section(&mut out, "IO constraints");
    for record in &set.records {
        for port in record.ports() {
            out.push_str(&format!("# {}\n", port.tag()));
            for (bit, pin) in port.bits() {
                port_property(&mut out, "LOC", pin, &bit);
                if let Some(std) = &port.iostandard {
                    port_property(&mut out, "IOSTANDARD", std.as_str(), &bit);
                }
                for m in port.misc.iter().filter(|m| well_formed(m, &port.name)) {
                    if let Some(value) = m.value() {
                        port_property(&mut out, m.key(), value, &bit);
                    }
                }
            }
            out.push('\n');
        }
    }

    section(&mut out, "Design constraints");
    for cmd in &set.commands {
        out.push_str(cmd);
        out.push('\n');
    }
    out.push('\n');

    section(&mut out, "Clock constraints");
    for t in &set.timing {
        out.push_str(&format!(
            "create_clock -name {} -period {} [get_ports {{{}}}]\n",
            t.port, t.period_ns, t.port
        ));
    }

    out
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Section {
    Io,
    Design,
    Clock,
}

impl Section {
    fn from_banner(title: &str) -> Option<Self> {
        match title {
            "IO constraints" => Some(Self::Io),
            "Design constraints" => Some(Self::Design),
            "Clock constraints" => Some(Self::Clock),
            _ => None,
        }
    }
}

/// Text before the first banner is read as IO constraints. Lines in the design
/// section are kept as commands verbatim, whatever they look like.
pub fn parse(text: &str) -> Result<ParsedConstraints, ParseError> {
    let mut assembler = RecordAssembler::default();
    let mut timing = Vec::new();
    let mut commands = Vec::new();
    let mut section = Section::Io;

    for (lineno, line) in text.lines().enumerate() {
        let lineno = lineno + 1;
        let line = line.trim();
        if line.is_empty() || line == SECTION_RULE {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if let Some(next) = Section::from_banner(comment.trim()) {
                section = next;
            } else if section == Section::Io {
                /* Free comments are not resource tags */
                assembler.tag(comment);
            } else if section == Section::Design {
                commands.push(line.to_string());
            }
            continue;
        }

        if section == Section::Design {
            commands.push(line.to_string());
        } else if let (Section::Io, Some(caps)) = (section, RE_PORT_PROPERTY.captures(line)) {
            let (key, value, bit) = (&caps[1], &caps[2], &caps[3]);
            match key {
                "LOC" | "PACKAGE_PIN" => assembler.location(lineno, bit, value)?,
                "IOSTANDARD" => assembler.iostandard(lineno, bit, value)?,
                _ => assembler.misc(lineno, bit, key, value)?,
            }
        } else if let Some(caps) = RE_CREATE_CLOCK.captures(line) {
            let period_ns = caps[2].parse::<f64>().map_err(|_| ParseError::BadNumber {
                line: lineno,
                text: caps[2].to_string(),
            })?;
            timing.push(TimingConstraint { port: caps[3].to_string(), period_ns });
        } else if line.starts_with("create_clock") {
            return Err(ParseError::Syntax { line: lineno, text: line.to_string() });
        } else {
            commands.push(line.to_string());
        }
    }

    Ok(ParsedConstraints { records: assembler.finish()?, timing, commands })
}
