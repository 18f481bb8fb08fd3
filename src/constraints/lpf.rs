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

const HEADER: &[&str] = &["BLOCK RESETPATHS;", "BLOCK ASYNCPATHS;"];

lazy_static! {
    static ref RE_LOCATE: Regex = Regex::new(
        r#"^LOCATE\s+COMP\s+"([^"]+)"\s+SITE\s+"([^"]+)"\s*;$"#
    ).unwrap();
    static ref RE_IOBUF: Regex = Regex::new(
        r#"^IOBUF\s+PORT\s+"([^"]+)"((?:\s+[^\s=;]+=[^\s;]+)*)\s*;$"#
    ).unwrap();
    static ref RE_FREQUENCY: Regex = Regex::new(
        r#"^FREQUENCY\s+PORT\s+"([^"]+)"\s+(\S+)\s+MHz\s*;$"#
    ).unwrap();
}

pub fn write(set: &ConstraintSet) -> String {
    let mut out = String::new();
    for line in HEADER {
        out.push_str(line);
        out.push('\n');
    }

    for record in &set.records {
        for port in record.ports() {
            out.push_str(&format!("# {}\n", port.tag()));
            for (bit, pin) in port.bits() {
                out.push_str(&format!("LOCATE COMP \"{}\" SITE \"{}\";\n", bit, pin));
                let misc: Vec<&Misc> = port.misc.iter()
                    .filter(|m| well_formed(m, &port.name))
                    .collect();
                if port.iostandard.is_none() && misc.is_empty() {
                    continue;
                }
                let mut iobuf = format!("IOBUF PORT \"{}\"", bit);
                if let Some(std) = &port.iostandard {
                    iobuf += &format!(" IO_TYPE={}", std);
                }
                for m in misc {
                    iobuf += &format!(" {}", m);
                }
                out.push_str(&iobuf);
                out.push_str(";\n");
            }
        }
    }

    for cmd in &set.commands {
        out.push_str(cmd);
        out.push('\n');
    }

    for t in &set.timing {
        out.push_str(&format!("FREQUENCY PORT \"{}\" {} MHz;\n", t.port, 1e3 / t.period_ns));
    }

    out
}

pub fn parse(text: &str) -> Result<ParsedConstraints, ParseError> {
    let mut assembler = RecordAssembler::default();
    let mut timing = Vec::new();
    let mut commands = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let lineno = lineno + 1;
        let line = line.trim();
        if line.is_empty() || HEADER.contains(&line) {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            assembler.tag(comment);
            continue;
        }

        if let Some(caps) = RE_LOCATE.captures(line) {
            assembler.location(lineno, &caps[1], &caps[2])?;
        } else if let Some(caps) = RE_IOBUF.captures(line) {
            let bit = &caps[1];
            for attr in caps[2].split_whitespace() {
                let (key, value) = attr.split_once('=')
                    .ok_or_else(|| ParseError::Syntax { line: lineno, text: line.to_string() })?;
                if key == "IO_TYPE" {
                    assembler.iostandard(lineno, bit, value)?;
                } else {
                    assembler.misc(lineno, bit, key, value)?;
                }
            }
        } else if let Some(caps) = RE_FREQUENCY.captures(line) {
            let mhz = caps[2].parse::<f64>().map_err(|_| ParseError::BadNumber {
                line: lineno,
                text: caps[2].to_string(),
            })?;
            timing.push(TimingConstraint { port: caps[1].to_string(), period_ns: 1e3 / mhz });
        } else if line.starts_with("LOCATE") || line.starts_with("IOBUF") {
            return Err(ParseError::Syntax { line: lineno, text: line.to_string() });
        } else {
            commands.push(line.to_string());
        }
    }

    Ok(ParsedConstraints { records: assembler.finish()?, timing, commands })
}
