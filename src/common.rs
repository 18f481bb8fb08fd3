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

/// Placeholder used in connector tables for positions with no FPGA pin behind them.
pub const NC_PIN: &str = "-";

/* Splits whitespace-separated pin groups into a flat list of pin identifiers */
pub fn split_pin_groups<S>(groups: &[S]) -> Vec<String> where S: AsRef<str> {
    groups.iter()
        .flat_map(|g| g.as_ref().split_whitespace())
        .map(|p| p.to_string())
        .collect()
}

/// Name of the toolchain port for a (resource, index, subsignal) triple.
/// Index 0 keeps the bare resource name.
pub fn port_name(name: &str, index: u32, sub: Option<&str>) -> String {
    let mut port = if index == 0 {
        name.to_string()
    } else {
        format!("{}{}", name, index)
    };
    if let Some(sub) = sub {
        port.push('_');
        port.push_str(sub);
    }
    port
}

/// Bit-level port names: a single pin keeps the port name, buses get `port[i]`.
pub fn bit_names(port: &str, width: usize) -> Vec<String> {
    if width == 1 {
        vec![port.to_string()]
    } else {
        (0 .. width).map(|i| format!("{}[{}]", port, i)).collect()
    }
}

/// Splits `port[3]` into `("port", Some(3))`, plain names into `(name, None)`.
pub fn split_bit_name(bit: &str) -> (&str, Option<usize>) {
    if let Some(stripped) = bit.strip_suffix(']') {
        if let Some((base, idx)) = stripped.rsplit_once('[') {
            if let Ok(idx) = idx.parse() {
                return (base, Some(idx));
            }
        }
    }
    (bit, None)
}

/// Location comment tag `name:index` or `name:index.sub`.
pub fn resource_tag(name: &str, index: u32, sub: Option<&str>) -> String {
    match sub {
        Some(sub) => format!("{}:{}.{}", name, index, sub),
        None => format!("{}:{}", name, index),
    }
}

/// Inverse of [`resource_tag`].
pub fn parse_resource_tag(tag: &str) -> Option<(&str, u32, Option<&str>)> {
    let (name, rest) = tag.split_once(':')?;
    let (index, sub) = match rest.split_once('.') {
        Some((index, sub)) => (index, Some(sub)),
        None => (rest, None),
    };
    if name.is_empty() || sub == Some("") {
        return None;
    }
    Some((name, index.parse().ok()?, sub))
}

pub fn period_ns_from_hz(freq_hz: f64) -> f64 {
    1e9 / freq_hz
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pin_groups() {
        let pins = split_pin_groups(&["A9 E10 B12", "  D9  B7 C8"]);
        assert_eq!(pins, vec!["A9", "E10", "B12", "D9", "B7", "C8"]);
    }

    #[test]
    fn test_port_names() {
        assert_eq!(port_name("serial", 0, Some("tx")), "serial_tx");
        assert_eq!(port_name("eth_clocks", 1, Some("rx")), "eth_clocks1_rx");
        assert_eq!(port_name("user_led", 2, None), "user_led2");
        assert_eq!(bit_names("ddram_ba", 2), vec!["ddram_ba[0]", "ddram_ba[1]"]);
        assert_eq!(bit_names("clk25", 1), vec!["clk25"]);
    }

    #[test]
    fn test_bit_name_split() {
        assert_eq!(split_bit_name("ddram_dq[13]"), ("ddram_dq", Some(13)));
        assert_eq!(split_bit_name("clk25"), ("clk25", None));
        assert_eq!(split_bit_name("odd[x]"), ("odd[x]", None));
    }

    #[test]
    fn test_resource_tags() {
        assert_eq!(resource_tag("ddram", 2, Some("dq")), "ddram:2.dq");
        assert_eq!(parse_resource_tag("ddram:2.dq"), Some(("ddram", 2, Some("dq"))));
        assert_eq!(parse_resource_tag("clk25:0"), Some(("clk25", 0, None)));
        assert_eq!(parse_resource_tag("clk25"), None);
        assert_eq!(parse_resource_tag("clk25:x"), None);
    }
}
