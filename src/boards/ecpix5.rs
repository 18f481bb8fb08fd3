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

use super::*;

fn rgb_led(index: u32, r: &str, g: &str, b: &str) -> SignalRecord {
    SignalRecord::subsignals("rgb_led", index, vec![
        Subsignal::new("r", r),
        Subsignal::new("g", g),
        Subsignal::new("b", b),
    ]).iostandard("LVCMOS33")
}

fn io() -> Vec<SignalRecord> {
    vec![
        /* clock / reset */
        SignalRecord::pins("clk100", 0, "K23").iostandard("LVCMOS33"),
        SignalRecord::pins("rst_n", 0, "N5").iostandard("LVCMOS33"),

        rgb_led(0, "U21", "W21", "T24"),
        rgb_led(1, "T23", "R21", "T22"),
        rgb_led(2, "P21", "R23", "P22"),
        rgb_led(3, "K21", "K24", "M21"),

        SignalRecord::subsignals("serial", 0, vec![
            Subsignal::new("rx", "R26").iostandard("LVCMOS33"),
            Subsignal::new("tx", "R24").iostandard("LVCMOS33"),
        ]),

        /* DDR3 */
        SignalRecord::subsignals("ddram", 0, vec![
            Subsignal::new("a", Pins::new(&[
                "T5 M3 L3 V6 K2 W6 K3 L1",
                "H2 L2 N1 J1 M1 K1",
            ])).iostandard("SSTL15_I"),
            Subsignal::new("ba", "U6 N3 N4").iostandard("SSTL15_I"),
            Subsignal::new("ras_n", "T3").iostandard("SSTL15_I"),
            Subsignal::new("cas_n", "P2").iostandard("SSTL15_I"),
            Subsignal::new("we_n", "R3").iostandard("SSTL15_I"),
            Subsignal::new("dm", "U4 U1").iostandard("SSTL15_I"),
            Subsignal::new("dq", Pins::new(&[
                "T4 W4 R4 W5 R6 P6 P5 P4",
                "R1 W3 T2 V3 U3 W1 T1 W2",
            ])).iostandard("SSTL15_I").misc("TERMINATION=75"),
            Subsignal::new("dqs_p", "V4 V1").iostandard("SSTL15D_I")
                .misc("TERMINATION=OFF")
                .misc("DIFFRESISTOR=100"),
            Subsignal::new("clk_p", "H3").iostandard("SSTL15D_I"),
            Subsignal::new("cke", "P1").iostandard("SSTL15_I"),
            Subsignal::new("odt", "P3").iostandard("SSTL15_I"),
        ]).misc("SLEWRATE=FAST"),

        /* ethernet */
        SignalRecord::subsignals("eth_clocks", 0, vec![
            Subsignal::new("tx", "A12"),
            Subsignal::new("rx", "E11"),
        ]).iostandard("LVCMOS33"),
        /* RGMII mode: pulling rx_data up at reset advertises all capabilities */
        SignalRecord::subsignals("eth", 0, vec![
            Subsignal::new("rst_n", "C13"),
            Subsignal::new("mdio", "A13"),
            Subsignal::new("mdc", "C11"),
            Subsignal::new("rx_ctl", "A11"),
            Subsignal::new("rx_data", "B11 A10 B10 A9").misc("PULLMODE=UP"),
            Subsignal::new("tx_ctl", "C9"),
            Subsignal::new("tx_data", "D8 C8 B8 A8"),
        ]).iostandard("LVCMOS33"),

        SignalRecord::subsignals("sdcard", 0, vec![
            Subsignal::new("data", "N26 N25 N23 N21").misc("PULLMODE=UP"),
            Subsignal::new("cmd", "M24").misc("PULLMODE=UP"),
            Subsignal::new("clk", "P24"),
            Subsignal::new("cmd_dir", "M23"),
            Subsignal::new("dat0_dir", "N24"),
            Subsignal::new("dat13_dir", "P26"),
        ]).iostandard("LVCMOS33"),
    ]
}

pub fn board() -> BoardDescription {
    BoardDescription {
        name: "ecpix5".into(),
        default_clk_name: "clk100".into(),
        default_clk_period_ns: period_ns_from_hz(100e6),
        toolchains: vec![Toolchain::Diamond, Toolchain::Trellis],
        programmer: Programmer::OpenocdJtag { config: "openocd_ecpix5.cfg".into() },
        default_revision: DEFAULT_REVISION.into(),
        revisions: vec![
            Revision {
                name: DEFAULT_REVISION.into(),
                device: "LFE5UM5G-85F-8BG554I".into(),
                io: io(),
                connectors: Vec::new(),
            },
        ],
        period_constraints: vec![
            PeriodConstraint::new("clk100", 0, period_ns_from_hz(100e6)),
            PeriodConstraint::new("eth_clocks:rx", 0, period_ns_from_hz(125e6)),
        ],
        platform_commands: Vec::new(),
        shared_pins: Vec::new(),
    }
}
