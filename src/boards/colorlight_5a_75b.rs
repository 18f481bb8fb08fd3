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

//! Colorlight 5A-75B LED receiver card (ECP5). Pinout documented by the
//! chubby75 project.

use super::*;

fn io_v7_1() -> Vec<SignalRecord> {
    vec![
        /* clock */
        SignalRecord::pins("clk25", 0, "P6").iostandard("LVCMOS33"),

        /* led */
        SignalRecord::pins("user_led_n", 0, "P11").iostandard("LVCMOS33"),

        /* btn */
        SignalRecord::pins("user_btn_n", 0, "M13").iostandard("LVCMOS33"),

        /* serial, on J1 pins 1 and 2 */
        SignalRecord::subsignals("serial", 0, vec![
            Subsignal::new("tx", "F3"),
            Subsignal::new("rx", "F1"),
        ]).iostandard("LVCMOS33"),

        /* spiflash (W25Q32JV), clk is driven through USRMCLK */
        SignalRecord::subsignals("spiflash", 0, vec![
            Subsignal::new("cs_n", "N8"),
            Subsignal::new("mosi", "T8"),
            Subsignal::new("miso", "T7"),
        ]).iostandard("LVCMOS33"),

        /* sdram (M12616161A), cs_n/dm tied to ground, cke to 3V3 */
        SignalRecord::pins("sdram_clock", 0, "C6").iostandard("LVCMOS33"),
        SignalRecord::subsignals("sdram", 0, vec![
            Subsignal::new("a", Pins::new(&[
                "A9 E10 B12 D13 C12 D11 D10 E9",
                "D9 B7 C8",
            ])),
            Subsignal::new("dq", Pins::new(&[
                "B13 C11 C10 A11 C9 E8  B6  B9",
                "A6  B5  A5  B4  B3 C3  A2  B2",
                "E2  D3  A4  E4  D4 C4  E5  D5",
                "E6  D6  D8  A8  B8 B10 B11 E11",
            ])),
            Subsignal::new("we_n", "C7"),
            Subsignal::new("ras_n", "D7"),
            Subsignal::new("cas_n", "E7"),
            Subsignal::new("ba", "A7"),
        ]).iostandard("LVCMOS33").misc("SLEWRATE=FAST"),

        /* ethernet (B50612D), both PHYs share the management bus and reset */
        SignalRecord::subsignals("eth_clocks", 0, vec![
            Subsignal::new("tx", "M2"),
            Subsignal::new("rx", "M1"),
        ]).iostandard("LVCMOS33"),
        SignalRecord::subsignals("eth", 0, vec![
            Subsignal::new("rst_n", "P5"),
            Subsignal::new("mdio", "T2"),
            Subsignal::new("mdc", "P3"),
            Subsignal::new("rx_ctl", "N6"),
            Subsignal::new("rx_data", "N1 M5 N5 M6"),
            Subsignal::new("tx_ctl", "M3"),
            Subsignal::new("tx_data", "L1 L3 P2 L4"),
        ]).iostandard("LVCMOS33"),
        SignalRecord::subsignals("eth_clocks", 1, vec![
            Subsignal::new("tx", "M12"),
            Subsignal::new("rx", "M16"),
        ]).iostandard("LVCMOS33"),
        SignalRecord::subsignals("eth", 1, vec![
            Subsignal::new("rst_n", "P5"),
            Subsignal::new("mdio", "T2"),
            Subsignal::new("mdc", "P3"),
            Subsignal::new("rx_ctl", "L15"),
            Subsignal::new("rx_data", "P13 N13 P14 M15"),
            Subsignal::new("tx_ctl", "R15"),
            Subsignal::new("tx_data", "T14 R12 R13 R14"),
        ]).iostandard("LVCMOS33"),

        SignalRecord::subsignals("usb", 0, vec![
            Subsignal::new("d_p", "M8"),
            Subsignal::new("d_n", "R2"),
            Subsignal::new("pullup", "P4"),
        ]).iostandard("LVCMOS33"),
    ]
}

/* Only J1 is confirmed on this revision. J2..J8 follow the same layout on the
 * HUB75 headers but are not listed until verified. */
fn connectors_v7_1() -> Vec<ConnectorRecord> {
    vec![
        ConnectorRecord::new("j1", "F3  F1  G3  - G2  H3  H5  F15 L2 K1 J5 K2 B16 J14 F12 -"),
    ]
}

pub fn board() -> BoardDescription {
    BoardDescription {
        name: "colorlight_5a_75b".into(),
        default_clk_name: "clk25".into(),
        default_clk_period_ns: period_ns_from_hz(25e6),
        toolchains: vec![Toolchain::Trellis],
        programmer: Programmer::OpenocdJtag { config: "openocd_colorlight_5a_75b.cfg".into() },
        default_revision: "7.1".into(),
        revisions: vec![
            Revision {
                name: "7.1".into(),
                device: "LFE5U-25F-6BG256C".into(),
                io: io_v7_1(),
                connectors: connectors_v7_1(),
            },
        ],
        period_constraints: vec![
            PeriodConstraint::new("clk25", 0, period_ns_from_hz(25e6)),
            PeriodConstraint::new("eth_clocks:rx", 0, period_ns_from_hz(125e6)),
            PeriodConstraint::new("eth_clocks:rx", 1, period_ns_from_hz(125e6)),
        ],
        platform_commands: Vec::new(),
        shared_pins: vec!["P5".into(), "T2".into(), "P3".into()],
    }
}
