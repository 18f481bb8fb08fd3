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

//! Xilinx VCU1525 / Alveo-class accelerator card (Virtex UltraScale+ VU9P),
//! four DDR4 channels.

use super::*;

/* Pins of one DDR4 DIMM channel, in subsignal order */
struct Ddr4Pins<'a> {
    a: [&'a str; 2],
    act_n: &'a str,
    ba: &'a str,
    bg: &'a str,
    cas_n: &'a str,
    cke: &'a str,
    clk_n: &'a str,
    clk_p: &'a str,
    cs_n: &'a str,
    dm: &'a str,
    dq: [&'a str; 8],
    dqs_n: &'a str,
    dqs_p: &'a str,
    odt: &'a str,
    ras_n: &'a str,
    reset_n: &'a str,
    we_n: &'a str,
}

fn ddr4_channel(index: u32, p: Ddr4Pins) -> SignalRecord {
    let data = |name: &str, pins: Pins, std: &str| Subsignal::new(name, pins)
        .iostandard(std)
        .misc("PRE_EMPHASIS=RDRV_240")
        .misc("EQUALIZATION=EQ_LEVEL2");

    SignalRecord::subsignals("ddram", index, vec![
        Subsignal::new("a", Pins::new(&p.a)).iostandard("SSTL12_DCI"),
        Subsignal::new("act_n", p.act_n).iostandard("SSTL12_DCI"),
        Subsignal::new("ba", p.ba).iostandard("SSTL12_DCI"),
        Subsignal::new("bg", p.bg).iostandard("SSTL12_DCI"),
        Subsignal::new("cas_n", p.cas_n).iostandard("SSTL12_DCI"),
        Subsignal::new("cke", p.cke).iostandard("SSTL12_DCI"),
        Subsignal::new("clk_n", p.clk_n).iostandard("DIFF_SSTL12_DCI"),
        Subsignal::new("clk_p", p.clk_p).iostandard("DIFF_SSTL12_DCI"),
        Subsignal::new("cs_n", p.cs_n).iostandard("SSTL12_DCI"),
        Subsignal::new("dm", p.dm).iostandard("POD12_DCI"),
        data("dq", Pins::new(&p.dq), "POD12_DCI"),
        data("dqs_n", p.dqs_n.into(), "DIFF_POD12"),
        data("dqs_p", p.dqs_p.into(), "DIFF_POD12"),
        Subsignal::new("odt", p.odt).iostandard("SSTL12_DCI"),
        Subsignal::new("ras_n", p.ras_n).iostandard("SSTL12_DCI"),
        Subsignal::new("reset_n", p.reset_n).iostandard("LVCMOS12"),
        Subsignal::new("we_n", p.we_n).iostandard("SSTL12_DCI"),
    ]).misc("SLEW=FAST")
}

fn io() -> Vec<SignalRecord> {
    vec![
        SignalRecord::subsignals("clk300", 0, vec![
            Subsignal::new("n", "AY38").iostandard("DIFF_SSTL12"),
            Subsignal::new("p", "AY37").iostandard("DIFF_SSTL12"),
        ]),

        SignalRecord::pins("user_led", 0, "BC21").iostandard("LVCMOS12"),
        SignalRecord::pins("user_led", 1, "BB21").iostandard("LVCMOS12"),
        SignalRecord::pins("user_led", 2, "BA20").iostandard("LVCMOS12"),

        SignalRecord::subsignals("serial", 0, vec![
            Subsignal::new("rx", "BF18").iostandard("LVCMOS12"),
            Subsignal::new("tx", "BB20").iostandard("LVCMOS12"),
        ]),

        /* Transceiver pins take no I/O standard */
        SignalRecord::subsignals("pcie_x4", 0, vec![
            Subsignal::new("rst_n", "BD21").iostandard("LVCMOS12"),
            Subsignal::new("clk_n", "AM10"),
            Subsignal::new("clk_p", "AM11"),
            Subsignal::new("rx_n", "AF1 AG3 AH1 AJ3"),
            Subsignal::new("rx_p", "AF2 AG4 AH2 AJ4"),
            Subsignal::new("tx_n", "AF6 AG8 AH6 AJ8"),
            Subsignal::new("tx_p", "AF7 AG9 AH7 AJ9"),
        ]),

        ddr4_channel(0, Ddr4Pins {
            a: [
                "AT36 AV36 AV37 AW35 AW36 AY36 AY35 BA40",
                "BA37 BB37 AR35 BA39 BB40 AN36",
            ],
            act_n: "BB39",
            ba: "AT35 AT34",
            bg: "BC37 BC39",
            cas_n: "AP36",
            cke: "BC38",
            clk_n: "AW38",
            clk_p: "AV38",
            cs_n: "AR33",
            dm: "AM31 AP30 AL28 AR30 AU29 AY27 BE35 BE31",
            dq: [
                "AW28 AW29 BA28 BA27 BB29 BA29 BC27 BB27",
                "BE28 BF28 BE30 BD30 BF27 BE27 BF30 BF29",
                "BB31 BB32 AY32 AY33 BC32 BC33 BB34 BC34",
                "AV31 AV32 AV34 AW34 AW31 AY31 BA35 BA34",
                "AL30 AM30 AU32 AT32 AN31 AN32 AR32 AR31",
                "AP29 AP28 AN27 AM27 AN29 AM29 AR27 AR28",
                "AT28 AV27 AU27 AT27 AV29 AY30 AW30 AV28",
                "BD34 BD33 BE33 BD35 BF32 BF33 BF34 BF35",
            ],
            dqs_n: "BB30 BC26 BD29 BE26 BB36 BD31 AW33 BA33",
            dqs_p: "BA30 BB26 BD28 BD26 BB35 BC31 AV33 BA32",
            odt: "AP34",
            ras_n: "AR36",
            reset_n: "AU31",
            we_n: "AP35",
        }),
        ddr4_channel(1, Ddr4Pins {
            a: [
                "AN24 AT24 AW24 AN26 AY22 AY23 AV24 BA22",
                "AY25 BA23 AM26 BA25 BB22 AL24",
            ],
            act_n: "AW25",
            ba: "AU24 AP26",
            bg: "BC22 AW26",
            cas_n: "AM25",
            cke: "BB25",
            clk_n: "AU25",
            clk_p: "AT25",
            cs_n: "AV23",
            dm: "BE12 BE15 BC13 BB14 AV18 AW16 AP16 AM17",
            dq: [
                "BD9 BD7 BC7 BD8 BD10 BE10 BE7 BF7",
                "AU13 AV13 AW13 AW14 AU14 AY11 AV14 BA11",
                "BA12 BB12 BA13 BA14 BC9 BB9 BA7 BA8",
                "AN13 AR13 AM13 AP13 AM14 AR15 AL14 AT15",
                "BE13 BD14 BF12 BD13 BD15 BD16 BF14 BF13",
                "AY17 BA17 AY18 BA18 BA15 BB15 BC11 BD11",
                "AV16 AV17 AU16 AU17 BB17 BB16 AT18 AT17",
                "AM15 AL15 AN17 AN16 AR18 AP18 AL17 AL16",
            ],
            dqs_n: "BF9 BF8 AY15 AY12 BB10 BA9 AT13 AP14",
            dqs_p: "BF10 BE8 AW15 AY13 BB11 BA10 AT14 AN14",
            odt: "AW23",
            ras_n: "AN23",
            reset_n: "AR17",
            we_n: "AL25",
        }),
        ddr4_channel(2, Ddr4Pins {
            a: [
                "L29 A33 C33 J29 H31 G31 C32 B32",
                "A32 D31 A34 E31 M30 F33",
            ],
            act_n: "B31",
            ba: "D33 B36",
            bg: "C31 J30",
            cas_n: "G32",
            cke: "G30",
            clk_n: "B34",
            clk_p: "C34",
            cs_n: "B35",
            dm: "E39 G37 N31 T30 L35 M34 J38 H33",
            dq: [
                "R25 P25 M25 L25 P26 R26 N27 N28",
                "J28 H29 H28 G29 K25 L27 K26 K27",
                "F27 E27 E28 D28 G27 G26 F28 F29",
                "D26 C26 B27 B26 A29 A30 C27 C28",
                "F35 E38 D38 E35 E36 E37 F38 G38",
                "P30 R30 P29 N29 L32 M32 P31 N32",
                "J35 K35 L33 K33 J34 J33 N34 P34",
                "H36 G36 H37 J36 K37 K38 G35 G34",
            ],
            dqs_n: "M26 P28 J26 L28 D30 H27 A28 B29",
            dqs_p: "N26 R28 J25 M27 D29 H26 A27 C29",
            odt: "E33",
            ras_n: "K30",
            reset_n: "D36",
            we_n: "A35",
        }),
        /* Vendor channel C3 */
        ddr4_channel(4, Ddr4Pins {
            a: [
                "K15 B15 F14 A15 C14 A14 B14 E13",
                "F13 A13 D14 C13 B13 K16",
            ],
            act_n: "H13",
            ba: "J15 H14",
            bg: "D13 J13",
            cas_n: "E15",
            cke: "K13",
            clk_n: "L13",
            clk_p: "L14",
            cs_n: "B16",
            dm: "A25 D24 C17 B19 F18 H19 F23 H23",
            dq: [
                "P24 N24 T24 R23 N23 P21 P23 R21",
                "J24 J23 H24 G24 L24 L23 K22 K21",
                "G20 H17 F19 G17 J20 L19 L18 J19",
                "M19 M20 R18 R17 R20 T20 N18 N19",
                "A23 A22 B24 B25 B22 C22 C24 C23",
                "C19 C18 C21 B21 A18 A17 A20 B20",
                "E17 F20 E18 E20 D19 D20 H18 J18",
                "F22 E22 G22 G21 F24 E25 F25 G25",
            ],
            dqs_n: "R22 N21 H21 L22 K20 K17 P18 M17",
            dqs_p: "T22 N22 J21 M22 L20 K18 P19 N17",
            odt: "C16",
            ras_n: "F15",
            reset_n: "D21",
            we_n: "D15",
        }),
    ]
}

fn platform_commands() -> Vec<String> {
    let mut commands = vec![
        /* Over-temperature shutdown and bitstream compression */
        "set_property BITSTREAM.CONFIG.OVERTEMPSHUTDOWN ENABLE [current_design]".to_string(),
        "set_property BITSTREAM.GENERAL.COMPRESS TRUE [current_design]".to_string(),
    ];
    /* DDR4 channels C0..C3 use the internal Vref */
    for bank in [41, 42, 43, 65, 66, 67, 46, 47, 48, 70, 71, 72] {
        commands.push(format!("set_property INTERNAL_VREF 0.84 [get_iobanks {}]", bank));
    }
    commands
}

pub fn board() -> BoardDescription {
    BoardDescription {
        name: "xcu1525".into(),
        default_clk_name: "clk300".into(),
        default_clk_period_ns: period_ns_from_hz(300e6),
        toolchains: vec![Toolchain::Vivado],
        programmer: Programmer::Vivado,
        default_revision: DEFAULT_REVISION.into(),
        revisions: vec![
            Revision {
                name: DEFAULT_REVISION.into(),
                device: "xcvu9p-fsgd2104-2l-e".into(),
                io: io(),
                connectors: Vec::new(),
            },
        ],
        period_constraints: vec![
            PeriodConstraint::new("clk300", 0, period_ns_from_hz(300e6)),
        ],
        platform_commands: platform_commands(),
        shared_pins: Vec::new(),
    }
}
