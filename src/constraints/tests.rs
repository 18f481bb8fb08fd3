use super::*;
use crate::boards;
use crate::platform::BoardDescription;

fn board_set(board: &BoardDescription, timing: Vec<TimingConstraint>) -> ConstraintSet {
    let revision = board.revision(&board.default_revision).unwrap();
    ConstraintSet {
        records: revision.io.clone(),
        timing,
        commands: board.platform_commands.clone(),
    }
}

fn normalized(records: &[SignalRecord]) -> Vec<SignalRecord> {
    records.iter().map(|r| r.normalized()).collect()
}

fn assert_periods_close(parsed: &[TimingConstraint], expected: &[TimingConstraint]) {
    assert_eq!(parsed.len(), expected.len());
    for (p, e) in parsed.iter().zip(expected) {
        assert_eq!(p.port, e.port);
        assert!((p.period_ns - e.period_ns).abs() < 1e-9, "{}: {} != {}", p.port, p.period_ns, e.period_ns);
    }
}

#[test]
fn test_xdc_round_trip() {
    let board = boards::get("xcu1525").unwrap();
    let timing = vec![TimingConstraint { port: "clk300_p".into(), period_ns: period_ns_from_hz(300e6) }];
    let set = board_set(board, timing.clone());

    let text = write(ConstraintFormat::Xdc, &set);
    let parsed = parse(ConstraintFormat::Xdc, &text).unwrap();

    assert_eq!(parsed.records, normalized(&set.records));
    assert_eq!(parsed.timing, timing);
    assert_eq!(parsed.commands, board.platform_commands);
}

#[test]
fn test_lpf_round_trip() {
    for name in ["ecpix5", "colorlight_5a_75b"] {
        let board = boards::get(name).unwrap();
        let timing = vec![
            TimingConstraint { port: board.default_clk_name.clone(), period_ns: board.default_clk_period_ns },
            TimingConstraint { port: "eth_clocks_rx".into(), period_ns: period_ns_from_hz(125e6) },
        ];
        let set = board_set(board, timing.clone());

        let text = write(ConstraintFormat::Lpf, &set);
        let parsed = parse(ConstraintFormat::Lpf, &text).unwrap();

        assert_eq!(parsed.records, normalized(&set.records), "{}", name);
        assert_periods_close(&parsed.timing, &timing);
        assert!(parsed.commands.is_empty());
    }
}

#[test]
fn test_xdc_layout() {
    let set = ConstraintSet {
        records: vec![
            SignalRecord::pins("user_led", 1, "BB21").iostandard("LVCMOS12"),
            SignalRecord::subsignals("ddram", 0, vec![
                Subsignal::new("ba", "AT35 AT34").iostandard("SSTL12_DCI"),
            ]).misc("SLEW=FAST"),
        ],
        timing: vec![TimingConstraint { port: "clk300_p".into(), period_ns: 3.2 }],
        commands: vec!["set_property BITSTREAM.GENERAL.COMPRESS TRUE [current_design]".into()],
    };
    let text = write(ConstraintFormat::Xdc, &set);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], SECTION_RULE);
    assert_eq!(lines[0].len(), 80);
    assert_eq!(lines[1], "# IO constraints");
    assert!(lines.contains(&"# user_led:1"));
    assert!(lines.contains(&"set_property LOC BB21 [get_ports {user_led1}]"));
    assert!(lines.contains(&"set_property IOSTANDARD LVCMOS12 [get_ports {user_led1}]"));
    assert!(lines.contains(&"# ddram:0.ba"));
    assert!(lines.contains(&"set_property LOC AT34 [get_ports {ddram_ba[1]}]"));
    assert!(lines.contains(&"set_property SLEW FAST [get_ports {ddram_ba[0]}]"));
    assert!(lines.contains(&"set_property BITSTREAM.GENERAL.COMPRESS TRUE [current_design]"));
    assert_eq!(lines.last(), Some(&"create_clock -name clk300_p -period 3.2 [get_ports {clk300_p}]"));
}

#[test]
fn test_lpf_layout() {
    let set = ConstraintSet {
        records: vec![
            SignalRecord::pins("clk25", 0, "P6").iostandard("LVCMOS33"),
            SignalRecord::subsignals("sdram", 0, vec![
                Subsignal::new("ba", "A7"),
                Subsignal::new("dq", "B13 C11"),
            ]).iostandard("LVCMOS33").misc("SLEWRATE=FAST"),
            SignalRecord::pins("usb_pullup", 0, "P4"),
        ],
        timing: vec![TimingConstraint { port: "clk25".into(), period_ns: 40.0 }],
        commands: Vec::new(),
    };
    let text = write(ConstraintFormat::Lpf, &set);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(&lines[.. 2], &["BLOCK RESETPATHS;", "BLOCK ASYNCPATHS;"]);
    assert!(lines.contains(&"LOCATE COMP \"clk25\" SITE \"P6\";"));
    assert!(lines.contains(&"IOBUF PORT \"clk25\" IO_TYPE=LVCMOS33;"));
    assert!(lines.contains(&"LOCATE COMP \"sdram_dq[1]\" SITE \"C11\";"));
    assert!(lines.contains(&"IOBUF PORT \"sdram_dq[1]\" IO_TYPE=LVCMOS33 SLEWRATE=FAST;"));
    assert!(!lines.iter().any(|l| l.starts_with("IOBUF PORT \"usb_pullup\"")));
    assert_eq!(lines.last(), Some(&"FREQUENCY PORT \"clk25\" 25 MHz;"));
}

#[test]
fn test_attribute_without_value_is_left_out() {
    let set = ConstraintSet {
        records: vec![
            SignalRecord::pins("led", 0, "A1").iostandard("LVCMOS33").misc("PULLUP").misc("DRIVE=8"),
            SignalRecord::pins("btn", 0, "B1").misc("PULLUP"),
        ],
        timing: Vec::new(),
        commands: Vec::new(),
    };
    let expected = vec![
        SignalRecord::pins("led", 0, "A1").iostandard("LVCMOS33").misc("DRIVE=8"),
        SignalRecord::pins("btn", 0, "B1"),
    ];

    for format in [ConstraintFormat::Xdc, ConstraintFormat::Lpf] {
        let text = write(format, &set);
        assert!(!text.contains("PULLUP"), "{:?}:\n{}", format, text);
        assert_eq!(parse(format, &text).unwrap().records, expected, "{:?}", format);
    }
}

#[test]
fn test_xdc_design_commands_stay_verbatim() {
    let commands = vec![
        "set_property CLOCK_DEDICATED_ROUTE FALSE [get_ports {clk}]".to_string(),
        "create_clock -name virt -period 5 [get_ports {clk}]".to_string(),
        "set_property INTERNAL_VREF 0.84 [get_iobanks 41]".to_string(),
    ];
    let set = ConstraintSet {
        records: vec![SignalRecord::pins("clk", 0, "E3").iostandard("LVCMOS33")],
        timing: vec![TimingConstraint { port: "clk".into(), period_ns: 10.0 }],
        commands: commands.clone(),
    };

    let parsed = parse(ConstraintFormat::Xdc, &write(ConstraintFormat::Xdc, &set)).unwrap();
    assert_eq!(parsed.records, set.records);
    assert!(parsed.records[0].misc.is_empty());
    assert_eq!(parsed.commands, commands);
    assert_eq!(parsed.timing, set.timing);
}

#[test]
fn test_parse_errors() {
    assert_eq!(
        parse(ConstraintFormat::Xdc, "set_property LOC A1 [get_ports {led}]\n"),
        Err(ParseError::OrphanPort { line: 1, port: "led".into() })
    );
    assert_eq!(
        parse(ConstraintFormat::Xdc, "# led:0\nset_property LOC A1 [get_ports {btn}]\n"),
        Err(ParseError::UnexpectedPort { line: 2, expected: "led".into(), found: "btn".into() })
    );
    assert_eq!(
        parse(ConstraintFormat::Xdc, "create_clock -period 10\n"),
        Err(ParseError::Syntax { line: 1, text: "create_clock -period 10".into() })
    );
    assert_eq!(
        parse(ConstraintFormat::Lpf, "# bus:0\nLOCATE COMP \"bus[1]\" SITE \"A1\";\n"),
        Err(ParseError::MissingBit { port: "bus".into(), bit: 0 })
    );
    assert_eq!(
        parse(ConstraintFormat::Lpf, "FREQUENCY PORT \"clk25\" fast MHz;\n"),
        Err(ParseError::BadNumber { line: 1, text: "fast".into() })
    );
    assert_eq!(
        parse(ConstraintFormat::Lpf, "LOCATE COMP \"clk25\";\n"),
        Err(ParseError::Syntax { line: 1, text: "LOCATE COMP \"clk25\";".into() })
    );
}

#[test]
fn test_platform_output_reads_back() {
    let board = boards::get("colorlight_5a_75b").unwrap();
    let mut p = crate::platform::Platform::new(board, Default::default()).unwrap();
    p.request("clk25", None).unwrap();
    p.request("serial", None).unwrap();
    let text = p.build_constraints().unwrap();

    let parsed = parse(p.constraint_format(), &text).unwrap();
    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.records[1].subsignal("tx").map(|s| s.pins.clone()), Some(Pins::from("F3")));
    assert_periods_close(&parsed.timing, p.timing());
}

#[test]
fn test_format_names() {
    assert_eq!("XDC".parse::<ConstraintFormat>(), Ok(ConstraintFormat::Xdc));
    assert_eq!("lpf".parse::<ConstraintFormat>(), Ok(ConstraintFormat::Lpf));
    assert!("ucf".parse::<ConstraintFormat>().is_err());
    assert_eq!(ConstraintFormat::Lpf.extension(), ".lpf");
}
