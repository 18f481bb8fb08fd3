use super::*;
use crate::boards;

fn platform(name: &str) -> Platform {
    let board = boards::get(name).unwrap();
    Platform::new(board, PlatformOpts::default()).unwrap()
}

#[test]
fn test_unsupported_revision_is_rejected() {
    let board = boards::get("colorlight_5a_75b").unwrap();
    let opts = PlatformOpts { revision: Some("6.0".into()), ..Default::default() };

    match Platform::new(board, opts) {
        Err(PlatformError::UnsupportedRevision { board, revision, supported }) => {
            assert_eq!(board, "colorlight_5a_75b");
            assert_eq!(revision, "6.0");
            assert_eq!(supported, vec!["7.1".to_string()]);
        },
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("revision 6.0 should not exist"),
    }
}

#[test]
fn test_revision_and_toolchain_selection() {
    let p = platform("colorlight_5a_75b");
    assert_eq!(p.revision(), "7.1");
    assert_eq!(p.device(), "LFE5U-25F-6BG256C");
    assert_eq!(p.toolchain(), Toolchain::Trellis);

    let ecpix5 = boards::get("ecpix5").unwrap();
    let p = Platform::new(ecpix5, PlatformOpts::default()).unwrap();
    assert_eq!(p.toolchain(), Toolchain::Diamond);
    assert_eq!(p.constraint_format(), ConstraintFormat::Lpf);

    let opts = PlatformOpts { toolchain: Some(Toolchain::Trellis), ..Default::default() };
    assert_eq!(Platform::new(ecpix5, opts).unwrap().toolchain(), Toolchain::Trellis);

    let xcu1525 = boards::get("xcu1525").unwrap();
    let opts = PlatformOpts { toolchain: Some(Toolchain::Trellis), ..Default::default() };
    assert!(matches!(
        Platform::new(xcu1525, opts),
        Err(PlatformError::UnsupportedToolchain { toolchain: Toolchain::Trellis, .. })
    ));
}

#[test]
fn test_request() {
    let mut p = platform("colorlight_5a_75b");

    assert_eq!(p.request("eth", None).unwrap().index, 0);
    assert_eq!(p.request("eth", None).unwrap().index, 1);
    assert_eq!(
        p.request("eth", None).unwrap_err(),
        PlatformError::ResourceNotFound { name: "eth".into(), index: None }
    );
    assert_eq!(
        p.request("eth", Some(0)).unwrap_err(),
        PlatformError::ResourceAlreadyRequested { name: "eth".into(), index: 0 }
    );
    assert_eq!(
        p.request("hdmi", Some(0)).unwrap_err(),
        PlatformError::ResourceNotFound { name: "hdmi".into(), index: Some(0) }
    );

    assert!(p.is_requested("eth", 1));
    assert!(!p.is_requested("eth_clocks", 0));
    assert_eq!(p.request_all("eth_clocks").unwrap(), vec![0, 1]);
    assert!(p.request_all("eth_clocks").is_err());
}

#[test]
fn test_lookup_request() {
    let mut p = platform("colorlight_5a_75b");
    p.request("eth_clocks", Some(1)).unwrap();

    let found = p.lookup_request("eth_clocks:rx", None, false).unwrap().unwrap();
    assert_eq!(found, SignalRef { name: "eth_clocks".into(), index: 1, subsignal: Some("rx".into()) });
    assert_eq!(found.port_name(), "eth_clocks1_rx");

    /* Exists but was not requested */
    assert_eq!(p.lookup_request("eth_clocks:rx", Some(0), true), Ok(None));
    assert_eq!(
        p.lookup_request("eth_clocks:rx", Some(0), false),
        Err(PlatformError::LookupFailed { signal: "eth_clocks:rx".into(), index: Some(0) })
    );
    assert_eq!(p.lookup_request("eth_clocks:bogus", None, true), Ok(None));
    assert!(p.lookup_request("clk25", None, false).is_err());
}

#[test]
fn test_finalize_applies_periods() {
    let mut p = platform("colorlight_5a_75b");
    p.request("clk25", None).unwrap();
    p.request_all("eth_clocks").unwrap();
    p.finalize().unwrap();

    let timing: Vec<(&str, f64)> = p.timing().iter()
        .map(|t| (t.port.as_str(), t.period_ns))
        .collect();
    assert_eq!(timing, vec![("clk25", 40.0), ("eth_clocks_rx", 8.0), ("eth_clocks1_rx", 8.0)]);

    /* Second call is a no-op */
    p.finalize().unwrap();
    assert_eq!(p.timing().len(), 3);
}

#[test]
fn test_finalize_skips_unrequested() {
    let mut p = platform("colorlight_5a_75b");
    p.request("eth_clocks", Some(1)).unwrap();
    p.finalize().unwrap();

    assert_eq!(p.timing().len(), 1);
    assert_eq!(p.timing()[0].port, "eth_clocks1_rx");
}

#[test]
fn test_default_clock_period() {
    let mut board = boards::get("ecpix5").unwrap().clone();
    board.period_constraints.clear();
    let mut p = Platform::new(&board, PlatformOpts::default()).unwrap();
    p.request("clk100", None).unwrap();
    p.finalize().unwrap();

    assert_eq!(p.timing(), &[TimingConstraint { port: "clk100".into(), period_ns: 10.0 }]);
}

#[test]
fn test_differential_clock_period() {
    let mut p = platform("xcu1525");
    p.request("clk300", None).unwrap();
    p.finalize().unwrap();

    assert_eq!(p.timing().len(), 1);
    assert_eq!(p.timing()[0].port, "clk300_p");
    assert!((p.timing()[0].period_ns - 3.333).abs() < 1e-3);
    assert_eq!(p.commands().len(), 14);
    assert!(p.commands()[0].contains("OVERTEMPSHUTDOWN"));
}

#[test]
fn test_conflicting_period() {
    let mut p = platform("colorlight_5a_75b");
    p.request("clk25", None).unwrap();
    p.finalize().unwrap();

    let clk = p.lookup_request("clk25", None, false).unwrap().unwrap();
    assert_eq!(p.add_period_constraint(&clk, 40.0), Ok(()));
    assert_eq!(
        p.add_period_constraint(&clk, 20.0),
        Err(PlatformError::ConflictingPeriod {
            port: "clk25".into(),
            existing_ns: 40.0,
            requested_ns: 20.0,
        })
    );
}

#[test]
fn test_connector_pins() {
    let p = platform("colorlight_5a_75b");

    assert_eq!(p.resolve_pin("j1:0"), Ok("F3".to_string()));
    assert_eq!(p.resolve_pin("j1:5"), Ok("H3".to_string()));
    assert_eq!(p.resolve_pin("P6"), Ok("P6".to_string()));
    for bad in ["j1:3", "j1:99", "j9:0", "j1:x"] {
        assert_eq!(
            p.resolve_pin(bad),
            Err(PlatformError::ConnectorPinUnresolved { reference: bad.to_string() })
        );
    }
}

#[test]
fn test_add_extension() {
    let mut p = platform("colorlight_5a_75b");
    let before = p.io().len();

    let clash = SignalRecord::pins("pmod_led", 0, "j1:0 j1:1").iostandard("LVCMOS33");
    match p.add_extension(vec![clash]) {
        Err(PlatformError::InvalidExtension(report)) => {
            assert!(report.violations.iter().any(|v| matches!(
                v, Violation::PinConflict { pin, .. } if pin == "F3"
            )));
        },
        other => panic!("expected a pin conflict, got {:?}", other.err()),
    }
    assert_eq!(p.io().len(), before);

    let led = SignalRecord::pins("pmod_led", 0, "j1:5 j1:6").iostandard("LVCMOS33");
    p.add_extension(vec![led]).unwrap();
    assert_eq!(p.io().len(), before + 1);
    let added = p.io().last().unwrap();
    assert_eq!(added.all_pins(), vec!["H3", "H5"]);
    assert_eq!(p.request("pmod_led", None).unwrap().name, "pmod_led");
}

#[test]
fn test_builtin_boards_validate() {
    for board in boards::all() {
        for revision in &board.revisions {
            let report = validate(&revision.io, &revision.connectors, &board.shared_pins);
            assert!(report.is_ok(), "{} rev. {}:\n{}", board.name, revision.name, report);
        }
    }
}

#[test]
fn test_shared_pins_must_be_declared() {
    let board = boards::get("colorlight_5a_75b").unwrap();
    let revision = board.revision("7.1").unwrap();
    let report = validate(&revision.io, &revision.connectors, &[]);

    let mut pins: Vec<&str> = report.violations.iter()
        .map(|v| match v {
            Violation::PinConflict { pin, .. } => pin.as_str(),
            other => panic!("unexpected violation {}", other),
        })
        .collect();
    pins.sort();
    assert_eq!(pins, vec!["P3", "P5", "T2"]);
}

#[test]
fn test_validator_violations() {
    let io = vec![
        SignalRecord::pins("led", 0, "A1"),
        SignalRecord::pins("led", 0, "A2"),
        SignalRecord::subsignals("spi", 0, vec![
            Subsignal::new("clk", "B1"),
            Subsignal::new("clk", "B2"),
        ]),
        SignalRecord::pins("empty", 0, ""),
        SignalRecord::pins("btn", 1, "C1"),
        SignalRecord::pins("btn1", 0, "C2"),
        SignalRecord::pins("rst", 0, "A1"),
        SignalRecord::subsignals("nothing", 0, vec![]),
        SignalRecord::pins("irq", 0, "D1").misc("PULLUP"),
    ];
    let connectors = vec![
        ConnectorRecord::new("j1", "A1 -"),
        ConnectorRecord::new("j1", "A2"),
    ];

    let report = validate(&io, &connectors, &[]);
    let has = |v: Violation| report.violations.contains(&v);

    assert!(has(Violation::DuplicateSignal { name: "led".into(), index: 0 }));
    assert!(has(Violation::DuplicateSubsignal {
        name: "spi".into(),
        index: 0,
        subsignal: "clk".into(),
    }));
    assert!(has(Violation::EmptyPins { port: "empty".into() }));
    assert!(has(Violation::PortNameCollision { port: "btn1".into() }));
    assert!(has(Violation::PinConflict {
        pin: "A1".into(),
        first: "led".into(),
        second: "rst".into(),
    }));
    assert!(has(Violation::DuplicateConnector { name: "j1".into() }));
    assert!(has(Violation::EmptySubsignals { name: "nothing".into(), index: 0 }));
    assert!(has(Violation::MalformedMisc { port: "irq".into(), misc: "PULLUP".into() }));
    /* The duplicated "led" record is not a port name collision on top */
    assert!(!has(Violation::PortNameCollision { port: "led".into() }));
    assert!(!has(Violation::PortNameCollision { port: "spi_clk".into() }));
    assert_eq!(report.violations.len(), 8);
}

#[test]
fn test_extension_without_subsignals_is_rejected() {
    let mut p = platform("colorlight_5a_75b");
    let before = p.io().len();

    match p.add_extension(vec![SignalRecord::subsignals("pmod", 0, vec![])]) {
        Err(PlatformError::InvalidExtension(report)) => assert_eq!(
            report.violations,
            vec![Violation::EmptySubsignals { name: "pmod".into(), index: 0 }]
        ),
        other => panic!("expected an invalid extension, got {:?}", other.err()),
    }
    assert_eq!(p.io().len(), before);
}

#[test]
fn test_build_constraints_requests_everything() {
    let mut p = platform("xcu1525");
    let xdc = p.build_constraints().unwrap();

    assert_eq!(p.requested_records().len(), p.io().len());
    assert!(xdc.contains("set_property LOC AY37 [get_ports {clk300_p}]"));
    assert!(xdc.contains("set_property IOSTANDARD DIFF_SSTL12 [get_ports {clk300_p}]"));
    assert!(xdc.contains("create_clock -name clk300_p -period"));
    assert!(xdc.contains("set_property INTERNAL_VREF 0.84 [get_iobanks 41]"));
}

#[test]
fn test_record_normalization() {
    let record = SignalRecord::subsignals("eth", 0, vec![
        Subsignal::new("mdc", "C11"),
        Subsignal::new("rx_data", "B11 A10").misc("PULLMODE=UP").misc("SLEWRATE=FAST"),
        Subsignal::new("ref", "D1").iostandard("LVCMOS12"),
    ]).iostandard("LVCMOS33").misc("SLEWRATE=FAST");

    let normalized = record.normalized();
    assert_eq!(normalized.iostandard, None);
    assert!(normalized.misc.is_empty());

    let mdc = normalized.subsignal("mdc").unwrap();
    assert_eq!(mdc.iostandard, Some(IoStandard::Lvcmos33));
    assert_eq!(mdc.misc, vec![Misc::new("SLEWRATE=FAST")]);
    let rx = normalized.subsignal("rx_data").unwrap();
    assert_eq!(rx.misc, vec![Misc::new("SLEWRATE=FAST"), Misc::new("PULLMODE=UP")]);
    assert_eq!(normalized.subsignal("ref").unwrap().iostandard, Some(IoStandard::Lvcmos12));

    let ports = record.ports();
    assert_eq!(ports.len(), 3);
    assert_eq!(ports[1].name, "eth_rx_data");
    assert_eq!(ports[1].tag(), "eth:0.rx_data");
    assert_eq!(ports[1].bits(), vec![("eth_rx_data[0]".to_string(), "B11"), ("eth_rx_data[1]".to_string(), "A10")]);
}
