use super::*;
use crate::boards;
use crate::platform::{Misc, Pins, SignalRecord};
use crate::programmer::Programmer;

#[test]
fn test_encoding_from_path() {
    assert_eq!(Encoding::from_path(Path::new("board.json")), Encoding::Json);
    assert_eq!(Encoding::from_path(Path::new("out/board.JSON.gz")), Encoding::Json);
    assert_eq!(Encoding::from_path(Path::new("board.yaml.gz")), Encoding::Yaml);
    assert_eq!(Encoding::from_path(Path::new("board.yml")), Encoding::Yaml);
}

#[test]
fn test_compressed_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["xcu1525.json.gz", "xcu1525.yaml.gz"] {
        let path = dir.path().join(name);
        let board = boards::get("xcu1525").unwrap();

        write(&path, board, WriteOpts::default()).unwrap();
        let loaded = open(&path, OpenOpts::default()).unwrap();
        assert_eq!(&loaded, board, "{}", name);
    }
}

#[test]
fn test_raw_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["colorlight.json", "colorlight.yml"] {
        let path = dir.path().join(name);
        let board = boards::get("colorlight_5a_75b").unwrap();

        write(&path, board, WriteOpts { raw: true, compresion_level: 0 }).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("colorlight_5a_75b"));

        let loaded = open(&path, OpenOpts { raw: true }).unwrap();
        assert_eq!(&loaded, board, "{}", name);
    }
}

#[test]
fn test_hand_written_board() {
    let yaml = r#"
name: tiny
default_clk_name: clk12
default_clk_period_ns: 83.333
toolchains: [trellis]
programmer:
  kind: openocd_jtag
  config: tiny.cfg
default_revision: a
revisions:
  - name: a
    device: LFE5U-12F-6BG256C
    io:
      - name: clk12
        pins: A1
        iostandard: LVCMOS33
      - name: serial
        subsignals:
          - name: tx
            pins: B1
          - name: rx
            pins: B2
        iostandard: LVCMOS33
"#;
    let board = decode(yaml.as_bytes(), Encoding::Yaml).unwrap();

    assert_eq!(board.programmer, Programmer::OpenocdJtag { config: "tiny.cfg".into() });
    let io = &board.revisions[0].io;
    assert_eq!(io[0], SignalRecord::pins("clk12", 0, "A1").iostandard("LVCMOS33"));
    assert_eq!(io[1].subsignal("rx").map(|s| s.pins.clone()), Some(Pins::from("B2")));
    assert!(board.period_constraints.is_empty());
    assert!(board.revisions[0].connectors.is_empty());
}

#[test]
fn test_bare_attribute_is_refused() {
    let yaml = r#"
name: tiny
default_clk_name: clk12
default_clk_period_ns: 83.333
toolchains: [trellis]
programmer:
  kind: openocd_jtag
  config: tiny.cfg
default_revision: a
revisions:
  - name: a
    device: LFE5U-12F-6BG256C
    io:
      - name: led
        pins: A1
        misc: [PULLUP]
"#;
    match decode(yaml.as_bytes(), Encoding::Yaml) {
        Err(OpenWriteError::ParseError(e)) => assert!(e.contains("KEY=VALUE"), "{}", e),
        other => panic!("bare attribute was accepted: {:?}", other.map(|b| b.name)),
    }

    let fixed = yaml.replace("[PULLUP]", "[PULLMODE=UP]");
    let board = decode(fixed.as_bytes(), Encoding::Yaml).unwrap();
    assert_eq!(board.revisions[0].io[0].misc, vec![Misc::new("PULLMODE=UP")]);
}

#[test]
fn test_open_failures() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json.gz");
    assert!(matches!(open(&missing, OpenOpts::default()), Err(OpenWriteError::CantOpenFile(_))));

    /* Compressed file opened as raw */
    let path = dir.path().join("ecpix5.json");
    write(&path, boards::get("ecpix5").unwrap(), WriteOpts::default()).unwrap();
    assert!(matches!(open(&path, OpenOpts { raw: true }), Err(OpenWriteError::ParseError(_))));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"name\": 3}").unwrap();
    assert!(matches!(open(&path, OpenOpts { raw: true }), Err(OpenWriteError::ParseError(_))));
}
