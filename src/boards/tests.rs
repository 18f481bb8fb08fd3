use std::collections::HashSet;

use super::*;

#[test]
fn test_catalog() {
    assert_eq!(names(), vec!["colorlight_5a_75b", "ecpix5", "xcu1525"]);
    assert!(get("ecpix5").is_some());
    assert!(get("arty").is_none());
}

#[test]
fn test_devices_and_revisions() {
    let expected = [
        ("colorlight_5a_75b", "7.1", "LFE5U-25F-6BG256C"),
        ("ecpix5", DEFAULT_REVISION, "LFE5UM5G-85F-8BG554I"),
        ("xcu1525", DEFAULT_REVISION, "xcvu9p-fsgd2104-2l-e"),
    ];
    for (name, revision, device) in expected {
        let board = get(name).unwrap();
        assert_eq!(board.default_revision, revision);
        assert_eq!(board.revision(revision).map(|r| r.device.as_str()), Some(device));
    }
}

#[test]
fn test_signal_keys_are_unique() {
    for board in all() {
        for revision in &board.revisions {
            let mut seen = HashSet::new();
            for record in &revision.io {
                assert!(
                    seen.insert((record.name.as_str(), record.index)),
                    "{}: {}:{} declared twice", board.name, record.name, record.index
                );
                if let SignalBody::Subsignals(subs) = &record.body {
                    let mut names = HashSet::new();
                    for s in subs {
                        assert!(names.insert(s.name.as_str()), "{}: {}.{}", board.name, record.name, s.name);
                    }
                }
            }
        }
    }
}

#[test]
fn test_pins_used_once() {
    for board in all() {
        for revision in &board.revisions {
            let mut seen = HashSet::new();
            for record in &revision.io {
                for pin in record.all_pins() {
                    if board.shared_pins.iter().any(|p| p == pin) {
                        continue;
                    }
                    assert!(seen.insert(pin), "{}: pin {} used twice", board.name, pin);
                }
            }
        }
    }
}

#[test]
fn test_clocks_exist() {
    for board in all() {
        let revision = board.revision(&board.default_revision).unwrap();
        assert!(
            revision.io.iter().any(|r| r.name == board.default_clk_name),
            "{}: no {}", board.name, board.default_clk_name
        );
        for pc in &board.period_constraints {
            let (name, sub) = match pc.signal.split_once(':') {
                Some((name, sub)) => (name, Some(sub)),
                None => (pc.signal.as_str(), None),
            };
            let record = revision.io.iter()
                .find(|r| r.name == name && r.index == pc.index)
                .unwrap_or_else(|| panic!("{}: no {}:{}", board.name, name, pc.index));
            if let Some(sub) = sub {
                assert!(record.subsignal(sub).is_some(), "{}: no {}", board.name, pc.signal);
            }
        }
    }
}

#[test]
fn test_board_details() {
    let colorlight = get("colorlight_5a_75b").unwrap();
    assert_eq!(colorlight.default_clk_period_ns, 40.0);
    assert_eq!(colorlight.toolchains, vec![Toolchain::Trellis]);
    let j1 = &colorlight.revisions[0].connectors[0];
    assert_eq!(j1.pins.len(), 16);
    assert_eq!(j1.pin(3), None);

    let ecpix5 = get("ecpix5").unwrap();
    assert_eq!(ecpix5.default_toolchain(), Some(Toolchain::Diamond));
    let ddram = ecpix5.revisions[0].io.iter().find(|r| r.name == "ddram").unwrap();
    assert_eq!(ddram.subsignal("a").unwrap().pins.len(), 14);
    assert_eq!(ddram.subsignal("dq").unwrap().pins.len(), 16);

    let xcu1525 = get("xcu1525").unwrap();
    assert_eq!(xcu1525.programmer, Programmer::Vivado);
    let channels: Vec<u32> = xcu1525.revisions[0].io.iter()
        .filter(|r| r.name == "ddram")
        .map(|r| r.index)
        .collect();
    assert_eq!(channels, vec![0, 1, 2, 4]);
    for index in channels {
        let ddram = xcu1525.revisions[0].io.iter().find(|r| r.name == "ddram" && r.index == index).unwrap();
        assert_eq!(ddram.subsignal("dq").unwrap().pins.len(), 64);
        assert_eq!(ddram.subsignal("dqs_p").unwrap().pins.len(), 8);
        assert_eq!(ddram.subsignal("a").unwrap().pins.len(), 14);
    }
}
