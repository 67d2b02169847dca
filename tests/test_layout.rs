mod common;
use common::*;

use hm_dtu::hm::layout::*;
use hm_dtu::prelude::*;

#[test]
fn table_sizes() {
    common_setup();

    assert_eq!(layout_for(InverterType::Hm400).len(), 10);
    assert_eq!(layout_for(InverterType::Hm600).len(), 14);
    assert_eq!(layout_for(InverterType::Hm800).len(), 15);
    assert_eq!(layout_for(InverterType::Hm1200).len(), 24);
}

#[test]
fn fields_fit_in_a_radio_payload() {
    for t in InverterType::ALL {
        for a in layout_for(t) {
            assert!(a.end() <= MAX_RF_PAYLOAD_SIZE, "{} {:?}", t, a);
            assert!(a.start >= 1, "{} {:?} overlaps the command byte", t, a);
            assert!(a.num == 2 || a.num == 4, "{} {:?}", t, a);
            assert!(a.div > 0, "{} {:?}", t, a);
        }
    }
}

#[test]
fn fields_of_a_command_do_not_overlap() {
    for t in InverterType::ALL {
        let table = layout_for(t);
        for (i, a) in table.iter().enumerate() {
            for b in &table[i + 1..] {
                assert!(!a.overlaps(b), "{}: {:?} overlaps {:?}", t, a, b);
            }
        }
    }
}

#[test]
fn units_match_fields() {
    for t in InverterType::ALL {
        for a in layout_for(t) {
            assert_eq!(a.unit, a.field.unit(), "{} {:?}", t, a);
        }
    }
}

#[test]
fn channels_within_model() {
    for t in InverterType::ALL {
        let max = layout_for(t).iter().map(|a| a.ch).max();
        assert_eq!(max, Some(t.channels()), "{}", t);
    }
}

#[test]
fn hm400_cmd01() {
    let fields: Vec<_> = fields_for_command(InverterType::Hm400, Command::Cmd01)
        .map(|a| (a.field, a.ch, a.start, a.num, a.div))
        .collect();

    assert_eq!(
        fields,
        vec![
            (FieldId::UDc, CH1, 3, 2, 10),
            (FieldId::IDc, CH1, 5, 2, 100),
            (FieldId::PDc, CH1, 7, 2, 10),
            (FieldId::YieldTotal, CH1, 9, 4, 1000),
            (FieldId::YieldDay, CH1, 13, 2, 1),
            (FieldId::UAc, CH0, 15, 2, 10),
        ]
    );
}

#[test]
fn hm600_and_hm800_differ_after_cmd02() {
    let hm600_ac: Vec<_> = fields_for_command(InverterType::Hm600, Command::Cmd02)
        .map(|a| a.field)
        .collect();
    let hm800_ac: Vec<_> = fields_for_command(InverterType::Hm800, Command::Cmd02)
        .map(|a| a.field)
        .collect();

    assert!(hm600_ac.contains(&FieldId::IAc));
    assert!(!hm600_ac.contains(&FieldId::PAc));
    assert!(hm800_ac.contains(&FieldId::PAc));
    assert!(!hm800_ac.contains(&FieldId::IAc));

    // HM600 reports AC current with one decimal only
    let iac = fields_for_command(InverterType::Hm600, Command::Cmd02)
        .find(|a| a.field == FieldId::IAc)
        .unwrap();
    assert_eq!(iac.div, 10);
}

#[test]
fn hm1200_channel_assignment_is_irregular() {
    let find = |field, ch| {
        layout_for(InverterType::Hm1200)
            .iter()
            .find(|a| a.field == field && a.ch == ch)
            .copied()
            .unwrap()
    };

    // channel 2 voltage arrives with cmd 0x02 while its current comes in 0x01
    let udc2 = find(FieldId::UDc, CH2);
    assert_eq!((udc2.cmd, udc2.start), (Command::Cmd02, 9));
    let idc2 = find(FieldId::IDc, CH2);
    assert_eq!((idc2.cmd, idc2.start), (Command::Cmd01, 7));

    let pdc4 = find(FieldId::PDc, CH4);
    assert_eq!((pdc4.cmd, pdc4.start), (Command::Cmd03, 1));

    // no voltage at all for channels 3 and 4
    assert!(layout_for(InverterType::Hm1200)
        .iter()
        .all(|a| !(a.field == FieldId::UDc && a.ch > CH2)));

    let pct = find(FieldId::Pct, CH0);
    assert_eq!((pct.cmd, pct.start, pct.unit), (Command::Cmd84, 9, Unit::Percent));
}

#[test]
fn no_fields_for_unused_commands() {
    assert_eq!(fields_for_command(InverterType::Hm400, Command::Cmd02).count(), 0);
    assert_eq!(fields_for_command(InverterType::Hm800, Command::Cmd84).count(), 0);
    assert_eq!(fields_for_command(InverterType::Hm1200, Command::Cmd82).count(), 0);
}

#[test]
fn inverter_type_from_id() -> Result<()> {
    assert_eq!(InverterType::from_id(0)?, InverterType::Hm400);
    assert_eq!(InverterType::from_id(3)?, InverterType::Hm1200);
    assert_eq!(
        InverterType::from_id(4),
        Err(Error::UnknownInverterType("4".to_string()))
    );

    Ok(())
}

#[test]
fn inverter_type_from_str() -> Result<()> {
    assert_eq!("HM-400".parse::<InverterType>()?, InverterType::Hm400);
    assert_eq!("hm350".parse::<InverterType>()?, InverterType::Hm400);
    assert_eq!("HM 700".parse::<InverterType>()?, InverterType::Hm800);
    assert_eq!("HM-1500".parse::<InverterType>()?, InverterType::Hm1200);
    assert_eq!(
        "HMS-2000".parse::<InverterType>(),
        Err(Error::UnknownInverterType("HMS-2000".to_string()))
    );

    Ok(())
}

#[test]
fn display_names() {
    assert_eq!(InverterType::Hm800.to_string(), "HM700 / 800");
    assert_eq!(FieldId::YieldTotal.to_string(), "YieldTotal");
    assert_eq!(FieldId::UDc.name(), "U_DC");
    assert_eq!(Unit::KiloWattHour.to_string(), "kWh");
    assert_eq!(Unit::Celsius.symbol(), "°C");
}
