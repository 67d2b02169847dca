#![allow(dead_code)]

use hm_dtu::hm::crc::checksum8;
use hm_dtu::hm::inverter::{default_radio_id, Inverter, Serial};
use hm_dtu::hm::layout::{layout_for, FieldId, InverterType};
use hm_dtu::hm::packet::encode_field;

// reply payloads are the 27 byte frame minus header and check byte
pub const PAYLOAD_LEN: usize = 17;
pub const DTU_ADDRESS: u32 = 0x11223344;

pub fn common_setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Factory();
impl Factory {
    pub fn serial() -> Serial {
        Serial::new(0x114172220049)
    }

    pub fn inverter(inverter_type: InverterType) -> Inverter {
        Inverter::new(0, "roof", inverter_type, Self::serial(), default_radio_id)
            .expect("valid inverter")
    }

    /// A reply payload for `cmd` with the given fields set and everything
    /// else zero.
    pub fn payload(inverter_type: InverterType, cmd: u8, values: &[(FieldId, u8, f64)]) -> Vec<u8> {
        let mut buf = vec![0u8; PAYLOAD_LEN];
        buf[0] = cmd;

        for (field, channel, value) in values {
            let a = layout_for(inverter_type)
                .iter()
                .find(|a| u8::from(a.cmd) == cmd && a.field == *field && a.ch == *channel)
                .expect("field is carried by cmd");
            encode_field(a, *value, &mut buf).expect("value fits");
        }

        buf
    }

    /// Wrap a payload in a received frame header and check byte.
    pub fn response_frame(inverter: u32, dtu: u32, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x95];
        frame.extend_from_slice(&inverter.to_be_bytes());
        frame.extend_from_slice(&dtu.to_be_bytes());
        frame.extend_from_slice(payload);
        frame.push(checksum8(&frame));
        frame
    }
}
