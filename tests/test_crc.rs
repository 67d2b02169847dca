mod common;
use common::*;

use hm_dtu::hm::crc::{checksum8, crc16_modbus, crc16_modbus_bytes};

#[test]
fn crc16_check_value() {
    common_setup();

    assert_eq!(crc16_modbus(b"123456789"), 0x4b37);
}

#[test]
fn crc16_modbus_request() {
    // read holding registers 0..10 of unit 1
    assert_eq!(crc16_modbus(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0a]), 0xcdc5);
    assert_eq!(
        crc16_modbus_bytes(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0a]),
        [0xcd, 0xc5]
    );
}

#[test]
fn crc16_empty_is_init() {
    assert_eq!(crc16_modbus(&[]), 0xffff);
    assert_eq!(crc16_modbus_bytes(&[]), [0xff, 0xff]);
}

#[test]
fn checksum8_values() {
    assert_eq!(checksum8(&[]), 0x00);
    assert_eq!(checksum8(b"123456789"), 0x31);
    assert_eq!(checksum8(&[0x80, 0x01, 0xff]), 0x7e);
    assert_eq!(checksum8(&[0x5a]), 0x5a);
}

#[test]
fn checksum8_is_xor_of_bytes() {
    let buf: Vec<u8> = (0..=255u8).step_by(7).collect();
    let xor = buf.iter().fold(0u8, |acc, b| acc ^ b);

    assert_eq!(checksum8(&buf), xor);
}

#[test]
fn checksum8_appended_gives_zero() {
    let mut buf = vec![0x15, 0x78, 0x56, 0x34, 0x12, 0x44, 0x33];
    buf.push(checksum8(&buf));

    assert_eq!(checksum8(&buf), 0x00);
}
