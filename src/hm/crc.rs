//! Checksums used on the radio link.
//!
//! Every frame ends in an 8-bit check byte over everything before it. The
//! time-sync frame additionally carries a CRC-16/MODBUS over its sub-header
//! and timestamp block.

const CRC8_INIT: u8 = 0x00;
const CRC8_POLY: u8 = 0x01;

/// 8-bit check byte as computed by the inverter firmware.
///
/// The shift-and-conditional-xor loop is kept exactly as the firmware runs
/// it. With poly 0x01 it rotates each byte back into place, so the result is
/// the xor of all input bytes.
pub fn checksum8(buf: &[u8]) -> u8 {
    buf.iter().fold(CRC8_INIT, |mut crc, b| {
        crc ^= b;
        for _ in 0..8 {
            crc = (crc << 1) ^ if crc & 0x80 != 0 { CRC8_POLY } else { 0x00 };
        }
        crc
    })
}

/// CRC-16 with the Modbus convention (init 0xffff, reflected poly 0xa001).
pub fn crc16_modbus(buf: &[u8]) -> u16 {
    crc16::State::<crc16::MODBUS>::calculate(buf)
}

/// CRC-16/MODBUS split into the trailer byte order used in frames: high byte
/// first.
pub fn crc16_modbus_bytes(buf: &[u8]) -> [u8; 2] {
    let crc = crc16_modbus(buf);
    [(crc >> 8) as u8, (crc & 0xff) as u8]
}
