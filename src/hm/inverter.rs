use crate::prelude::*;

use crate::hm::layout::{layout_for, FieldAssignment, InverterType};
use crate::hm::packet::{decode_frame, Decoded, Frame, PacketBuilder};

use serde::{Serialize, Serializer};

// the firmware record is 16 bytes including the terminating NUL
pub const MAX_NAME_LENGTH: usize = 15;

// Serial {{{
/// Serial number as printed on the inverter's barcode, read as hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Serial(u64);

impl Serial {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Little-endian bytes, the order the firmware keeps the serial in.
    pub fn bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl From<u64> for Serial {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for Serial {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.len() > 16 {
            bail!("serial {:?} must be 1 to 16 hex digits", s);
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|err| anyhow!("invalid serial {:?}: {}", s, err))
    }
}

impl std::fmt::Display for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:012x}", self.0)
    }
}

impl std::fmt::Debug for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:012x}", self.0)
    }
}

impl Serialize for Serial {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
} // }}}

// RadioAddress {{{
/// On-air address derived from a serial by the link layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RadioAddress(u64);

impl RadioAddress {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The four address bytes used in request frames. Byte 0 of the radio
    /// address is the pipe prefix and is not sent.
    pub fn writer_address(&self) -> u32 {
        (self.0 >> 8) as u32
    }
}

impl std::fmt::Display for RadioAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl std::fmt::Debug for RadioAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl Serialize for RadioAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
} // }}}

/// Serial to radio address conversion supplied by the link layer.
pub type RadioIdFn = fn(Serial) -> RadioAddress;

/// The usual conversion: the low four serial bytes, reversed, behind a 0x01
/// pipe prefix.
pub fn default_radio_id(serial: Serial) -> RadioAddress {
    let s = serial.bytes();
    let mut b = [0u8; 8];
    b[0] = 0x01;
    b[1] = s[3];
    b[2] = s[2];
    b[3] = s[1];
    b[4] = s[0];
    RadioAddress(u64::from_le_bytes(b))
}

/// One registered inverter. The layout table is borrowed from the static
/// catalog of its model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Inverter {
    pub id: u8,
    pub name: String,
    #[serde(rename = "type")]
    pub inverter_type: InverterType,
    #[serde(skip)]
    pub assignment: &'static [FieldAssignment],
    pub serial: Serial,
    pub radio_address: RadioAddress,
}

impl Inverter {
    pub fn new(
        id: u8,
        name: &str,
        inverter_type: InverterType,
        serial: Serial,
        radio_id: RadioIdFn,
    ) -> Result<Self, Error> {
        if name.len() > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong(name.to_string()));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            inverter_type,
            assignment: layout_for(inverter_type),
            serial,
            radio_address: radio_id(serial),
        })
    }

    pub fn writer_address(&self) -> u32 {
        self.radio_address.writer_address()
    }

    pub fn decode(&self, cmd: u8, payload: &[u8]) -> Decoded {
        decode_frame(self.inverter_type, cmd, payload)
    }

    pub fn time_packet(&self, builder: &PacketBuilder, dtu_adr: u32) -> Frame {
        builder.time_packet(self.writer_address(), dtu_adr)
    }

    pub fn cmd_packet(&self, builder: &PacketBuilder, dtu_adr: u32, mid: u8, cmd: u8) -> Frame {
        builder.cmd_packet(self.writer_address(), dtu_adr, mid, cmd)
    }
}
