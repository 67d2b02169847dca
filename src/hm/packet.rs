use crate::prelude::*;

use crate::hm::crc::{checksum8, crc16_modbus_bytes};
use crate::hm::layout::{layout_for, Command, FieldAssignment, FieldId, InverterType, Unit, MAX_RF_PAYLOAD_SIZE};

use enum_dispatch::*;
use nom::number::complete::{be_u16, be_u24, be_u32, be_u8};
use nom_derive::{Nom, Parse};
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};

pub const TIME_SYNC_OPCODE: u8 = 0x15;
pub const TIME_SYNC_FRAME_LEN: usize = 27;
pub const COMMAND_FRAME_LEN: usize = 11;

// {{{ Frame
/// An outbound frame. Always backed by a fixed 32-byte buffer, `len` is the
/// number of meaningful bytes.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Frame {
    buf: [u8; MAX_RF_PAYLOAD_SIZE],
    len: usize,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// The whole scratch buffer, including the zeroed tail past `len`.
    pub fn buffer(&self) -> &[u8; MAX_RF_PAYLOAD_SIZE] {
        &self.buf
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({})", Utils::hex(self.as_bytes()))
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Utils::hex(self.as_bytes()))
    }
} // }}}

/// Build the time-sync request.
///
/// Byte order is inconsistent on the wire and must stay that way: both
/// addresses are copied in host byte order (least significant byte first on
/// little-endian targets) while the timestamp is big-endian.
pub fn time_sync_frame(wr_adr: u32, dtu_adr: u32, ts: u32) -> Frame {
    let mut buf = [0u8; MAX_RF_PAYLOAD_SIZE];

    buf[0] = TIME_SYNC_OPCODE;
    buf[1..5].copy_from_slice(&wr_adr.to_ne_bytes());
    buf[5..9].copy_from_slice(&dtu_adr.to_ne_bytes());
    buf[9] = 0x80;
    buf[10] = 0x0b;
    buf[11] = 0x00;

    buf[12..16].copy_from_slice(&ts.to_be_bytes());

    buf[19] = 0x05;

    let crc = crc16_modbus_bytes(&buf[10..24]);
    buf[24..26].copy_from_slice(&crc);

    buf[26] = checksum8(&buf[0..26]);

    Frame {
        buf,
        len: TIME_SYNC_FRAME_LEN,
    }
}

/// Build a short request: message id, both addresses big-endian, command,
/// check byte.
pub fn command_frame(wr_adr: u32, dtu_adr: u32, mid: u8, cmd: u8) -> Frame {
    let mut buf = [0u8; MAX_RF_PAYLOAD_SIZE];

    buf[0] = mid;
    buf[1..5].copy_from_slice(&wr_adr.to_be_bytes());
    buf[5..9].copy_from_slice(&dtu_adr.to_be_bytes());
    buf[9] = cmd;

    buf[10] = checksum8(&buf[0..10]);

    Frame {
        buf,
        len: COMMAND_FRAME_LEN,
    }
}

// {{{ Requests
#[enum_dispatch]
pub trait RequestCommon {
    fn wr_adr(&self) -> u32;
    fn dtu_adr(&self) -> u32;
    fn opcode(&self) -> u8;
    fn frame(&self) -> Frame;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeSyncRequest {
    pub wr_adr: u32,
    pub dtu_adr: u32,
    pub time: UnixTime,
}

impl RequestCommon for TimeSyncRequest {
    fn wr_adr(&self) -> u32 {
        self.wr_adr
    }
    fn dtu_adr(&self) -> u32 {
        self.dtu_adr
    }
    fn opcode(&self) -> u8 {
        TIME_SYNC_OPCODE
    }
    fn frame(&self) -> Frame {
        time_sync_frame(self.wr_adr, self.dtu_adr, self.time.get())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommandRequest {
    pub wr_adr: u32,
    pub dtu_adr: u32,
    pub mid: u8,
    pub cmd: u8,
}

impl RequestCommon for CommandRequest {
    fn wr_adr(&self) -> u32 {
        self.wr_adr
    }
    fn dtu_adr(&self) -> u32 {
        self.dtu_adr
    }
    fn opcode(&self) -> u8 {
        self.mid
    }
    fn frame(&self) -> Frame {
        command_frame(self.wr_adr, self.dtu_adr, self.mid, self.cmd)
    }
}

#[enum_dispatch(RequestCommon)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Request {
    TimeSync(TimeSyncRequest),
    Command(CommandRequest),
} // }}}

// {{{ PacketBuilder
/// Owns the running timestamp and stamps it into time-sync requests.
#[derive(Clone, Debug, Default)]
pub struct PacketBuilder {
    time: UnixTime,
}

impl PacketBuilder {
    pub fn new(time: UnixTime) -> Self {
        Self { time }
    }

    pub fn set_unix_timestamp(&mut self, ts: u32) {
        self.time.set(ts);
    }

    /// Called once per elapsed second.
    pub fn unix_timestamp_tick(&mut self) {
        self.time.tick();
    }

    pub fn unix_timestamp(&self) -> UnixTime {
        self.time
    }

    pub fn time_request(&self, wr_adr: u32, dtu_adr: u32) -> Request {
        Request::TimeSync(TimeSyncRequest {
            wr_adr,
            dtu_adr,
            time: self.time,
        })
    }

    pub fn cmd_request(&self, wr_adr: u32, dtu_adr: u32, mid: u8, cmd: u8) -> Request {
        Request::Command(CommandRequest {
            wr_adr,
            dtu_adr,
            mid,
            cmd,
        })
    }

    pub fn time_packet(&self, wr_adr: u32, dtu_adr: u32) -> Frame {
        self.time_request(wr_adr, dtu_adr).frame()
    }

    pub fn cmd_packet(&self, wr_adr: u32, dtu_adr: u32, mid: u8, cmd: u8) -> Frame {
        self.cmd_request(wr_adr, dtu_adr, mid, cmd).frame()
    }
} // }}}

// {{{ Decoding
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub field: FieldId,
    pub unit: Unit,
    pub channel: u8,
    pub value: f64,
}

/// Result of decoding one payload. Fields whose bytes were missing are
/// listed in `errors`; the rest decoded normally.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Decoded {
    pub cmd: u8,
    pub measurements: Vec<Measurement>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    pub errors: Vec<Error>,
}

impl Decoded {
    pub fn get(&self, field: FieldId, channel: u8) -> Option<f64> {
        self.measurements
            .iter()
            .find(|m| m.field == field && m.channel == channel)
            .map(|m| m.value)
    }

    /// Number of decoded measurements. Failed fields are not counted, see
    /// `errors`.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn unsupported_width(a: &FieldAssignment) -> Error {
    Error::UnsupportedWidth {
        field: a.field,
        channel: a.ch,
        num: a.num as usize,
    }
}

// values are read into a u32, so 1 to 4 bytes
fn check_width(a: &FieldAssignment) -> Result<usize, Error> {
    match a.num {
        1..=4 => Ok(a.num as usize),
        _ => Err(unsupported_width(a)),
    }
}

fn truncated(a: &FieldAssignment, len: usize) -> Error {
    Error::Truncated {
        field: a.field,
        channel: a.ch,
        start: a.start as usize,
        num: a.num as usize,
        len,
    }
}

/// Raw big-endian integer at the field's position.
pub fn read_raw(a: &FieldAssignment, payload: &[u8]) -> Result<u32, Error> {
    let num = check_width(a)?;
    if payload.len() < a.end() {
        return Err(truncated(a, payload.len()));
    }

    let input = &payload[a.range()];
    let parsed: nom::IResult<&[u8], u32> = match num {
        1 => be_u8(input).map(|(rest, v)| (rest, u32::from(v))),
        2 => be_u16(input).map(|(rest, v)| (rest, u32::from(v))),
        3 => be_u24(input),
        4 => be_u32(input),
        _ => return Err(unsupported_width(a)),
    };

    parsed
        .map(|(_, v)| v)
        .map_err(|_| truncated(a, payload.len()))
}

/// Scaled physical value of one field.
pub fn read_field(a: &FieldAssignment, payload: &[u8]) -> Result<f64, Error> {
    let raw = read_raw(a, payload)?;
    Ok(f64::from(raw) / f64::from(a.div))
}

/// Write `value` into the field's position, scaled by its divisor and
/// rounded to the nearest step.
pub fn encode_field(a: &FieldAssignment, value: f64, buf: &mut [u8]) -> Result<(), Error> {
    let num = check_width(a)?;
    if buf.len() < a.end() {
        return Err(truncated(a, buf.len()));
    }

    let max = if num == 4 {
        f64::from(u32::MAX)
    } else {
        f64::from((1u32 << (8 * num)) - 1)
    };
    let raw = (value * f64::from(a.div)).round();
    if !(0.0..=max).contains(&raw) {
        return Err(Error::ValueOutOfRange {
            field: a.field,
            channel: a.ch,
            value,
            num,
        });
    }

    let bytes = (raw as u32).to_be_bytes();
    buf[a.range()].copy_from_slice(&bytes[4 - num..]);

    Ok(())
}

/// Decode every field of `inverter_type` carried by `cmd` out of `payload`.
///
/// A command the model has no fields for yields an empty result.
pub fn decode_frame(inverter_type: InverterType, cmd: u8, payload: &[u8]) -> Decoded {
    let mut decoded = Decoded {
        cmd,
        ..Default::default()
    };

    let cmd = match Command::try_from(cmd) {
        Ok(cmd) => cmd,
        Err(_) => {
            debug!("{}: no fields for command {:#04x}", inverter_type, decoded.cmd);
            return decoded;
        }
    };

    for a in layout_for(inverter_type).iter().filter(|a| a.cmd == cmd) {
        match read_field(a, payload) {
            Ok(value) => decoded.measurements.push(Measurement {
                field: a.field,
                unit: a.unit,
                channel: a.ch,
                value,
            }),
            Err(err) => {
                warn!("{}: {}", inverter_type, err);
                decoded.errors.push(err);
            }
        }
    }

    debug!(
        "{}: command {:#04x} decoded {} fields, {} failed",
        inverter_type,
        decoded.cmd,
        decoded.measurements.len(),
        decoded.errors.len()
    );

    decoded
}
// }}}

// {{{ ResponseFrame
#[derive(Clone, Copy, Debug, Eq, PartialEq, Nom)]
#[nom(BigEndian)]
pub struct ResponseHeader {
    pub cmd: u8,
    pub inverter: u32,
    pub dtu: u32,
}

/// A received frame with its check byte verified. The payload starts at the
/// packet command byte, which is what the layout offsets count from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResponseFrame<'a> {
    pub header: ResponseHeader,
    payload: &'a [u8],
}

impl<'a> ResponseFrame<'a> {
    pub const HEADER_LEN: usize = 9;
    // header, at least the packet command byte, check byte
    pub const MIN_LEN: usize = Self::HEADER_LEN + 2;

    pub fn decode(input: &'a [u8]) -> Result<Self, Error> {
        let len = input.len();
        if len < Self::MIN_LEN {
            return Err(Error::FrameTooShort {
                len,
                min: Self::MIN_LEN,
            });
        }

        let (body, trailer) = input.split_at(len - 1);
        let expected = checksum8(body);
        if expected != trailer[0] {
            return Err(Error::ChecksumMismatch {
                expected,
                actual: trailer[0],
            });
        }

        let (payload, header) = ResponseHeader::parse(body).map_err(|_| Error::FrameTooShort {
            len,
            min: Self::MIN_LEN,
        })?;

        Ok(Self { header, payload })
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn command(&self) -> u8 {
        self.payload[0]
    }

    pub fn measurements(&self, inverter_type: InverterType) -> Decoded {
        decode_frame(inverter_type, self.command(), self.payload)
    }
} // }}}
