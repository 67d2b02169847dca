use crate::prelude::*;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Serialize, Serializer};

/// Every radio frame fits in this many bytes, command byte included.
pub const MAX_RF_PAYLOAD_SIZE: usize = 32;

// CH0 is the inverter-wide channel (AC side, frequency, temperature)
pub const CH0: u8 = 0;
pub const CH1: u8 = 1;
pub const CH2: u8 = 2;
pub const CH3: u8 = 3;
pub const CH4: u8 = 4;

// {{{ Unit
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Unit {
    Volt = 0,
    Ampere,
    Watt,
    WattHour,
    KiloWattHour,
    Hertz,
    Celsius,
    Percent,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Watt => "W",
            Unit::WattHour => "Wh",
            Unit::KiloWattHour => "kWh",
            Unit::Hertz => "Hz",
            Unit::Celsius => "°C",
            Unit::Percent => "%",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Serialize for Unit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.symbol())
    }
} // }}}

// {{{ FieldId
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum FieldId {
    UDc = 0,
    IDc,
    PDc,
    YieldDay,
    YieldWeek,
    YieldTotal,
    UAc,
    IAc,
    PAc,
    Freq,
    Temp,
    Pct,
}

impl FieldId {
    pub fn name(&self) -> &'static str {
        match self {
            FieldId::UDc => "U_DC",
            FieldId::IDc => "I_DC",
            FieldId::PDc => "P_DC",
            FieldId::YieldDay => "YieldDay",
            FieldId::YieldWeek => "YieldWeek",
            FieldId::YieldTotal => "YieldTotal",
            FieldId::UAc => "U_AC",
            FieldId::IAc => "I_AC",
            FieldId::PAc => "P_AC",
            FieldId::Freq => "Freq",
            FieldId::Temp => "Temp",
            FieldId::Pct => "Pct",
        }
    }

    /// The physically correct unit for this quantity.
    pub fn unit(&self) -> Unit {
        match self {
            FieldId::UDc | FieldId::UAc => Unit::Volt,
            FieldId::IDc | FieldId::IAc => Unit::Ampere,
            FieldId::PDc | FieldId::PAc => Unit::Watt,
            FieldId::YieldDay | FieldId::YieldWeek => Unit::WattHour,
            FieldId::YieldTotal => Unit::KiloWattHour,
            FieldId::Freq => Unit::Hertz,
            FieldId::Temp => Unit::Celsius,
            FieldId::Pct => Unit::Percent,
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for FieldId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
} // }}}

// {{{ Command
/// Packet id of an inverter reply; the first byte of a decodable payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive, Serialize)]
#[repr(u8)]
pub enum Command {
    Cmd01 = 0x01,
    Cmd02 = 0x02,
    Cmd03 = 0x03,
    Cmd82 = 0x82,
    Cmd83 = 0x83,
    Cmd84 = 0x84,
} // }}}

// {{{ InverterType
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum InverterType {
    Hm400 = 0,
    Hm600,
    Hm800,
    Hm1200,
}

impl InverterType {
    pub const ALL: [InverterType; 4] = [
        InverterType::Hm400,
        InverterType::Hm600,
        InverterType::Hm800,
        InverterType::Hm1200,
    ];

    /// Map a raw type id (as stored by the device registry) to a model.
    pub fn from_id(id: u8) -> Result<Self, Error> {
        Self::try_from(id).map_err(|_| Error::UnknownInverterType(id.to_string()))
    }

    pub fn description(&self) -> &'static str {
        match self {
            InverterType::Hm400 => "HM400",
            InverterType::Hm600 => "HM600",
            InverterType::Hm800 => "HM700 / 800",
            InverterType::Hm1200 => "HM1200 / HM1500",
        }
    }

    /// Number of DC inputs reported by this model.
    pub fn channels(&self) -> u8 {
        match self {
            InverterType::Hm400 => 1,
            InverterType::Hm600 | InverterType::Hm800 => 2,
            InverterType::Hm1200 => 4,
        }
    }

    pub fn assignment(&self) -> &'static [FieldAssignment] {
        layout_for(*self)
    }
}

impl std::fmt::Display for InverterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for InverterType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(&['-', ' '][..], "").as_str() {
            "HM300" | "HM350" | "HM400" => Ok(InverterType::Hm400),
            "HM600" => Ok(InverterType::Hm600),
            "HM700" | "HM800" => Ok(InverterType::Hm800),
            "HM1200" | "HM1500" => Ok(InverterType::Hm1200),
            _ => Err(Error::UnknownInverterType(s.to_string())),
        }
    }
}

impl Serialize for InverterType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.description())
    }
} // }}}

// {{{ FieldAssignment
/// Where one measurement lives in a reply frame and how to scale it.
///
/// `start` counts from the beginning of the payload, which begins with the
/// packet's command byte. Values are big-endian unsigned, `num` is 2 or 4.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct FieldAssignment {
    pub field: FieldId,
    pub unit: Unit,
    pub ch: u8,
    pub cmd: Command,
    pub start: u8,
    pub num: u8,
    pub div: u16,
}

impl FieldAssignment {
    pub const fn new(
        field: FieldId,
        unit: Unit,
        ch: u8,
        cmd: Command,
        start: u8,
        num: u8,
        div: u16,
    ) -> Self {
        Self {
            field,
            unit,
            ch,
            cmd,
            start,
            num,
            div,
        }
    }

    /// Byte range of the field within its payload.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end()
    }

    pub fn end(&self) -> usize {
        self.start as usize + self.num as usize
    }

    pub fn overlaps(&self, other: &FieldAssignment) -> bool {
        self.cmd == other.cmd
            && (self.start as usize) < other.end()
            && (other.start as usize) < self.end()
    }
} // }}}

/// Layout table for a model. Tables are static and shared by every inverter
/// of that model.
pub fn layout_for(inverter_type: InverterType) -> &'static [FieldAssignment] {
    match inverter_type {
        InverterType::Hm400 => &tables::HM400,
        InverterType::Hm600 => &tables::HM600,
        InverterType::Hm800 => &tables::HM800,
        InverterType::Hm1200 => &tables::HM1200,
    }
}

/// Fields of a model carried by one command, in table order.
pub fn fields_for_command(
    inverter_type: InverterType,
    cmd: Command,
) -> impl Iterator<Item = &'static FieldAssignment> {
    layout_for(inverter_type)
        .iter()
        .filter(move |a| a.cmd == cmd)
}

// Offsets are wire format of real hardware. HM1200 channel/command
// assignment is irregular on purpose, keep it that way.
mod tables {
    use super::Command::*;
    use super::FieldId::*;
    use super::Unit::*;
    use super::{FieldAssignment as F, CH0, CH1, CH2, CH3, CH4};

    // HM400 (HM300, HM350)
    pub(super) static HM400: [F; 10] = [
        F::new(UDc, Volt, CH1, Cmd01, 3, 2, 10),
        F::new(IDc, Ampere, CH1, Cmd01, 5, 2, 100),
        F::new(PDc, Watt, CH1, Cmd01, 7, 2, 10),
        F::new(YieldTotal, KiloWattHour, CH1, Cmd01, 9, 4, 1000),
        F::new(YieldDay, WattHour, CH1, Cmd01, 13, 2, 1),
        F::new(UAc, Volt, CH0, Cmd01, 15, 2, 10),
        F::new(Freq, Hertz, CH0, Cmd82, 1, 2, 100),
        F::new(PAc, Watt, CH0, Cmd82, 3, 2, 10),
        F::new(IAc, Ampere, CH0, Cmd82, 7, 2, 100),
        F::new(Temp, Celsius, CH0, Cmd82, 11, 2, 10),
    ];

    pub(super) static HM600: [F; 14] = [
        F::new(UDc, Volt, CH1, Cmd01, 3, 2, 10),
        F::new(IDc, Ampere, CH1, Cmd01, 5, 2, 100),
        F::new(PDc, Watt, CH1, Cmd01, 7, 2, 10),
        F::new(UDc, Volt, CH2, Cmd01, 9, 2, 10),
        F::new(IDc, Ampere, CH2, Cmd01, 11, 2, 100),
        F::new(PDc, Watt, CH2, Cmd01, 13, 2, 10),
        F::new(YieldWeek, WattHour, CH0, Cmd02, 1, 2, 1),
        F::new(YieldTotal, KiloWattHour, CH0, Cmd02, 3, 4, 1000),
        F::new(YieldDay, WattHour, CH1, Cmd02, 7, 2, 1),
        F::new(YieldDay, WattHour, CH2, Cmd02, 9, 2, 1),
        F::new(UAc, Volt, CH0, Cmd02, 11, 2, 10),
        F::new(Freq, Hertz, CH0, Cmd02, 13, 2, 100),
        F::new(IAc, Ampere, CH0, Cmd02, 15, 2, 10),
        F::new(Temp, Celsius, CH0, Cmd83, 7, 2, 10),
    ];

    // HM700, HM800
    pub(super) static HM800: [F; 15] = [
        F::new(UDc, Volt, CH1, Cmd01, 3, 2, 10),
        F::new(IDc, Ampere, CH1, Cmd01, 5, 2, 100),
        F::new(PDc, Watt, CH1, Cmd01, 7, 2, 10),
        F::new(UDc, Volt, CH2, Cmd01, 9, 2, 10),
        F::new(IDc, Ampere, CH2, Cmd01, 11, 2, 100),
        F::new(PDc, Watt, CH2, Cmd01, 13, 2, 10),
        F::new(YieldWeek, WattHour, CH0, Cmd02, 1, 2, 1),
        F::new(YieldTotal, KiloWattHour, CH0, Cmd02, 3, 4, 1000),
        F::new(YieldDay, WattHour, CH1, Cmd02, 7, 2, 1),
        F::new(YieldDay, WattHour, CH2, Cmd02, 9, 2, 1),
        F::new(UAc, Volt, CH0, Cmd02, 11, 2, 10),
        F::new(Freq, Hertz, CH0, Cmd02, 13, 2, 100),
        F::new(PAc, Watt, CH0, Cmd02, 15, 2, 10),
        F::new(IAc, Ampere, CH0, Cmd83, 3, 2, 100),
        F::new(Temp, Celsius, CH0, Cmd83, 7, 2, 10),
    ];

    // HM1200, HM1500
    pub(super) static HM1200: [F; 24] = [
        F::new(UDc, Volt, CH1, Cmd01, 3, 2, 10),
        F::new(IDc, Ampere, CH1, Cmd01, 5, 2, 100),
        F::new(PDc, Watt, CH1, Cmd01, 9, 2, 10),
        F::new(YieldDay, WattHour, CH1, Cmd02, 5, 2, 1),
        F::new(YieldTotal, KiloWattHour, CH1, Cmd01, 13, 4, 1000),
        F::new(UDc, Volt, CH2, Cmd02, 9, 2, 10),
        F::new(IDc, Ampere, CH2, Cmd01, 7, 2, 100),
        F::new(PDc, Watt, CH2, Cmd01, 11, 2, 10),
        F::new(YieldDay, WattHour, CH2, Cmd02, 7, 2, 1),
        F::new(YieldTotal, KiloWattHour, CH2, Cmd02, 1, 4, 1000),
        F::new(IDc, Ampere, CH3, Cmd02, 11, 2, 100),
        F::new(PDc, Watt, CH3, Cmd02, 15, 2, 10),
        F::new(YieldDay, WattHour, CH3, Cmd03, 11, 2, 1),
        F::new(YieldTotal, KiloWattHour, CH3, Cmd03, 3, 4, 1000),
        F::new(IDc, Ampere, CH4, Cmd02, 13, 2, 100),
        F::new(PDc, Watt, CH4, Cmd03, 1, 2, 10),
        F::new(YieldDay, WattHour, CH4, Cmd03, 13, 2, 1),
        F::new(YieldTotal, KiloWattHour, CH4, Cmd03, 7, 4, 1000),
        F::new(UAc, Volt, CH0, Cmd03, 15, 2, 10),
        F::new(IAc, Ampere, CH0, Cmd84, 7, 2, 100),
        F::new(PAc, Watt, CH0, Cmd84, 3, 2, 10),
        F::new(Freq, Hertz, CH0, Cmd84, 1, 2, 100),
        F::new(Pct, Percent, CH0, Cmd84, 9, 2, 10),
        F::new(Temp, Celsius, CH0, Cmd84, 11, 2, 10),
    ];
}
