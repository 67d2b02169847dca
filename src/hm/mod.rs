//! Radio protocol of the HM microinverter family.

pub mod crc;
pub mod inverter;
pub mod layout;
pub mod packet;
