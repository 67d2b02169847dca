use clap::{Parser, Subcommand};

/// hm-dtu - request and decode frames for HM microinverters
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Options {
    /// Config file to read
    #[clap(short = 'c', long = "config", default_value = "config.yaml")]
    pub config_file: String,

    #[clap(subcommand)]
    pub command: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Print the time-sync frame for every enabled inverter
    TimeSync {
        /// Unix timestamp to send, defaults to now
        #[clap(short = 't', long = "timestamp")]
        timestamp: Option<u32>,
    },

    /// Print a short request frame for every enabled inverter
    Request {
        /// Message id byte (decimal or 0x..)
        #[clap(long = "mid", default_value = "0x80")]
        mid: String,

        /// Command byte (decimal or 0x..)
        #[clap(long = "cmd", default_value = "0x01")]
        cmd: String,
    },

    /// Decode a reply payload for a configured inverter and print JSON
    Decode {
        /// Inverter name from the config
        #[clap(short = 'i', long = "inverter")]
        inverter: String,

        /// Hex bytes of either a full received frame or a bare payload
        /// starting at the command byte
        #[clap(short = 'p', long = "payload")]
        payload: String,

        /// Treat --payload as a full received frame (header and check byte)
        #[clap(long = "frame")]
        frame: bool,
    },

    /// Print the field layout of a model
    Catalog {
        /// HM400, HM600, HM800, HM1200 (HM300/350/700/1500 are aliases)
        #[clap(long = "type")]
        inverter_type: String,
    },
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
