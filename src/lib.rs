pub mod config;    // Configuration management
pub mod error;     // Protocol error types
pub mod hm;        // HM radio protocol: checksums, layouts, frames
pub mod options;   // Command line options parsing
pub mod prelude;   // Common imports and types
pub mod registry;  // Registered inverters
pub mod unixtime;  // Unix timestamp handling
pub mod utils;     // Utility functions

// Get the package version from Cargo.toml
const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

use crate::hm::layout::{layout_for, InverterType};
use crate::hm::packet::{PacketBuilder, ResponseFrame};
use crate::options::Action;
use crate::prelude::*;
use crate::registry::Registry;

use std::io::Write;

fn init_logging(level: &str) -> std::result::Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or(""),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Never)
        .try_init()
}

fn start_logging(level: &str) {
    if let Err(e) = init_logging(level) {
        eprintln!("Failed to initialise logging: {}", e);
    }
}

/// Main application entry point
///
/// Loads the config, registers the enabled inverters and runs one action.
/// Frames go to stdout, logging to stderr.
pub fn app(options: Options) -> Result<()> {
    // catalog needs no config
    if let Action::Catalog { inverter_type } = &options.command {
        start_logging("info");
        return print_catalog(inverter_type);
    }

    let config = ConfigWrapper::new(options.config_file.clone())?;
    start_logging(&config.loglevel());

    info!("hm-dtu {} starting", CARGO_PKG_VERSION);

    let registry = Registry::from_config(&config)?;
    let dtu_adr = config.dtu().address();

    match options.command {
        Action::TimeSync { timestamp } => {
            let mut builder = PacketBuilder::new(UnixTime::now());
            if let Some(ts) = timestamp {
                builder.set_unix_timestamp(ts);
            }
            info!("time-sync at {}", builder.unix_timestamp());

            for inverter in registry.iter() {
                println!("{}: {}", inverter.name, inverter.time_packet(&builder, dtu_adr));
            }
        }
        Action::Request { mid, cmd } => {
            let mid = Utils::parse_u8(&mid)?;
            let cmd = Utils::parse_u8(&cmd)?;
            let builder = PacketBuilder::default();

            for inverter in registry.iter() {
                println!(
                    "{}: {}",
                    inverter.name,
                    inverter.cmd_packet(&builder, dtu_adr, mid, cmd)
                );
            }
        }
        Action::Decode {
            inverter,
            payload,
            frame,
        } => {
            let inverter = registry
                .find_by_name(&inverter)
                .ok_or_else(|| anyhow!("no enabled inverter named {:?}", inverter))?;
            let bytes = Utils::parse_hex(&payload)?;

            let decoded = if frame {
                let response = ResponseFrame::decode(&bytes)?;
                if response.header.inverter != inverter.writer_address() {
                    warn!(
                        "frame is from {:#010x}, expected {:#010x}",
                        response.header.inverter,
                        inverter.writer_address()
                    );
                }
                response.measurements(inverter.inverter_type)
            } else {
                let cmd = *bytes.first().ok_or_else(|| anyhow!("empty payload"))?;
                inverter.decode(cmd, &bytes)
            };

            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        Action::Catalog { .. } => {}
    }

    Ok(())
}

fn print_catalog(inverter_type: &str) -> Result<()> {
    let inverter_type: InverterType = inverter_type.parse()?;

    println!("{} ({} DC inputs)", inverter_type, inverter_type.channels());
    println!("{:<10} {:>4} {:>3} {:>4} {:>5} {:>3} {:>5}", "field", "unit", "ch", "cmd", "start", "num", "div");
    for a in layout_for(inverter_type) {
        println!(
            "{:<10} {:>4} {:>3} {:#04x} {:>5} {:>3} {:>5}",
            a.field.name(),
            a.unit.symbol(),
            a.ch,
            u8::from(a.cmd),
            a.start,
            a.num,
            a.div
        );
    }

    Ok(())
}
