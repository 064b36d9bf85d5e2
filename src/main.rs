#![allow(dead_code)]

mod config;
mod ethernet;
mod tick;
mod vlan;

mod device {
    pub mod cable;
    pub mod switch;
}

#[cfg(test)]
mod tests {
    pub mod cable_tests;
    pub mod frame_tests;
    pub mod switch_tests;
    pub mod tick_tests;
    pub mod vlan_tests;
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::SwitchConfig;
use device::cable::CableSimulator;
use device::switch::Switch;
use ethernet::{format_mac, random_mac, FrameCodec};
use tick::Tickable;

/// Cadence of the receive/control-plane loop.
const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// A VLAN-aware virtual Ethernet switch.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Identifier of this switch; selects `<configs-dir>/switch<ID>.cfg`
    switch_id: u32,

    /// Directory holding per-switch configuration files
    #[arg(long, default_value = "configs")]
    configs_dir: PathBuf,
}

/// Initializes tracing/logging subsystem
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn main() -> ExitCode {
    init_logging();

    let args = Args::parse();

    let config_path = args
        .configs_dir
        .join(format!("switch{}.cfg", args.switch_id));

    let config = match SwitchConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Cannot load {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mac_address = random_mac();

    info!("Starting switch {}", args.switch_id);
    info!("Switch MAC {}", format_mac(mac_address));
    for (interface, vlan) in config.vlan_table.iter().enumerate() {
        info!("Interface {}: {}", interface, vlan);
    }

    let mut switch = Switch::new(
        mac_address,
        config.bridge_priority,
        config.vlan_table,
        FrameCodec::default(),
    );

    let mut sim = CableSimulator::default();
    sim.adds(switch.ports());

    // Frames are processed to completion one at a time, and the control
    // plane shares the same tick; nothing here ever observes a torn table.
    loop {
        sim.tick();
        switch.tick();
        thread::sleep(TICK_INTERVAL);
    }
}
