use std::fs;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::vlan::{VlanDescriptor, VlanTable};

/// Highest valid 12-bit VLAN id.
const MAX_VLAN_ID: u16 = 0x0FFF;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration is missing the bridge priority line")]
    MissingPriority,

    #[error("malformed bridge priority {0:?}")]
    MalformedPriority(String),

    #[error("malformed VLAN entry {content:?} on line {line}")]
    MalformedEntry { line: usize, content: String },

    #[error("VLAN id {vlan_id} on line {line} is outside 0..=4095")]
    VlanIdOutOfRange { line: usize, vlan_id: u32 },

    #[error("configuration defines no interfaces")]
    NoInterfaces,
}

/// Startup configuration of one switch, loaded from `configs/switch<ID>.cfg`.
///
/// The file's first line is the bridge priority; each following line
/// configures one interface, in interface-id order: a decimal access VLAN
/// id, or `T` for a trunk interface.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SwitchConfig {
    pub bridge_priority: u16,
    pub vlan_table: VlanTable,
}

impl SwitchConfig {
    pub fn from_file(path: &Path) -> Result<SwitchConfig, ConfigError> {
        SwitchConfig::parse(&fs::read_to_string(path)?)
    }

    /// Parses configuration text. Any malformed line is fatal: the switch
    /// must not start forwarding with an incomplete VLAN table.
    pub fn parse(contents: &str) -> Result<SwitchConfig, ConfigError> {
        let entry_re = Regex::new(r"^(?:(\d+)|T)$").expect("hard-coded regex");

        let mut lines = contents.lines();

        let priority_line = lines.next().ok_or(ConfigError::MissingPriority)?.trim();
        let bridge_priority = priority_line
            .parse::<u16>()
            .map_err(|_| ConfigError::MalformedPriority(priority_line.to_string()))?;

        let mut entries = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line.trim();
            let line_no = index + 2; // 1-based, after the priority line

            let captures = entry_re
                .captures(line)
                .ok_or_else(|| ConfigError::MalformedEntry {
                    line: line_no,
                    content: line.to_string(),
                })?;

            let descriptor = match captures.get(1) {
                Some(digits) => {
                    let vlan_id: u32 = digits.as_str().parse().map_err(|_| {
                        ConfigError::MalformedEntry {
                            line: line_no,
                            content: line.to_string(),
                        }
                    })?;
                    if vlan_id > MAX_VLAN_ID as u32 {
                        return Err(ConfigError::VlanIdOutOfRange { line: line_no, vlan_id });
                    }
                    VlanDescriptor::Access(vlan_id as u16)
                }
                None => VlanDescriptor::Trunk,
            };

            entries.push(descriptor);
        }

        if entries.is_empty() {
            return Err(ConfigError::NoInterfaces);
        }

        Ok(SwitchConfig {
            bridge_priority,
            vlan_table: VlanTable::from_entries(entries),
        })
    }
}
