pub mod interface;

use thiserror::Error;

/// A data link physical address
pub type MacAddress = [u8; 6];

/// Creates a MAC address from a u64
#[macro_export]
macro_rules! mac_addr {
    ($num:expr) => {{
        let num = $num as u64;
        [
            (((num >> 40) & 0xff) as u8 & 0xFE), // Clear the least significant bit to avoid multicast
            ((num >> 32) & 0xff) as u8,
            ((num >> 24) & 0xff) as u8,
            ((num >> 16) & 0xff) as u8,
            ((num >> 8) & 0xff) as u8,
            (num & 0xff) as u8,
        ]
    }};
}

/// Broadcast MAC address
#[macro_export]
macro_rules! mac_broadcast_addr {
    () => {
        [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
    };
}

/// Creates a generic ethernet payload with a given value
#[cfg(test)]
#[macro_export]
macro_rules! ether_payload {
    ($value:expr) => {{
        vec![$value; 28]
    }};
}

/// Generates a locally administered unicast MAC address.
pub fn random_mac() -> MacAddress {
    let mut mac: MacAddress = rand::random();
    mac[0] &= 0xFE; // unicast
    mac[0] |= 0x02; // locally administered
    mac
}

/// Formats a MAC address as a colon-separated hex string.
pub fn format_mac(mac: MacAddress) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

/// EtherType-position value marking an 802.1Q-shaped VLAN tag.
///
/// The value is deployment configuration: it has to match whatever the
/// link simulator on the other end of the wire stamps into tagged frames.
pub const DEFAULT_TAG_PROTOCOL_ID: u16 = 0x8200;

/// Header length of an untagged Ethernet frame (two addresses + EtherType).
pub const UNTAGGED_HEADER_LEN: usize = 14;

/// Header length of a frame carrying one VLAN tag.
pub const TAGGED_HEADER_LEN: usize = 18;

/// On-wire length of a VLAN tag (tag protocol id + tag control info).
pub const TAG_LEN: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Frame shorter than its minimum header length; Runt frame.
    #[error("frame of {actual} bytes is shorter than the {expected} byte header")]
    Runt {
        /// Actual number of bytes captured
        actual: usize,
        /// Minimum number of bytes the header requires
        expected: usize,
    },
}

/// Parsed header view of a raw frame, consumed by the forwarding engine.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EthernetHeader {
    pub destination: MacAddress,
    pub source: MacAddress,
    pub ether_type: u16,
    /// None when the frame carries no VLAN tag.
    pub vlan_id: Option<u16>,
}

/// A structured Ethernet frame carrying at most one VLAN tag.
///
/// Endpoints build and inspect frames in this form; on the wire a frame
/// is a plain byte buffer encoded/decoded through a [`FrameCodec`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EthernetFrame {
    pub destination: MacAddress,
    pub source: MacAddress,
    /// None when the frame carries no VLAN tag.
    pub vlan_id: Option<u16>,
    pub ether_type: u16,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn new(
        destination: MacAddress,
        source: MacAddress,
        ether_type: u16,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            destination,
            source,
            vlan_id: None,
            ether_type,
            payload,
        }
    }

    pub fn tagged(
        destination: MacAddress,
        source: MacAddress,
        vlan_id: u16,
        ether_type: u16,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            destination,
            source,
            vlan_id: Some(vlan_id),
            ether_type,
            payload,
        }
    }
}

/// Parses and rewrites Ethernet headers and 802.1Q-shaped VLAN tags.
///
/// Carries the tag protocol id it recognizes on the wire, so one process
/// can talk to simulators with different tagging conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    tag_protocol_id: u16,
}

impl Default for FrameCodec {
    fn default() -> Self {
        FrameCodec::new(DEFAULT_TAG_PROTOCOL_ID)
    }
}

impl FrameCodec {
    pub fn new(tag_protocol_id: u16) -> Self {
        FrameCodec { tag_protocol_id }
    }

    pub fn tag_protocol_id(&self) -> u16 {
        self.tag_protocol_id
    }

    /// Reads the addresses, EtherType and VLAN id (if any) from fixed offsets.
    ///
    /// The 16-bit value at offset 12 is a candidate EtherType; when it equals
    /// the tag protocol id, the low 12 bits of the following word are the
    /// VLAN id and the real EtherType sits at offset 16.
    pub fn parse_header(&self, bytes: &[u8]) -> Result<EthernetHeader, FrameError> {
        if bytes.len() < UNTAGGED_HEADER_LEN {
            return Err(FrameError::Runt {
                actual: bytes.len(),
                expected: UNTAGGED_HEADER_LEN,
            });
        }

        let destination: MacAddress = bytes[0..6].try_into().unwrap();
        let source: MacAddress = bytes[6..12].try_into().unwrap();
        let ether_type = u16::from_be_bytes([bytes[12], bytes[13]]);

        if ether_type != self.tag_protocol_id {
            return Ok(EthernetHeader {
                destination,
                source,
                ether_type,
                vlan_id: None,
            });
        }

        if bytes.len() < TAGGED_HEADER_LEN {
            return Err(FrameError::Runt {
                actual: bytes.len(),
                expected: TAGGED_HEADER_LEN,
            });
        }

        let tag_control = u16::from_be_bytes([bytes[14], bytes[15]]);
        let ether_type = u16::from_be_bytes([bytes[16], bytes[17]]);

        Ok(EthernetHeader {
            destination,
            source,
            ether_type,
            vlan_id: Some(tag_control & 0x0FFF),
        })
    }

    /// Returns true if the frame carries a VLAN tag.
    pub fn is_tagged(&self, bytes: &[u8]) -> bool {
        bytes.len() >= TAGGED_HEADER_LEN
            && bytes[12..14] == self.tag_protocol_id.to_be_bytes()
    }

    /// Returns a copy of the frame with a VLAN tag spliced in after the
    /// source address. Only the low 12 bits of `vlan_id` are encoded; the
    /// upper bits of the tag control word are zero.
    pub fn insert_tag(&self, bytes: &[u8], vlan_id: u16) -> Vec<u8> {
        let mut tagged = Vec::with_capacity(bytes.len() + TAG_LEN);
        tagged.extend_from_slice(&bytes[..12]);
        tagged.extend_from_slice(&self.tag_protocol_id.to_be_bytes());
        tagged.extend_from_slice(&(vlan_id & 0x0FFF).to_be_bytes());
        tagged.extend_from_slice(&bytes[12..]);
        tagged
    }

    /// Returns a copy of the frame with the byte range occupied by the VLAN
    /// tag removed.
    ///
    /// # Panics
    /// Panics if the frame carries no tag. Callers must establish the frame
    /// is tagged before stripping.
    pub fn strip_tag(&self, bytes: &[u8]) -> Vec<u8> {
        if !self.is_tagged(bytes) {
            panic!("Stripping a frame that carries no VLAN tag");
        }

        let mut untagged = Vec::with_capacity(bytes.len() - TAG_LEN);
        untagged.extend_from_slice(&bytes[..12]);
        untagged.extend_from_slice(&bytes[16..]);
        untagged
    }

    /// Decodes a raw frame into its structured form.
    pub fn decode(&self, bytes: &[u8]) -> Result<EthernetFrame, FrameError> {
        let header = self.parse_header(bytes)?;

        let payload_offset = if header.vlan_id.is_some() {
            TAGGED_HEADER_LEN
        } else {
            UNTAGGED_HEADER_LEN
        };

        Ok(EthernetFrame {
            destination: header.destination,
            source: header.source,
            vlan_id: header.vlan_id,
            ether_type: header.ether_type,
            payload: bytes[payload_offset..].to_vec(),
        })
    }

    /// Encodes a structured frame into its on-wire byte form.
    pub fn encode(&self, frame: &EthernetFrame) -> Vec<u8> {
        let header_len = if frame.vlan_id.is_some() {
            TAGGED_HEADER_LEN
        } else {
            UNTAGGED_HEADER_LEN
        };

        let mut bytes = Vec::with_capacity(header_len + frame.payload.len());
        bytes.extend_from_slice(&frame.destination);
        bytes.extend_from_slice(&frame.source);

        if let Some(vlan_id) = frame.vlan_id {
            bytes.extend_from_slice(&self.tag_protocol_id.to_be_bytes());
            bytes.extend_from_slice(&(vlan_id & 0x0FFF).to_be_bytes());
        }

        bytes.extend_from_slice(&frame.ether_type.to_be_bytes());
        bytes.extend_from_slice(&frame.payload);

        bytes
    }
}
