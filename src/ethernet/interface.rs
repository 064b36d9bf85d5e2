use std::{cell::RefCell, rc::Rc};

use crate::device::cable::EthernetPort;

use super::{EthernetFrame, FrameCodec, MacAddress};

/// A MAC-stamped station endpoint: builds frames, pushes them through a
/// physical port, and decodes whatever arrives in the other direction.
///
/// The switch's ports are promiscuous and deal in raw bytes; this type is
/// the host side of a cable, used by demo topologies and tests.
#[derive(Debug, Clone)]
pub struct EthernetInterface {
    port: Rc<RefCell<EthernetPort>>,
    codec: FrameCodec,
    pub mac_address: MacAddress,
}

impl EthernetInterface {
    pub fn new(mac_address: MacAddress) -> EthernetInterface {
        EthernetInterface::with_codec(mac_address, FrameCodec::default())
    }

    /// An endpoint speaking a non-default tag protocol id.
    pub fn with_codec(mac_address: MacAddress, codec: FrameCodec) -> EthernetInterface {
        EthernetInterface {
            port: Rc::new(RefCell::new(EthernetPort::new())),
            codec,
            mac_address,
        }
    }

    pub fn port(&self) -> Rc<RefCell<EthernetPort>> {
        self.port.clone()
    }

    /// Connects two EthernetInterfaces together via EthernetPorts (bi-directional).
    pub fn connect(&self, other: &EthernetInterface) {
        EthernetPort::connect(&self.port, &other.port);
    }

    /// Sends an untagged frame from this interface's MAC address.
    pub fn send(&mut self, destination: MacAddress, ether_type: u16, payload: Vec<u8>) {
        self.sendv(self.mac_address, destination, None, ether_type, payload);
    }

    /// Sends a frame tagged with the given VLAN id from this interface's MAC address.
    pub fn send_tagged(
        &mut self,
        destination: MacAddress,
        vlan_id: u16,
        ether_type: u16,
        payload: Vec<u8>,
    ) {
        self.sendv(
            self.mac_address,
            destination,
            Some(vlan_id),
            ether_type,
            payload,
        );
    }

    /// Sends a frame with a variable source address and optional VLAN tag.
    pub fn sendv(
        &mut self,
        source: MacAddress,
        destination: MacAddress,
        vlan_id: Option<u16>,
        ether_type: u16,
        payload: Vec<u8>,
    ) {
        let frame = EthernetFrame {
            destination,
            source,
            vlan_id,
            ether_type,
            payload,
        };
        self.port.borrow_mut().send(self.codec.encode(&frame));
    }

    /// Returns the frames received since the last call, oldest first.
    ///
    /// Buffers that do not decode as Ethernet frames are discarded.
    pub fn receive(&mut self) -> Vec<EthernetFrame> {
        self.port
            .borrow_mut()
            .consume_incoming()
            .iter()
            .filter_map(|bytes| self.codec.decode(bytes).ok())
            .collect()
    }
}
