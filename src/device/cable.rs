use std::{cell::RefCell, rc::Rc};

use crate::tick::Tickable;

/// Simulates the movement of data over the physical cabling.
///
/// Holds every EthernetPort in the topology and, on each `transmit`, moves
/// each port's outgoing frames into its peer's incoming buffer.
#[derive(Default)]
pub struct CableSimulator {
    ports: Vec<Rc<RefCell<EthernetPort>>>,
}

impl CableSimulator {
    /// Adds a port to the simulator.
    pub fn add(&mut self, ethernet_port: Rc<RefCell<EthernetPort>>) {
        self.ports.push(ethernet_port);
    }

    /// Adds multiple ports to the simulator.
    pub fn adds(&mut self, ethernet_ports: Vec<Rc<RefCell<EthernetPort>>>) {
        for port in ethernet_ports {
            self.add(port);
        }
    }

    /// Delivers every pending outgoing frame to the connected peer.
    ///
    /// Transmission is best-effort: a port with no cable attached drops its
    /// outgoing frames on the floor.
    pub fn transmit(&mut self) {
        for port in self.ports.iter() {
            let mut port = port.borrow_mut();

            match port.connection.clone() {
                Some(peer) => port.flush_outgoing(&mut peer.borrow_mut()),
                None => port.drop_outgoing(),
            }
        }
    }
}

impl Tickable for CableSimulator {
    fn tick(&mut self) {
        self.transmit();
    }
}

/// A physical ethernet port: frames queue in an outgoing buffer until the
/// cable simulator carries them to the connected peer's incoming buffer.
///
/// Buffers hold whole frames (`Vec<u8>` each) rather than a raw byte
/// stream; the interpacket gap on a real wire is what keeps frames
/// individually receivable, and the simulation models that directly.
#[derive(Debug, Clone, Default)]
pub struct EthernetPort {
    incoming_buffer: Vec<Vec<u8>>,
    outgoing_buffer: Vec<Vec<u8>>,

    /// None until a cable is attached.
    connection: Option<Rc<RefCell<EthernetPort>>>,
}

impl EthernetPort {
    pub fn new() -> EthernetPort {
        EthernetPort::default()
    }

    /// Connects two ethernet ports together. This is a bi-directional connection.
    pub fn connect(port1: &Rc<RefCell<EthernetPort>>, port2: &Rc<RefCell<EthernetPort>>) {
        port1.borrow_mut().connection = Some(port2.clone());
        port2.borrow_mut().connection = Some(port1.clone());
    }

    /// Detaches the cable, leaving buffered frames in place.
    pub fn disconnect(&mut self) {
        self.connection = None;
    }

    /// Queues a frame for transmission. Fire-and-forget: delivery happens
    /// on the simulator's next transmit, or not at all if unconnected.
    pub fn send(&mut self, frame: Vec<u8>) {
        self.outgoing_buffer.push(frame);
    }

    /// Moves this port's outgoing frames into the peer's incoming buffer.
    fn flush_outgoing(&mut self, peer: &mut EthernetPort) {
        peer.incoming_buffer.append(&mut self.outgoing_buffer);
    }

    /// Discards this port's outgoing frames.
    fn drop_outgoing(&mut self) {
        self.outgoing_buffer.clear();
    }

    /// Drains and returns the incoming buffer, oldest frame first.
    pub fn consume_incoming(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.incoming_buffer)
    }

    /// Returns true if frames are queued for transmission.
    #[cfg(test)]
    pub(crate) fn has_outgoing(&self) -> bool {
        !self.outgoing_buffer.is_empty()
    }
}
