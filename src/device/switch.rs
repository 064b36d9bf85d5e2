use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use tracing::{debug, trace, warn};

use crate::ethernet::{format_mac, interface::EthernetInterface, FrameCodec, MacAddress};
use crate::tick::{TickTimer, Tickable};
use crate::vlan::{VlanDescriptor, VlanTable};

use super::cable::EthernetPort;

/// How often the control plane wakes up.
pub const CONTROL_PLANE_INTERVAL: Duration = Duration::from_secs(1);

/// Dynamic source-MAC to interface bindings, learned from received frames.
///
/// Entries live for the process lifetime; there is no aging. A future
/// spanning-tree revision would sweep last-seen timestamps from the
/// control-plane timer, but this core deliberately leaves entries pinned.
#[derive(Debug, Default)]
pub struct MacTable {
    entries: HashMap<MacAddress, usize>,
}

impl MacTable {
    pub fn new() -> MacTable {
        MacTable::default()
    }

    /// Binds a MAC address to an interface, overwriting any previous binding.
    pub fn learn(&mut self, mac: MacAddress, interface: usize) {
        self.entries.insert(mac, interface);
    }

    /// Returns the interface a MAC address was last learned on.
    pub fn resolve(&self, mac: MacAddress) -> Option<usize> {
        self.entries.get(&mac).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Hash, Eq, PartialEq, Clone)]
enum ControlPlaneAction {
    Hello,
}

/// One switch interface: a physical port plus its static VLAN role.
#[derive(Debug)]
struct SwitchPort {
    port: Rc<RefCell<EthernetPort>>,
    vlan: VlanDescriptor,
}

/// A VLAN-aware layer two switch.
///
/// Learns source addresses, forwards to learned destinations and floods
/// everything else, adding or stripping 802.1Q tags so every frame leaves
/// in the wire form its egress interface requires. A periodic control-plane
/// hook is reserved for a future loop-prevention protocol.
pub struct Switch {
    ports: Vec<SwitchPort>,
    mac_table: MacTable,
    codec: FrameCodec,
    mac_address: MacAddress,
    bridge_priority: u16,
    timer: TickTimer<ControlPlaneAction>,
    #[cfg(test)]
    hello_count: u64,
}

impl Switch {
    /// Creates a switch with one interface per VLAN table entry, interfaces
    /// numbered `0..vlan_table.len()` in table order.
    /// * `mac_address` - The switch's own MAC address; frames addressed to it are flooded, not consumed.
    /// * `bridge_priority` - Spanning-tree priority from the configuration file; dormant until the control plane grows a real protocol.
    /// * `vlan_table` - Per-interface VLAN roles, complete by construction.
    /// * `codec` - Frame codec carrying the deployment's tag protocol id.
    pub fn new(
        mac_address: MacAddress,
        bridge_priority: u16,
        vlan_table: VlanTable,
        codec: FrameCodec,
    ) -> Switch {
        let ports = vlan_table
            .iter()
            .map(|vlan| SwitchPort {
                port: Rc::new(RefCell::new(EthernetPort::new())),
                vlan: *vlan,
            })
            .collect();

        let mut timer = TickTimer::new();
        timer.schedule(ControlPlaneAction::Hello, CONTROL_PLANE_INTERVAL, true);

        Switch {
            ports,
            mac_table: MacTable::new(),
            codec,
            mac_address,
            bridge_priority,
            timer,
            #[cfg(test)]
            hello_count: 0,
        }
    }

    /// Connects an interface's port to an endpoint (bi-directional).
    /// * `interface` - The interface id on this switch to connect.
    /// * `endpoint` - The endpoint to attach.
    ///
    /// # Panics
    /// Panics if the interface id is out of range.
    pub fn connect(&mut self, interface: usize, endpoint: &EthernetInterface) {
        if interface >= self.ports.len() {
            panic!("Interface id out of range");
        }
        EthernetPort::connect(&self.ports[interface].port, &endpoint.port());
    }

    /// Returns all the EthernetPorts of the switch, for the cable simulator.
    pub fn ports(&self) -> Vec<Rc<RefCell<EthernetPort>>> {
        self.ports.iter().map(|sp| sp.port.clone()).collect()
    }

    /// Returns the number of interfaces, identified `0..N-1`.
    pub fn interface_count(&self) -> usize {
        self.ports.len()
    }

    /// Returns the MAC address of the switch.
    pub fn mac_address(&self) -> MacAddress {
        self.mac_address
    }

    /// Returns the spanning-tree bridge priority of the switch.
    pub fn bridge_priority(&self) -> u16 {
        self.bridge_priority
    }

    /// Returns the configured VLAN role of an interface.
    pub fn vlan(&self, interface: usize) -> VlanDescriptor {
        self.ports[interface].vlan
    }

    /// Returns the learned MAC bindings.
    pub fn mac_table(&self) -> &MacTable {
        &self.mac_table
    }

    /// Drains every interface's received frames and runs each through the
    /// forwarding engine, one frame at a time.
    pub fn forward(&mut self) {
        for ingress in 0..self.ports.len() {
            let frames = self.ports[ingress].port.borrow_mut().consume_incoming();
            for bytes in frames {
                self.process_frame(ingress, bytes);
            }
        }
    }

    /// The per-frame forwarding decision: learn the source, then unicast to
    /// a learned destination or flood, re-tagging as each egress requires.
    fn process_frame(&mut self, ingress: usize, bytes: Vec<u8>) {
        let header = match self.codec.parse_header(&bytes) {
            Ok(header) => header,
            Err(e) => {
                warn!("Dropping malformed frame on interface {}: {}", ingress, e);
                return;
            }
        };

        debug!(
            "Received {} byte frame on interface {}: {} -> {}",
            bytes.len(),
            ingress,
            format_mac(header.source),
            format_mac(header.destination),
        );

        // The engine keeps exactly one canonical representation in flight:
        // untagged bytes plus the effective VLAN. Tags reappear only at the
        // egress boundary.
        let (effective_vlan, bytes) = match header.vlan_id {
            Some(vlan_id) => (vlan_id, self.codec.strip_tag(&bytes)),
            None => match self.ports[ingress].vlan {
                VlanDescriptor::Access(vlan_id) => (vlan_id, bytes),
                VlanDescriptor::Trunk => {
                    // A trunk has no untagged default; the frame's VLAN is undefined.
                    warn!(
                        "Dropping untagged frame on trunk interface {}",
                        ingress
                    );
                    return;
                }
            },
        };

        self.mac_table.learn(header.source, ingress);
        trace!(
            "Learned {} on interface {}",
            format_mac(header.source),
            ingress
        );

        // Frames addressed to the switch itself would be the control plane's
        // to consume; until it exists they flood like unknown destinations.
        if header.destination == self.mac_address {
            self.flood(ingress, effective_vlan, &bytes);
            return;
        }

        match self.mac_table.resolve(header.destination) {
            Some(egress) => match self.ports[egress].vlan {
                VlanDescriptor::Access(vlan_id) if vlan_id == effective_vlan => {
                    self.ports[egress].port.borrow_mut().send(bytes);
                }
                // Trunk egress, or an access interface on another VLAN: the
                // resolve path always re-tags with the effective VLAN.
                _ => {
                    let tagged = self.codec.insert_tag(&bytes, effective_vlan);
                    self.ports[egress].port.borrow_mut().send(tagged);
                }
            },
            None => self.flood(ingress, effective_vlan, &bytes),
        }
    }

    /// Sends a copy of the frame on every interface except the ingress,
    /// each in its required wire form: untagged on access interfaces of the
    /// effective VLAN, tagged with the effective VLAN everywhere else.
    fn flood(&self, ingress: usize, effective_vlan: u16, bytes: &[u8]) {
        for (interface, switch_port) in self.ports.iter().enumerate() {
            if interface == ingress {
                continue;
            }

            match switch_port.vlan {
                VlanDescriptor::Access(vlan_id) if vlan_id == effective_vlan => {
                    switch_port.port.borrow_mut().send(bytes.to_vec());
                }
                _ => {
                    let tagged = self.codec.insert_tag(bytes, effective_vlan);
                    switch_port.port.borrow_mut().send(tagged);
                }
            }
        }
    }

    /// Control-plane hello. A future loop-prevention protocol transmits its
    /// BPDUs from here; today the hook only traces. It must stay cheap and
    /// non-blocking: it shares the tick with frame processing.
    fn control_plane_hello(&mut self) {
        trace!(
            "Control-plane hello from {} (priority {})",
            format_mac(self.mac_address),
            self.bridge_priority
        );
        #[cfg(test)]
        {
            self.hello_count += 1;
        }
    }

    /// Stops the control-plane timer so the switch can wind down cleanly.
    /// Forwarding keeps working; only the periodic hook stops firing.
    pub fn shutdown(&mut self) {
        self.timer.cancel(&ControlPlaneAction::Hello);
    }

    #[cfg(test)]
    pub(crate) fn control_plane_scheduled(&self) -> bool {
        self.timer.is_scheduled(&ControlPlaneAction::Hello)
    }

    #[cfg(test)]
    pub(crate) fn hello_count(&self) -> u64 {
        self.hello_count
    }
}

impl Tickable for Switch {
    fn tick(&mut self) {
        self.forward();

        for action in self.timer.ready() {
            match action {
                ControlPlaneAction::Hello => self.control_plane_hello(),
            }
        }

        self.timer.tick();
    }
}
