use std::fmt;

/// A 12-bit 802.1Q VLAN identifier.
pub type VlanId = u16;

/// Static VLAN role of a switch interface, decoded once at configuration
/// load and never re-inspected as text afterwards.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VlanDescriptor {
    /// Carries frames for exactly one VLAN, always untagged on the wire.
    Access(VlanId),
    /// May carry frames for any VLAN, tagged on the wire.
    Trunk,
}

impl fmt::Display for VlanDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VlanDescriptor::Access(vlan_id) => write!(f, "access VLAN {}", vlan_id),
            VlanDescriptor::Trunk => write!(f, "trunk"),
        }
    }
}

/// Per-interface VLAN configuration, indexed by interface id.
///
/// Built complete at startup and immutable afterwards. The switch creates
/// exactly one port per entry, so every interface it owns has a descriptor.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VlanTable {
    entries: Vec<VlanDescriptor>,
}

impl VlanTable {
    pub fn from_entries(entries: Vec<VlanDescriptor>) -> VlanTable {
        VlanTable { entries }
    }

    /// Returns the configured descriptor of an interface.
    ///
    /// # Panics
    /// Panics if the interface id is not covered by the configuration; the
    /// table is validated against the interface count at startup, so this
    /// is a programmer error at forwarding time.
    pub fn lookup(&self, interface: usize) -> VlanDescriptor {
        self.entries[interface]
    }

    /// Number of interfaces the configuration covers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VlanDescriptor> {
        self.entries.iter()
    }
}
