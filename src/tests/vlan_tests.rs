#![allow(non_snake_case)]

use std::path::Path;

use crate::config::{ConfigError, SwitchConfig};
use crate::vlan::{VlanDescriptor, VlanTable};

#[test]
fn Parse_AccessAndTrunkEntries_BuildsVlanTable() {
    // Arrange
    let contents = "5\n10\n20\nT\n10";

    // Act
    let config = SwitchConfig::parse(contents).unwrap();

    // Assert
    assert_eq!(config.bridge_priority, 5);
    assert_eq!(
        config.vlan_table,
        VlanTable::from_entries(vec![
            VlanDescriptor::Access(10),
            VlanDescriptor::Access(20),
            VlanDescriptor::Trunk,
            VlanDescriptor::Access(10),
        ])
    );
}

#[test]
fn Parse_MultiDigitVlanId_ParsesWholeNumber() {
    // Arrange
    let contents = "0\n100\n1024";

    // Act
    let config = SwitchConfig::parse(contents).unwrap();

    // Assert
    assert_eq!(config.vlan_table.lookup(0), VlanDescriptor::Access(100));
    assert_eq!(config.vlan_table.lookup(1), VlanDescriptor::Access(1024));
}

#[test]
fn Parse_SurroundingWhitespace_IsTrimmed() {
    // Arrange
    let contents = " 1 \n 10\nT \n";

    // Act
    let config = SwitchConfig::parse(contents).unwrap();

    // Assert
    assert_eq!(config.bridge_priority, 1);
    assert_eq!(config.vlan_table.lookup(0), VlanDescriptor::Access(10));
    assert_eq!(config.vlan_table.lookup(1), VlanDescriptor::Trunk);
}

#[test]
fn Parse_MalformedEntry_ReturnsError() {
    // Arrange
    let contents = "1\n10\nhello";

    // Act
    let result = SwitchConfig::parse(contents);

    // Assert
    assert!(matches!(
        result,
        Err(ConfigError::MalformedEntry { line: 3, .. })
    ));
}

#[test]
fn Parse_EmptyEntryLine_ReturnsError() {
    // Arrange
    let contents = "1\n10\n\n20";

    // Act
    let result = SwitchConfig::parse(contents);

    // Assert
    assert!(matches!(
        result,
        Err(ConfigError::MalformedEntry { line: 3, .. })
    ));
}

#[test]
fn Parse_MissingPriority_ReturnsError() {
    // Act
    let result = SwitchConfig::parse("");

    // Assert
    assert!(matches!(result, Err(ConfigError::MissingPriority)));
}

#[test]
fn Parse_MalformedPriority_ReturnsError() {
    // Act
    let result = SwitchConfig::parse("root\n10");

    // Assert
    assert!(matches!(result, Err(ConfigError::MalformedPriority(_))));
}

#[test]
fn Parse_VlanIdOutOfRange_ReturnsError() {
    // Act
    let result = SwitchConfig::parse("1\n5000");

    // Assert
    assert!(matches!(
        result,
        Err(ConfigError::VlanIdOutOfRange {
            line: 2,
            vlan_id: 5000
        })
    ));
}

#[test]
fn Parse_NoInterfaceEntries_ReturnsError() {
    // Act
    let result = SwitchConfig::parse("1\n");

    // Assert
    assert!(matches!(result, Err(ConfigError::NoInterfaces)));
}

#[test]
fn FromFile_MissingFile_ReturnsIoError() {
    // Act
    let result = SwitchConfig::from_file(Path::new("configs/no-such-switch.cfg"));

    // Assert
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn Lookup_ReturnsConfiguredDescriptor() {
    // Arrange
    let table = VlanTable::from_entries(vec![VlanDescriptor::Access(7), VlanDescriptor::Trunk]);

    // Act / Assert
    assert_eq!(table.lookup(0), VlanDescriptor::Access(7));
    assert_eq!(table.lookup(1), VlanDescriptor::Trunk);
    assert_eq!(table.len(), 2);
}

#[test]
fn Display_DescribesDescriptor() {
    // Act / Assert
    assert_eq!(format!("{}", VlanDescriptor::Access(10)), "access VLAN 10");
    assert_eq!(format!("{}", VlanDescriptor::Trunk), "trunk");
}
