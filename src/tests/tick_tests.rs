#![allow(non_snake_case)]

use std::time::Duration;

use serial_test::serial;

use crate::device::switch::{Switch, CONTROL_PLANE_INTERVAL};
use crate::ethernet::FrameCodec;
use crate::mac_addr;
use crate::tick::{Clock, TickTimer, Tickable};
use crate::vlan::{VlanDescriptor, VlanTable};

fn freeze_clock() {
    Clock::instance().lock().unwrap().freeze();
}

fn unfreeze_clock() {
    Clock::instance().lock().unwrap().unfreeze();
}

fn advance_clock(duration: Duration) {
    Clock::instance().lock().unwrap().advance(duration);
}

fn one_port_switch() -> Switch {
    Switch::new(
        mac_addr!(99),
        1,
        VlanTable::from_entries(vec![VlanDescriptor::Access(10)]),
        FrameCodec::default(),
    )
}

#[test]
#[serial]
fn Schedule_IntervalElapses_KeyBecomesReady() {
    // Arrange
    freeze_clock();
    let mut timer = TickTimer::new();
    timer.schedule("hello", Duration::from_secs(1), false);

    // Act / Assert
    assert!(timer.ready().is_empty());

    advance_clock(Duration::from_secs(1));
    assert_eq!(timer.ready(), vec!["hello"]);

    unfreeze_clock();
}

#[test]
#[serial]
fn Schedule_SameKeyTwice_KeepsOriginalInterval() {
    // Arrange
    freeze_clock();
    let mut timer = TickTimer::new();
    timer.schedule("hello", Duration::from_secs(1), false);
    timer.schedule("hello", Duration::from_secs(60), false);

    // Act
    advance_clock(Duration::from_secs(1));

    // Assert
    assert_eq!(timer.ready(), vec!["hello"]);

    unfreeze_clock();
}

#[test]
#[serial]
fn Tick_OneShotFired_RemovesKey() {
    // Arrange
    freeze_clock();
    let mut timer = TickTimer::new();
    timer.schedule("hello", Duration::from_secs(1), false);
    advance_clock(Duration::from_secs(1));

    // Act
    timer.tick();

    // Assert
    assert!(!timer.is_scheduled(&"hello"));
    assert!(timer.ready().is_empty());

    unfreeze_clock();
}

#[test]
#[serial]
fn Tick_RepeatingFired_RearmsForNextInterval() {
    // Arrange
    freeze_clock();
    let mut timer = TickTimer::new();
    timer.schedule("hello", Duration::from_secs(1), true);
    advance_clock(Duration::from_secs(1));
    assert_eq!(timer.ready(), vec!["hello"]);

    // Act
    timer.tick();

    // Assert: re-armed, not ready until another interval passes
    assert!(timer.is_scheduled(&"hello"));
    assert!(timer.ready().is_empty());

    advance_clock(Duration::from_secs(1));
    assert_eq!(timer.ready(), vec!["hello"]);

    unfreeze_clock();
}

#[test]
#[serial]
fn Cancel_ScheduledKey_NeverFires() {
    // Arrange
    freeze_clock();
    let mut timer = TickTimer::new();
    timer.schedule("hello", Duration::from_secs(1), true);

    // Act
    let cancelled = timer.cancel(&"hello");

    // Assert
    assert!(cancelled);
    assert!(!timer.cancel(&"hello"));

    advance_clock(Duration::from_secs(5));
    assert!(timer.ready().is_empty());

    unfreeze_clock();
}

#[test]
#[serial]
fn Tick_ControlPlaneInterval_FiresHelloEachTime() {
    // Arrange
    freeze_clock();
    let mut switch = one_port_switch();

    // Act / Assert
    switch.tick();
    assert_eq!(switch.hello_count(), 0); // interval not yet elapsed

    advance_clock(CONTROL_PLANE_INTERVAL);
    switch.tick();
    assert_eq!(switch.hello_count(), 1);

    advance_clock(CONTROL_PLANE_INTERVAL);
    switch.tick();
    assert_eq!(switch.hello_count(), 2);

    unfreeze_clock();
}

#[test]
#[serial]
fn Shutdown_CancelsControlPlane_ForwardingKeepsTicking() {
    // Arrange
    freeze_clock();
    let mut switch = one_port_switch();
    assert!(switch.control_plane_scheduled());

    // Act
    switch.shutdown();
    advance_clock(CONTROL_PLANE_INTERVAL);
    switch.tick();

    // Assert
    assert!(!switch.control_plane_scheduled());
    assert_eq!(switch.hello_count(), 0);

    unfreeze_clock();
}
