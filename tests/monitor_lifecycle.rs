//! Integration tests for the monitor lifecycle and subscriptions

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use netreach::{
    FlagSource, NetworkStatus, ReachabilityFlags, ReachabilityMonitor, Result, Target,
};

const EVENT_WAIT: Duration = Duration::from_secs(2);

/// A flag source the test can switch at will.
struct SwitchSource {
    flags: Mutex<ReachabilityFlags>,
    failing: AtomicBool,
}

impl SwitchSource {
    fn new(flags: ReachabilityFlags) -> Arc<Self> {
        Arc::new(Self {
            flags: Mutex::new(flags),
            failing: AtomicBool::new(false),
        })
    }

    fn set_flags(&self, flags: ReachabilityFlags) {
        *self.flags.lock().unwrap() = flags;
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl FlagSource for SwitchSource {
    fn flags(&self, _target: &Target) -> Result<ReachabilityFlags> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "switched off").into());
        }
        Ok(*self.flags.lock().unwrap())
    }
}

fn internet_monitor(source: &Arc<SwitchSource>) -> ReachabilityMonitor {
    ReachabilityMonitor::internet()
        .with_source(Arc::clone(source) as Arc<dyn FlagSource>)
        .poll_interval(Duration::from_millis(10))
}

/// Let the worker take its baseline reading before flipping state.
fn settle() {
    std::thread::sleep(Duration::from_millis(50));
}

#[test]
fn change_events_reach_subscribers() {
    let source = SwitchSource::new(ReachabilityFlags::empty());
    let mut monitor = internet_monitor(&source);
    let subscription = monitor.subscribe();

    assert!(monitor.start());
    assert_eq!(monitor.current_status(), NetworkStatus::NotReachable);
    settle();

    source.set_flags(ReachabilityFlags::REACHABLE);
    let event = subscription.recv_timeout(EVENT_WAIT).expect("change event");
    assert_eq!(event.target, Target::Internet);
    assert_eq!(monitor.current_status(), NetworkStatus::ReachableViaWifi);

    monitor.stop();
}

#[test]
fn every_subscriber_sees_the_change() {
    let source = SwitchSource::new(ReachabilityFlags::empty());
    let mut monitor = internet_monitor(&source);
    let first = monitor.subscribe();
    let second = monitor.subscribe();

    assert!(monitor.start());
    settle();
    source.set_flags(ReachabilityFlags::REACHABLE);

    assert!(first.recv_timeout(EVENT_WAIT).is_some());
    assert!(second.recv_timeout(EVENT_WAIT).is_some());
    monitor.stop();
}

#[test]
fn dropped_subscription_does_not_affect_the_rest() {
    let source = SwitchSource::new(ReachabilityFlags::empty());
    let mut monitor = internet_monitor(&source);
    let cancelled = monitor.subscribe();
    let kept = monitor.subscribe();
    drop(cancelled);

    assert!(monitor.start());
    settle();
    source.set_flags(ReachabilityFlags::REACHABLE);
    assert!(kept.recv_timeout(EVENT_WAIT).is_some());

    // Another change still flows after the dead sender was pruned.
    source.set_flags(ReachabilityFlags::empty());
    assert!(kept.recv_timeout(EVENT_WAIT).is_some());
    monitor.stop();
}

#[test]
fn no_events_after_stop_returns() {
    let source = SwitchSource::new(ReachabilityFlags::empty());
    let mut monitor = internet_monitor(&source);
    let subscription = monitor.subscribe();

    assert!(monitor.start());
    settle();
    source.set_flags(ReachabilityFlags::REACHABLE);
    assert!(subscription.recv_timeout(EVENT_WAIT).is_some());

    monitor.stop();
    while subscription.try_recv().is_some() {}

    source.set_flags(ReachabilityFlags::empty());
    std::thread::sleep(Duration::from_millis(100));
    assert!(subscription.try_recv().is_none());
}

#[test]
fn stopped_monitor_can_be_started_again() {
    let source = SwitchSource::new(ReachabilityFlags::empty());
    let mut monitor = internet_monitor(&source);
    let subscription = monitor.subscribe();

    assert!(monitor.start());
    monitor.stop();
    assert!(!monitor.is_active());

    assert!(monitor.start());
    assert!(monitor.is_active());
    settle();
    source.set_flags(ReachabilityFlags::REACHABLE);
    assert!(subscription.recv_timeout(EVENT_WAIT).is_some());
    monitor.stop();
}

#[test]
fn source_failure_counts_as_a_change_to_not_reachable() {
    let source = SwitchSource::new(ReachabilityFlags::REACHABLE);
    let mut monitor = internet_monitor(&source);
    let subscription = monitor.subscribe();

    assert!(monitor.start());
    assert_eq!(monitor.current_status(), NetworkStatus::ReachableViaWifi);
    settle();

    source.set_failing(true);
    assert!(subscription.recv_timeout(EVENT_WAIT).is_some());
    assert_eq!(monitor.current_status(), NetworkStatus::NotReachable);
    assert!(!monitor.connection_required());

    let snapshot = monitor.snapshot();
    assert_eq!(snapshot.status, NetworkStatus::NotReachable);
    assert!(!snapshot.connection_required);
    monitor.stop();
}

#[test]
fn snapshot_masks_connection_required_when_unreachable() {
    let source = SwitchSource::new(ReachabilityFlags::CONNECTION_REQUIRED);
    let monitor = internet_monitor(&source);

    // The raw query reports the flag as observed...
    assert!(monitor.connection_required());

    // ...while the snapshot pairs it with the status and masks it.
    let snapshot = monitor.snapshot();
    assert_eq!(snapshot.status, NetworkStatus::NotReachable);
    assert!(!snapshot.connection_required);
}

#[test]
fn monitors_are_independent() {
    let wifi = SwitchSource::new(ReachabilityFlags::REACHABLE);
    let dead = SwitchSource::new(ReachabilityFlags::empty());

    let mut wifi_monitor = internet_monitor(&wifi);
    let mut dead_monitor = internet_monitor(&dead);
    let dead_subscription = dead_monitor.subscribe();

    assert!(wifi_monitor.start());
    assert!(dead_monitor.start());
    settle();

    // Changing one monitor's source leaves the other silent.
    wifi.set_flags(ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_CELLULAR);
    std::thread::sleep(Duration::from_millis(100));
    assert!(dead_subscription.try_recv().is_none());

    assert_eq!(
        wifi_monitor.current_status(),
        NetworkStatus::ReachableViaCellular
    );
    assert_eq!(dead_monitor.current_status(), NetworkStatus::NotReachable);

    wifi_monitor.stop();
    dead_monitor.stop();
}

#[test]
fn local_network_monitor_uses_the_link_local_rule() {
    let source = SwitchSource::new(ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_DIRECT);
    let monitor = ReachabilityMonitor::local_network()
        .with_source(Arc::clone(&source) as Arc<dyn FlagSource>)
        .poll_interval(Duration::from_millis(10));

    assert_eq!(monitor.current_status(), NetworkStatus::ReachableViaWifi);

    // Reachable but routed: not a local network.
    source.set_flags(ReachabilityFlags::REACHABLE);
    assert_eq!(monitor.current_status(), NetworkStatus::NotReachable);

    // Cellular never shows up for the local probe.
    source.set_flags(
        ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_DIRECT | ReachabilityFlags::IS_CELLULAR,
    );
    assert_ne!(
        monitor.current_status(),
        NetworkStatus::ReachableViaCellular
    );
}

#[test]
fn events_identify_their_monitor() {
    let source = SwitchSource::new(ReachabilityFlags::empty());
    let target = Target::address("192.0.2.10:443".parse().unwrap());
    let mut monitor = ReachabilityMonitor::new(target.clone())
        .with_source(Arc::clone(&source) as Arc<dyn FlagSource>)
        .poll_interval(Duration::from_millis(10));
    let subscription = monitor.subscribe();

    assert!(monitor.start());
    settle();
    source.set_flags(ReachabilityFlags::REACHABLE);

    let event = subscription.recv_timeout(EVENT_WAIT).expect("change event");
    assert_eq!(event.target, target);
    assert_eq!(&event.target, monitor.target());
    monitor.stop();
}
