//! Host-environment checks for the system-backed flag source.
//!
//! These run against whatever network state the test machine has, so
//! they assert invariants that hold everywhere rather than concrete
//! statuses.

use std::time::{Duration, Instant};

use netreach::{
    FlagSource, NetworkStatus, ReachabilityFlags, ReachabilityMonitor, SystemSource, Target,
};

#[test]
fn loopback_address_is_local_and_direct() {
    let source = SystemSource::new();
    let target = Target::address("127.0.0.1:80".parse().unwrap());

    let flags = source.flags(&target).expect("loopback flags");
    assert!(flags.contains(
        ReachabilityFlags::REACHABLE
            | ReachabilityFlags::IS_LOCAL_ADDRESS
            | ReachabilityFlags::IS_DIRECT
    ));
    assert_eq!(target.classify(flags), NetworkStatus::ReachableViaWifi);
}

#[test]
fn consecutive_loopback_reads_agree() {
    let source = SystemSource::new();
    let target = Target::address("[::1]:80".parse().unwrap());

    let first = source.flags(&target).expect("flags");
    let second = source.flags(&target).expect("flags");
    assert_eq!(first, second);
}

#[test]
fn queries_answer_from_local_state_quickly() {
    let source = SystemSource::new();
    let host = Target::host("www.example.com").expect("valid host");

    let started = Instant::now();
    let _ = source.flags(&Target::Internet);
    let _ = source.flags(&Target::LocalNetwork);
    let _ = source.flags(&host);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "flag queries must not wait on network I/O"
    );
}

#[test]
fn local_network_probe_never_reports_cellular() {
    let monitor = ReachabilityMonitor::local_network();
    assert_ne!(
        monitor.current_status(),
        NetworkStatus::ReachableViaCellular
    );
}

#[cfg(target_os = "linux")]
#[test]
fn system_state_is_readable_on_linux() {
    let source = SystemSource::new();
    assert!(source.flags(&Target::Internet).is_ok());
    assert!(source.flags(&Target::LocalNetwork).is_ok());
    assert!(source
        .flags(&Target::host("www.example.com").unwrap())
        .is_ok());
}

#[test]
fn monitor_smoke() {
    // Turn it on, wait a moment, turn it off; stop must return
    // promptly once the worker has exited.
    let mut monitor = ReachabilityMonitor::internet().poll_interval(Duration::from_millis(50));
    let _subscription = monitor.subscribe();

    monitor.start();
    std::thread::sleep(Duration::from_millis(120));

    let begun = Instant::now();
    monitor.stop();
    assert!(begun.elapsed() < Duration::from_secs(1));
    assert!(!monitor.is_active());
}
