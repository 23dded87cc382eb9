use std::env;
use std::thread;
use std::time::{Duration, Instant};

use netreach::{NetworkStatus, ReachabilityMonitor};

fn main() -> netreach::Result<()> {
    env_logger::init();

    let host = env::args()
        .nth(1)
        .unwrap_or_else(|| "www.example.com".to_string());

    let interval = Duration::from_millis(500);
    let mut host_monitor = ReachabilityMonitor::host(host.clone())?.poll_interval(interval);
    let mut internet_monitor = ReachabilityMonitor::internet().poll_interval(interval);
    let mut local_monitor = ReachabilityMonitor::local_network().poll_interval(interval);

    let subscriptions = [
        host_monitor.subscribe(),
        internet_monitor.subscribe(),
        local_monitor.subscribe(),
    ];

    for monitor in [&mut host_monitor, &mut internet_monitor, &mut local_monitor] {
        if !monitor.start() {
            eprintln!(
                "could not start change notifications for {}; showing polled readings only",
                monitor.target()
            );
        }
    }

    let labels = [
        format!("Remote Host ({host})"),
        "Internet Connection".to_string(),
        "Local Network".to_string(),
    ];
    let monitors = [&host_monitor, &internet_monitor, &local_monitor];

    // Initial readings, then change-driven updates for a minute.
    for (monitor, label) in monitors.iter().zip(&labels) {
        print_status(monitor, label);
    }

    let deadline = Instant::now() + Duration::from_secs(60);
    while Instant::now() < deadline {
        let mut changed = false;
        for ((subscription, monitor), label) in subscriptions.iter().zip(&monitors).zip(&labels) {
            if subscription.try_recv().is_some() {
                // Collapse a burst of changes into one fresh reading.
                while subscription.try_recv().is_some() {}
                print_status(monitor, label);
                changed = true;
            }
        }
        if !changed {
            thread::sleep(Duration::from_millis(200));
        }
    }

    Ok(())
}

fn print_status(monitor: &ReachabilityMonitor, label: &str) {
    let snapshot = monitor.snapshot();
    let mut line = format!("{label}: {}", snapshot.status);
    if snapshot.connection_required {
        line.push_str(", Connection Required");
    }
    println!("{line}");

    if snapshot.status == NetworkStatus::ReachableViaCellular {
        if snapshot.connection_required {
            println!("  Cellular data is available; traffic will flow once a connection is established.");
        } else {
            println!("  Cellular data is active; traffic will be routed through it.");
        }
    }
}
