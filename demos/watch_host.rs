use std::env;
use std::time::{Duration, Instant};

use netreach::ReachabilityMonitor;

fn main() -> netreach::Result<()> {
    env_logger::init();

    let host = env::args()
        .nth(1)
        .unwrap_or_else(|| "www.example.com".to_string());

    let mut monitor = ReachabilityMonitor::host(host)?.poll_interval(Duration::from_millis(500));
    let subscription = monitor.subscribe();

    println!("{}: {}", monitor.target(), monitor.current_status());

    if !monitor.start() {
        eprintln!("change notifications unavailable; showing the initial reading only");
    }

    // Watch for 30 seconds, reporting each transition.
    let deadline = Instant::now() + Duration::from_secs(30);
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        if subscription.recv_timeout(deadline - now).is_some() {
            println!("{}: {}", monitor.target(), monitor.current_status());
        }
    }

    monitor.stop();
    Ok(())
}
