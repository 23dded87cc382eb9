use std::net::SocketAddr;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::error::Result;
use crate::flags::ReachabilityFlags;
use crate::source::{FlagSource, SystemSource};
use crate::status::{NetworkStatus, StatusSnapshot};
use crate::target::Target;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// How often the worker re-reads flags unless configured otherwise.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Notification that a monitor observed a reachability change.
///
/// The event deliberately carries no flags: the state may have moved
/// again by the time it is handled, so receivers re-read through
/// [`ReachabilityMonitor::current_status`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct ReachabilityEvent {
    /// Target of the monitor that observed the change
    pub target: Target,
}

/// Receiving end of one monitor subscription.
///
/// Dropping the subscription cancels delivery for this subscriber; the
/// monitor prunes it on the next publish. All receive methods return
/// `None` once the monitor itself has been dropped.
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<ReachabilityEvent>,
}

impl Subscription {
    /// Block until the next change event.
    pub fn recv(&self) -> Option<ReachabilityEvent> {
        self.rx.recv().ok()
    }

    /// Block for at most `timeout` waiting for a change event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ReachabilityEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Take a pending change event without blocking.
    pub fn try_recv(&self) -> Option<ReachabilityEvent> {
        self.rx.try_recv().ok()
    }
}

/// Watches reachability of one target and notifies subscribers when it
/// changes.
///
/// The monitor is idle until [`start`](Self::start) spawns its worker;
/// [`stop`](Self::stop) (or dropping the monitor) shuts the worker
/// down again. Status queries work in both states and always read
/// fresh flags.
pub struct ReachabilityMonitor {
    target: Target,
    source: Arc<dyn FlagSource>,
    interval: Duration,
    subscribers: Arc<Mutex<Vec<Sender<ReachabilityEvent>>>>,
    shutdown: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ReachabilityMonitor {
    /// Create a monitor for a target, backed by the system flag
    /// source.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            source: Arc::new(SystemSource::new()),
            interval: DEFAULT_POLL_INTERVAL,
            subscribers: Arc::new(Mutex::new(Vec::new())),
            shutdown: None,
            worker: None,
        }
    }

    /// Watch the route to a named remote host.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidTarget`] if the name is not a
    /// plausible host name.
    pub fn host(name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(Target::host(name)?))
    }

    /// Watch the route to a socket address.
    #[must_use]
    pub fn address(addr: SocketAddr) -> Self {
        Self::new(Target::Address(addr))
    }

    /// Watch whether the default route is available. For applications
    /// that do not connect to one particular host.
    #[must_use]
    pub fn internet() -> Self {
        Self::new(Target::Internet)
    }

    /// Watch whether a directly attached local network is available.
    #[must_use]
    pub fn local_network() -> Self {
        Self::new(Target::LocalNetwork)
    }

    /// Replace the default system-backed flag source. Takes effect for
    /// queries immediately and for the worker at the next `start`.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FlagSource>) -> Self {
        self.source = source;
        self
    }

    /// Set the worker's polling interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The target this monitor watches.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Whether the worker is currently delivering change events.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// Open a subscription to this monitor's change events.
    ///
    /// Subscribing works before `start`; events only flow while the
    /// monitor is active.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        Subscription { rx }
    }

    /// Start delivering change events.
    ///
    /// Returns false (non-fatal) if the worker thread could not be
    /// spawned; the caller may retry or poll
    /// [`current_status`](Self::current_status) instead. Calling
    /// `start` on an already active monitor is a no-op returning true.
    pub fn start(&mut self) -> bool {
        if self.worker.is_some() {
            return true;
        }

        let (shutdown_tx, shutdown_rx) = channel();
        let source = Arc::clone(&self.source);
        let target = self.target.clone();
        let subscribers = Arc::clone(&self.subscribers);
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name("reachability".to_string())
            .spawn(move || worker_loop(&*source, &target, &subscribers, &shutdown_rx, interval));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.shutdown = Some(shutdown_tx);
                true
            }
            Err(err) => {
                warn!("could not start reachability worker for {}: {err}", self.target);
                false
            }
        }
    }

    /// Stop delivering change events.
    ///
    /// Synchronous: the worker has exited by the time this returns, so
    /// no further events will be delivered. Idempotent and safe to
    /// call on a monitor that was never started.
    pub fn stop(&mut self) {
        // Dropping the sender wakes the worker out of its timed wait.
        self.shutdown = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("reachability worker for {} panicked", self.target);
            }
        }
    }

    /// Classify the target's reachability from a fresh flags read.
    ///
    /// Degrades to [`NetworkStatus::NotReachable`] when flags cannot
    /// be read; absence of information is treated as not reachable.
    #[must_use]
    pub fn current_status(&self) -> NetworkStatus {
        match self.read_flags() {
            Some(flags) => self.target.classify(flags),
            None => NetworkStatus::NotReachable,
        }
    }

    /// Whether a connection must first be established before traffic
    /// can flow (e.g. dial-on-demand or VPN-on-demand links).
    ///
    /// This is the raw flag; see [`snapshot`](Self::snapshot) for the
    /// masked pairing with status.
    #[must_use]
    pub fn connection_required(&self) -> bool {
        self.read_flags()
            .is_some_and(|flags| flags.contains(ReachabilityFlags::CONNECTION_REQUIRED))
    }

    /// Status and connection requirement from a single flags read,
    /// with `connection_required` masked to false when the target is
    /// not reachable.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        match self.read_flags() {
            Some(flags) => StatusSnapshot::new(
                self.target.classify(flags),
                flags.contains(ReachabilityFlags::CONNECTION_REQUIRED),
            ),
            None => StatusSnapshot::new(NetworkStatus::NotReachable, false),
        }
    }

    fn read_flags(&self) -> Option<ReachabilityFlags> {
        match self.source.flags(&self.target) {
            Ok(flags) => {
                trace!("flags {flags} for {}", self.target);
                Some(flags)
            }
            Err(err) => {
                debug!("flags query failed for {}: {err}", self.target);
                None
            }
        }
    }
}

impl Drop for ReachabilityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ReachabilityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReachabilityMonitor")
            .field("target", &self.target)
            .field("interval", &self.interval)
            .field("active", &self.worker.is_some())
            .finish_non_exhaustive()
    }
}

fn worker_loop(
    source: &dyn FlagSource,
    target: &Target,
    subscribers: &Mutex<Vec<Sender<ReachabilityEvent>>>,
    shutdown: &Receiver<()>,
    interval: Duration,
) {
    // The first read establishes a baseline; events are published for
    // changes after that. A failed read counts as "no flags", which
    // classifies as not reachable.
    let mut last: Option<ReachabilityFlags> = None;
    loop {
        let observed = source
            .flags(target)
            .unwrap_or_else(|_| ReachabilityFlags::empty());
        if let Some(previous) = last {
            if previous != observed {
                debug!("reachability changed for {target}: {previous} -> {observed}");
                publish(subscribers, target);
            }
        }
        last = Some(observed);

        match shutdown.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn publish(subscribers: &Mutex<Vec<Sender<ReachabilityEvent>>>, target: &Target) {
    if let Ok(mut subscribers) = subscribers.lock() {
        // Dropped subscriptions fail to send and fall out here.
        subscribers.retain(|tx| {
            tx.send(ReachabilityEvent {
                target: target.clone(),
            })
            .is_ok()
        });
    }
}
