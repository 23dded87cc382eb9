use crate::flags::ReachabilityFlags;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Coarse classification of how a target can currently be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum NetworkStatus {
    /// No usable route to the target
    NotReachable,
    /// Reachable over WiFi or another local network link
    ReachableViaWifi,
    /// Reachable over a cellular data network
    ReachableViaCellular,
}

impl NetworkStatus {
    /// Returns true unless the status is [`NetworkStatus::NotReachable`]
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        !matches!(self, Self::NotReachable)
    }
}

impl std::fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReachable => write!(f, "Not Reachable"),
            Self::ReachableViaWifi => write!(f, "Reachable WiFi"),
            Self::ReachableViaCellular => write!(f, "Reachable WWAN"),
        }
    }
}

/// Classify flags for a routed target (host, address, or the default
/// route).
///
/// The decision ladder:
/// 1. Without `REACHABLE`, nothing else matters.
/// 2. A reachable target is assumed to be on WiFi. That holds when no
///    connection needs establishing, and also when an on-demand or
///    on-traffic connection will come up without user intervention.
///    A reachable target whose connection still needs manual
///    intervention keeps the WiFi answer; callers that care consult
///    the `CONNECTION_REQUIRED` flag separately.
/// 3. `IS_CELLULAR` overrides the WiFi answer whenever it is present.
///
/// Pure and deterministic: same flags, same answer, no side effects.
#[must_use]
pub fn classify_routed(flags: ReachabilityFlags) -> NetworkStatus {
    if !flags.contains(ReachabilityFlags::REACHABLE) {
        return NetworkStatus::NotReachable;
    }

    if flags.contains(ReachabilityFlags::IS_CELLULAR) {
        // Cellular wins over the WiFi assumption whenever the route
        // crosses a WWAN interface.
        return NetworkStatus::ReachableViaCellular;
    }

    NetworkStatus::ReachableViaWifi
}

/// Classify flags for the directly attached link-local network.
///
/// Reports [`NetworkStatus::ReachableViaWifi`] only when the target is
/// both reachable and on a direct link; routed and cellular paths do
/// not count, so this never yields
/// [`NetworkStatus::ReachableViaCellular`].
#[must_use]
pub fn classify_local(flags: ReachabilityFlags) -> NetworkStatus {
    if flags.contains(ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_DIRECT) {
        NetworkStatus::ReachableViaWifi
    } else {
        NetworkStatus::NotReachable
    }
}

/// One classified reading of a monitor's flags: the status together
/// with whether a connection must first be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct StatusSnapshot {
    /// Classified status at read time
    pub status: NetworkStatus,
    /// Whether traffic needs a connection established first
    pub connection_required: bool,
}

impl StatusSnapshot {
    /// Combine a classified status with the raw `CONNECTION_REQUIRED`
    /// flag.
    ///
    /// The raw flag can be set even when the target is unreachable; it
    /// is masked to `false` here so callers never render a
    /// "connection required" hint for a dead route.
    #[must_use]
    pub const fn new(status: NetworkStatus, connection_required: bool) -> Self {
        Self {
            status,
            connection_required: status.is_reachable() && connection_required,
        }
    }
}
