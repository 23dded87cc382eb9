//! Flag sources: where reachability flags come from.
//!
//! The default [`SystemSource`] answers from operating-system state
//! (interface tables, routing tables) using non-blocking local
//! lookups. The [`FlagSource`] trait is the seam for swapping in a
//! different facility, e.g. a scripted source in tests.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

use std::net::IpAddr;

use crate::error::Result;
use crate::flags::ReachabilityFlags;
use crate::target::Target;

/// Supplies reachability flag snapshots for a target.
///
/// Implementations answer from locally held knowledge and must never
/// wait on network I/O. A failing read is reported as an error;
/// monitors treat that as "not reachable" rather than surfacing it.
#[cfg_attr(test, mockall::automock)]
pub trait FlagSource: Send + Sync {
    /// Read the current flags for `target`.
    ///
    /// # Errors
    /// Returns an error if system network state cannot be read.
    fn flags(&self, target: &Target) -> Result<ReachabilityFlags>;
}

/// The default source: derives flags from the operating system's
/// interface and routing state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSource;

impl SystemSource {
    /// Create a new system-backed source
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FlagSource for SystemSource {
    fn flags(&self, target: &Target) -> Result<ReachabilityFlags> {
        #[cfg(unix)]
        {
            let interfaces = unix::interface_snapshot()?;
            let route = unix::default_route(&interfaces)?;
            Ok(synthesize(target, &interfaces, route.as_ref()))
        }
        #[cfg(windows)]
        {
            let (interfaces, route) = windows::adapter_snapshot()?;
            Ok(synthesize(target, &interfaces, route.as_ref()))
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = target;
            Err(crate::error::Error::unsupported_platform(
                "reachability flags",
            ))
        }
    }
}

/// One address assigned to an interface.
#[derive(Debug, Clone)]
pub(crate) struct IfAddr {
    pub(crate) addr: IpAddr,
    pub(crate) netmask: Option<IpAddr>,
}

/// One interface, reduced to what flag synthesis needs.
#[derive(Debug, Clone)]
pub(crate) struct IfSnapshot {
    pub(crate) name: String,
    pub(crate) up: bool,
    pub(crate) running: bool,
    pub(crate) loopback: bool,
    pub(crate) point_to_point: bool,
    pub(crate) cellular: bool,
    pub(crate) addrs: Vec<IfAddr>,
}

/// The interface the default route leaves through.
#[derive(Debug, Clone)]
pub(crate) struct DefaultRoute {
    pub(crate) interface: String,
    pub(crate) has_gateway: bool,
}

/// Derive flags for `target` from an interface snapshot and the
/// default route. Pure with respect to its inputs; the platform
/// backends only gather the inputs.
pub(crate) fn synthesize(
    target: &Target,
    interfaces: &[IfSnapshot],
    route: Option<&DefaultRoute>,
) -> ReachabilityFlags {
    match target {
        Target::Internet | Target::Host(_) => routed_flags(interfaces, route),
        Target::Address(addr) => address_flags(addr.ip(), interfaces, route),
        Target::LocalNetwork => local_network_flags(interfaces),
    }
}

fn routed_flags(interfaces: &[IfSnapshot], route: Option<&DefaultRoute>) -> ReachabilityFlags {
    let Some(route) = route else {
        return ReachabilityFlags::empty();
    };

    let mut flags = ReachabilityFlags::REACHABLE;
    if !route.has_gateway {
        flags |= ReachabilityFlags::IS_DIRECT;
    }
    if let Some(iface) = interfaces.iter().find(|s| s.name == route.interface) {
        if iface.cellular {
            flags |= ReachabilityFlags::IS_CELLULAR;
        }
        if iface.point_to_point {
            flags |= ReachabilityFlags::TRANSIENT_CONNECTION;
        }
    }
    flags
}

fn address_flags(
    ip: IpAddr,
    interfaces: &[IfSnapshot],
    route: Option<&DefaultRoute>,
) -> ReachabilityFlags {
    if ip.is_loopback() {
        return ReachabilityFlags::REACHABLE
            | ReachabilityFlags::IS_LOCAL_ADDRESS
            | ReachabilityFlags::IS_DIRECT;
    }

    // An address assigned to one of our own interfaces.
    for iface in interfaces.iter().filter(|s| s.up) {
        if iface.addrs.iter().any(|a| a.addr == ip) {
            return ReachabilityFlags::REACHABLE
                | ReachabilityFlags::IS_LOCAL_ADDRESS
                | ReachabilityFlags::IS_DIRECT;
        }
    }

    // An address on a directly attached subnet.
    for iface in interfaces
        .iter()
        .filter(|s| s.up && s.running && !s.loopback)
    {
        if iface.addrs.iter().any(|a| on_same_subnet(a, ip)) {
            let mut flags = ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_DIRECT;
            if iface.cellular {
                flags |= ReachabilityFlags::IS_CELLULAR;
            }
            return flags;
        }
    }

    // Anything else travels the default route.
    routed_flags(interfaces, route)
}

fn local_network_flags(interfaces: &[IfSnapshot]) -> ReachabilityFlags {
    let attached = interfaces.iter().any(|s| {
        s.up && s.running && !s.loopback && !s.cellular && s.addrs.iter().any(|a| a.addr.is_ipv4())
    });
    if attached {
        ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_DIRECT
    } else {
        ReachabilityFlags::empty()
    }
}

fn on_same_subnet(assigned: &IfAddr, candidate: IpAddr) -> bool {
    match (assigned.addr, assigned.netmask, candidate) {
        (IpAddr::V4(a), Some(IpAddr::V4(m)), IpAddr::V4(c)) => {
            let mask = u32::from(m);
            mask != 0 && (u32::from(a) & mask) == (u32::from(c) & mask)
        }
        (IpAddr::V6(a), Some(IpAddr::V6(m)), IpAddr::V6(c)) => {
            let mask = u128::from(m);
            mask != 0 && (u128::from(a) & mask) == (u128::from(c) & mask)
        }
        _ => false,
    }
}

/// Pick the interface most likely to carry the default route, for
/// platforms where the routing table itself is not readable.
#[allow(dead_code)]
pub(crate) fn infer_default_route(interfaces: &[IfSnapshot]) -> Option<DefaultRoute> {
    interfaces
        .iter()
        .find(|s| s.up && s.running && !s.loopback && s.addrs.iter().any(|a| is_routable(a.addr)))
        .map(|s| DefaultRoute {
            interface: s.name.clone(),
            has_gateway: true,
        })
}

const fn is_link_local(ip: IpAddr) -> bool {
    match ip {
        // RFC 3927
        IpAddr::V4(ip) => ip.octets()[0] == 169 && ip.octets()[1] == 254,
        // RFC 4291
        IpAddr::V6(ip) => ip.segments()[0] & 0xffc0 == 0xfe80,
    }
}

const fn is_routable(ip: IpAddr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified() && !is_link_local(ip)
}
