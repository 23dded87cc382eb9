use std::collections::HashMap;
use std::net::IpAddr;

use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use nix::sys::socket::SockaddrStorage;

use crate::error::{Error, Result};

use super::{DefaultRoute, IfAddr, IfSnapshot};

/// Collect the current interface table.
pub(crate) fn interface_snapshot() -> Result<Vec<IfSnapshot>> {
    let entries =
        getifaddrs().map_err(|errno| Error::system_call("getifaddrs", errno as i32))?;

    // getifaddrs yields one entry per address; fold them into one
    // snapshot per interface. Link-layer entries still tell us the
    // interface exists and what its flags are.
    let mut interfaces: HashMap<String, IfSnapshot> = HashMap::new();
    for entry in entries {
        let flags = entry.flags;
        let snapshot = interfaces
            .entry(entry.interface_name.clone())
            .or_insert_with(|| IfSnapshot {
                cellular: is_cellular_name(&entry.interface_name),
                name: entry.interface_name.clone(),
                up: flags.contains(InterfaceFlags::IFF_UP),
                running: flags.contains(InterfaceFlags::IFF_RUNNING),
                loopback: flags.contains(InterfaceFlags::IFF_LOOPBACK),
                point_to_point: flags.contains(InterfaceFlags::IFF_POINTOPOINT),
                addrs: Vec::new(),
            });

        if let Some(ip) = entry.address.as_ref().and_then(sockaddr_ip) {
            snapshot.addrs.push(IfAddr {
                addr: ip,
                netmask: entry.netmask.as_ref().and_then(sockaddr_ip),
            });
        }
    }

    Ok(interfaces.into_values().collect())
}

fn sockaddr_ip(storage: &SockaddrStorage) -> Option<IpAddr> {
    if let Some(sin) = storage.as_sockaddr_in() {
        Some(IpAddr::V4(sin.ip()))
    } else if let Some(sin6) = storage.as_sockaddr_in6() {
        Some(IpAddr::V6(sin6.ip()))
    } else {
        None
    }
}

/// Best-effort name heuristic for WWAN interfaces, matching the names
/// the usual kernel drivers hand out.
fn is_cellular_name(name: &str) -> bool {
    name.starts_with("wwan")
        || name.starts_with("wwp")
        || name.starts_with("rmnet")
        || name.starts_with("ppp")
}

// Route flag bits as printed in /proc/net/route and /proc/net/ipv6_route.
#[cfg(target_os = "linux")]
const RTF_UP: u32 = 0x0001;
#[cfg(target_os = "linux")]
const RTF_GATEWAY: u32 = 0x0002;

#[cfg(target_os = "linux")]
pub(crate) fn default_route(_interfaces: &[IfSnapshot]) -> Result<Option<DefaultRoute>> {
    if let Some(route) = ipv4_default_route()? {
        return Ok(Some(route));
    }
    ipv6_default_route()
}

/// Scan /proc/net/route for an up route whose destination and mask are
/// both zero.
#[cfg(target_os = "linux")]
fn ipv4_default_route() -> Result<Option<DefaultRoute>> {
    let table = std::fs::read_to_string("/proc/net/route")?;
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let (Some(destination), Some(flags), Some(mask)) = (
            u32::from_str_radix(fields[1], 16).ok(),
            u32::from_str_radix(fields[3], 16).ok(),
            u32::from_str_radix(fields[7], 16).ok(),
        ) else {
            continue;
        };
        if destination != 0 || mask != 0 || flags & RTF_UP == 0 {
            continue;
        }
        return Ok(Some(DefaultRoute {
            interface: fields[0].to_string(),
            has_gateway: flags & RTF_GATEWAY != 0,
        }));
    }
    Ok(None)
}

#[cfg(target_os = "linux")]
fn ipv6_default_route() -> Result<Option<DefaultRoute>> {
    // Hosts without IPv6 have no ipv6_route file; that is not an error.
    let table = match std::fs::read_to_string("/proc/net/ipv6_route") {
        Ok(table) => table,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    for line in table.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        // dst prefix length is field 1, flags field 8, device field 9.
        // Kernel reject routes sit on "lo".
        if fields.len() < 10 || fields[9] == "lo" {
            continue;
        }
        let (Some(prefix_len), Some(flags)) = (
            u8::from_str_radix(fields[1], 16).ok(),
            u32::from_str_radix(fields[8], 16).ok(),
        ) else {
            continue;
        };
        if prefix_len != 0 || flags & RTF_UP == 0 {
            continue;
        }
        return Ok(Some(DefaultRoute {
            interface: fields[9].to_string(),
            has_gateway: flags & RTF_GATEWAY != 0,
        }));
    }
    Ok(None)
}

/// The BSDs and macOS keep the routing table behind sysctl rather than
/// a readable file; infer from interface state instead.
#[cfg(not(target_os = "linux"))]
pub(crate) fn default_route(interfaces: &[IfSnapshot]) -> Result<Option<DefaultRoute>> {
    Ok(super::infer_default_route(interfaces))
}
