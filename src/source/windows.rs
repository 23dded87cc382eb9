use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ptr;

use winapi::shared::ifdef::IfOperStatusUp;
use winapi::shared::ipifcons::{
    IF_TYPE_PPP, IF_TYPE_SOFTWARE_LOOPBACK, IF_TYPE_WWANPP, IF_TYPE_WWANPP2,
};
use winapi::shared::winerror::{ERROR_BUFFER_OVERFLOW, ERROR_SUCCESS};
use winapi::shared::ws2def::{AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR, SOCKADDR_IN};
use winapi::shared::ws2ipdef::SOCKADDR_IN6_LH;
use winapi::um::iphlpapi::GetAdaptersAddresses;
use winapi::um::iptypes::{
    GAA_FLAG_INCLUDE_GATEWAYS, GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER,
    GAA_FLAG_SKIP_MULTICAST, IP_ADAPTER_ADDRESSES_LH,
};

use crate::error::{Error, Result};

use super::{DefaultRoute, IfAddr, IfSnapshot};

/// Enumerate adapters and pick out the default-route carrier in one
/// pass over `GetAdaptersAddresses`.
pub(crate) fn adapter_snapshot() -> Result<(Vec<IfSnapshot>, Option<DefaultRoute>)> {
    let flags = GAA_FLAG_INCLUDE_GATEWAYS
        | GAA_FLAG_SKIP_ANYCAST
        | GAA_FLAG_SKIP_MULTICAST
        | GAA_FLAG_SKIP_DNS_SERVER;

    let mut size = 0u32;
    let mut ret = unsafe {
        GetAdaptersAddresses(
            AF_UNSPEC as u32,
            flags,
            ptr::null_mut(),
            ptr::null_mut(),
            &mut size,
        )
    };
    if ret != ERROR_SUCCESS && ret != ERROR_BUFFER_OVERFLOW {
        return Err(Error::system_call("GetAdaptersAddresses", ret as i32));
    }

    let mut buffer = vec![0u8; size as usize];
    let adapters = buffer.as_mut_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();
    ret = unsafe {
        GetAdaptersAddresses(AF_UNSPEC as u32, flags, ptr::null_mut(), adapters, &mut size)
    };
    if ret != ERROR_SUCCESS {
        return Err(Error::system_call("GetAdaptersAddresses", ret as i32));
    }

    let mut interfaces = Vec::new();
    let mut route = None;

    let mut cursor: *const IP_ADAPTER_ADDRESSES_LH = adapters;
    while !cursor.is_null() {
        let adapter = unsafe { &*cursor };
        let up = adapter.OperStatus == IfOperStatusUp;
        let snapshot = IfSnapshot {
            name: wide_to_string(adapter.FriendlyName),
            up,
            running: up,
            loopback: adapter.IfType == IF_TYPE_SOFTWARE_LOOPBACK,
            point_to_point: adapter.IfType == IF_TYPE_PPP,
            cellular: adapter.IfType == IF_TYPE_WWANPP || adapter.IfType == IF_TYPE_WWANPP2,
            addrs: unicast_addrs(adapter),
        };

        // The first up, non-loopback adapter with a gateway carries
        // the default route.
        if route.is_none() && up && !snapshot.loopback && !adapter.FirstGatewayAddress.is_null() {
            route = Some(DefaultRoute {
                interface: snapshot.name.clone(),
                has_gateway: true,
            });
        }

        interfaces.push(snapshot);
        cursor = adapter.Next;
    }

    Ok((interfaces, route))
}

fn unicast_addrs(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Vec<IfAddr> {
    let mut addrs = Vec::new();
    let mut cursor = adapter.FirstUnicastAddress;
    while !cursor.is_null() {
        let unicast = unsafe { &*cursor };
        if let Some(addr) = sockaddr_ip(unicast.Address.lpSockaddr) {
            addrs.push(IfAddr {
                addr,
                netmask: Some(prefix_netmask(addr, unicast.OnLinkPrefixLength)),
            });
        }
        cursor = unicast.Next;
    }
    addrs
}

fn sockaddr_ip(sa: *const SOCKADDR) -> Option<IpAddr> {
    if sa.is_null() {
        return None;
    }
    let family = i32::from(unsafe { (*sa).sa_family });
    if family == AF_INET {
        let sin = unsafe { &*sa.cast::<SOCKADDR_IN>() };
        let octets = unsafe { *sin.sin_addr.S_un.S_addr() }.to_ne_bytes();
        Some(IpAddr::V4(Ipv4Addr::from(octets)))
    } else if family == AF_INET6 {
        let sin6 = unsafe { &*sa.cast::<SOCKADDR_IN6_LH>() };
        let octets = unsafe { *sin6.sin6_addr.u.Byte() };
        Some(IpAddr::V6(Ipv6Addr::from(octets)))
    } else {
        None
    }
}

fn prefix_netmask(addr: IpAddr, prefix: u8) -> IpAddr {
    match addr {
        IpAddr::V4(_) => {
            let prefix = u32::from(prefix.min(32));
            let mask = if prefix == 0 {
                0
            } else {
                u32::MAX << (32 - prefix)
            };
            IpAddr::V4(Ipv4Addr::from(mask))
        }
        IpAddr::V6(_) => {
            let prefix = u32::from(prefix.min(128));
            let mask = if prefix == 0 {
                0
            } else {
                u128::MAX << (128 - prefix)
            };
            IpAddr::V6(Ipv6Addr::from(mask))
        }
    }
}

fn wide_to_string(mut ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut units = Vec::new();
    unsafe {
        while *ptr != 0 {
            units.push(*ptr);
            ptr = ptr.add(1);
        }
    }
    String::from_utf16_lossy(&units)
}
