use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::flags::ReachabilityFlags;
use crate::status::{classify_local, classify_routed, NetworkStatus};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// What a monitor watches. Immutable once the monitor is constructed.
///
/// The variant carries its own classification rule: routed targets
/// (host, address, internet) use the general classifier, the local
/// network probe uses the link-local one. There is no hidden mode
/// switch to set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum Target {
    /// A remote host identified by name. The name is never resolved by
    /// this crate; it identifies the route being asked about.
    Host(String),
    /// A concrete IPv4 or IPv6 socket address
    Address(SocketAddr),
    /// The default route ("can the internet be reached at all")
    Internet,
    /// The directly attached link-local network segment, the probe
    /// historically used to ask "is local WiFi up"
    LocalNetwork,
}

impl Target {
    /// Build a host target, validating the name.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTarget`] for an empty name, a name with
    /// whitespace or control characters, or one that exceeds DNS name
    /// and label length limits.
    pub fn host(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_host_name(&name)?;
        Ok(Self::Host(name))
    }

    /// Build a target from a socket address. Addresses are valid by
    /// construction, so this cannot fail.
    #[must_use]
    pub const fn address(addr: SocketAddr) -> Self {
        Self::Address(addr)
    }

    /// Classify observed flags under this target's rule.
    #[must_use]
    pub fn classify(&self, flags: ReachabilityFlags) -> NetworkStatus {
        match self {
            Self::LocalNetwork => classify_local(flags),
            Self::Host(_) | Self::Address(_) | Self::Internet => classify_routed(flags),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host(name) => write!(f, "{name}"),
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Internet => write!(f, "internet"),
            Self::LocalNetwork => write!(f, "local network"),
        }
    }
}

fn validate_host_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_target("host name is empty"));
    }
    if name.len() > 253 {
        return Err(Error::invalid_target("host name exceeds 253 characters"));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(Error::invalid_target(format!(
            "host name '{name}' contains whitespace or control characters"
        )));
    }

    // A single trailing dot is the fully-qualified form.
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(Error::invalid_target("host name has no labels"));
    }
    for label in name.split('.') {
        if label.is_empty() {
            return Err(Error::invalid_target(format!(
                "host name '{name}' contains an empty label"
            )));
        }
        if label.len() > 63 {
            return Err(Error::invalid_target(format!(
                "host name '{name}' contains a label over 63 characters"
            )));
        }
    }

    Ok(())
}
