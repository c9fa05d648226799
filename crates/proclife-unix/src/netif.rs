use nix::ifaddrs::{InterfaceAddress, getifaddrs};
use nix::net::if_::InterfaceFlags;
use proclife_core::ProcessError;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// One address record of a network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEntry {
    pub name: String,
    pub up: bool,
    pub address: Option<IpAddr>,
}

impl From<&InterfaceAddress> for InterfaceEntry {
    fn from(ifaddr: &InterfaceAddress) -> Self {
        let address = ifaddr.address.as_ref().and_then(|addr| {
            if let Some(v4) = addr.as_sockaddr_in() {
                Some(IpAddr::V4(v4.ip()))
            } else {
                addr.as_sockaddr_in6().map(|v6| IpAddr::V6(v6.ip()))
            }
        });

        Self {
            name: ifaddr.interface_name.clone(),
            up: ifaddr.flags.contains(InterfaceFlags::IFF_UP),
            address,
        }
    }
}

/// First non-loopback IPv4 address of the named interface
///
/// Returns `Ok(None)` when the interface is down or carries no such address,
/// and [`ProcessError::InterfaceNotFound`] when no interface has that name.
pub fn interface_ipv4(name: &str) -> Result<Option<Ipv4Addr>, ProcessError> {
    let entries: Vec<InterfaceEntry> = getifaddrs()
        .map_err(std::io::Error::from)?
        .map(|ifaddr| InterfaceEntry::from(&ifaddr))
        .collect();

    let ip = select_ipv4(name, &entries)?;
    debug!(interface = name, ?ip, "looked up interface address");
    Ok(ip)
}

/// Pick the address [`interface_ipv4`] reports out of raw interface entries
pub fn select_ipv4(name: &str, entries: &[InterfaceEntry]) -> Result<Option<Ipv4Addr>, ProcessError> {
    let matching: Vec<&InterfaceEntry> = entries.iter().filter(|e| e.name == name).collect();

    if matching.is_empty() {
        return Err(ProcessError::InterfaceNotFound {
            name: name.to_string(),
        });
    }

    if !matching.iter().any(|e| e.up) {
        return Ok(None);
    }

    Ok(matching.into_iter().find_map(|e| match e.address {
        Some(IpAddr::V4(ip)) if !ip.is_loopback() => Some(ip),
        _ => None,
    }))
}
