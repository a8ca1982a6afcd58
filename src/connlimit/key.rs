//! Identity keys for the connection limiter.
//!
//! An IPv4 key is the 32-bit address value. A MAC key packs the six address
//! bytes little-endian into bits 0..48 and sets bit 48, so every MAC key is
//! greater than `u32::MAX` and the two forms never collide.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

const MAC_MARKER: u8 = 0x01;

/// Opaque 64-bit identity used as the limiter's lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(u64);

impl IdentityKey {
    /// Wrap a raw key value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Key for an IPv4 address.
    pub fn from_ipv4(addr: Ipv4Addr) -> Self {
        Self(u32::from(addr) as u64)
    }

    /// Key for a 48-bit hardware address.
    pub fn from_mac(mac: MacAddr) -> Self {
        let [a, b, c, d, e, f] = mac.0;
        Self(u64::from_le_bytes([a, b, c, d, e, f, MAC_MARKER, 0]))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Whether this key was derived from a MAC address.
    pub fn is_mac(&self) -> bool {
        self.0 > u32::MAX as u64
    }

    /// Decode back into the address form used for display.
    pub fn address(&self) -> KeyAddress {
        if self.is_mac() {
            let bytes = self.0.to_le_bytes();
            KeyAddress::Mac(MacAddr([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
            ]))
        } else {
            KeyAddress::Ipv4(Ipv4Addr::from(self.0 as u32))
        }
    }
}

impl From<Ipv4Addr> for IdentityKey {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_ipv4(addr)
    }
}

impl From<MacAddr> for IdentityKey {
    fn from(mac: MacAddr) -> Self {
        Self::from_mac(mac)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address a key decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAddress {
    Ipv4(Ipv4Addr),
    Mac(MacAddr),
}

/// Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

/// Error returned for unparsable hardware addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address: {0}")]
pub struct MacParseError(String);

impl FromStr for MacAddr {
    type Err = MacParseError;

    /// Parses `xx:xx:xx:xx:xx:xx`; each group is one or two hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(|| MacParseError(s.to_string()))?;
            if part.is_empty() || part.len() > 2 {
                return Err(MacParseError(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| MacParseError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(MacParseError(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}
