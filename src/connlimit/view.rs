//! Textual inspection and flush commands over the limiter (`connlimit ...`).

use std::fmt::Write;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use crate::connlimit::key::{IdentityKey, KeyAddress, MacAddr};
use crate::connlimit::limiter::ConnLimiter;

const HEADER: &str = "       mac         |       ip      | count |    age   | age-raw   \r\n";
const SEPARATOR: &str = "-------------------+---------------+-------+----------+-----------\r\n";
const INVALID_FORMAT: &str = "invalid format\r\n";

/// Flush target selected by a `connlimit flush` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushScope {
    All,
    Ip(Ipv4Addr),
    Mac(MacAddr),
}

/// Management view over a shared limiter.
#[derive(Debug, Clone)]
pub struct ConnlimitView {
    limiter: Arc<ConnLimiter>,
}

impl ConnlimitView {
    pub fn new(limiter: Arc<ConnLimiter>) -> Self {
        Self { limiter }
    }

    /// Execute `fields` (starting with `connlimit`) and append the reply to `out`.
    ///
    /// A successful flush writes nothing, so over the management listener the
    /// reply is the bare terminating empty line. Rejected input never touches
    /// the limiter.
    pub fn execute(&self, fields: &[&str], out: &mut String) {
        match fields {
            [_, "show"] => self.show(out),
            [_, "flush", "all"] => self.flush(FlushScope::All),
            [_, "flush", "ip", addr] => match addr.parse::<Ipv4Addr>() {
                Ok(ip) => self.flush(FlushScope::Ip(ip)),
                Err(_) => out.push_str(INVALID_FORMAT),
            },
            [_, "flush", "mac", addr] => match addr.parse::<MacAddr>() {
                Ok(mac) => self.flush(FlushScope::Mac(mac)),
                Err(_) => out.push_str(INVALID_FORMAT),
            },
            _ => Self::help(out),
        }
    }

    /// Render every entry as a table row.
    pub fn show(&self, out: &mut String) {
        out.push_str(HEADER);
        out.push_str(SEPARATOR);

        for entry in self.limiter.entries() {
            let address = match entry.identity.address() {
                KeyAddress::Mac(mac) => format!(" {} | {:<12} ", mac, " "),
                KeyAddress::Ipv4(ip) => format!(" {:<18}| {:<13}", " ", ip.to_string()),
            };
            let (age, age_raw) = format_age(entry.age);
            let _ = write!(
                out,
                "{} | {:<5} | {:<8} | {} \r\n",
                address, entry.count, age, age_raw
            );
        }
    }

    /// Apply a flush. Unknown identities are not an error.
    pub fn flush(&self, scope: FlushScope) {
        match scope {
            FlushScope::All => {
                self.limiter.flush_all();
            }
            FlushScope::Ip(ip) => {
                self.limiter.flush(IdentityKey::from_ipv4(ip));
            }
            FlushScope::Mac(mac) => {
                self.limiter.flush(IdentityKey::from_mac(mac));
            }
        }
    }

    pub fn help(out: &mut String) {
        out.push_str("connlimit show - show connection limit entries\r\n");
        out.push_str("connlimit flush - flush connection limit entries\r\n");
        out.push_str("\tip <addresss> - flush by ip address\r\n");
        out.push_str("\tmac <mac> - flush by station mac address\r\n");
        out.push_str("\tall - flush all entries\r\n");
    }
}

/// Age as `HH:MM:SS` plus raw seconds.
fn format_age(age: Duration) -> (String, String) {
    let secs = age.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    (
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds),
        secs.to_string(),
    )
}
