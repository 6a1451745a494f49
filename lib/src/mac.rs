//! Provides MAC address resolution for scan targets
//!
//! A resolvable MAC address is the only liveness signal used by the
//! scanner: a target without one is treated as unreachable.

#[cfg(test)]
use mockall::automock;
use pnet::util::MacAddr;
use std::{
    fs,
    net::Ipv4Addr,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

/// Location of the kernel neighbor (ARP) table on linux
pub const NEIGHBOR_TABLE_PATH: &str = "/proc/net/arp";

// ATF_COM: the entry holds a completed hardware address
const ATF_COM: u32 = 0x2;

/// Trait describing a MAC address resolver
#[cfg_attr(test, automock)]
pub trait MacResolver: Send + Sync {
    /// Returns the MAC address of the given target if it can be resolved
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr>;
}

/// [`MacResolver`] that reads the operating system's neighbor table
///
/// On linux the table is read from [`NEIGHBOR_TABLE_PATH`]; elsewhere the
/// `arp` command is consulted. Entries are only present once the kernel
/// has resolved the address, which the scanner's connect attempts trigger
/// for targets on the local segment.
#[derive(Debug, Clone)]
pub struct NeighborTableResolver {
    table_path: Option<PathBuf>,
    local: Option<(Ipv4Addr, MacAddr)>,
}

impl Default for NeighborTableResolver {
    fn default() -> Self {
        let table_path = if cfg!(target_os = "linux") {
            Some(PathBuf::from(NEIGHBOR_TABLE_PATH))
        } else {
            None
        };

        Self {
            table_path,
            local: None,
        }
    }
}

impl NeighborTableResolver {
    /// Returns a resolver that reads the system neighbor table
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads neighbor entries from the given file instead of the system
    /// table. The file must use the `/proc/net/arp` layout.
    pub fn with_table_path(mut self, path: impl AsRef<Path>) -> Self {
        self.table_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Registers the current host's own address. The kernel never holds a
    /// neighbor entry for it, so it is answered directly.
    pub fn with_local_host(mut self, ip: Ipv4Addr, mac: MacAddr) -> Self {
        self.local = Some((ip, mac));
        self
    }

    fn lookup_table(&self, path: &Path, ip: Ipv4Addr) -> Option<MacAddr> {
        match fs::read_to_string(path) {
            Ok(contents) => parse_neighbor_table(&contents, ip),
            Err(e) => {
                log::warn!(
                    "failed to read neighbor table {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    fn lookup_command(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        let flag = if cfg!(windows) { "-a" } else { "-n" };
        match Command::new("arp").arg(flag).arg(ip.to_string()).output() {
            Ok(output) => parse_arp_command_output(
                &String::from_utf8_lossy(&output.stdout),
                ip,
            ),
            Err(e) => {
                log::warn!("failed to run arp command: {}", e);
                None
            }
        }
    }
}

impl MacResolver for NeighborTableResolver {
    fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        if let Some((local_ip, local_mac)) = self.local {
            if local_ip == ip {
                return Some(local_mac);
            }
        }

        match &self.table_path {
            Some(path) => self.lookup_table(path, ip),
            None => self.lookup_command(ip),
        }
    }
}

/// Finds the completed entry for `ip` in a `/proc/net/arp` formatted table
pub fn parse_neighbor_table(contents: &str, ip: Ipv4Addr) -> Option<MacAddr> {
    contents.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < 4 || Ipv4Addr::from_str(fields[0]).ok()? != ip {
            return None;
        }

        let flags =
            u32::from_str_radix(fields[2].trim_start_matches("0x"), 16).ok()?;

        if flags & ATF_COM == 0 {
            return None;
        }

        MacAddr::from_str(fields[3]).ok().filter(|m| !m.is_zero())
    })
}

/// Finds the MAC address reported for `ip` in the output of the `arp`
/// command. Both `:` and `-` separated addresses are recognised.
pub fn parse_arp_command_output(output: &str, ip: Ipv4Addr) -> Option<MacAddr> {
    let needle = ip.to_string();

    output
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .any(|t| t.trim_matches(|c| c == '(' || c == ')') == needle)
        })
        .flat_map(str::split_whitespace)
        .find_map(|token| {
            MacAddr::from_str(&token.replace('-', ":"))
                .ok()
                .filter(|m| !m.is_zero() && !m.is_broadcast())
        })
}

#[cfg(test)]
#[path = "./mac_tests.rs"]
mod tests;
