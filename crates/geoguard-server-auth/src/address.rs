// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source address whitelist.

use ipnet::IpNet;
use std::net::IpAddr;

use crate::error::{AuthError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressMatcher {
	Exact(IpAddr),
	Network(IpNet),
}

impl AddressMatcher {
	fn parse(entry: &str) -> Result<Self> {
		let entry = entry.trim();
		if let Ok(addr) = entry.parse::<IpAddr>() {
			return Ok(AddressMatcher::Exact(addr.to_canonical()));
		}
		entry
			.parse::<IpNet>()
			.map(AddressMatcher::Network)
			.map_err(|_| AuthError::InvalidWhitelistEntry {
				entry: entry.to_string(),
			})
	}

	fn matches(&self, addr: &IpAddr) -> bool {
		match self {
			AddressMatcher::Exact(exact) => exact == addr,
			AddressMatcher::Network(net) => net.contains(addr),
		}
	}
}

/// Addresses exempt from brute-force delays.
///
/// IPv4-mapped IPv6 addresses, in entries and lookups alike, are compared in
/// their IPv4 form, so a `127.0.0.1` entry also covers `::ffff:127.0.0.1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressWhitelist {
	matchers: Vec<AddressMatcher>,
}

impl AddressWhitelist {
	pub fn parse<I, S>(entries: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let matchers = entries
			.into_iter()
			.filter(|e| !e.as_ref().trim().is_empty())
			.map(|e| AddressMatcher::parse(e.as_ref()))
			.collect::<Result<Vec<_>>>()?;
		Ok(Self { matchers })
	}

	pub fn contains(&self, addr: IpAddr) -> bool {
		let addr = addr.to_canonical();
		self.matchers.iter().any(|m| m.matches(&addr))
	}

	pub fn len(&self) -> usize {
		self.matchers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.matchers.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::net::Ipv4Addr;

	fn ip(s: &str) -> IpAddr {
		s.parse().unwrap()
	}

	#[test]
	fn mapped_exact_entry_matches_both_forms() {
		let list = AddressWhitelist::parse(["::ffff:10.0.0.1"]).unwrap();
		assert!(list.contains(ip("10.0.0.1")));
		assert!(list.contains(ip("::ffff:10.0.0.1")));
		assert!(!list.contains(ip("10.0.0.2")));
	}

	#[test]
	fn exact_addresses() {
		let list = AddressWhitelist::parse(["127.0.0.1", "::1"]).unwrap();
		assert!(list.contains(ip("127.0.0.1")));
		assert!(list.contains(ip("::1")));
		assert!(!list.contains(ip("127.0.0.2")));
	}

	#[test]
	fn cidr_networks() {
		let list = AddressWhitelist::parse(["10.0.0.0/8", "fd00::/8"]).unwrap();
		assert!(list.contains(ip("10.1.2.3")));
		assert!(list.contains(ip("fd12::1")));
		assert!(!list.contains(ip("11.0.0.1")));
	}

	#[test]
	fn mapped_ipv4_matches_ipv4_entry() {
		let list = AddressWhitelist::parse(["127.0.0.1"]).unwrap();
		assert!(list.contains(ip("::ffff:127.0.0.1")));
	}

	#[test]
	fn blank_entries_are_skipped() {
		let list = AddressWhitelist::parse(["", "  ", "192.168.0.1"]).unwrap();
		assert_eq!(list.len(), 1);
	}

	#[test]
	fn invalid_entry_is_reported() {
		let err = AddressWhitelist::parse(["127.0.0.1", "localhost"]).unwrap_err();
		assert_eq!(
			err,
			AuthError::InvalidWhitelistEntry {
				entry: "localhost".to_string()
			}
		);
	}

	proptest! {
		#[test]
		fn slash_24_contains_every_host(
			a in any::<u8>(),
			b in any::<u8>(),
			c in any::<u8>(),
			host in any::<u8>(),
		) {
			let list = AddressWhitelist::parse([format!("{a}.{b}.{c}.0/24")]).unwrap();
			prop_assert!(list.contains(IpAddr::V4(Ipv4Addr::new(a, b, c, host))));
			prop_assert!(!list.contains(IpAddr::V4(Ipv4Addr::new(a, b, c.wrapping_add(1), host))));
		}
	}
}
