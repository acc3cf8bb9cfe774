// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service prefix to port mapping.
//!
//! The leftmost label of a certificate name (its *service prefix*) selects which
//! TCP and UDP ports get a TLSA record. `smtp.example.com` publishes records for
//! ports 25, 465 and 587, while a name without a rule falls back to TCP 443.
//!
//! # Overrides
//!
//! Rules can be replaced at startup with strings of the form
//!
//! ```text
//! <prefix>:<port>{t|u}[,<port>{t|u}]*[;<prefix>:<port>{t|u}[,<port>{t|u}]*]*
//! ```
//!
//! A later entry for a prefix replaces the earlier rule entirely.
//!
//! ```rust
//! use tlsa_updater::port_rules::{PortRule, PortRuleTable};
//!
//! let mut table = PortRuleTable::default();
//! table.apply_override("openvpn:943t,1194u").unwrap();
//!
//! assert_eq!(table.resolve("openvpn"), &PortRule::new(vec![943], vec![1194]));
//! assert_eq!(table.resolve("unknown"), &PortRule::new(vec![443], vec![]));
//! ```

use crate::constants::{
    DEFAULT_TCP_PORT, RULE_ENTRY_SEPARATOR, RULE_PORT_SEPARATOR, RULE_PREFIX_SEPARATOR,
};
use crate::errors::PortRuleError;
use std::collections::HashMap;
use std::fmt;

/// Transport protocol a TLSA record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// `_tcp`
    Tcp,
    /// `_udp`
    Udp,
}

impl Protocol {
    /// Label used in the owner name, without the leading underscore.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TCP and UDP ports published for one service prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortRule {
    /// TCP ports, in declaration order
    pub tcp_ports: Vec<u16>,
    /// UDP ports, in declaration order
    pub udp_ports: Vec<u16>,
}

impl PortRule {
    #[must_use]
    pub fn new(tcp_ports: Vec<u16>, udp_ports: Vec<u16>) -> Self {
        Self {
            tcp_ports,
            udp_ports,
        }
    }

    fn tcp(ports: &[u16]) -> Self {
        Self::new(ports.to_vec(), Vec::new())
    }

    /// Iterates over every `(protocol, port)` pair, TCP ports first.
    pub fn ports(&self) -> impl Iterator<Item = (Protocol, u16)> + '_ {
        self.tcp_ports
            .iter()
            .map(|port| (Protocol::Tcp, *port))
            .chain(self.udp_ports.iter().map(|port| (Protocol::Udp, *port)))
    }
}

impl fmt::Display for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ports: Vec<String> = self
            .ports()
            .map(|(protocol, port)| match protocol {
                Protocol::Tcp => format!("{port}t"),
                Protocol::Udp => format!("{port}u"),
            })
            .collect();
        f.write_str(&ports.join(","))
    }
}

/// Mapping from service prefix to [`PortRule`].
///
/// Built once at startup, read-only while records are synthesized.
#[derive(Debug, Clone)]
pub struct PortRuleTable {
    rules: HashMap<String, PortRule>,
    fallback: PortRule,
}

impl Default for PortRuleTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PortRuleTable {
    /// A table with no rules; every prefix resolves to the TCP 443 fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: PortRule::tcp(&[DEFAULT_TCP_PORT]),
        }
    }

    /// A table holding the built-in rules for common mail, directory and web services.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        let builtin: [(&str, PortRule); 26] = [
            ("influx", PortRule::tcp(&[8888])),
            ("ha", PortRule::tcp(&[8123])),
            ("webcam", PortRule::tcp(&[8080])),
            ("router", PortRule::tcp(&[809])),
            ("git", PortRule::tcp(&[443])),
            ("pve", PortRule::tcp(&[8006])),
            ("mx", PortRule::tcp(&[25])),
            ("mx1", PortRule::tcp(&[25])),
            ("mx2", PortRule::tcp(&[25])),
            ("mx3", PortRule::tcp(&[25])),
            ("mx4", PortRule::tcp(&[25])),
            ("smtp", PortRule::tcp(&[25, 465, 587])),
            ("submission", PortRule::tcp(&[587])),
            ("smtps", PortRule::tcp(&[465])),
            ("pop3", PortRule::tcp(&[110, 995])),
            ("pop3s", PortRule::tcp(&[995])),
            ("imap", PortRule::tcp(&[143, 993])),
            ("imaps", PortRule::tcp(&[993])),
            ("news", PortRule::tcp(&[119, 563])),
            ("nntp", PortRule::tcp(&[119, 563])),
            ("nntps", PortRule::tcp(&[563])),
            ("ldap", PortRule::tcp(&[389, 636])),
            ("ldaps", PortRule::tcp(&[636])),
            ("ftp", PortRule::tcp(&[21, 990])),
            ("ftps", PortRule::tcp(&[990])),
            ("openvpn", PortRule::new(vec![943], vec![1194])),
        ];
        for (prefix, rule) in builtin {
            table.insert(prefix, rule);
        }
        table
    }

    /// Sets the rule for `prefix`, replacing any previous rule.
    pub fn insert(&mut self, prefix: impl Into<String>, rule: PortRule) {
        self.rules.insert(prefix.into(), rule);
    }

    /// Returns the rule for `prefix`, or the TCP 443 fallback.
    ///
    /// Matching is exact and case-sensitive.
    #[must_use]
    pub fn resolve(&self, prefix: &str) -> &PortRule {
        self.rules.get(prefix).unwrap_or(&self.fallback)
    }

    /// Whether an explicit rule exists for `prefix`.
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.rules.contains_key(prefix)
    }

    /// Parses `spec` and applies every entry in order.
    ///
    /// The whole string is parsed before anything is applied, so a malformed
    /// string leaves the table untouched. Rules applied by earlier calls stay.
    ///
    /// # Errors
    ///
    /// Returns a [`PortRuleError`] describing the first malformed entry.
    pub fn apply_override(&mut self, spec: &str) -> Result<(), PortRuleError> {
        for (prefix, rule) in parse_override(spec)? {
            self.insert(prefix, rule);
        }
        Ok(())
    }
}

/// Parses an override string into `(prefix, rule)` pairs in declaration order.
///
/// Empty entries and empty port tokens are skipped.
///
/// # Errors
///
/// Returns a [`PortRuleError`] for the first malformed entry.
pub fn parse_override(spec: &str) -> Result<Vec<(String, PortRule)>, PortRuleError> {
    spec.split(RULE_ENTRY_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Result<(String, PortRule), PortRuleError> {
    let Some((prefix, ports)) = entry.split_once(RULE_PREFIX_SEPARATOR) else {
        return Err(PortRuleError::MissingSeparator {
            entry: entry.to_string(),
        });
    };

    let mut rule = PortRule::default();
    for token in ports
        .split(RULE_PORT_SEPARATOR)
        .filter(|token| !token.is_empty())
    {
        match parse_port(entry, token)? {
            (Protocol::Tcp, port) => rule.tcp_ports.push(port),
            (Protocol::Udp, port) => rule.udp_ports.push(port),
        }
    }
    Ok((prefix.to_string(), rule))
}

fn parse_port(entry: &str, token: &str) -> Result<(Protocol, u16), PortRuleError> {
    let suffix_error = || PortRuleError::MissingProtocolSuffix {
        entry: entry.to_string(),
        port: token.to_string(),
    };

    let suffix = token.chars().last().ok_or_else(suffix_error)?;
    let protocol = match suffix {
        't' => Protocol::Tcp,
        'u' => Protocol::Udp,
        _ => return Err(suffix_error()),
    };

    let number = &token[..token.len() - suffix.len_utf8()];
    let port = number
        .parse::<u16>()
        .map_err(|_| PortRuleError::InvalidPort {
            entry: entry.to_string(),
            port: token.to_string(),
        })?;
    Ok((protocol, port))
}

#[cfg(test)]
#[path = "port_rules_tests.rs"]
mod port_rules_tests;
