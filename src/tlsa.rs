// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! TLSA record synthesis (RFC 6698).
//!
//! Every record produced by this crate is `3 0 1`: DANE-EE usage, full
//! certificate selector, SHA-256 matching. The owner name follows the
//! `_<port>._<proto>.<name>` convention.

use crate::constants::{TLSA_CERT_USAGE_DANE_EE, TLSA_MATCHING_SHA256, TLSA_SELECTOR_FULL_CERT};
use crate::fqdn::to_fqdn;
use crate::port_rules::Protocol;
use hickory_client::rr::rdata::tlsa::{CertUsage, Matching, Selector, TLSA};
use hickory_client::rr::{DNSClass, Name, RData, Record};
use hickory_proto::error::ProtoError;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// One TLSA resource record to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsaRecordSpec {
    /// `_<port>._<proto>.<subject fqdn>`
    pub owner_name: String,
    /// Record TTL in seconds
    pub ttl: u32,
    /// Always [`TLSA_CERT_USAGE_DANE_EE`]
    pub cert_usage: u8,
    /// Always [`TLSA_SELECTOR_FULL_CERT`]
    pub selector: u8,
    /// Always [`TLSA_MATCHING_SHA256`]
    pub matching_type: u8,
    /// SHA-256 of the DER-encoded certificate
    pub cert_association_data: Vec<u8>,
}

/// Builds the owner name for a service on `subject`.
///
/// ```rust
/// use tlsa_updater::port_rules::Protocol;
/// use tlsa_updater::tlsa::owner_name;
///
/// assert_eq!(owner_name(25, Protocol::Tcp, "mail.example.com."), "_25._tcp.mail.example.com.");
/// ```
#[must_use]
pub fn owner_name(port: u16, protocol: Protocol, subject: &str) -> String {
    format!("_{port}._{protocol}.{}", to_fqdn(subject))
}

/// SHA-256 digest of the DER certificate.
#[must_use]
pub fn association_data(cert_der: &[u8]) -> Vec<u8> {
    Sha256::digest(cert_der).to_vec()
}

impl TlsaRecordSpec {
    /// Synthesizes the record for `subject` on `port`/`protocol`.
    #[must_use]
    pub fn new(subject: &str, port: u16, protocol: Protocol, ttl: u32, cert_der: &[u8]) -> Self {
        Self {
            owner_name: owner_name(port, protocol, subject),
            ttl,
            cert_usage: TLSA_CERT_USAGE_DANE_EE,
            selector: TLSA_SELECTOR_FULL_CERT,
            matching_type: TLSA_MATCHING_SHA256,
            cert_association_data: association_data(cert_der),
        }
    }

    /// Association data as lowercase hex, as shown in presentation format.
    #[must_use]
    pub fn association_hex(&self) -> String {
        self.cert_association_data
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Parses the owner name as a DNS name.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner name is not a valid DNS name.
    pub fn owner(&self) -> Result<Name, ProtoError> {
        Name::from_str(&self.owner_name)
    }

    /// Converts the record into a hickory `IN TLSA` record.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner name is not a valid DNS name.
    pub fn to_record(&self) -> Result<Record, ProtoError> {
        let tlsa = TLSA::new(
            CertUsage::from(self.cert_usage),
            Selector::from(self.selector),
            Matching::from(self.matching_type),
            self.cert_association_data.clone(),
        );
        let mut record = Record::from_rdata(self.owner()?, self.ttl, RData::TLSA(tlsa));
        record.set_dns_class(DNSClass::IN);
        Ok(record)
    }
}

impl fmt::Display for TlsaRecordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN TLSA {} {} {} {}",
            self.owner_name,
            self.ttl,
            self.cert_usage,
            self.selector,
            self.matching_type,
            self.association_hex()
        )
    }
}

#[cfg(test)]
#[path = "tlsa_tests.rs"]
mod tlsa_tests;
