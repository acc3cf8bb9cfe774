// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Certificate to TLSA record extraction.
//!
//! For each DNS name on a certificate:
//! 1. Qualify the name and look up its owning zone
//! 2. Resolve the leftmost label through the [`PortRuleTable`]
//! 3. Synthesize one TLSA record per TCP and UDP port of the rule
//! 4. Append the records to the zone's entry in the returned batch
//!
//! Extraction of a certificate is all-or-nothing: the first zone lookup failure
//! discards the partial batch.

use crate::batch::ZoneUpdateBatch;
use crate::certificate::{certificate_path, load_certificate, Certificate};
use crate::errors::{ExtractError, ZoneResolutionError};
use crate::fqdn::{service_prefix, to_fqdn};
use crate::port_rules::PortRuleTable;
use crate::tlsa::TlsaRecordSpec;
use crate::zone::ZoneResolver;
use std::path::Path;
use tracing::debug;

/// Synthesizes the TLSA records for one subject name.
#[must_use]
pub fn records_for_name(
    name: &str,
    rules: &PortRuleTable,
    ttl: u32,
    cert_der: &[u8],
) -> Vec<TlsaRecordSpec> {
    let fqdn = to_fqdn(name);
    rules
        .resolve(service_prefix(&fqdn))
        .ports()
        .map(|(protocol, port)| TlsaRecordSpec::new(&fqdn, port, protocol, ttl, cert_der))
        .collect()
}

/// Builds the batch of TLSA records implied by `certificate`.
///
/// Duplicate names on the certificate are processed twice, producing duplicate
/// records.
///
/// # Errors
///
/// Returns a [`ZoneResolutionError`] for the first name whose zone cannot be
/// determined.
pub async fn extract(
    certificate: &Certificate,
    rules: &PortRuleTable,
    resolver: &dyn ZoneResolver,
    ttl: u32,
) -> Result<ZoneUpdateBatch, ZoneResolutionError> {
    debug!("dnsnames {:?}", certificate.dns_names);

    let mut batch = ZoneUpdateBatch::new();
    for name in &certificate.dns_names {
        let fqdn = to_fqdn(name);
        let zone = resolver.find_zone(&fqdn).await?;
        let records = records_for_name(&fqdn, rules, ttl, &certificate.der);
        debug!(
            "{} -> zone {} with {} TLSA record(s)",
            fqdn,
            zone,
            records.len()
        );
        batch.append(&zone, records);
    }
    Ok(batch)
}

/// Loads the certificate for `domain` below `cert_root` and extracts its records.
///
/// # Errors
///
/// Returns [`ExtractError::Certificate`] if the certificate cannot be loaded and
/// [`ExtractError::ZoneResolution`] if a zone lookup fails.
pub async fn extract_domain(
    cert_root: &Path,
    domain: &str,
    rules: &PortRuleTable,
    resolver: &dyn ZoneResolver,
    ttl: u32,
) -> Result<ZoneUpdateBatch, ExtractError> {
    let path = certificate_path(cert_root, domain);
    debug!("Loading certificate for {} from {}", domain, path.display());
    let certificate = load_certificate(&path)?;
    Ok(extract(&certificate, rules, resolver, ttl).await?)
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod extract_tests;
