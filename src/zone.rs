// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authoritative zone discovery.
//!
//! A name's zone is found by walking from the name towards the root and asking
//! the configured nameserver for the SOA of each candidate. The first candidate
//! answering with an SOA record (and no CNAME) is the zone apex.

use crate::errors::ZoneResolutionError;
use crate::fqdn::to_fqdn;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::{DNSClass, Name, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::debug;

/// Finds the zone a name belongs to.
#[async_trait::async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Returns the fully-qualified apex of the zone owning `fqdn`.
    async fn find_zone(&self, fqdn: &str) -> Result<String, ZoneResolutionError>;
}

/// Outcome of a single SOA probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoaProbe {
    /// The candidate is the apex of the named zone
    Apex(String),
    /// Not an apex; continue with the parent name
    Continue,
}

/// Classifies an SOA query response for `candidate`.
///
/// # Errors
///
/// Any response code other than `NOERROR` and `NXDOMAIN` is an error.
pub fn classify_soa_response(
    candidate: &str,
    response_code: ResponseCode,
    answers: &[(RecordType, String)],
) -> Result<SoaProbe, String> {
    match response_code {
        ResponseCode::NoError => {
            if answers.iter().any(|(ty, _)| *ty == RecordType::CNAME) {
                return Ok(SoaProbe::Continue);
            }
            Ok(answers
                .iter()
                .find(|(ty, _)| *ty == RecordType::SOA)
                .map_or(SoaProbe::Continue, |(_, owner)| {
                    SoaProbe::Apex(to_fqdn(owner))
                }))
        }
        ResponseCode::NXDomain => Ok(SoaProbe::Continue),
        code => Err(format!(
            "unexpected response code '{code}' for {candidate}"
        )),
    }
}

/// [`ZoneResolver`] that queries a nameserver over UDP with hickory-client.
///
/// Results are cached for the lifetime of the resolver.
pub struct SoaZoneResolver {
    server: SocketAddr,
    cache: Mutex<HashMap<String, String>>,
}

impl SoaZoneResolver {
    #[must_use]
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, fqdn: &str) -> Option<String> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(fqdn).cloned())
    }

    fn remember(&self, fqdn: &str, zone: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(fqdn.to_string(), zone.to_string());
        }
    }
}

#[async_trait::async_trait]
impl ZoneResolver for SoaZoneResolver {
    async fn find_zone(&self, fqdn: &str) -> Result<String, ZoneResolutionError> {
        let fqdn = to_fqdn(fqdn);
        if let Some(zone) = self.cached(&fqdn) {
            debug!("Zone for {} served from cache: {}", fqdn, zone);
            return Ok(zone);
        }

        let server = self.server;
        let name = fqdn.clone();

        // hickory-client's SyncClient drives its own runtime, so keep it off ours
        let zone = tokio::task::spawn_blocking(move || walk_to_apex(server, &name))
            .await
            .map_err(|e| ZoneResolutionError {
                name: fqdn.clone(),
                reason: format!("zone lookup task failed: {e}"),
            })??;

        debug!("Resolved zone for {}: {}", fqdn, zone);
        self.remember(&fqdn, &zone);
        Ok(zone)
    }
}

fn walk_to_apex(server: SocketAddr, fqdn: &str) -> Result<String, ZoneResolutionError> {
    let resolution_error = |reason: String| ZoneResolutionError {
        name: fqdn.to_string(),
        reason,
    };

    let mut candidate = Name::from_str(fqdn).map_err(|e| resolution_error(e.to_string()))?;
    let conn = UdpClientConnection::new(server)
        .map_err(|e| resolution_error(format!("failed to create UDP connection: {e}")))?;
    let client = SyncClient::new(conn);

    let mut last_failure = None;
    while !candidate.is_root() {
        match client.query(&candidate, DNSClass::IN, RecordType::SOA) {
            Ok(response) => {
                let answers: Vec<(RecordType, String)> = response
                    .answers()
                    .iter()
                    .map(|record| (record.record_type(), record.name().to_string()))
                    .collect();
                match classify_soa_response(
                    &candidate.to_string(),
                    response.response_code(),
                    &answers,
                )
                .map_err(resolution_error)?
                {
                    SoaProbe::Apex(zone) => return Ok(zone),
                    SoaProbe::Continue => {}
                }
            }
            Err(e) => {
                debug!("SOA query for {} failed: {}", candidate, e);
                last_failure = Some(e.to_string());
            }
        }
        candidate = candidate.base_name();
    }

    let reason = match last_failure {
        Some(cause) => format!("could not find the start of authority for {fqdn}: {cause}"),
        None => format!("could not find the start of authority for {fqdn}"),
    };
    Err(resolution_error(reason))
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
