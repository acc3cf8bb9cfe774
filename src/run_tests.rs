// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `run.rs`

use super::*;
use crate::errors::ZoneResolutionError;
use crate::port_rules::Protocol;
use crate::tlsa::TlsaRecordSpec;
use async_trait::async_trait;
use hickory_client::op::{Message, UpdateMessage};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Mutex;

struct FakeResolver {
    zones: Vec<&'static str>,
}

#[async_trait]
impl ZoneResolver for FakeResolver {
    async fn find_zone(&self, fqdn: &str) -> Result<String, ZoneResolutionError> {
        self.zones
            .iter()
            .find(|zone| fqdn.ends_with(&format!(".{zone}")))
            .map(|zone| (*zone).to_string())
            .ok_or_else(|| ZoneResolutionError {
                name: fqdn.to_string(),
                reason: "NXDOMAIN".to_string(),
            })
    }
}

/// Records every update it is handed and rejects the zones in `reject`.
#[derive(Default)]
struct RecordingClient {
    reject: Vec<&'static str>,
    sent: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl DynamicUpdateClient for RecordingClient {
    async fn send_update(&self, zone: &str, update: Message) -> Result<(), UpdateError> {
        self.sent
            .lock()
            .unwrap()
            .push((zone.to_string(), update.updates().len()));
        if self.reject.iter().any(|rejected| *rejected == zone) {
            return Err(UpdateError::Rejected {
                zone: zone.to_string(),
                server: "192.0.2.53:53".to_string(),
                rcode: "REFUSED".to_string(),
            });
        }
        Ok(())
    }
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn config(dry_run: bool) -> RunConfig {
    RunConfig {
        ttl: 3600,
        verbose: true,
        dry_run,
        cert_root: fixtures_dir(),
        nameserver: "192.0.2.53:53".parse::<SocketAddr>().unwrap(),
        tsig: None,
    }
}

fn resolver() -> FakeResolver {
    FakeResolver {
        zones: vec!["example.com.", "example.org."],
    }
}

fn domains(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn owners(records: &[TlsaRecordSpec]) -> Vec<&str> {
    records.iter().map(|r| r.owner_name.as_str()).collect()
}

#[tokio::test]
async fn test_build_batch_merges_certificates_in_order() {
    let batch = build_batch(
        &domains(&["mail.example.com", "vpn.example.com"]),
        &config(false),
        &PortRuleTable::default(),
        &resolver(),
    )
    .await
    .unwrap();

    assert_eq!(batch.zones().collect::<Vec<_>>(), vec!["example.com.", "example.org."]);
    assert_eq!(
        owners(batch.get("example.com.").unwrap()),
        vec![
            "_443._tcp.mail.example.com.",
            "_25._tcp.smtp.example.com.",
            "_465._tcp.smtp.example.com.",
            "_587._tcp.smtp.example.com.",
            "_943._tcp.openvpn.example.com.",
            "_1194._udp.openvpn.example.com.",
            "_8888._tcp.influx.example.com.",
        ]
    );
    assert_eq!(
        owners(batch.get("example.org.").unwrap()),
        vec!["_443._tcp.www.example.org."]
    );
    assert!(batch
        .iter()
        .flat_map(|(_, records)| records)
        .all(|r| r.ttl == 3600));
}

#[tokio::test]
async fn test_build_batch_applies_port_overrides() {
    let mut rules = PortRuleTable::default();
    rules.apply_override("influx:8086t,8089u").unwrap();

    let batch = build_batch(
        &domains(&["vpn.example.com"]),
        &config(false),
        &rules,
        &resolver(),
    )
    .await
    .unwrap();

    let influx: Vec<_> = batch
        .get("example.com.")
        .unwrap()
        .iter()
        .filter(|r| r.owner_name.ends_with("influx.example.com."))
        .collect();
    assert_eq!(
        influx.iter().map(|r| r.owner_name.as_str()).collect::<Vec<_>>(),
        vec!["_8086._tcp.influx.example.com.", "_8089._udp.influx.example.com."]
    );
}

#[tokio::test]
async fn test_build_batch_aborts_on_missing_certificate() {
    let err = build_batch(
        &domains(&["mail.example.com", "missing.example.com"]),
        &config(false),
        &PortRuleTable::default(),
        &resolver(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("Error processing missing.example.com"));
}

#[tokio::test]
async fn test_build_batch_aborts_on_unknown_zone() {
    let only_com = FakeResolver {
        zones: vec!["example.com."],
    };

    let err = build_batch(
        &domains(&["mail.example.com"]),
        &config(false),
        &PortRuleTable::default(),
        &only_com,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("mail.example.com"));
    assert!(format!("{err:#}").contains("www.example.org."));
}

#[tokio::test]
async fn test_build_batch_without_domains_is_empty() {
    let batch = build_batch(&[], &config(false), &PortRuleTable::default(), &resolver())
        .await
        .unwrap();
    assert!(batch.is_empty());
}

#[tokio::test]
async fn test_publish_sends_one_update_per_zone() {
    let mut batch = ZoneUpdateBatch::new();
    batch.append(
        "example.com.",
        vec![
            TlsaRecordSpec::new("a.example.com.", 443, Protocol::Tcp, 60, b"x"),
            TlsaRecordSpec::new("b.example.com.", 443, Protocol::Tcp, 60, b"x"),
        ],
    );
    batch.append(
        "example.org.",
        vec![TlsaRecordSpec::new("www.example.org.", 443, Protocol::Tcp, 60, b"x")],
    );
    let client = RecordingClient::default();

    let summary = publish_batch(batch, &config(false), &client).await;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.is_success());
    // two deletes and two adds, then one delete and one add
    assert_eq!(
        *client.sent.lock().unwrap(),
        vec![("example.com.".to_string(), 4), ("example.org.".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_publish_dry_run_sends_nothing() {
    let batch = build_batch(
        &domains(&["mail.example.com"]),
        &config(true),
        &PortRuleTable::default(),
        &resolver(),
    )
    .await
    .unwrap();
    let client = RecordingClient::default();

    let summary = publish_batch(batch, &config(true), &client).await;

    assert!(client.sent.lock().unwrap().is_empty());
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.succeeded, 0);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_publish_continues_after_rejected_zone() {
    let mut batch = ZoneUpdateBatch::new();
    batch.append(
        "a.example.",
        vec![TlsaRecordSpec::new("www.a.example.", 443, Protocol::Tcp, 60, b"x")],
    );
    batch.append(
        "b.example.",
        vec![TlsaRecordSpec::new("www.b.example.", 443, Protocol::Tcp, 60, b"x")],
    );
    let client = RecordingClient {
        reject: vec!["a.example."],
        ..Default::default()
    };

    let summary = publish_batch(batch, &config(false), &client).await;

    assert_eq!(client.sent.lock().unwrap().len(), 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].zone(), Some("a.example."));
    assert_eq!(
        summary.failed[0].to_string(),
        "DNS update for zone 'a.example.' failed. Server 192.0.2.53:53 replied: REFUSED"
    );
}

#[tokio::test]
async fn test_publish_invalid_zone_fails_only_that_zone() {
    let bad_zone = format!("{}.example.", "a".repeat(64));
    let mut batch = ZoneUpdateBatch::new();
    batch.append(
        &bad_zone,
        vec![TlsaRecordSpec::new("www.example.", 443, Protocol::Tcp, 60, b"x")],
    );
    batch.append(
        "example.",
        vec![TlsaRecordSpec::new("www.example.", 443, Protocol::Tcp, 60, b"x")],
    );
    let client = RecordingClient::default();

    let summary = publish_batch(batch, &config(false), &client).await;

    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 1);
    assert!(matches!(summary.failed[0], UpdateError::InvalidName { .. }));
    assert_eq!(
        *client.sent.lock().unwrap(),
        vec![("example.".to_string(), 2)]
    );
}
