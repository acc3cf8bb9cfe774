// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end tests of a run against a certificate directory, with the zone
//! lookups and update delivery replaced by in-memory fakes.

use async_trait::async_trait;
use hickory_client::op::{Message, UpdateMessage};
use hickory_client::rr::{DNSClass, RecordType};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tlsa_updater::config::{build_port_rules, RunConfig};
use tlsa_updater::errors::{UpdateError, ZoneResolutionError};
use tlsa_updater::run::{build_batch, publish_batch};
use tlsa_updater::tlsa::association_data;
use tlsa_updater::update::DynamicUpdateClient;
use tlsa_updater::zone::ZoneResolver;

struct StaticZones(Vec<&'static str>);

#[async_trait]
impl ZoneResolver for StaticZones {
    async fn find_zone(&self, fqdn: &str) -> Result<String, ZoneResolutionError> {
        self.0
            .iter()
            .find(|zone| fqdn.ends_with(&format!(".{zone}")))
            .map(|zone| (*zone).to_string())
            .ok_or_else(|| ZoneResolutionError {
                name: fqdn.to_string(),
                reason: "NXDOMAIN".to_string(),
            })
    }
}

#[derive(Default)]
struct CapturingClient {
    messages: Mutex<Vec<(String, Message)>>,
}

#[async_trait]
impl DynamicUpdateClient for CapturingClient {
    async fn send_update(&self, zone: &str, update: Message) -> Result<(), UpdateError> {
        self.messages
            .lock()
            .unwrap()
            .push((zone.to_string(), update));
        Ok(())
    }
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/certificates")
        .join(name)
}

/// Lays out `<root>/certificates/<domain>.crt` like an ACME client does.
fn cert_root(domains: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let certificates = dir.path().join("certificates");
    fs::create_dir(&certificates).unwrap();
    for domain in domains {
        let name = format!("{domain}.crt");
        fs::copy(fixture(&name), certificates.join(&name)).unwrap();
    }
    dir
}

fn config(root: &Path, dry_run: bool) -> RunConfig {
    RunConfig {
        ttl: 86400,
        verbose: false,
        dry_run,
        cert_root: root.to_path_buf(),
        nameserver: "192.0.2.53:53".parse().unwrap(),
        tsig: None,
    }
}

fn der_of(domain: &str) -> Vec<u8> {
    let pem = fs::read(fixture(&format!("{domain}.crt"))).unwrap();
    pem::parse(pem).unwrap().into_contents()
}

#[tokio::test]
async fn test_full_run_publishes_one_transaction_per_zone() {
    let root = cert_root(&["mail.example.com", "vpn.example.com"]);
    let config = config(root.path(), false);
    let rules = build_port_rules(&["openvpn:1194u".to_string()]).unwrap();
    let domains = vec!["mail.example.com".to_string(), "vpn.example.com".to_string()];

    let batch = build_batch(
        &domains,
        &config,
        &rules,
        &StaticZones(vec!["example.com.", "example.org."]),
    )
    .await
    .unwrap();
    let client = CapturingClient::default();
    let summary = publish_batch(batch, &config, &client).await;

    assert!(summary.is_success());
    assert_eq!(summary.succeeded, 2);

    let messages = client.messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    let (zone, message) = &messages[0];
    assert_eq!(zone, "example.com.");
    assert_eq!(message.zones()[0].name().to_string(), "example.com.");

    let (deletes, adds): (Vec<_>, Vec<_>) = message
        .updates()
        .iter()
        .partition(|record| record.dns_class() == DNSClass::ANY);
    let owners: Vec<String> = adds.iter().map(|r| r.name().to_string()).collect();
    assert_eq!(
        owners,
        vec![
            "_443._tcp.mail.example.com.",
            "_25._tcp.smtp.example.com.",
            "_465._tcp.smtp.example.com.",
            "_587._tcp.smtp.example.com.",
            "_1194._udp.openvpn.example.com.",
            "_8888._tcp.influx.example.com.",
        ]
    );
    assert_eq!(deletes.len(), owners.len());
    assert!(adds
        .iter()
        .all(|r| r.record_type() == RecordType::TLSA && r.ttl() == 86400));

    // The first four records carry the digest of the mail certificate
    let mail_digest = association_data(&der_of("mail.example.com"));
    let vpn_digest = association_data(&der_of("vpn.example.com"));
    let digest_of = |index: usize| match adds[index].data() {
        Some(hickory_client::rr::RData::TLSA(tlsa)) => tlsa.cert_data().to_vec(),
        other => panic!("expected TLSA rdata, got {other:?}"),
    };
    assert_eq!(digest_of(0), mail_digest);
    assert_eq!(digest_of(3), mail_digest);
    assert_eq!(digest_of(4), vpn_digest);

    let (zone, message) = &messages[1];
    assert_eq!(zone, "example.org.");
    assert_eq!(message.updates().len(), 2);
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let root = cert_root(&["mail.example.com"]);
    let config = config(root.path(), true);
    let rules = build_port_rules(&[]).unwrap();

    let batch = build_batch(
        &["mail.example.com".to_string()],
        &config,
        &rules,
        &StaticZones(vec!["example.com.", "example.org."]),
    )
    .await
    .unwrap();
    let client = CapturingClient::default();
    let summary = publish_batch(batch, &config, &client).await;

    assert!(client.messages.lock().unwrap().is_empty());
    assert_eq!(summary.skipped, 2);
}

#[tokio::test]
async fn test_unreadable_certificate_aborts_before_publishing() {
    let root = cert_root(&["mail.example.com", "nopem.example.com"]);
    let config = config(root.path(), false);
    let rules = build_port_rules(&[]).unwrap();

    let result = build_batch(
        &[
            "mail.example.com".to_string(),
            "nopem.example.com".to_string(),
        ],
        &config,
        &rules,
        &StaticZones(vec!["example.com.", "example.org."]),
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("nopem.example.com"));
}

#[tokio::test]
async fn test_invalid_certificate_is_reported() {
    let root = cert_root(&["garbage.example.com"]);
    let config = config(root.path(), false);
    let rules = build_port_rules(&[]).unwrap();

    let err = build_batch(
        &["garbage.example.com".to_string()],
        &config,
        &rules,
        &StaticZones(vec!["example.com."]),
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("Invalid X.509 certificate"));
}
