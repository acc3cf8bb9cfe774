// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # tlsa-updater - DANE TLSA publishing for ACME certificates
//!
//! tlsa-updater reads certificates issued by an ACME client, derives one
//! `3 0 1` TLSA record per (subject name, port, protocol) and publishes them
//! with RFC 2136 dynamic updates, optionally signed with TSIG.
//!
//! ## Overview
//!
//! A run has two phases:
//!
//! 1. **Extraction** - every requested certificate is loaded, each subject
//!    alternative name is mapped to its zone and to the ports served by its
//!    leftmost label, and the records are grouped per zone.
//! 2. **Publishing** - each zone receives a single update that deletes the
//!    TLSA RRsets it touches and adds the fresh records.
//!
//! ## Modules
//!
//! - [`port_rules`] - Prefix to port mapping and `--mappings` parsing
//! - [`certificate`] - Certificate loading
//! - [`tlsa`] - TLSA record synthesis
//! - [`zone`] - Zone apex discovery through SOA queries
//! - [`extract`] - Certificate to per-zone record extraction
//! - [`batch`] - Per-zone record batching
//! - [`update`] - RFC 2136 update messages and delivery
//! - [`tsig`] - TSIG key handling
//! - [`config`] - Flags and environment gathered into a [`config::RunConfig`]
//! - [`run`] - The extraction and publishing phases
//!
//! ## Example
//!
//! ```rust
//! use tlsa_updater::port_rules::Protocol;
//! use tlsa_updater::tlsa::TlsaRecordSpec;
//!
//! let record = TlsaRecordSpec::new("mail.example.com", 25, Protocol::Tcp, 3600, b"der");
//! assert_eq!(record.owner_name, "_25._tcp.mail.example.com.");
//! assert_eq!((record.cert_usage, record.selector, record.matching_type), (3, 0, 1));
//! ```

pub mod batch;
pub mod certificate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod extract;
pub mod fqdn;
pub mod port_rules;
pub mod run;
pub mod tlsa;
pub mod tsig;
pub mod update;
pub mod zone;
