// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the TLSA updater.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS port, appended to the nameserver address when none is given
pub const DNS_PORT: u16 = 53;

/// Default TTL for published TLSA records (1 day)
pub const DEFAULT_TLSA_TTL_SECS: u32 = 86_400;

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u64 = 300;

/// TSIG algorithm used when `RFC2136_TSIG_ALGORITHM` is unset
pub const DEFAULT_TSIG_ALGORITHM: &str = "hmac-sha256";

// ============================================================================
// Port Rule Constants
// ============================================================================

/// TCP port used for names whose service prefix has no rule
pub const DEFAULT_TCP_PORT: u16 = 443;

/// Separator between rule entries in a `--mappings` value
pub const RULE_ENTRY_SEPARATOR: char = ';';

/// Separator between the service prefix and its port list
pub const RULE_PREFIX_SEPARATOR: char = ':';

/// Separator between ports in a rule entry
pub const RULE_PORT_SEPARATOR: char = ',';

// ============================================================================
// TLSA Parameters (RFC 6698 / RFC 7218)
// ============================================================================

/// Certificate usage: DANE-EE, domain-issued certificate
pub const TLSA_CERT_USAGE_DANE_EE: u8 = 3;

/// Selector: the full certificate
pub const TLSA_SELECTOR_FULL_CERT: u8 = 0;

/// Matching type: SHA-256 of the selected content
pub const TLSA_MATCHING_SHA256: u8 = 1;

// ============================================================================
// Filesystem Layout Constants
// ============================================================================

/// Directory below the working directory used as the default certificate root
pub const DEFAULT_CERT_ROOT_DIR: &str = ".lego";

/// Directory below the certificate root that holds the `.crt` files
pub const CERTIFICATES_DIR: &str = "certificates";

/// File extension of PEM certificates
pub const CERTIFICATE_EXTENSION: &str = "crt";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Nameserver that receives the dynamic updates (required)
pub const ENV_NAMESERVER: &str = "RFC2136_NAMESERVER";

/// TSIG key name
pub const ENV_TSIG_KEY: &str = "RFC2136_TSIG_KEY";

/// Base64-encoded TSIG shared secret
pub const ENV_TSIG_SECRET: &str = "RFC2136_TSIG_SECRET";

/// TSIG algorithm name
pub const ENV_TSIG_ALGORITHM: &str = "RFC2136_TSIG_ALGORITHM";

/// Log output format selector (`json` or `text`)
pub const ENV_LOG_FORMAT: &str = "RUST_LOG_FORMAT";
