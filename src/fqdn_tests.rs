// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `fqdn.rs`

use super::*;

#[test]
fn test_to_fqdn_appends_dot() {
    assert_eq!(to_fqdn("mail.example.com"), "mail.example.com.");
}

#[test]
fn test_to_fqdn_keeps_qualified_name() {
    assert_eq!(to_fqdn("mail.example.com."), "mail.example.com.");
}

#[test]
fn test_un_fqdn() {
    assert_eq!(un_fqdn("example.com."), "example.com");
    assert_eq!(un_fqdn("example.com"), "example.com");
    assert_eq!(un_fqdn(""), "");
}

#[test]
fn test_service_prefix() {
    assert_eq!(service_prefix("mail.example.com."), "mail");
    assert_eq!(service_prefix("openvpn.example.com"), "openvpn");
    assert_eq!(service_prefix("localhost"), "localhost");
}

#[test]
fn test_service_prefix_is_case_preserving() {
    assert_eq!(service_prefix("SMTP.example.com"), "SMTP");
}

#[test]
fn test_service_prefix_of_wildcard_and_root() {
    assert_eq!(service_prefix("*.example.com"), "*");
    assert_eq!(service_prefix("."), "");
}
