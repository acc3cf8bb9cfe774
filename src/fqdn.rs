// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fully-qualified domain name helpers.

/// Returns `name` with a trailing dot, appending one if missing.
#[must_use]
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Returns `name` without its trailing dot, if any.
#[must_use]
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Returns the leftmost label of `name`, used as the key into the port rule table.
///
/// Works on both qualified and unqualified names. The root name yields an empty prefix.
#[must_use]
pub fn service_prefix(name: &str) -> &str {
    un_fqdn(name).split('.').next().unwrap_or_default()
}

#[cfg(test)]
#[path = "fqdn_tests.rs"]
mod fqdn_tests;
