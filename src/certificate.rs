// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Certificate loading.
//!
//! Certificates are read from `<root>/certificates/<domain>.crt`, the layout used by
//! ACME clients such as lego. Only the first PEM block of the file is used; for a
//! chain file this is the end-entity certificate.

use crate::constants::{CERTIFICATES_DIR, CERTIFICATE_EXTENSION};
use crate::errors::CertificateError;
use std::path::{Path, PathBuf};
use x509_parser::extensions::GeneralName;

/// A decoded end-entity certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// DER encoding of the whole certificate, the input to the TLSA hash
    pub der: Vec<u8>,
    /// DNS names from the subject alternative name extension, in certificate order
    pub dns_names: Vec<String>,
}

/// Returns the path of the certificate for `domain` below `root`.
#[must_use]
pub fn certificate_path(root: &Path, domain: &str) -> PathBuf {
    root.join(CERTIFICATES_DIR)
        .join(format!("{domain}.{CERTIFICATE_EXTENSION}"))
}

/// Reads and decodes the PEM certificate at `path`.
///
/// # Errors
///
/// Returns [`CertificateError::Read`] if the file cannot be read, otherwise see
/// [`parse_certificate`].
pub fn load_certificate(path: &Path) -> Result<Certificate, CertificateError> {
    let bytes = std::fs::read(path).map_err(|source| CertificateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_certificate(path, &bytes)
}

/// Decodes the first PEM block of `pem_bytes` as an X.509 certificate.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`CertificateError::Pem`] when no PEM block can be decoded, and
/// [`CertificateError::X509`] when the block is not a valid certificate.
pub fn parse_certificate(path: &Path, pem_bytes: &[u8]) -> Result<Certificate, CertificateError> {
    let block = pem::parse(pem_bytes).map_err(|e| CertificateError::Pem {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let der = block.into_contents();
    let dns_names = subject_dns_names(path, &der)?;

    Ok(Certificate { der, dns_names })
}

fn subject_dns_names(path: &Path, der: &[u8]) -> Result<Vec<String>, CertificateError> {
    let x509_error = |reason: String| CertificateError::X509 {
        path: path.to_path_buf(),
        reason,
    };

    let (_, cert) =
        x509_parser::parse_x509_certificate(der).map_err(|e| x509_error(e.to_string()))?;

    let names = match cert
        .subject_alternative_name()
        .map_err(|e| x509_error(e.to_string()))?
    {
        Some(san) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns_name) => Some((*dns_name).to_string()),
                _ => None,
            })
            .collect(),
        None => Vec::new(),
    };
    Ok(names)
}

#[cfg(test)]
#[path = "certificate_tests.rs"]
mod certificate_tests;
