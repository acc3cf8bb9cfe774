// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The two phases of a run.
//!
//! [`build_batch`] reads every requested certificate and merges the resulting
//! records into one [`ZoneUpdateBatch`]. Any certificate or zone lookup failure
//! aborts the run before anything is sent. [`publish_batch`] then sends one
//! update per zone. A failed zone is logged and reported in the
//! [`PublishSummary`] but does not stop the remaining zones.

use crate::batch::ZoneUpdateBatch;
use crate::config::RunConfig;
use crate::errors::UpdateError;
use crate::extract::extract_domain;
use crate::port_rules::PortRuleTable;
use crate::update::{build_update_message, describe_update, DynamicUpdateClient};
use crate::zone::ZoneResolver;
use anyhow::{Context, Result};
use tracing::{debug, error, info};

/// Outcome of [`publish_batch`].
#[derive(Debug, Default)]
pub struct PublishSummary {
    /// Zones for which an update was built
    pub attempted: usize,
    /// Zones whose update the server accepted
    pub succeeded: usize,
    /// Zones left unsent because of a dry run
    pub skipped: usize,
    /// One error per failed zone, in zone order
    pub failed: Vec<UpdateError>,
}

impl PublishSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Extracts the TLSA records of every domain's certificate into one batch.
///
/// Domains are processed in order, so records of a zone shared by several
/// certificates keep the certificates' order.
///
/// # Errors
///
/// Returns the first certificate or zone resolution failure, with the domain
/// being processed as context. No partial batch is returned.
pub async fn build_batch(
    domains: &[String],
    config: &RunConfig,
    rules: &PortRuleTable,
    resolver: &dyn ZoneResolver,
) -> Result<ZoneUpdateBatch> {
    let mut batch = ZoneUpdateBatch::new();

    for domain in domains {
        debug!("Processing certificate for {}", domain);
        let extracted = extract_domain(&config.cert_root, domain, rules, resolver, config.ttl)
            .await
            .with_context(|| format!("Error processing {domain}"))?;
        batch = batch.merge(extracted);
    }

    if config.verbose {
        for (zone, records) in batch.iter() {
            info!("Zone {} ({} record(s))", zone, records.len());
            for record in records {
                info!("  {}", record);
            }
        }
    }

    Ok(batch)
}

/// Sends one update transaction per zone of `batch`.
///
/// In dry-run mode every message is built and logged but nothing is sent.
pub async fn publish_batch(
    batch: ZoneUpdateBatch,
    config: &RunConfig,
    client: &dyn DynamicUpdateClient,
) -> PublishSummary {
    let mut summary = PublishSummary::default();

    for (zone, records) in batch {
        summary.attempted += 1;

        let message = match build_update_message(&zone, &records) {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to build update for zone {}: {}", zone, e);
                summary.failed.push(e);
                continue;
            }
        };

        if config.verbose || config.dry_run {
            info!("Update for zone {}:\n{}", zone, describe_update(&zone, &records));
        }

        if config.dry_run {
            info!("Dry run, not sending update for zone {}", zone);
            summary.skipped += 1;
            continue;
        }

        match client.send_update(&zone, message).await {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                error!("{}", e);
                summary.failed.push(e);
            }
        }
    }

    summary
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod run_tests;
