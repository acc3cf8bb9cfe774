// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-zone batching of TLSA records.
//!
//! Records are grouped by the zone that owns them so that each zone receives a
//! single dynamic update transaction. A zone only appears once at least one
//! record has been appended for it.

use crate::tlsa::TlsaRecordSpec;
use std::collections::BTreeMap;

/// TLSA records to publish, keyed by fully-qualified zone apex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneUpdateBatch {
    zones: BTreeMap<String, Vec<TlsaRecordSpec>>,
}

impl ZoneUpdateBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `records` to the entry for `zone`, preserving order.
    ///
    /// Appending nothing does not create an entry.
    pub fn append(&mut self, zone: &str, records: impl IntoIterator<Item = TlsaRecordSpec>) {
        let mut records = records.into_iter().peekable();
        if records.peek().is_none() {
            return;
        }
        self.zones.entry(zone.to_string()).or_default().extend(records);
    }

    /// Folds `other` into `self`; records of a shared zone keep `self`'s first.
    #[must_use]
    pub fn merge(mut self, other: ZoneUpdateBatch) -> ZoneUpdateBatch {
        for (zone, records) in other.zones {
            self.append(&zone, records);
        }
        self
    }

    /// Records queued for `zone`, if any.
    #[must_use]
    pub fn get(&self, zone: &str) -> Option<&[TlsaRecordSpec]> {
        self.zones.get(zone).map(Vec::as_slice)
    }

    /// Zones with at least one record.
    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.zones.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TlsaRecordSpec])> {
        self.zones
            .iter()
            .map(|(zone, records)| (zone.as_str(), records.as_slice()))
    }

    /// Number of zones in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Total number of records across all zones.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.zones.values().map(Vec::len).sum()
    }
}

impl IntoIterator for ZoneUpdateBatch {
    type Item = (String, Vec<TlsaRecordSpec>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<TlsaRecordSpec>>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.into_iter()
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod batch_tests;
