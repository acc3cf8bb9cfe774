// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RFC 2136 dynamic update transactions.
//!
//! Each zone receives one UPDATE message that first deletes the TLSA RRset at
//! every owner name it touches and then adds the freshly synthesized records,
//! so stale associations are replaced rather than accumulated.

use crate::errors::UpdateError;
use crate::tlsa::TlsaRecordSpec;
use crate::tsig::{create_tsig_signer, TsigKeyData};
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::{Message, MessageType, OpCode, Query, ResponseCode, UpdateMessage};
use hickory_client::rr::{DNSClass, Name, Record, RecordType};
use hickory_client::udp::UdpClientConnection;
use hickory_proto::xfer::{DnsRequest, DnsRequestOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::{debug, info};

/// Sends one signed update transaction to a nameserver.
#[async_trait::async_trait]
pub trait DynamicUpdateClient: Send + Sync {
    /// Delivers `update` for `zone` and checks the server's response code.
    async fn send_update(&self, zone: &str, update: Message) -> Result<(), UpdateError>;
}

/// Owner names of `records`, deduplicated, in first-seen order.
#[must_use]
pub fn distinct_owner_names(records: &[TlsaRecordSpec]) -> Vec<&str> {
    let mut owners: Vec<&str> = Vec::new();
    for record in records {
        if !owners.contains(&record.owner_name.as_str()) {
            owners.push(&record.owner_name);
        }
    }
    owners
}

/// Builds the UPDATE message replacing the TLSA RRsets of `records` in `zone`.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidName`] if the zone or an owner name is not a
/// valid DNS name.
pub fn build_update_message(
    zone: &str,
    records: &[TlsaRecordSpec],
) -> Result<Message, UpdateError> {
    let invalid_name = |name: &str, reason: String| UpdateError::InvalidName {
        zone: zone.to_string(),
        name: name.to_string(),
        reason,
    };

    let origin = Name::from_str(zone).map_err(|e| invalid_name(zone, e.to_string()))?;
    let mut zone_query = Query::new();
    zone_query
        .set_name(origin)
        .set_query_class(DNSClass::IN)
        .set_query_type(RecordType::SOA);

    let mut message = Message::new();
    message
        .set_id(rand::random::<u16>())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Update)
        .set_recursion_desired(false);
    message.add_zone(zone_query);

    // RFC 2136 2.5.2: class ANY, TTL 0, empty RDATA deletes the whole RRset
    for owner in distinct_owner_names(records) {
        let name = Name::from_str(owner).map_err(|e| invalid_name(owner, e.to_string()))?;
        let mut delete = Record::with(name, RecordType::TLSA, 0);
        delete.set_dns_class(DNSClass::ANY);
        message.add_update(delete);
    }

    for record in records {
        let add = record
            .to_record()
            .map_err(|e| invalid_name(&record.owner_name, e.to_string()))?;
        message.add_update(add);
    }

    Ok(message)
}

/// Renders the update for `zone` in an nsupdate-like text form for logging.
#[must_use]
pub fn describe_update(zone: &str, records: &[TlsaRecordSpec]) -> String {
    let mut text = format!("zone {zone}\n");
    for owner in distinct_owner_names(records) {
        text.push_str(&format!("update delete {owner} TLSA\n"));
    }
    for record in records {
        text.push_str(&format!("update add {record}\n"));
    }
    text.push_str("send\n");
    text
}

/// [`DynamicUpdateClient`] that sends updates over UDP with hickory-client,
/// TSIG-signed when key material is configured.
pub struct HickoryUpdateClient {
    server: SocketAddr,
    tsig: Option<TsigKeyData>,
}

impl HickoryUpdateClient {
    #[must_use]
    pub fn new(server: SocketAddr, tsig: Option<TsigKeyData>) -> Self {
        Self { server, tsig }
    }
}

#[async_trait::async_trait]
impl DynamicUpdateClient for HickoryUpdateClient {
    async fn send_update(&self, zone: &str, update: Message) -> Result<(), UpdateError> {
        let server = self.server;
        let tsig = self.tsig.clone();
        let zone_name = zone.to_string();

        // Execute DNS update in blocking thread (hickory-client is sync)
        tokio::task::spawn_blocking(move || {
            let transport_error = |reason: String| UpdateError::Transport {
                zone: zone_name.clone(),
                server: server.to_string(),
                reason,
            };

            let conn = UdpClientConnection::new(server)
                .map_err(|e| transport_error(format!("failed to create UDP connection: {e}")))?;
            let client = match &tsig {
                Some(key_data) => {
                    debug!("Signing update for {} with TSIG key {}", zone_name, key_data.name);
                    SyncClient::with_tsigner(conn, create_tsig_signer(key_data)?)
                }
                None => SyncClient::new(conn),
            };

            let request = DnsRequest::new(update, DnsRequestOptions::default());
            let response = client
                .send(request)
                .into_iter()
                .next()
                .ok_or_else(|| transport_error("no response received".to_string()))?
                .map_err(|e| transport_error(e.to_string()))?;

            match response.response_code() {
                ResponseCode::NoError => {
                    info!("Successfully updated TLSA records in zone {}", zone_name);
                    Ok(())
                }
                code => Err(UpdateError::Rejected {
                    zone: zone_name.clone(),
                    server: server.to_string(),
                    rcode: code.to_string(),
                }),
            }
        })
        .await
        .map_err(|e| UpdateError::TaskFailed {
            zone: zone.to_string(),
            reason: e.to_string(),
        })?
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod update_tests;
