use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

use crate::UnitSummary;
use crate::layers::LayerType;
use crate::protocols::modbus::Mbap;
use crate::registry::PortRegistry;

use super::tcp::TcpSegment;

/// Which side of the exchange a record travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Client to a port bound to the MBAP decoder.
    Request,
    /// From a port bound to the MBAP decoder back to the client.
    Response,
}

impl Direction {
    /// Destination port wins when both ends are bound, matching the registry lookup order.
    pub(crate) fn classify(registry: &PortRegistry, segment: &TcpSegment<'_>) -> Self {
        if registry.tcp_port_layer_type(segment.dst_port) == Some(LayerType::ModbusMbap) {
            Direction::Request
        } else {
            Direction::Response
        }
    }
}

#[derive(Debug, Hash, PartialEq, Eq)]
struct TransactionKey {
    client: (IpAddr, u16),
    server: (IpAddr, u16),
    transaction_id: u16,
}

#[derive(Debug, Default)]
pub(crate) struct UnitStats {
    pub records: u64,
    pub requests: u64,
    pub responses: u64,
    pub pdu_bytes: u64,
    pub unmatched_responses: u64,
    pending: HashMap<TransactionKey, u64>,
}

pub(crate) fn add_unit_record(
    stats: &mut BTreeMap<u8, UnitStats>,
    mbap: &Mbap<'_>,
    segment: &TcpSegment<'_>,
    direction: Direction,
) {
    let entry = stats.entry(mbap.unit_id).or_default();
    entry.records += 1;
    entry.pdu_bytes += mbap.payload.len() as u64;

    let src = (segment.src_ip, segment.src_port);
    let dst = (segment.dst_ip, segment.dst_port);
    match direction {
        Direction::Request => {
            entry.requests += 1;
            let key = TransactionKey {
                client: src,
                server: dst,
                transaction_id: mbap.transaction_id,
            };
            *entry.pending.entry(key).or_default() += 1;
        }
        Direction::Response => {
            entry.responses += 1;
            let key = TransactionKey {
                client: dst,
                server: src,
                transaction_id: mbap.transaction_id,
            };
            match entry.pending.get_mut(&key) {
                Some(outstanding) if *outstanding > 0 => *outstanding -= 1,
                _ => entry.unmatched_responses += 1,
            }
        }
    }
}

/// Summaries in ascending unit id order.
pub(crate) fn build_unit_summaries(stats: BTreeMap<u8, UnitStats>) -> Vec<UnitSummary> {
    stats
        .into_iter()
        .map(|(unit_id, stats)| UnitSummary {
            unit_id,
            records: stats.records,
            requests: stats.requests,
            responses: stats.responses,
            pdu_bytes: stats.pdu_bytes,
            unanswered_requests: stats.pending.values().sum(),
            unmatched_responses: stats.unmatched_responses,
        })
        .collect()
}
