//! Offline analysis pipeline.
//!
//! Frames from a `PacketSource` are reduced to TCP segments; every non-empty
//! segment payload is treated as one application-layer record and handed to
//! the `PortRegistry`. Decoded MBAP records feed per-unit statistics and
//! compliance checks, decode failures feed compliance violations, and every
//! TCP segment counts towards its flow.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::{debug, trace};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::config::{AnalysisConfig, ConfigError};
use crate::registry::{PortRegistry, RegistryError};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, make_stub_report};

mod compliance;
mod flows;
mod tcp;
mod units;

use compliance::ComplianceStats;
use flows::{FlowKey, FlowStats, add_flow_stats, build_flow_summaries, format_endpoint};
use tcp::parse_tcp_segment;
use units::{Direction, UnitStats, add_unit_record, build_unit_summaries};

const MODBUS_PROTOCOL: &str = "modbus";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Analyze a capture with the default configuration.
pub fn analyze_pcap_file(path: &Path) -> Result<Report, AnalysisError> {
    analyze_pcap_file_with(path, &AnalysisConfig::default())
}

/// Analyze a capture file with an explicit configuration.
pub fn analyze_pcap_file_with(
    path: &Path,
    config: &AnalysisConfig,
) -> Result<Report, AnalysisError> {
    let source = PcapFileSource::open(path)?;
    analyze_source(path, source, config)
}

pub fn analyze_source<S: PacketSource>(
    path: &Path,
    mut source: S,
    config: &AnalysisConfig,
) -> Result<Report, AnalysisError> {
    config.validate()?;
    let registry = PortRegistry::from_config(config)?;

    let mut packets_total = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut flow_stats: HashMap<FlowKey, FlowStats> = HashMap::new();
    let mut unit_stats: BTreeMap<u8, UnitStats> = BTreeMap::new();
    let mut compliance = ComplianceStats::default();

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);

        let segment = match parse_tcp_segment(linktype, &data) {
            Ok(Some(segment)) => segment,
            Ok(None) => continue,
            Err(err) => {
                trace!("skipping frame {packets_total}: {err}");
                continue;
            }
        };
        let layer_type = registry.layer_for_ports(segment.src_port, segment.dst_port);
        add_flow_stats(&mut flow_stats, &segment, layer_type);
        if segment.payload.is_empty() {
            continue;
        }

        let stack =
            registry.decode_tcp_payload(segment.src_port, segment.dst_port, segment.payload);
        if let Some(mbap) = stack.mbap() {
            let context = example_context(&segment, ts);
            trace!(
                "MBAP record from {}: transaction {} unit {} ({} PDU bytes)",
                format_endpoint(segment.src_ip, segment.src_port),
                mbap.transaction_id,
                mbap.unit_id,
                mbap.payload.len()
            );
            compliance.check_record(mbap, &context);
            let direction = Direction::classify(&registry, &segment);
            add_unit_record(&mut unit_stats, mbap, &segment, direction);
        } else if let Some(failure) = stack.failure() {
            let context = example_context(&segment, ts);
            debug!("{} decode failed ({context}): {}", failure.layer_type, failure.error);
            compliance.record_failure(&failure.error, &context);
        }
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    let duration_s = match (first_ts, last_ts) {
        (Some(start), Some(end)) if end > start => Some(end - start),
        _ => None,
    };

    report.flows = build_flow_summaries(flow_stats, duration_s);
    report.units = build_unit_summaries(unit_stats);
    report.compliance = vec![compliance.into_summary(MODBUS_PROTOCOL)];
    Ok(report)
}

fn example_context(segment: &tcp::TcpSegment<'_>, ts: Option<f64>) -> String {
    format!(
        "source {} @ {}",
        format_endpoint(segment.src_ip, segment.src_port),
        ts_to_rfc3339(ts).unwrap_or_else(|| "unknown".to_string())
    )
}

fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{ts_to_rfc3339, update_ts_bounds};

    #[test]
    fn ts_bounds_track_min_and_max() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(2.0), Some(9.5)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(2.0));
        assert_eq!(last, Some(9.5));
    }

    #[test]
    fn rfc3339_formatting() {
        assert_eq!(
            ts_to_rfc3339(Some(0.0)).as_deref(),
            Some("1970-01-01T00:00:00Z")
        );
        assert_eq!(ts_to_rfc3339(None), None);
    }
}
