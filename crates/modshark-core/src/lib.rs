//! Modbus/TCP decoding and offline capture analysis.
//!
//! The core of this crate is the MBAP decoder (`parse_mbap`): it validates the
//! 7-byte Modbus Application Protocol header at the start of a TCP payload and
//! exposes the Modbus PDU that follows it as a borrowed view. Around it sit a
//! small layer contract (`layers`), an explicit port registry that binds
//! decoders to TCP ports and drives the layer chain (`PortRegistry`), and an
//! offline pipeline that runs captures through the registry and aggregates a
//! deterministic report.
//!
//! Invariants:
//! - Decoding is pure: no I/O, no logging, no panics on malformed input.
//! - A record either decodes completely or not at all; there is no partial header.
//! - The registry is built once by its owner and is read-only afterwards, so
//!   it can be shared across decoding threads.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```
//! use modshark_core::{AnalysisConfig, DecodedLayer, LayerType, PortRegistry, parse_mbap};
//!
//! let record = [0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0xFF, 0x03, 0x00, 0x00, 0x00, 0x0A];
//! let mbap = parse_mbap(&record)?;
//! assert_eq!(mbap.unit_id, 0xFF);
//! assert_eq!(mbap.payload, &[0x03, 0x00, 0x00, 0x00, 0x0A]);
//!
//! let registry = PortRegistry::from_config(&AnalysisConfig::default())?;
//! let stack = registry.decode_tcp_payload(49152, 502, &record);
//! let app = stack.application_layer().expect("application layer");
//! assert_eq!(app.layer_type(), LayerType::ModbusMbap);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod config;
pub mod layers;
pub mod protocols;
mod registry;
mod source;

pub use analysis::{AnalysisError, analyze_pcap_file, analyze_pcap_file_with, analyze_source};
pub use config::{AnalysisConfig, ConfigError, ModbusConfig};
pub use layers::{
    DecodeError, DecodeFailure, DecodedLayer, Layer, LayerClass, LayerDecoder, LayerStack,
    LayerType, Payload,
};
pub use protocols::modbus::{Mbap, MbapDecoder, MbapError, encode_mbap, parse_mbap};
pub use registry::{PortRegistry, RegistryError};
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use modshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, modshark_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the crate version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp; the last capture timestamp when one is known.
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// TCP flows sorted by source then destination.
    pub flows: Vec<FlowSummary>,
    /// Modbus units sorted by unit identifier.
    pub units: Vec<UnitSummary>,
    /// Protocol compliance summaries.
    pub compliance: Vec<ComplianceSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
///
/// # Examples
/// ```
/// use modshark_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub packets_total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Flow-level summary for a TCP endpoint pair.
///
/// # Examples
/// ```
/// use modshark_core::FlowSummary;
///
/// let flow = FlowSummary {
///     app_proto: "modbus".to_string(),
///     src: "192.168.0.10:49152".to_string(),
///     dst: "192.168.0.20:502".to_string(),
///     packets: 4,
///     bytes: 48,
///     pps: None,
///     bps: None,
/// };
/// assert_eq!(flow.app_proto, "modbus");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSummary {
    /// `modbus` when either port is bound to the MBAP decoder, `tcp` otherwise.
    pub app_proto: String,
    /// Source endpoint in `ip:port` form.
    pub src: String,
    /// Destination endpoint in `ip:port` form.
    pub dst: String,
    /// TCP segments observed, empty ones included.
    pub packets: u64,
    /// TCP payload bytes observed.
    pub bytes: u64,
    /// Packets per second over the capture duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pps: Option<f64>,
    /// Payload bytes per second over the capture duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bps: Option<f64>,
}

/// Per-unit Modbus traffic summary.
///
/// Requests travel to a port bound to the MBAP decoder, responses come back
/// from it. A response answers the oldest outstanding request with the same
/// client, server and transaction identifier.
///
/// # Examples
/// ```
/// use modshark_core::UnitSummary;
///
/// let unit = UnitSummary {
///     unit_id: 1,
///     records: 2,
///     requests: 1,
///     responses: 1,
///     pdu_bytes: 9,
///     unanswered_requests: 0,
///     unmatched_responses: 0,
/// };
/// assert_eq!(unit.records, unit.requests + unit.responses);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSummary {
    pub unit_id: u8,
    /// Decoded MBAP records addressed to or sent by this unit.
    pub records: u64,
    pub requests: u64,
    pub responses: u64,
    /// PDU bytes carried by the decoded records.
    pub pdu_bytes: u64,
    /// Requests with no response by the end of the capture.
    pub unanswered_requests: u64,
    /// Responses with no matching outstanding request.
    pub unmatched_responses: u64,
}

/// Compliance summary for a protocol.
///
/// # Examples
/// ```
/// use modshark_core::{ComplianceSummary, Violation};
///
/// let summary = ComplianceSummary {
///     protocol: "modbus".to_string(),
///     compliance_percentage: 50.0,
///     violations: vec![Violation {
///         id: "LS-MODBUS-TRUNCATED".to_string(),
///         severity: "error".to_string(),
///         message: "MBAP length field exceeds the bytes in the segment".to_string(),
///         count: 1,
///         examples: Vec::new(),
///     }],
/// };
/// assert_eq!(summary.violations.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub protocol: String,
    /// Share of checked records without any violation (0.0–100.0).
    pub compliance_percentage: f64,
    /// Violations sorted by severity and ID.
    pub violations: Vec<Violation>,
}

/// Single compliance violation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable violation identifier (e.g., `LS-MODBUS-PROTOCOL-ID`).
    pub id: String,
    /// Severity label (`error` or `warning`).
    pub severity: String,
    pub message: String,
    /// Number of occurrences aggregated into this violation.
    pub count: u64,
    /// At most three example contexts, formatted as `source ip:port @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use modshark_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert!(report.units.is_empty());
/// assert_eq!(report.input.bytes, 123);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "modshark".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        flows: vec![],
        units: vec![],
        compliance: vec![],
    }
}
