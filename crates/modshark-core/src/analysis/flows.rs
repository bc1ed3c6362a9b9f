use std::collections::HashMap;
use std::net::IpAddr;

use crate::FlowSummary;
use crate::layers::LayerType;

use super::tcp::TcpSegment;

#[derive(Debug, Hash, PartialEq, Eq)]
pub(crate) struct FlowKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct FlowStats {
    pub app_proto: &'static str,
    pub packets: u64,
    pub bytes: u64,
}

pub(crate) fn add_flow_stats(
    stats: &mut HashMap<FlowKey, FlowStats>,
    segment: &TcpSegment<'_>,
    layer_type: LayerType,
) {
    let key = FlowKey {
        src_ip: segment.src_ip,
        src_port: segment.src_port,
        dst_ip: segment.dst_ip,
        dst_port: segment.dst_port,
    };
    let entry = stats.entry(key).or_insert_with(|| FlowStats {
        app_proto: app_proto(layer_type),
        packets: 0,
        bytes: 0,
    });
    entry.packets += 1;
    entry.bytes += segment.payload.len() as u64;
}

pub(crate) fn build_flow_summaries(
    stats: HashMap<FlowKey, FlowStats>,
    duration_s: Option<f64>,
) -> Vec<FlowSummary> {
    let mut flows: Vec<FlowSummary> = stats
        .into_iter()
        .map(|(key, stats)| {
            let (pps, bps) = duration_s
                .map(|d| (stats.packets as f64 / d, stats.bytes as f64 / d))
                .map(|(pps, bps)| (Some(pps), Some(bps)))
                .unwrap_or((None, None));

            FlowSummary {
                app_proto: stats.app_proto.to_string(),
                src: format_endpoint(key.src_ip, key.src_port),
                dst: format_endpoint(key.dst_ip, key.dst_port),
                packets: stats.packets,
                bytes: stats.bytes,
                pps,
                bps,
            }
        })
        .collect();

    flows.sort_by(|a, b| a.src.cmp(&b.src).then_with(|| a.dst.cmp(&b.dst)));
    flows
}

fn app_proto(layer_type: LayerType) -> &'static str {
    match layer_type {
        LayerType::ModbusMbap => "modbus",
        LayerType::Payload => "tcp",
    }
}

pub(crate) fn format_endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(addr) => format!("{}:{}", addr, port),
        IpAddr::V6(addr) => format!("[{}]:{}", addr, port),
    }
}
