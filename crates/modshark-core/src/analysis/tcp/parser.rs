use std::net::IpAddr;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;

use super::error::TcpError;
use super::reader::TcpReader;

/// TCP segment with endpoints and its application payload.
#[derive(Debug)]
pub struct TcpSegment<'a> {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

/// Parse a TCP segment from a link-layer frame.
///
/// Returns `Ok(None)` when the frame does not carry TCP or the link type is
/// not supported.
pub fn parse_tcp_segment(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<TcpSegment<'_>>, TcpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => SlicedPacket::from_ethernet(data).map_err(slice_error)?,
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => {
            SlicedPacket::from_ip(data).map_err(slice_error)?
        }
        Linktype::LINUX_SLL => SlicedPacket::from_linux_sll(data).map_err(slice_error)?,
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(TcpError::MissingNetworkLayer)?;
    let tcp = match sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => tcp,
        _ => return Ok(None),
    };

    let (src_ip, dst_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ref ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    let ip_payload = net.ip_payload_ref().ok_or(TcpError::MissingIpPayload)?;
    let reader = TcpReader::new(ip_payload.payload);
    let payload = reader.payload_without_header()?;

    Ok(Some(TcpSegment {
        src_ip,
        src_port: tcp.source_port(),
        dst_ip,
        dst_port: tcp.destination_port(),
        payload,
    }))
}

fn slice_error(err: impl std::fmt::Display) -> TcpError {
    TcpError::Slice(err.to_string())
}
