use super::error::MbapError;
use super::layout;

/// Encode an MBAP record carrying `pdu` for `unit_id`.
///
/// The protocol identifier is always zero and the length field is derived
/// from the PDU size.
pub fn encode_mbap(transaction_id: u16, unit_id: u8, pdu: &[u8]) -> Result<Vec<u8>, MbapError> {
    let length = u16::try_from(pdu.len() + 1)
        .map_err(|_| MbapError::PduTooLarge { len: pdu.len() })?;

    let mut record = Vec::with_capacity(layout::HEADER_LEN + pdu.len());
    record.extend_from_slice(&transaction_id.to_be_bytes());
    record.extend_from_slice(&layout::MODBUS_PROTOCOL_ID.to_be_bytes());
    record.extend_from_slice(&length.to_be_bytes());
    record.push(unit_id);
    record.extend_from_slice(pdu);
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::encode_mbap;
    use crate::protocols::modbus::error::MbapError;
    use crate::protocols::modbus::parser::parse_mbap;

    #[test]
    fn encode_write_single_coil() {
        let record = encode_mbap(0x0102, 0x11, &[0x05, 0x00, 0xAC, 0xFF, 0x00]).unwrap();
        assert_eq!(
            record,
            [0x01, 0x02, 0x00, 0x00, 0x00, 0x06, 0x11, 0x05, 0x00, 0xAC, 0xFF, 0x00]
        );
    }

    #[test]
    fn encoded_record_decodes_back() {
        let pdu = [0x10, 0x00, 0x01, 0x00, 0x02, 0x04, 0x00, 0x0A, 0x01, 0x02];
        let record = encode_mbap(0xBEEF, 0x01, &pdu).unwrap();
        let parsed = parse_mbap(&record).unwrap();
        assert_eq!(parsed.transaction_id, 0xBEEF);
        assert_eq!(parsed.unit_id, 0x01);
        assert_eq!(parsed.length as usize, pdu.len() + 1);
        assert_eq!(parsed.payload, pdu);
    }

    #[test]
    fn encode_rejects_oversized_pdu() {
        let pdu = vec![0u8; u16::MAX as usize];
        let err = encode_mbap(1, 1, &pdu).unwrap_err();
        assert_eq!(err, MbapError::PduTooLarge { len: 65535 });
    }
}
