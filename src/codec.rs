//! Byte-level helpers for the MBAP header and the coil packing convention.
//!
//! Custom function code handlers can use [`build_response_header`] to frame
//! their own responses.

use crate::constants::mbap;

/// Encode a 16-bit value as two big-endian bytes
pub fn encode_u16(value: u16) -> [u8; 2] {
    [(value >> 8) as u8, value as u8]
}

/// Decode two big-endian bytes to a 16-bit value
pub fn decode_u16(bytes: [u8; 2]) -> u16 {
    (bytes[0] as u16) << 8 | bytes[1] as u16
}

/// Extract the transaction id from a request frame, or zero if the frame is
/// too short to carry one
pub fn transaction_id(frame: &[u8]) -> u16 {
    match frame {
        [high, low, ..] => decode_u16([*high, *low]),
        _ => 0,
    }
}

/// Build the 7-byte MBAP header for a response.
///
/// `length` counts the bytes that follow the length field itself, i.e. the
/// unit id plus the PDU.
pub fn build_response_header(
    transaction_id: u16,
    protocol_id: u16,
    length: u16,
    unit_id: u8,
) -> [u8; mbap::HEADER_LENGTH] {
    let tx = encode_u16(transaction_id);
    let proto = encode_u16(protocol_id);
    let len = encode_u16(length);
    [tx[0], tx[1], proto[0], proto[1], len[0], len[1], unit_id]
}

/// Wire bytes needed to carry `count` packed bits, i.e. `ceil(count / 8)`
pub fn byte_count_for_bits(count: u16) -> usize {
    (count as usize).div_ceil(8)
}

/// Pack one-byte-per-coil values into wire bytes, LSB first: the coil at
/// offset `i` lands in bit `i % 8` of byte `i / 8`. Any non-zero byte counts
/// as ON.
pub fn pack_bits(values: &[u8]) -> Vec<u8> {
    let mut packed = vec![0u8; values.len().div_ceil(8)];
    for (i, value) in values.iter().enumerate() {
        if *value != 0 {
            packed[i / 8] |= 1 << (i % 8);
        }
    }
    packed
}

/// Unpack `count` wire bits into one-byte-per-coil values, LSB first.
/// Bits beyond the end of `data` read as OFF.
pub fn unpack_bits(data: &[u8], count: u16) -> Vec<u8> {
    let mut values = vec![0u8; count as usize];
    for (i, value) in values.iter_mut().enumerate() {
        if let Some(byte) = data.get(i / 8) {
            *value = (byte >> (i % 8)) & 0x01;
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_big_endian_u16() {
        assert_eq!(encode_u16(0x1234), [0x12, 0x34]);
        assert_eq!(decode_u16([0x12, 0x34]), 0x1234);
        assert_eq!(decode_u16(encode_u16(0xFFFF)), 0xFFFF);
    }

    #[test]
    fn extracts_transaction_id_from_frame() {
        let frame = [0x12, 0x34, 0x00, 0x00, 0x00, 0x06, 0x01];
        assert_eq!(transaction_id(&frame), 0x1234);
        assert_eq!(transaction_id(&[0x01]), 0);
        assert_eq!(transaction_id(&[]), 0);
    }

    #[test]
    fn builds_response_header() {
        let header = build_response_header(0x1234, 0, 5, 0x01);
        assert_eq!(header, [0x12, 0x34, 0x00, 0x00, 0x00, 0x05, 0x01]);
    }

    #[test]
    fn byte_count_rounds_partial_bytes_up() {
        // zero bits need zero bytes, anything else rounds up to a whole byte
        assert_eq!(byte_count_for_bits(0), 0);
        assert_eq!(byte_count_for_bits(1), 1);
        assert_eq!(byte_count_for_bits(8), 1);
        assert_eq!(byte_count_for_bits(9), 2);
        // the largest read the validator admits
        assert_eq!(byte_count_for_bits(2000), 250);
        // a full u16 worth of bits must not wrap in the usize arithmetic
        assert_eq!(byte_count_for_bits(u16::MAX), 8192);
    }

    #[test]
    fn packs_bits_lsb_first() {
        assert_eq!(pack_bits(&[1, 0, 1]), vec![0b0000_0101]);
        assert_eq!(
            pack_bits(&[1, 0, 1, 0, 0, 0, 0, 0, 1]),
            vec![0b0000_0101, 0b0000_0001]
        );
        assert_eq!(pack_bits(&[]), Vec::<u8>::new());
    }

    #[test]
    fn unpacks_bits_lsb_first() {
        assert_eq!(unpack_bits(&[0b0000_0101], 3), vec![1, 0, 1]);
        assert_eq!(
            unpack_bits(&[0b0000_0101, 0b0000_0001], 9),
            vec![1, 0, 1, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn packing_round_trips() {
        let values = vec![1, 1, 0, 0, 1, 0, 1, 1, 0, 1];
        let packed = pack_bits(&values);
        assert_eq!(unpack_bits(&packed, values.len() as u16), values);
    }
}
