//! The parsed request record and the frame validator that produces it.

use crate::codec;
use crate::constants::{coil, function, limits, mbap};
use crate::error::{Error, FrameError};
use crate::exception::ExceptionCode;

/// An immutable, validated Modbus request.
///
/// A request owns its raw frame buffer, which is allocated fresh for every
/// socket read and never shared between requests. It lives for the duration
/// of a single dispatch.
#[derive(Debug, Clone)]
pub struct Request {
    frame: Vec<u8>,
    unit_id: u8,
    function: u8,
    start: u16,
    quantity: u16,
}

impl Request {
    /// Validate a raw frame and extract the request fields.
    ///
    /// The rules are applied in order: minimum frame length, protocol id,
    /// MBAP length field consistency, then the per-function-code PDU rules.
    /// Function codes outside the standard set bypass PDU validation so that
    /// custom handlers receive the frame as-is.
    pub fn parse(frame: Vec<u8>) -> Result<Request, Error> {
        if frame.len() < limits::MIN_FRAME_LENGTH {
            return Err(FrameError::InvalidLength(frame.len()).into());
        }

        let protocol_id = codec::decode_u16([frame[2], frame[3]]);
        if protocol_id != mbap::MODBUS_PROTOCOL_ID {
            return Err(FrameError::UnknownProtocolId(protocol_id).into());
        }

        let length_field = codec::decode_u16([frame[4], frame[5]]);
        if 6 + length_field as usize > frame.len() {
            return Err(FrameError::BadLengthField(length_field, frame.len()).into());
        }

        let request = Request {
            unit_id: frame[6],
            function: frame[7],
            start: codec::decode_u16([frame[8], frame[9]]),
            quantity: codec::decode_u16([frame[10], frame[11]]),
            frame,
        };
        request.validate_pdu()?;
        Ok(request)
    }

    fn validate_pdu(&self) -> Result<(), Error> {
        match self.function {
            function::READ_COILS
            | function::READ_DISCRETE_INPUTS
            | function::READ_HOLDING_REGISTERS
            | function::READ_INPUT_REGISTERS => {
                if self.quantity == 0 || self.quantity > limits::MAX_READ_COUNT {
                    return Err(ExceptionCode::IllegalDataValue.into());
                }
                self.check_address_overflow()
            }
            function::WRITE_SINGLE_COIL => match self.quantity {
                coil::ON | coil::OFF => Ok(()),
                _ => Err(ExceptionCode::IllegalDataValue.into()),
            },
            function::WRITE_SINGLE_REGISTER => Ok(()),
            function::WRITE_MULTIPLE_COILS => {
                self.check_write_multiple_region(codec::byte_count_for_bits(self.quantity))?;
                self.check_address_overflow()
            }
            function::WRITE_MULTIPLE_REGISTERS => {
                self.check_write_multiple_region(self.quantity as usize * 2)?;
                self.check_address_overflow()
            }
            // anything else is handed as-is to a custom handler
            _ => Ok(()),
        }
    }

    // the byte count at offset 12 must match what the quantity implies, and
    // the data region it promises must be present in the frame
    fn check_write_multiple_region(&self, expected_byte_count: usize) -> Result<(), Error> {
        if self.frame.len() < limits::MIN_WRITE_MULTIPLE_FRAME_LENGTH {
            return Err(ExceptionCode::IllegalDataValue.into());
        }
        let byte_count = self.frame[12] as usize;
        if byte_count != expected_byte_count {
            return Err(ExceptionCode::IllegalDataValue.into());
        }
        if self.frame.len() < 13 + byte_count {
            return Err(ExceptionCode::IllegalDataValue.into());
        }
        Ok(())
    }

    fn check_address_overflow(&self) -> Result<(), Error> {
        if self.start as u32 + self.quantity as u32 > 0x10000 {
            return Err(ExceptionCode::IllegalDataAddress.into());
        }
        Ok(())
    }

    /// The raw frame this request was parsed from
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    /// Transaction id echoed into the response header
    pub fn transaction_id(&self) -> u16 {
        codec::transaction_id(&self.frame)
    }

    /// Unit (slave) id the request is addressed to
    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// Function code of the request
    pub fn function(&self) -> u8 {
        self.function
    }

    /// Start address field
    pub fn start(&self) -> u16 {
        self.start
    }

    /// Quantity field, which carries the written value for the
    /// write-single function codes
    pub fn quantity(&self) -> u16 {
        self.quantity
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "unit: {:#04X} func: {:#04X} start: {} qty: {}",
            self.unit_id, self.function, self.start, self.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_coils_frame(start: u16, quantity: u16) -> Vec<u8> {
        let mut frame = vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x01];
        frame.extend_from_slice(&codec::encode_u16(start));
        frame.extend_from_slice(&codec::encode_u16(quantity));
        frame
    }

    #[test]
    fn parses_a_well_formed_read_request() {
        let request = Request::parse(read_coils_frame(0x0004, 9)).unwrap();
        assert_eq!(request.transaction_id(), 0x0001);
        assert_eq!(request.unit_id(), 0x01);
        assert_eq!(request.function(), 0x01);
        assert_eq!(request.start(), 4);
        assert_eq!(request.quantity(), 9);
    }

    #[test]
    fn rejects_short_frames() {
        assert_eq!(
            Request::parse(vec![0x00; 11]).unwrap_err(),
            Error::Frame(FrameError::InvalidLength(11))
        );
    }

    #[test]
    fn rejects_non_modbus_protocol_id() {
        let mut frame = read_coils_frame(0, 1);
        frame[2] = 0xCA;
        frame[3] = 0xFE;
        assert_eq!(Request::parse(frame).unwrap_err(), Error::Frame(FrameError::UnknownProtocolId(0xCAFE)));
    }

    #[test]
    fn rejects_length_field_disagreeing_with_frame() {
        let mut frame = read_coils_frame(0, 1);
        frame[5] = 0x07; // promises one more byte than the frame holds
        assert_eq!(Request::parse(frame).unwrap_err(), Error::Frame(FrameError::BadLengthField(7, 12)));
    }

    #[test]
    fn rejects_read_quantity_out_of_bounds() {
        assert_eq!(Request::parse(read_coils_frame(0, 0)).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataValue));
        assert_eq!(Request::parse(read_coils_frame(0, 2001)).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataValue));
        assert!(Request::parse(read_coils_frame(0, 2000)).is_ok());
    }

    #[test]
    fn rejects_read_range_overflowing_the_address_space() {
        assert_eq!(Request::parse(read_coils_frame(0xFFFF, 2)).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataAddress));
        assert!(Request::parse(read_coils_frame(0xFFFF, 1)).is_ok());
    }

    #[test]
    fn rejects_bad_single_coil_values() {
        let mut frame = read_coils_frame(0, 0);
        frame[7] = function::WRITE_SINGLE_COIL;
        frame[10] = 0x12;
        frame[11] = 0x34;
        assert_eq!(Request::parse(frame.clone()).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataValue));

        for value in [coil::ON, coil::OFF] {
            let mut frame = frame.clone();
            let encoded = codec::encode_u16(value);
            frame[10] = encoded[0];
            frame[11] = encoded[1];
            assert!(Request::parse(frame).is_ok());
        }
    }

    #[test]
    fn accepts_any_single_register_value() {
        let mut frame = read_coils_frame(0, 0);
        frame[7] = function::WRITE_SINGLE_REGISTER;
        frame[10] = 0xAB;
        frame[11] = 0xCD;
        let request = Request::parse(frame).unwrap();
        assert_eq!(request.quantity(), 0xABCD);
    }

    fn write_multiple_registers_frame(quantity: u16, byte_count: u8, data: &[u8]) -> Vec<u8> {
        let mut frame = vec![0x00, 0x01, 0x00, 0x00];
        frame.extend_from_slice(&codec::encode_u16(7 + data.len() as u16));
        frame.extend_from_slice(&[0x01, function::WRITE_MULTIPLE_REGISTERS, 0x00, 0x00]);
        frame.extend_from_slice(&codec::encode_u16(quantity));
        frame.push(byte_count);
        frame.extend_from_slice(data);
        frame
    }

    #[test]
    fn rejects_write_multiple_registers_byte_count_mismatch() {
        // quantity = 2 but byte count declares 3
        let frame = write_multiple_registers_frame(2, 3, &[0x01, 0x02, 0x03]);
        assert_eq!(Request::parse(frame).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataValue));
    }

    #[test]
    fn rejects_write_multiple_registers_with_truncated_data() {
        let frame = write_multiple_registers_frame(2, 4, &[0x01, 0x02, 0x03]);
        assert_eq!(Request::parse(frame).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataValue));
    }

    #[test]
    fn accepts_write_multiple_registers_with_matching_byte_count() {
        let frame = write_multiple_registers_frame(2, 4, &[0x12, 0x34, 0x56, 0x78]);
        assert!(Request::parse(frame).is_ok());
    }

    #[test]
    fn rejects_write_multiple_coils_byte_count_mismatch() {
        let mut frame = write_multiple_registers_frame(9, 3, &[0x05, 0x01, 0x00]);
        frame[7] = function::WRITE_MULTIPLE_COILS;
        // 9 coils require 2 data bytes, not 3
        assert_eq!(Request::parse(frame).unwrap_err(), Error::Exception(ExceptionCode::IllegalDataValue));
    }

    #[test]
    fn accepts_write_multiple_coils_with_matching_byte_count() {
        let mut frame = write_multiple_registers_frame(9, 2, &[0x05, 0x01]);
        frame[7] = function::WRITE_MULTIPLE_COILS;
        assert!(Request::parse(frame).is_ok());
    }

    #[test]
    fn custom_function_codes_bypass_pdu_validation() {
        let mut frame = read_coils_frame(0, 0); // quantity of zero would fail a read
        frame[7] = 0x42;
        let request = Request::parse(frame).unwrap();
        assert_eq!(request.function(), 0x42);
        assert_eq!(request.quantity(), 0);
    }
}
