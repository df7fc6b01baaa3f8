//! Built-in handlers for the eight standard function codes.
//!
//! Each handler consumes a validated [`Request`] and the injected store and
//! produces the complete response frame (MBAP header plus PDU), or an error.
//! Store-level address failures surface as `ILLEGAL_DATA_ADDRESS`; malformed
//! PDU content surfaces as `ILLEGAL_DATA_VALUE`.

use std::collections::BTreeMap;

use crate::codec;
use crate::constants::function;
use crate::error::Error;
use crate::request::Request;
use crate::store::Store;

mod read_bits;
mod read_registers;
mod write_multiple;
mod write_single;

use read_bits::{ReadCoils, ReadDiscreteInputs};
use read_registers::{ReadHoldingRegisters, ReadInputRegisters};
use write_multiple::{WriteMultipleCoils, WriteMultipleRegisters};
use write_single::{WriteSingleCoil, WriteSingleRegister};

/// A function-code-specific request handler
pub(crate) trait Handler: Send + Sync {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error>;
}

/// The built-in handler table consulted by the dispatcher after the custom
/// handler map
pub(crate) fn builtin_handlers() -> BTreeMap<u8, Box<dyn Handler>> {
    let mut handlers: BTreeMap<u8, Box<dyn Handler>> = BTreeMap::new();
    handlers.insert(function::READ_COILS, Box::new(ReadCoils));
    handlers.insert(function::READ_DISCRETE_INPUTS, Box::new(ReadDiscreteInputs));
    handlers.insert(
        function::READ_HOLDING_REGISTERS,
        Box::new(ReadHoldingRegisters),
    );
    handlers.insert(function::READ_INPUT_REGISTERS, Box::new(ReadInputRegisters));
    handlers.insert(function::WRITE_SINGLE_COIL, Box::new(WriteSingleCoil));
    handlers.insert(
        function::WRITE_SINGLE_REGISTER,
        Box::new(WriteSingleRegister),
    );
    handlers.insert(function::WRITE_MULTIPLE_COILS, Box::new(WriteMultipleCoils));
    handlers.insert(
        function::WRITE_MULTIPLE_REGISTERS,
        Box::new(WriteMultipleRegisters),
    );
    handlers
}

/// Prepend the MBAP header to a response PDU. The header's length field is
/// the PDU length plus one for the unit id.
pub(crate) fn assemble(request: &Request, pdu: Vec<u8>) -> Vec<u8> {
    let header = codec::build_response_header(
        request.transaction_id(),
        crate::constants::mbap::MODBUS_PROTOCOL_ID,
        pdu.len() as u16 + 1,
        request.unit_id(),
    );
    let mut response = Vec::with_capacity(header.len() + pdu.len());
    response.extend_from_slice(&header);
    response.extend_from_slice(&pdu);
    response
}

/// PDU that echoes the start address and quantity of a write-multiple request
pub(crate) fn echo_range_pdu(request: &Request) -> Vec<u8> {
    let start = codec::encode_u16(request.start());
    let quantity = codec::encode_u16(request.quantity());
    vec![
        request.function(),
        start[0],
        start[1],
        quantity[0],
        quantity[1],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_eight_standard_function_codes() {
        let handlers = builtin_handlers();
        assert_eq!(
            handlers.keys().copied().collect::<Vec<u8>>(),
            vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x0F, 0x10]
        );
    }

    #[test]
    fn assembled_response_length_field_covers_unit_id_and_pdu() {
        let request = Request::parse(vec![
            0x00, 0x07, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x01,
        ])
        .unwrap();
        let response = assemble(&request, vec![0x03, 0x02, 0x12, 0x34]);
        assert_eq!(
            response,
            vec![0x00, 0x07, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02, 0x12, 0x34]
        );
        // MBAP length equals total length minus the six leading header bytes
        assert_eq!(
            codec::decode_u16([response[4], response[5]]) as usize,
            response.len() - 6
        );
    }
}
