use crate::codec;
use crate::error::Error;
use crate::exception::ExceptionCode;
use crate::handler::{assemble, echo_range_pdu, Handler};
use crate::request::Request;
use crate::store::Store;

/// 0x0F - Write Multiple Coils
pub(crate) struct WriteMultipleCoils;

/// 0x10 - Write Multiple Registers
pub(crate) struct WriteMultipleRegisters;

// The validator has already checked the byte count against the quantity and
// the data region against the frame length; a short frame here means the
// handler was fed something that never went through validation.
fn data_region(request: &Request) -> Result<&[u8], Error> {
    let byte_count = *request
        .frame()
        .get(12)
        .ok_or(ExceptionCode::IllegalDataValue)? as usize;
    request
        .frame()
        .get(13..13 + byte_count)
        .ok_or_else(|| ExceptionCode::IllegalDataValue.into())
}

impl Handler for WriteMultipleCoils {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        let data = data_region(request)?;
        let values = codec::unpack_bits(data, request.quantity());

        store
            .write_coils_at(request.start(), &values)
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        Ok(assemble(request, echo_range_pdu(request)))
    }
}

impl Handler for WriteMultipleRegisters {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        let data = data_region(request)?;
        let values: Vec<u16> = data
            .chunks_exact(2)
            .map(|pair| codec::decode_u16([pair[0], pair[1]]))
            .collect();

        store
            .write_holding_registers_at(request.start(), &values)
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        Ok(assemble(request, echo_range_pdu(request)))
    }
}
