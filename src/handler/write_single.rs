use crate::codec;
use crate::constants::coil;
use crate::error::Error;
use crate::exception::ExceptionCode;
use crate::handler::{assemble, Handler};
use crate::request::Request;
use crate::store::Store;

/// 0x05 - Write Single Coil
pub(crate) struct WriteSingleCoil;

/// 0x06 - Write Single Register
pub(crate) struct WriteSingleRegister;

// Both single-write PDUs echo the start address and the value field
fn echo_value_pdu(request: &Request) -> Vec<u8> {
    let start = codec::encode_u16(request.start());
    let value = codec::encode_u16(request.quantity());
    vec![request.function(), start[0], start[1], value[0], value[1]]
}

impl Handler for WriteSingleCoil {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        // the validator only lets ON/OFF through, anything else is a misuse
        // of this handler via the custom registry
        let value = match request.quantity() {
            coil::ON => 1,
            coil::OFF => 0,
            _ => return Err(ExceptionCode::IllegalDataValue.into()),
        };

        store
            .write_coils_at(request.start(), &[value])
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        Ok(assemble(request, echo_value_pdu(request)))
    }
}

impl Handler for WriteSingleRegister {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        store
            .write_holding_registers_at(request.start(), &[request.quantity()])
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        Ok(assemble(request, echo_value_pdu(request)))
    }
}
