use crate::codec;
use crate::error::Error;
use crate::exception::ExceptionCode;
use crate::handler::{assemble, Handler};
use crate::request::Request;
use crate::store::Store;

/// 0x03 - Read Holding Registers
pub(crate) struct ReadHoldingRegisters;

/// 0x04 - Read Input Registers
pub(crate) struct ReadInputRegisters;

fn read_registers(request: &Request, values: Vec<u16>) -> Result<Vec<u8>, Error> {
    let quantity = request.quantity() as usize;
    if values.len() < quantity {
        return Err(ExceptionCode::IllegalDataAddress.into());
    }

    let mut pdu = Vec::with_capacity(2 + quantity * 2);
    pdu.push(request.function());
    pdu.push((quantity * 2) as u8);
    for value in &values[..quantity] {
        pdu.extend_from_slice(&codec::encode_u16(*value));
    }
    Ok(assemble(request, pdu))
}

impl Handler for ReadHoldingRegisters {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        let values = store
            .read_holding_registers(request.start(), request.quantity())
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        read_registers(request, values)
    }
}

impl Handler for ReadInputRegisters {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        let values = store
            .read_input_registers(request.start(), request.quantity())
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        read_registers(request, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn returns_holding_registers_big_endian() {
        let store = InMemoryStore::new();
        store
            .write_holding_registers(vec![0x1234, 0x5678])
            .unwrap();

        let request = Request::parse(vec![
            0x00, 0x07, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x02,
        ])
        .unwrap();

        let response = ReadHoldingRegisters.handle(&request, &store).unwrap();
        assert_eq!(
            response,
            vec![0x00, 0x07, 0x00, 0x00, 0x00, 0x07, 0x01, 0x03, 0x04, 0x12, 0x34, 0x56, 0x78]
        );
    }

    #[test]
    fn returns_input_registers_big_endian() {
        let store = InMemoryStore::new();
        store.write_input_registers(vec![0xCAFE]).unwrap();

        let request = Request::parse(vec![
            0x00, 0x08, 0x00, 0x00, 0x00, 0x06, 0x01, 0x04, 0x00, 0x00, 0x00, 0x01,
        ])
        .unwrap();

        let response = ReadInputRegisters.handle(&request, &store).unwrap();
        assert_eq!(
            response,
            vec![0x00, 0x08, 0x00, 0x00, 0x00, 0x05, 0x01, 0x04, 0x02, 0xCA, 0xFE]
        );
    }

    #[test]
    fn read_past_the_configured_space_is_an_illegal_data_address() {
        let store = InMemoryStore::new();
        store.write_holding_registers(vec![0; 4]).unwrap();

        let request = Request::parse(vec![
            0x00, 0x07, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x03, 0x00, 0x02,
        ])
        .unwrap();
        assert_eq!(
            ReadHoldingRegisters.handle(&request, &store),
            Err(Error::Exception(ExceptionCode::IllegalDataAddress))
        );
    }
}
