use crate::codec;
use crate::error::Error;
use crate::exception::ExceptionCode;
use crate::handler::{assemble, Handler};
use crate::request::Request;
use crate::store::Store;

/// 0x01 - Read Coils
pub(crate) struct ReadCoils;

/// 0x02 - Read Discrete Inputs
pub(crate) struct ReadDiscreteInputs;

// Shared by both bit-read handlers: the store hands back one byte per bit,
// the wire wants them packed LSB-first into ceil(quantity / 8) bytes.
fn read_bits(request: &Request, values: Vec<u8>) -> Result<Vec<u8>, Error> {
    if values.len() < request.quantity() as usize {
        return Err(ExceptionCode::IllegalDataAddress.into());
    }

    let packed = codec::pack_bits(&values[..request.quantity() as usize]);
    let mut pdu = Vec::with_capacity(2 + packed.len());
    pdu.push(request.function());
    pdu.push(packed.len() as u8);
    pdu.extend_from_slice(&packed);
    Ok(assemble(request, pdu))
}

impl Handler for ReadCoils {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        let values = store
            .read_coils(request.start(), request.quantity())
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        read_bits(request, values)
    }
}

impl Handler for ReadDiscreteInputs {
    fn handle(&self, request: &Request, store: &dyn Store) -> Result<Vec<u8>, Error> {
        let values = store
            .read_discrete_inputs(request.start(), request.quantity())
            .map_err(|_| ExceptionCode::IllegalDataAddress)?;
        read_bits(request, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn packs_coils_into_wire_bytes() {
        let store = InMemoryStore::new();
        store
            .write_coils(vec![1, 0, 1, 0, 0, 0, 0, 0, 1])
            .unwrap();

        let request = Request::parse(vec![
            0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x01, 0x00, 0x00, 0x00, 0x09,
        ])
        .unwrap();

        let response = ReadCoils.handle(&request, &store).unwrap();
        assert_eq!(
            response,
            vec![0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x01, 0x01, 0x02, 0x05, 0x01]
        );
    }

    #[test]
    fn out_of_range_read_is_an_illegal_data_address() {
        let store = InMemoryStore::with_sizes(8, 8, 0, 0);
        let request = Request::parse(vec![
            0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x01, 0x00, 0x05, 0x00, 0x04,
        ])
        .unwrap();
        assert_eq!(
            ReadCoils.handle(&request, &store),
            Err(Error::Exception(ExceptionCode::IllegalDataAddress))
        );
    }

    #[test]
    fn reads_discrete_inputs_preloaded_by_the_store_owner() {
        let store = InMemoryStore::new();
        store.write_discrete_inputs(vec![0, 1, 1]).unwrap();

        let request = Request::parse(vec![
            0x00, 0x02, 0x00, 0x00, 0x00, 0x06, 0x01, 0x02, 0x00, 0x00, 0x00, 0x03,
        ])
        .unwrap();

        let response = ReadDiscreteInputs.handle(&request, &store).unwrap();
        assert_eq!(
            response,
            vec![0x00, 0x02, 0x00, 0x00, 0x00, 0x04, 0x01, 0x02, 0x01, 0x06]
        );
    }
}
