use std::ops::Range;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{Store, StoreError};

const DEFAULT_COILS_SIZE: usize = 100;
const DEFAULT_DISCRETE_INPUTS_SIZE: usize = 100;

struct Spaces {
    coils: Vec<u8>,
    discrete_inputs: Vec<u8>,
    holding_registers: Vec<u16>,
    input_registers: Vec<u16>,
}

/// In-memory [`Store`] guarding all four address spaces with a single
/// reader/writer lock.
///
/// Coils and discrete inputs default to 100 entries; the register spaces
/// start empty and are sized by the first bulk write. Every write operation
/// holds the exclusive lock for its full duration, so concurrent readers
/// observe either the pre-image or the post-image of a multi-value write,
/// never a mix.
pub struct InMemoryStore {
    spaces: RwLock<Spaces>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_sizes(DEFAULT_COILS_SIZE, DEFAULT_DISCRETE_INPUTS_SIZE, 0, 0)
    }

    /// Create a store with explicit sizes for each address space
    pub fn with_sizes(
        coils: usize,
        discrete_inputs: usize,
        holding_registers: usize,
        input_registers: usize,
    ) -> Self {
        Self {
            spaces: RwLock::new(Spaces {
                coils: vec![0; coils],
                discrete_inputs: vec![0; discrete_inputs],
                holding_registers: vec![0; holding_registers],
                input_registers: vec![0; input_registers],
            }),
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Spaces> {
        self.spaces.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Spaces> {
        self.spaces.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_range(len: usize, start: u16, count: usize) -> Result<Range<usize>, StoreError> {
    let begin = start as usize;
    let end = begin + count;
    if end > len {
        return Err(StoreError::InvalidAddress);
    }
    Ok(begin..end)
}

impl Store for InMemoryStore {
    fn read_coils(&self, start: u16, quantity: u16) -> Result<Vec<u8>, StoreError> {
        let guard = self.read_lock();
        let range = checked_range(guard.coils.len(), start, quantity as usize)?;
        Ok(guard.coils[range].to_vec())
    }

    fn read_discrete_inputs(&self, start: u16, quantity: u16) -> Result<Vec<u8>, StoreError> {
        let guard = self.read_lock();
        let range = checked_range(guard.discrete_inputs.len(), start, quantity as usize)?;
        Ok(guard.discrete_inputs[range].to_vec())
    }

    fn read_holding_registers(&self, start: u16, quantity: u16) -> Result<Vec<u16>, StoreError> {
        let guard = self.read_lock();
        let range = checked_range(guard.holding_registers.len(), start, quantity as usize)?;
        Ok(guard.holding_registers[range].to_vec())
    }

    fn read_input_registers(&self, start: u16, quantity: u16) -> Result<Vec<u16>, StoreError> {
        let guard = self.read_lock();
        let range = checked_range(guard.input_registers.len(), start, quantity as usize)?;
        Ok(guard.input_registers[range].to_vec())
    }

    fn write_coils(&self, values: Vec<u8>) -> Result<(), StoreError> {
        self.write_lock().coils = values;
        Ok(())
    }

    fn write_discrete_inputs(&self, values: Vec<u8>) -> Result<(), StoreError> {
        self.write_lock().discrete_inputs = values;
        Ok(())
    }

    fn write_holding_registers(&self, values: Vec<u16>) -> Result<(), StoreError> {
        self.write_lock().holding_registers = values;
        Ok(())
    }

    fn write_input_registers(&self, values: Vec<u16>) -> Result<(), StoreError> {
        self.write_lock().input_registers = values;
        Ok(())
    }

    fn write_coils_at(&self, start: u16, values: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.write_lock();
        let range = checked_range(guard.coils.len(), start, values.len())?;
        guard.coils[range].copy_from_slice(values);
        Ok(())
    }

    fn write_holding_registers_at(&self, start: u16, values: &[u16]) -> Result<(), StoreError> {
        let mut guard = self.write_lock();
        let range = checked_range(guard.holding_registers.len(), start, values.len())?;
        guard.holding_registers[range].copy_from_slice(values);
        Ok(())
    }
}
