//! Non-volatile storage trait

/// Errors from persistent storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Request extends past the end of the device
    OutOfRange,
    /// Transport reported an error
    Bus,
    /// Device did not finish its write cycle in time
    Timeout,
    /// Stored float decodes to NaN (erased or never written)
    NotANumber,
}

/// Byte-addressable non-volatile memory
///
/// Addresses are linear from zero. Requests past [`capacity`](Self::capacity)
/// fail with [`StoreError::OutOfRange`] without touching the device.
pub trait PersistentStore {
    /// Device size in bytes
    fn capacity(&self) -> usize;

    /// Write bytes starting at `address`
    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StoreError>;

    /// Read bytes starting at `address`
    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Write a little-endian `f32`
    fn write_f32(&mut self, address: usize, value: f32) -> Result<(), StoreError> {
        self.write(address, &value.to_le_bytes())
    }

    /// Read a little-endian `f32`, rejecting NaN
    fn read_f32(&mut self, address: usize) -> Result<f32, StoreError> {
        let mut bytes = [0u8; 4];
        self.read(address, &mut bytes)?;
        let value = f32::from_le_bytes(bytes);
        if value.is_nan() {
            return Err(StoreError::NotANumber);
        }
        Ok(value)
    }
}

impl<P: PersistentStore + ?Sized> PersistentStore for &mut P {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(address, data)
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        (**self).read(address, buf)
    }
}
