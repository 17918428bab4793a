//! 24C16-class I2C EEPROM
//!
//! 2 KiB organised as eight 256-byte blocks. The block number is carried in
//! the low three bits of the device address, the byte within the block in
//! a one-byte word address:
//!
//! ```text
//! memory address:  0b0000_0bbb_wwww_wwww
//!                         │││ └───┬───┘
//! device address:  0x50 | bbb     └──── word address
//! ```
//!
//! Addressing and framing are done by the `eeprom24x` device driver. This
//! store splits writes into 16-byte pages and reads into transfers of at
//! most 32 bytes that never cross a block. After each page the device runs
//! an internal write cycle during which it does not acknowledge; the store
//! retries a one-byte current-address read until the device answers or the
//! write timeout elapses.

use eeprom24x::{addr_size, page_size, unique_serial, SlaveAddr};
use embedded_hal::i2c::I2c;
use ember_core::traits::{PersistentStore, StoreError};
use ember_hal::Clock;

/// Device size in bytes
pub const CAPACITY: usize = 2048;

/// Write page size in bytes
pub const PAGE_SIZE: usize = 16;

/// Largest read transaction in bytes
pub const READ_CHUNK: usize = 32;

/// Bytes addressed by one device address
const BLOCK_SIZE: usize = 256;

/// Longest write cycle before a page write is reported as failed (µs)
pub const WRITE_TIMEOUT_US: u32 = 7_000;

/// 24C16 device driver
type Device<I2C> =
    eeprom24x::Eeprom24x<I2C, page_size::B16, addr_size::OneByte, unique_serial::No>;

/// 24C16 EEPROM on an I2C bus
pub struct Eeprom24x<I2C, C> {
    device: Device<I2C>,
    clock: C,
}

impl<I2C: I2c, C: Clock> Eeprom24x<I2C, C> {
    /// Create a store
    ///
    /// # Arguments
    /// - `i2c`: bus the device sits on, address pins unused (base 0x50)
    /// - `clock`: time source for the write-cycle timeout
    pub fn new(i2c: I2C, clock: C) -> Self {
        Self {
            device: eeprom24x::Eeprom24x::new_24x16(i2c, SlaveAddr::default()),
            clock,
        }
    }

    /// Give back the bus and clock
    pub fn release(self) -> (I2C, C) {
        (self.device.destroy(), self.clock)
    }

    fn check_range(address: usize, len: usize) -> Result<(), StoreError> {
        match address.checked_add(len) {
            Some(end) if end <= CAPACITY => Ok(()),
            _ => Err(StoreError::OutOfRange),
        }
    }

    /// Poll until the device finishes its write cycle
    fn wait_ready(&mut self) -> Result<(), StoreError> {
        let start = self.clock.now_micros();
        loop {
            if self.device.read_current_address().is_ok() {
                return Ok(());
            }
            if self.clock.elapsed_since(start) >= WRITE_TIMEOUT_US {
                return Err(StoreError::Timeout);
            }
        }
    }
}

fn store_error<E>(error: eeprom24x::Error<E>) -> StoreError {
    match error {
        eeprom24x::Error::I2C(_) => StoreError::Bus,
        _ => StoreError::OutOfRange,
    }
}

impl<I2C: I2c, C: Clock> PersistentStore for Eeprom24x<I2C, C> {
    fn capacity(&self) -> usize {
        CAPACITY
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), StoreError> {
        Self::check_range(address, data.len())?;

        let mut memory = address;
        let mut remaining = data;
        while !remaining.is_empty() {
            let len = remaining.len().min(PAGE_SIZE - memory % PAGE_SIZE);
            let (page, rest) = remaining.split_at(len);

            self.device
                .write_page(memory as u32, page)
                .map_err(store_error)?;
            self.wait_ready()?;

            memory += len;
            remaining = rest;
        }

        Ok(())
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        Self::check_range(address, buf.len())?;

        let mut memory = address;
        for chunk in ChunkIter::new(buf, address) {
            let len = chunk.len();
            self.device
                .read_data(memory as u32, chunk)
                .map_err(store_error)?;
            memory += len;
        }

        Ok(())
    }
}

/// Splits a read buffer at chunk and block limits
struct ChunkIter<'a> {
    rest: &'a mut [u8],
    memory: usize,
}

impl<'a> ChunkIter<'a> {
    fn new(buf: &'a mut [u8], memory: usize) -> Self {
        Self { rest: buf, memory }
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = &'a mut [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let len = self
            .rest
            .len()
            .min(READ_CHUNK)
            .min(BLOCK_SIZE - self.memory % BLOCK_SIZE);
        let rest = core::mem::take(&mut self.rest);
        let (chunk, tail) = rest.split_at_mut(len);
        self.rest = tail;
        self.memory += len;
        Some(chunk)
    }
}
