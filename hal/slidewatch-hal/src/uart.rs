//! Serial channel abstractions
//!
//! The radio module is reached over a plain UART. The link layer treats it
//! as an unreliable, unframed byte pipe: it writes whole command lines and
//! polls for whatever bytes have arrived.

use embedded_io::{Read, ReadReady, Write};

/// Byte-oriented, half-duplex serial transport
///
/// No framing or reliability is assumed; all framing is applied by the
/// command channel and receive parser on top of this trait.
pub trait SerialChannel {
    /// Error type for transport operations
    type Error: core::fmt::Debug;

    /// Write all bytes, blocking until they are queued for transmission
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Number of bytes that can be read without blocking
    ///
    /// Implementations that cannot count may return a lower bound (1 when
    /// any data is pending); callers loop until this reports 0.
    fn available(&mut self) -> Result<usize, Self::Error>;

    /// Read one byte
    ///
    /// Only called after `available` reported pending data.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

impl<T: SerialChannel + ?Sized> SerialChannel for &mut T {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(data)
    }

    fn available(&mut self) -> Result<usize, Self::Error> {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }
}

/// Adapter exposing any blocking `embedded-io` port as a [`SerialChannel`]
///
/// Works with buffered HAL UARTs that implement `Read + Write + ReadReady`.
pub struct IoSerial<T> {
    inner: T,
}

impl<T> IoSerial<T> {
    /// Wrap a blocking `embedded-io` port
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped port
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Release the wrapped port
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> SerialChannel for IoSerial<T>
where
    T: Read + Write + ReadReady,
{
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)?;
        self.inner.flush()
    }

    fn available(&mut self) -> Result<usize, Self::Error> {
        Ok(usize::from(self.inner.read_ready()?))
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        loop {
            if self.inner.read(&mut buf)? == 1 {
                return Ok(buf[0]);
            }
        }
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    /// Wio-E5 factory setting: 9600 8N1
    fn default() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
