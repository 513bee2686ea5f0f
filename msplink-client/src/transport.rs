//! Byte transport abstraction and the serial implementation
//!
//! The protocol client needs very little from its transport: timeout-bounded
//! reads that report "no data yet" as zero bytes, all-or-error writes, a
//! blocking flush, and a best-effort count of queued input. Anything
//! satisfying that contract can carry MSP frames.

use std::io::{self, Read, Write};

use serialport::SerialPort;

use crate::config::LinkConfig;
use crate::error::Result;

/// Contract the protocol client requires from a byte transport.
pub trait Transport {
    /// Read up to `buf.len()` bytes.
    ///
    /// Returns 0 when the read timeout expires with no data rather than
    /// blocking indefinitely; may return fewer bytes than requested.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write the whole buffer, blocking until done or an unrecoverable
    /// error occurs.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Block until pending output has physically left the device.
    fn flush(&mut self) -> io::Result<()>;

    /// Best-effort hint of queued input bytes.
    ///
    /// Racy: the count may be stale by the time it is returned. Never a
    /// read-readiness guarantee on its own.
    fn bytes_to_read(&mut self) -> io::Result<usize>;
}

/// Serial port transport configured for raw binary I/O.
///
/// The device runs 8 data bits, no parity, one stop bit, no flow control;
/// reads return after the first byte or the configured timeout.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open and configure the device named by `config`.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let port = serialport::new(config.path.as_str(), config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.timeout)
            .open()?;
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.port.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn bytes_to_read(&mut self) -> io::Result<usize> {
        let n = self.port.bytes_to_read().map_err(io::Error::from)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::Transport;
    use std::collections::VecDeque;
    use std::io;

    /// Scripted transport for tests: hands out queued bytes and records
    /// everything written. An empty queue reads as a timeout (0 bytes).
    pub struct MockTransport {
        pub incoming: VecDeque<u8>,
        pub written: Vec<u8>,
        pub flushes: usize,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                incoming: VecDeque::new(),
                written: Vec::new(),
                flushes: 0,
            }
        }

        pub fn with_incoming(bytes: &[u8]) -> Self {
            let mut mock = Self::new();
            mock.push_incoming(bytes);
            mock
        }

        pub fn push_incoming(&mut self, bytes: &[u8]) {
            self.incoming.extend(bytes.iter().copied());
        }
    }

    impl Transport for MockTransport {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut n = 0;
            while n < buf.len() {
                match self.incoming.pop_front() {
                    Some(byte) => {
                        buf[n] = byte;
                        n += 1;
                    }
                    None => break,
                }
            }
            Ok(n)
        }

        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.written.extend_from_slice(buf);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }

        fn bytes_to_read(&mut self) -> io::Result<usize> {
            Ok(self.incoming.len())
        }
    }
}
