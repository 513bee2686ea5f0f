//! Blocking MSP exchange over a byte transport
//!
//! The client owns its transport and a persistent frame parser. All
//! operations are synchronous: a reply wait measures one deadline on entry
//! and keeps pulling bytes through the parser until a matching frame
//! arrives or the deadline passes. Malformed input (noise, checksum
//! failures, unrelated frames) is consumed silently inside that budget;
//! only transport faults and the deadline itself surface to the caller.

use std::time::{Duration, Instant};

use msplink_protocol::frame::{Direction, Frame, FrameParser, MAX_PAYLOAD_SIZE};
use tracing::{debug, trace};

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::transport::{SerialTransport, Transport};

/// MSP protocol client: framing, correlation and timeouts over one
/// exclusively-owned transport.
///
/// Not reentrant: there is at most one exchange in flight, enforced by
/// `&mut self`. Two threads interleaving sends would corrupt framing on the
/// wire; serialize externally if concurrent use is ever needed.
pub struct MspClient<T: Transport> {
    transport: T,
    timeout: Duration,
    parser: FrameParser,
}

impl MspClient<SerialTransport> {
    /// Open the configured serial device and bind a client to it.
    pub fn open(config: &LinkConfig) -> Result<Self> {
        let transport = SerialTransport::open(config)?;
        Ok(Self::new(transport, config.timeout))
    }
}

impl<T: Transport> MspClient<T> {
    /// Bind a client to an already-configured transport.
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            parser: FrameParser::new(),
        }
    }

    /// The configured reply budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[cfg(test)]
    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Encode one frame and write it out.
    ///
    /// Fire-and-forget: no reply correlation. The write blocks until the
    /// whole frame is handed to the transport; a write failure is fatal to
    /// the call and is not retried.
    pub fn send(&mut self, direction: Direction, command: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(LinkError::PayloadTooLarge {
                size: payload.len(),
            });
        }

        let frame = Frame::new(direction, command, payload).map_err(|_| {
            LinkError::PayloadTooLarge {
                size: payload.len(),
            }
        })?;
        let encoded = frame.encode_to_vec().map_err(|_| LinkError::PayloadTooLarge {
            size: payload.len(),
        })?;

        trace!(command, len = payload.len(), "send frame");
        self.transport.write_all(&encoded)?;
        Ok(())
    }

    /// Pull bytes until one frame passes the parser or `deadline` expires.
    fn next_frame(&mut self, deadline: Instant) -> Result<Frame> {
        let mut byte = [0u8; 1];
        loop {
            if Instant::now() >= deadline {
                return Err(LinkError::Timeout);
            }

            let n = self.transport.read(&mut byte)?;
            if n == 0 {
                // Read timeout: nothing arrived, re-check the deadline
                continue;
            }

            match self.parser.feed(byte[0]) {
                Ok(Some(frame)) => {
                    trace!(command = frame.command, len = frame.payload.len(), "frame received");
                    return Ok(frame);
                }
                Ok(None) => {}
                Err(err) => {
                    // Malformed input costs budget, never the call
                    trace!(%err, "discarding malformed input");
                }
            }
        }
    }

    /// Receive one validated frame within the timeout budget.
    ///
    /// The parser resynchronizes internally, so a single call may consume
    /// and discard any amount of noise before a frame passes. The payload
    /// is copied into `payload_out` (truncated to the buffer if longer) and
    /// the rest of the buffer is zero-filled; the returned length is the
    /// number of payload bytes copied. An error-direction frame is
    /// reported as [`LinkError::ErrorReply`].
    pub fn recv(&mut self, payload_out: &mut [u8]) -> Result<(u8, usize)> {
        let deadline = Instant::now() + self.timeout;
        let frame = self.next_frame(deadline)?;
        if frame.direction == Direction::Error {
            return Err(LinkError::ErrorReply {
                command: frame.command,
            });
        }
        let copied = copy_zero_padded(&frame.payload, payload_out);
        Ok((frame.command, copied))
    }

    /// Wait for a response bearing `command`, discarding everything else.
    ///
    /// One deadline is measured at entry; frames with other command ids
    /// consume budget but never restart it, so a peer streaming unrelated
    /// frames cannot starve the caller. An error frame bearing the awaited
    /// command id fails the wait rather than passing for an answer.
    pub fn wait_for(&mut self, command: u8, payload_out: &mut [u8]) -> Result<usize> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let frame = self.next_frame(deadline)?;
            if frame.command != command {
                debug!(got = frame.command, want = command, "discarding unrelated frame");
                continue;
            }
            if frame.direction == Direction::Error {
                return Err(LinkError::ErrorReply { command });
            }
            return Ok(copy_zero_padded(&frame.payload, payload_out));
        }
    }

    /// Send a zero-payload request and wait for its response.
    pub fn request(&mut self, command: u8, payload_out: &mut [u8]) -> Result<usize> {
        self.send(Direction::Request, command, &[])?;
        self.wait_for(command, payload_out)
    }

    /// Send a command with payload; optionally wait for the acknowledgement.
    ///
    /// The acknowledgement is nothing more than a zero-length response
    /// bearing the same command id. MSP cannot distinguish "peer received
    /// the command" from "peer applied it"; a successful ACK wait proves
    /// only the former.
    pub fn command(&mut self, command: u8, payload: &[u8], wait_ack: bool) -> Result<()> {
        self.send(Direction::Request, command, payload)?;
        if wait_ack {
            self.wait_for(command, &mut [])?;
        }
        Ok(())
    }

    /// Flush pending output and discard buffered input.
    ///
    /// Clears parser state too, so stale or partial frames cannot
    /// masquerade as replies to the next exchange.
    pub fn reset(&mut self) -> Result<()> {
        debug!("resetting link");
        self.transport.flush()?;

        let mut scratch = [0u8; 64];
        while self.transport.bytes_to_read()? > 0 {
            if self.transport.read(&mut scratch)? == 0 {
                // The hint raced the device; nothing actually queued
                break;
            }
        }

        self.parser.reset();
        Ok(())
    }
}

impl<T: Transport> Drop for MspClient<T> {
    fn drop(&mut self) {
        // Orderly drain; teardown failures have nowhere to go
        let _ = self.transport.flush();
    }
}

/// Copy `src` into `dst`, zero-filling the tail of `dst`. Longer payloads
/// are truncated to the buffer. Returns the number of bytes copied.
fn copy_zero_padded(src: &[u8], dst: &mut [u8]) -> usize {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    dst[n..].fill(0);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use msplink_protocol::command::{MSP_ALTITUDE, MSP_API_VERSION, MSP_SET_RAW_RC};

    fn wire_bytes(direction: Direction, command: u8, payload: &[u8]) -> Vec<u8> {
        Frame::new(direction, command, payload)
            .unwrap()
            .encode_to_vec()
            .unwrap()
            .to_vec()
    }

    fn client_with_incoming(bytes: &[u8], timeout: Duration) -> MspClient<MockTransport> {
        MspClient::new(MockTransport::with_incoming(bytes), timeout)
    }

    #[test]
    fn test_request_api_version() {
        let reply = wire_bytes(Direction::Response, MSP_API_VERSION, &[1, 45, 2]);
        let mut client = client_with_incoming(&reply, Duration::from_millis(1000));

        let mut payload = [0u8; 3];
        let n = client.request(MSP_API_VERSION, &mut payload).unwrap();

        assert_eq!(n, 3);
        assert_eq!(payload, [1, 45, 2]);
        // The request on the wire: zero-length frame, checksum = 0 ^ 1
        assert_eq!(client.transport.written, [b'$', b'M', b'<', 0, 1, 1]);
    }

    #[test]
    fn test_recv_zero_pads_buffer() {
        let reply = wire_bytes(Direction::Response, 42, &[7, 8]);
        let mut client = client_with_incoming(&reply, Duration::from_millis(1000));

        let mut payload = [0xFFu8; 6];
        let (command, n) = client.recv(&mut payload).unwrap();

        assert_eq!(command, 42);
        assert_eq!(n, 2);
        assert_eq!(payload, [7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn test_recv_truncates_long_payload() {
        let reply = wire_bytes(Direction::Response, 42, &[1, 2, 3, 4, 5]);
        let mut client = client_with_incoming(&reply, Duration::from_millis(1000));

        let mut payload = [0u8; 3];
        let (_, n) = client.recv(&mut payload).unwrap();

        assert_eq!(n, 3);
        assert_eq!(payload, [1, 2, 3]);
    }

    #[test]
    fn test_recv_resyncs_through_noise() {
        let frame_a = wire_bytes(Direction::Response, 1, &[1, 45, 2]);
        let frame_b = wire_bytes(Direction::Response, 109, &[0, 0, 0, 0, 0, 0]);

        let mut stream = vec![0x00, 0xFF, 0x13];
        stream.extend_from_slice(&frame_a);
        // Garbage with an accidental sync byte between the frames
        stream.extend_from_slice(&[0x55, b'$', 0x99]);
        stream.extend_from_slice(&frame_b);

        let mut client = client_with_incoming(&stream, Duration::from_millis(1000));

        let mut payload = [0u8; 8];
        let (first, _) = client.recv(&mut payload).unwrap();
        let (second, _) = client.recv(&mut payload).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 109);
    }

    #[test]
    fn test_recv_skips_corrupted_frame() {
        let mut corrupted = wire_bytes(Direction::Response, 7, &[1, 2, 3]);
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xFF;
        let good = wire_bytes(Direction::Response, 8, &[4]);

        let mut stream = corrupted;
        stream.extend_from_slice(&good);

        let mut client = client_with_incoming(&stream, Duration::from_millis(1000));
        let mut payload = [0u8; 4];
        let (command, n) = client.recv(&mut payload).unwrap();

        assert_eq!(command, 8);
        assert_eq!(n, 1);
    }

    #[test]
    fn test_wait_for_filters_command_ids() {
        let unrelated = wire_bytes(Direction::Response, 100, &[9]);
        let wanted = wire_bytes(Direction::Response, 105, &[2, 3]);

        let mut stream = unrelated;
        stream.extend_from_slice(&wanted);

        let mut client = client_with_incoming(&stream, Duration::from_millis(1000));
        let mut payload = [0u8; 2];
        let n = client.wait_for(105, &mut payload).unwrap();

        assert_eq!(n, 2);
        assert_eq!(payload, [2, 3]);
    }

    #[test]
    fn test_request_timeout_is_bounded() {
        let timeout = Duration::from_millis(50);
        let mut client = client_with_incoming(&[], timeout);

        let started = Instant::now();
        let mut payload = [0u8; 6];
        let result = client.request(MSP_ALTITUDE, &mut payload);
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(LinkError::Timeout)));
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(500));
    }

    #[test]
    fn test_unrelated_frames_do_not_restart_budget() {
        // A steady stream of wrong-id frames must not extend the wait
        let timeout = Duration::from_millis(50);
        let mut stream = Vec::new();
        for _ in 0..16 {
            stream.extend_from_slice(&wire_bytes(Direction::Response, 99, &[0]));
        }

        let mut client = client_with_incoming(&stream, timeout);
        let started = Instant::now();
        let result = client.wait_for(42, &mut []);

        assert!(matches!(result, Err(LinkError::Timeout)));
        assert!(started.elapsed() < timeout + Duration::from_millis(500));
    }

    #[test]
    fn test_client_usable_after_timeout() {
        let mut client = client_with_incoming(&[], Duration::from_millis(25));

        let mut payload = [0u8; 6];
        assert!(matches!(
            client.request(MSP_ALTITUDE, &mut payload),
            Err(LinkError::Timeout)
        ));

        client.reset().unwrap();
        client
            .transport
            .push_incoming(&wire_bytes(Direction::Response, MSP_ALTITUDE, &[0; 6]));

        let n = client.request(MSP_ALTITUDE, &mut payload).unwrap();
        assert_eq!(n, 6);
    }

    #[test]
    fn test_error_frame_fails_ack_wait() {
        let reply = wire_bytes(Direction::Error, MSP_SET_RAW_RC, &[]);
        let mut client = client_with_incoming(&reply, Duration::from_millis(1000));

        let result = client.command(MSP_SET_RAW_RC, &[0; 16], true);
        assert!(matches!(
            result,
            Err(LinkError::ErrorReply { command: MSP_SET_RAW_RC })
        ));
    }

    #[test]
    fn test_command_with_ack_echo() {
        let ack = wire_bytes(Direction::Response, MSP_SET_RAW_RC, &[]);
        let mut client = client_with_incoming(&ack, Duration::from_millis(1000));

        client.command(MSP_SET_RAW_RC, &[0xAA; 16], true).unwrap();

        let written = &client.transport.written;
        assert_eq!(&written[..5], &[b'$', b'M', b'<', 16, MSP_SET_RAW_RC]);
        assert_eq!(written.len(), 16 + 6);
    }

    #[test]
    fn test_command_without_ack_does_not_wait() {
        let mut client = client_with_incoming(&[], Duration::from_millis(1000));
        // Would time out if it waited
        client.command(MSP_SET_RAW_RC, &[0; 16], false).unwrap();
        assert!(!client.transport.written.is_empty());
    }

    #[test]
    fn test_send_rejects_oversize_payload() {
        let mut client = client_with_incoming(&[], Duration::from_millis(1000));
        let oversize = [0u8; 300];

        let result = client.send(Direction::Request, 5, &oversize);
        assert!(matches!(
            result,
            Err(LinkError::PayloadTooLarge { size: 300 })
        ));
        assert!(client.transport.written.is_empty());
    }

    #[test]
    fn test_reset_drains_input_and_flushes() {
        let mut client = client_with_incoming(&[0xDE, 0xAD, 0xBE, 0xEF], Duration::from_millis(1000));

        client.reset().unwrap();

        assert!(client.transport.incoming.is_empty());
        assert_eq!(client.transport.flushes, 1);
    }
}
